extern crate parking_lot;

extern crate primitives;
extern crate storage;

#[cfg(test)]
extern crate chain;

mod memory_store;

pub use memory_store::{MemoryBlockStore, SharedMemoryBlockStore};
