//! The chain state machine: holds a series of blocks, links them together
//! into a tree rooted at genesis, and knows how to verify that additions
//! follow the network consensus rules.
//!
//! The 'chain' is actually a tree, although in normal operation it operates
//! mostly as a list of blocks. When multiple new head blocks are found
//! simultaneously there are multiple stories of the economy competing to
//! become the one true consensus, either naturally when two miners solve a
//! block within a few seconds of each other, or when the chain is under
//! attack.
//!
//! A reference to the head block of the best known chain is kept: the chain
//! representing the largest amount of work done. Adding a block on top of
//! the head is a plain extension; adding a block that connects to some other
//! stored block opens a side chain, and when a side chain accumulates more
//! work than the best one a reorganize switches the head over to it.
//!
//! The chain object stores no data itself; that is delegated to a
//! `BlockStore`. Two configurations are wired through the hook seams:
//! a lightweight header-only chain (`HeaderStoreHook` + `NullUtxo`) that
//! implements simplified payment verification, and a full-validation chain
//! (`UndoableStoreHook` + a real `UtxoHook`) equivalent to the original
//! client.

#[macro_use]
extern crate log;
extern crate linked_hash_map;
extern crate parking_lot;
extern crate time;

extern crate chain;
extern crate network;
extern crate primitives;
extern crate storage;
extern crate verification;

#[cfg(test)]
extern crate db;

mod block_chain;
mod hooks;
mod listener;
mod orphan_pool;

pub use primitives::{bigint, hash, compact};

pub use block_chain::{BlockChain, SpvBlockChain, FullBlockChain};
pub use hooks::{StoreHook, HeaderStoreHook, UndoableStoreHook, UtxoHook, NullUtxo};
pub use listener::{ChainListener, ListenerRegistry, NewBlockType};
pub use orphan_pool::{OrphanBlock, OrphanPool};
pub use verification::Error;
