extern crate chain;
extern crate primitives;

mod block_store;
mod error;
mod stored_block;
mod tx_output_changes;

pub use primitives::{hash, bigint, compact};

pub use block_store::{BlockStore, UndoableBlockStore, SharedStore};
pub use error::Error;
pub use stored_block::{StoredBlock, block_work};
pub use tx_output_changes::TransactionOutputChanges;
