use std::sync::Arc;
use primitives::hash::H256;
use error::Error;
use stored_block::StoredBlock;

/// Keeps a map of block hashes to stored blocks and remembers which of them
/// is the head of the best chain. The chain object itself stores no data.
pub trait BlockStore: Send + Sync {
	/// Get the stored block with the given header hash.
	fn block(&self, hash: &H256) -> Result<Option<StoredBlock>, Error>;

	/// Add or update the given stored block.
	fn insert(&self, block: StoredBlock) -> Result<(), Error>;

	/// Get the head of the best known chain.
	fn best_block(&self) -> Result<StoredBlock, Error>;

	/// Durably record the new head of the best known chain.
	fn set_best_block(&self, block: &StoredBlock) -> Result<(), Error>;
}

/// Store that additionally retains the undo data a full-validation chain
/// needs to disconnect blocks during a reorganization.
pub trait UndoableBlockStore: BlockStore {
	/// Get the stored block with the given header hash, in undoable scope.
	/// Blocks whose undo data was pruned are not returned here.
	fn undoable_block(&self, hash: &H256) -> Result<Option<StoredBlock>, Error>;
}

pub type SharedStore = Arc<dyn BlockStore>;
