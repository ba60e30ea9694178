use std::collections::HashMap;
use std::sync::Arc;
use parking_lot::RwLock;
use primitives::hash::H256;
use storage::{BlockStore, UndoableBlockStore, StoredBlock, Error};

#[derive(Default)]
struct InnerStore {
	blocks: HashMap<H256, StoredBlock>,
	best_block: Option<StoredBlock>,
}

/// In-memory block store. Undo data is never pruned, so every stored block
/// is also visible in undoable scope.
#[derive(Default)]
pub struct MemoryBlockStore {
	db: RwLock<InnerStore>,
}

impl MemoryBlockStore {
	/// Creates a store seeded with the given genesis block as the best block.
	pub fn init(genesis: StoredBlock) -> Self {
		let store = MemoryBlockStore::default();
		{
			let mut db = store.db.write();
			db.blocks.insert(genesis.hash().clone(), genesis.clone());
			db.best_block = Some(genesis);
		}
		store
	}

	pub fn len(&self) -> usize {
		self.db.read().blocks.len()
	}

	pub fn is_empty(&self) -> bool {
		self.db.read().blocks.is_empty()
	}
}

impl BlockStore for MemoryBlockStore {
	fn block(&self, hash: &H256) -> Result<Option<StoredBlock>, Error> {
		Ok(self.db.read().blocks.get(hash).cloned())
	}

	fn insert(&self, block: StoredBlock) -> Result<(), Error> {
		self.db.write().blocks.insert(block.hash().clone(), block);
		Ok(())
	}

	fn best_block(&self) -> Result<StoredBlock, Error> {
		self.db.read().best_block.clone().ok_or(Error::NoBestBlock)
	}

	fn set_best_block(&self, block: &StoredBlock) -> Result<(), Error> {
		self.db.write().best_block = Some(block.clone());
		Ok(())
	}
}

impl UndoableBlockStore for MemoryBlockStore {
	fn undoable_block(&self, hash: &H256) -> Result<Option<StoredBlock>, Error> {
		self.block(hash)
	}
}

/// Clonable handle over a shared in-memory store.
#[derive(Clone)]
pub struct SharedMemoryBlockStore {
	db: Arc<MemoryBlockStore>,
}

impl Default for SharedMemoryBlockStore {
	fn default() -> Self {
		SharedMemoryBlockStore {
			db: Arc::default(),
		}
	}
}

impl SharedMemoryBlockStore {
	pub fn init(genesis: StoredBlock) -> Self {
		SharedMemoryBlockStore {
			db: Arc::new(MemoryBlockStore::init(genesis)),
		}
	}
}

impl BlockStore for SharedMemoryBlockStore {
	fn block(&self, hash: &H256) -> Result<Option<StoredBlock>, Error> {
		self.db.block(hash)
	}

	fn insert(&self, block: StoredBlock) -> Result<(), Error> {
		self.db.insert(block)
	}

	fn best_block(&self) -> Result<StoredBlock, Error> {
		self.db.best_block()
	}

	fn set_best_block(&self, block: &StoredBlock) -> Result<(), Error> {
		self.db.set_best_block(block)
	}
}

impl UndoableBlockStore for SharedMemoryBlockStore {
	fn undoable_block(&self, hash: &H256) -> Result<Option<StoredBlock>, Error> {
		self.db.undoable_block(hash)
	}
}

#[cfg(test)]
mod tests {
	use chain::{BlockHeader, IndexedBlockHeader};
	use primitives::hash::H256;
	use storage::{BlockStore, StoredBlock};
	use super::MemoryBlockStore;

	fn genesis() -> StoredBlock {
		let header: IndexedBlockHeader = BlockHeader {
			version: 1,
			previous_header_hash: H256::default(),
			merkle_root_hash: H256::default(),
			time: 100,
			bits: 0x207fffff.into(),
			nonce: 0,
		}.into();
		StoredBlock::genesis(header).unwrap()
	}

	#[test]
	fn test_init_sets_best_block() {
		let genesis = genesis();
		let store = MemoryBlockStore::init(genesis.clone());
		assert_eq!(store.best_block().unwrap(), genesis);
		assert_eq!(store.block(genesis.hash()).unwrap(), Some(genesis));
	}

	#[test]
	fn test_insert_and_get() {
		let genesis = genesis();
		let store = MemoryBlockStore::init(genesis.clone());

		let child = genesis.build(BlockHeader {
			version: 1,
			previous_header_hash: genesis.hash().clone(),
			merkle_root_hash: H256::default(),
			time: 220,
			bits: 0x207fffff.into(),
			nonce: 1,
		}.into()).unwrap();

		store.insert(child.clone()).unwrap();
		assert_eq!(store.block(child.hash()).unwrap(), Some(child.clone()));

		// best block only moves when explicitly set
		assert_eq!(store.best_block().unwrap(), genesis);
		store.set_best_block(&child).unwrap();
		assert_eq!(store.best_block().unwrap(), child);
	}

	#[test]
	fn test_missing_block_is_none() {
		let store = MemoryBlockStore::init(genesis());
		assert_eq!(store.block(&42.into()).unwrap(), None);
	}
}
