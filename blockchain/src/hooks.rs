use chain::{IndexedBlock, IndexedBlockHeader};
use primitives::hash::H256;
use storage::{BlockStore, UndoableBlockStore, StoredBlock, TransactionOutputChanges, Error as StorageError};
use verification::Error;

/// Storage scope and write path: the seam between the lightweight
/// header-only chain and the full-validation chain.
pub trait StoreHook<TStore: BlockStore>: Send + Sync {
	/// Resolves a stored block in the scope the validation mode requires.
	fn stored_block(&self, store: &TStore, hash: &H256) -> Result<Option<StoredBlock>, StorageError>;

	/// Builds the stored form of the block on top of `prev` and writes it,
	/// together with the output changes when transactions were verified.
	fn add_to_store(&self, store: &TStore, prev: &StoredBlock, header: &IndexedBlockHeader, changes: Option<TransactionOutputChanges>) -> Result<StoredBlock, StorageError>;

	/// Writes the new head to the store, committing any store transaction
	/// started by the UTXO hook, before the in-memory pointer is flipped.
	fn do_set_chain_head(&self, store: &TStore, head: &StoredBlock) -> Result<(), StorageError>;

	/// Aborts any store transaction started by the UTXO hook; called instead
	/// of `do_set_chain_head` when a block failed verification after the
	/// hook already ran.
	fn not_setting_chain_head(&self, store: &TStore) -> Result<(), StorageError>;
}

/// Store hook of the header-only chain: plain lookups, no undo data.
pub struct HeaderStoreHook;

impl<TStore: BlockStore> StoreHook<TStore> for HeaderStoreHook {
	fn stored_block(&self, store: &TStore, hash: &H256) -> Result<Option<StoredBlock>, StorageError> {
		store.block(hash)
	}

	fn add_to_store(&self, store: &TStore, prev: &StoredBlock, header: &IndexedBlockHeader, _changes: Option<TransactionOutputChanges>) -> Result<StoredBlock, StorageError> {
		let stored = prev.build(header.clone())?;
		store.insert(stored.clone())?;
		Ok(stored)
	}

	fn do_set_chain_head(&self, store: &TStore, head: &StoredBlock) -> Result<(), StorageError> {
		store.set_best_block(head)
	}

	fn not_setting_chain_head(&self, _store: &TStore) -> Result<(), StorageError> {
		// a header-only chain never has a store transaction in flight
		Ok(())
	}
}

/// Store hook of the full-validation chain: lookups go through the undoable
/// scope, so that reorganizations can reach undo data.
pub struct UndoableStoreHook;

impl<TStore: UndoableBlockStore> StoreHook<TStore> for UndoableStoreHook {
	fn stored_block(&self, store: &TStore, hash: &H256) -> Result<Option<StoredBlock>, StorageError> {
		store.undoable_block(hash)
	}

	fn add_to_store(&self, store: &TStore, prev: &StoredBlock, header: &IndexedBlockHeader, _changes: Option<TransactionOutputChanges>) -> Result<StoredBlock, StorageError> {
		let stored = prev.build(header.clone())?;
		store.insert(stored.clone())?;
		Ok(stored)
	}

	fn do_set_chain_head(&self, store: &TStore, head: &StoredBlock) -> Result<(), StorageError> {
		store.set_best_block(head)
	}

	fn not_setting_chain_head(&self, _store: &TStore) -> Result<(), StorageError> {
		// the reference in-memory store applies writes immediately; a
		// journalling store hooks its abort in here
		Ok(())
	}
}

/// Body of full validation: connecting and disconnecting the transactions
/// of blocks entering and leaving the best chain.
pub trait UtxoHook: Send + Sync {
	/// Whether a set of unspent outputs is maintained and every added block
	/// must carry transactions.
	fn should_verify_transactions(&self) -> bool;

	/// Connect each transaction of a freshly received block, verifying them
	/// as we go and removing spent outputs. When any transaction fails, no
	/// changes may remain in the underlying store.
	fn connect_transactions(&self, height: u32, block: &IndexedBlock) -> Result<TransactionOutputChanges, Error>;

	/// Load a historical block from the store during a reorganization and
	/// connect its transactions.
	fn connect_stored_transactions(&self, block: &StoredBlock) -> Result<TransactionOutputChanges, Error>;

	/// Disconnect each transaction of a block leaving the best chain, in
	/// reverse of connect order. Fails with `Pruned` when the undo data for
	/// the block is no longer held.
	fn disconnect_transactions(&self, block: &StoredBlock) -> Result<(), Error>;
}

/// The header-only chain maintains no unspent-output set; the engine never
/// routes connect or disconnect calls here.
pub struct NullUtxo;

impl UtxoHook for NullUtxo {
	fn should_verify_transactions(&self) -> bool {
		false
	}

	fn connect_transactions(&self, _height: u32, _block: &IndexedBlock) -> Result<TransactionOutputChanges, Error> {
		unreachable!("transactions are never connected in header-only mode");
	}

	fn connect_stored_transactions(&self, _block: &StoredBlock) -> Result<TransactionOutputChanges, Error> {
		unreachable!("transactions are never connected in header-only mode");
	}

	fn disconnect_transactions(&self, _block: &StoredBlock) -> Result<(), Error> {
		unreachable!("transactions are never disconnected in header-only mode");
	}
}
