use std::sync::Arc;
use parking_lot::RwLock;
use chain::IndexedTransaction;
use primitives::hash::H256;
use storage::StoredBlock;

/// Where a notified block sits relative to the best chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewBlockType {
	BestChain,
	SideChain,
}

/// Receives the chain events a wallet needs: transactions found in blocks,
/// best-chain extensions and reorganizations.
///
/// Callbacks run under the chain lock. A listener may read the chain head
/// (guarded separately) and may remove itself from the registry, but must
/// not submit blocks from inside a callback.
pub trait ChainListener: Send + Sync {
	/// True when the listener wants `receive_from_block` for this
	/// transaction.
	fn is_transaction_relevant(&self, _tx: &IndexedTransaction) -> bool {
		false
	}

	/// A relevant transaction was seen in a connected block.
	fn receive_from_block(&self, _tx: &IndexedTransaction, _block: &StoredBlock, _block_type: NewBlockType) {
	}

	/// A matched transaction hash was seen in a connected filtered block,
	/// without its body.
	fn notify_transaction_in_block(&self, _tx_hash: &H256, _block: &StoredBlock, _block_type: NewBlockType) {
	}

	/// The best chain gained a new head.
	fn notify_new_best_block(&self, _block: &StoredBlock) {
	}

	/// The best chain switched branches: blocks in `old_blocks` left it,
	/// blocks in `new_blocks` joined it, both ordered tip first down to but
	/// not including the split point.
	fn reorganize(&self, _split: &StoredBlock, _old_blocks: &[StoredBlock], _new_blocks: &[StoredBlock]) {
	}
}

/// Copy-on-write listener list: iteration works on a snapshot and stays
/// correct when a listener removes itself mid-notification.
#[derive(Default)]
pub struct ListenerRegistry {
	listeners: RwLock<Vec<Arc<dyn ChainListener>>>,
}

impl ListenerRegistry {
	pub fn add(&self, listener: Arc<dyn ChainListener>) {
		self.listeners.write().push(listener);
	}

	/// Removes the given listener, matched by identity. Returns whether it
	/// was present.
	pub fn remove(&self, listener: &Arc<dyn ChainListener>) -> bool {
		let mut listeners = self.listeners.write();
		match listeners.iter().position(|l| Arc::ptr_eq(l, listener)) {
			Some(index) => {
				listeners.remove(index);
				true
			},
			None => false,
		}
	}

	pub fn len(&self) -> usize {
		self.listeners.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.listeners.read().is_empty()
	}

	pub fn snapshot(&self) -> Vec<Arc<dyn ChainListener>> {
		self.listeners.read().clone()
	}

	/// Walks the list by index, re-reading the slot after every call: when
	/// the notified listener removed itself the index is not advanced, so
	/// the listener that shifted into its slot is not skipped.
	pub fn for_each_tolerant<F>(&self, mut f: F) where F: FnMut(&Arc<dyn ChainListener>) {
		let mut index = 0;
		loop {
			let listener = match self.listeners.read().get(index) {
				Some(listener) => listener.clone(),
				None => break,
			};

			f(&listener);

			let listeners = self.listeners.read();
			match listeners.get(index) {
				// the listener removed itself and another shifted into its slot
				Some(current) if !Arc::ptr_eq(current, &listener) => (),
				Some(_) => index += 1,
				// the listener removed itself and it was the last one
				None => break,
			}
		}
	}
}
