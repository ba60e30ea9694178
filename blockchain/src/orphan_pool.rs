use std::collections::HashSet;
use linked_hash_map::LinkedHashMap;
use chain::{IndexedBlock, IndexedTransaction};
use primitives::hash::H256;

/// A received block whose parent is not yet known, together with the
/// filtered-delivery payload it arrived with. A block carries either its
/// transactions or the two filter fields, never both; a bare header carries
/// neither.
#[derive(Debug, Clone)]
pub struct OrphanBlock {
	pub block: IndexedBlock,
	pub filtered_tx_hashes: Option<HashSet<H256>>,
	pub filtered_transactions: Option<Vec<IndexedTransaction>>,
}

impl OrphanBlock {
	pub fn new(block: IndexedBlock, filtered_tx_hashes: Option<HashSet<H256>>, filtered_transactions: Option<Vec<IndexedTransaction>>) -> Self {
		match (block.transactions.is_some(), filtered_tx_hashes.is_some(), filtered_transactions.is_some()) {
			// a full block, a filtered header, or a bare header
			(true, false, false) | (false, true, true) | (false, false, false) => (),
			_ => panic!("a block carries either its transactions or the filter fields"),
		}
		OrphanBlock {
			block: block,
			filtered_tx_hashes: filtered_tx_hashes,
			filtered_transactions: filtered_transactions,
		}
	}
}

/// Holds blocks that cannot be plugged into the chain yet, eg because they
/// were received whilst the chain was still downloading. Iteration order is
/// insertion order, which approximates parents-before-children for the
/// short orphan chains seen in practice.
#[derive(Default)]
pub struct OrphanPool {
	blocks: LinkedHashMap<H256, OrphanBlock>,
}

impl OrphanPool {
	pub fn insert(&mut self, orphan: OrphanBlock) {
		self.blocks.insert(orphan.block.hash().clone(), orphan);
	}

	pub fn remove(&mut self, hash: &H256) -> Option<OrphanBlock> {
		self.blocks.remove(hash)
	}

	pub fn contains(&self, hash: &H256) -> bool {
		self.blocks.contains_key(hash)
	}

	pub fn get(&self, hash: &H256) -> Option<&OrphanBlock> {
		self.blocks.get(hash)
	}

	pub fn len(&self) -> usize {
		self.blocks.len()
	}

	pub fn is_empty(&self) -> bool {
		self.blocks.is_empty()
	}

	/// Hashes in insertion order.
	pub fn hashes(&self) -> Vec<H256> {
		self.blocks.keys().cloned().collect()
	}

	/// Walks backwards through the known orphans from the given hash to the
	/// bottom-most reachable one. `None` when the hash is not an orphan.
	pub fn root_of(&self, hash: &H256) -> Option<&IndexedBlock> {
		let mut cursor = self.blocks.get(hash)?;
		while let Some(prev) = self.blocks.get(&cursor.block.header.raw.previous_header_hash) {
			cursor = prev;
		}
		Some(&cursor.block)
	}
}
