use std::cmp;
use primitives::hash::H256;
use merkle_root::merkle_root;
use block::Block;
use indexed_header::IndexedBlockHeader;
use indexed_transaction::IndexedTransaction;

#[derive(Debug, Clone)]
pub struct IndexedBlock {
	pub header: IndexedBlockHeader,
	pub transactions: Option<Vec<IndexedTransaction>>,
}

impl cmp::PartialEq for IndexedBlock {
	fn eq(&self, other: &Self) -> bool {
		self.header.hash == other.header.hash
	}
}

impl From<Block> for IndexedBlock {
	fn from(block: Block) -> Self {
		Self::from_raw(block)
	}
}

impl IndexedBlock {
	pub fn new(header: IndexedBlockHeader, transactions: Option<Vec<IndexedTransaction>>) -> Self {
		IndexedBlock {
			header: header,
			transactions: transactions,
		}
	}

	pub fn header_only(header: IndexedBlockHeader) -> Self {
		Self::new(header, None)
	}

	/// Explicit conversion of the raw Block into IndexedBlock.
	///
	/// Hashes block header + transactions.
	pub fn from_raw(block: Block) -> Self {
		let Block { block_header, transactions } = block;
		Self::new(
			IndexedBlockHeader::from_raw(block_header),
			transactions.map(|txs| txs.into_iter().map(IndexedTransaction::from_raw).collect()),
		)
	}

	pub fn hash(&self) -> &H256 {
		&self.header.hash
	}

	/// Merkle root over the carried transaction hashes, if any.
	pub fn merkle_root(&self) -> Option<H256> {
		self.transactions.as_ref()
			.map(|txs| merkle_root(&txs.iter().map(|tx| &tx.hash).collect::<Vec<&H256>>()))
	}

	pub fn is_final(&self, height: u32) -> bool {
		match self.transactions {
			Some(ref txs) => txs.iter().all(|tx| tx.raw.is_final_in_block(height, self.header.raw.time)),
			None => true,
		}
	}
}

#[cfg(test)]
mod tests {
	use primitives::hash::H256;
	use {Block, BlockHeader, Transaction};
	use super::IndexedBlock;

	#[test]
	fn test_indexed_block_carries_merkle_root() {
		let tx = Transaction::default();
		let header = BlockHeader {
			version: 1,
			previous_header_hash: H256::default(),
			merkle_root_hash: tx.hash(),
			time: 0,
			bits: 0x207fffff.into(),
			nonce: 0,
		};
		let block: IndexedBlock = Block::new(header, vec![tx]).into();
		assert_eq!(block.merkle_root(), Some(block.header.raw.merkle_root_hash.clone()));
	}

	#[test]
	fn test_header_only_block_is_final() {
		let header = BlockHeader {
			version: 1,
			previous_header_hash: H256::default(),
			merkle_root_hash: H256::default(),
			time: 0,
			bits: 0x207fffff.into(),
			nonce: 0,
		};
		let block: IndexedBlock = Block::header_only(header).into();
		assert!(block.is_final(100));
	}
}
