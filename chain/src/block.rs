use primitives::hash::H256;
use merkle_root::merkle_root;
use {BlockHeader, Transaction};

/// A block as received from the network: always a header, optionally the
/// transaction list. Header-only blocks are what an SPV chain downloads.
#[derive(Debug, PartialEq, Clone)]
pub struct Block {
	pub block_header: BlockHeader,
	pub transactions: Option<Vec<Transaction>>,
}

impl Block {
	pub fn new(header: BlockHeader, transactions: Vec<Transaction>) -> Self {
		Block { block_header: header, transactions: Some(transactions) }
	}

	pub fn header_only(header: BlockHeader) -> Self {
		Block { block_header: header, transactions: None }
	}

	/// Returns block's merkle root. A header-only block has none.
	pub fn merkle_root(&self) -> Option<H256> {
		self.transactions.as_ref().map(|transactions| {
			let hashes = transactions.iter().map(Transaction::hash).collect::<Vec<H256>>();
			merkle_root(&hashes)
		})
	}

	pub fn header(&self) -> &BlockHeader {
		&self.block_header
	}
}

#[cfg(test)]
mod tests {
	use primitives::hash::H256;
	use {BlockHeader, Transaction};
	use super::Block;

	fn header() -> BlockHeader {
		BlockHeader {
			version: 1,
			previous_header_hash: H256::default(),
			merkle_root_hash: H256::default(),
			time: 100,
			bits: 0x207fffff.into(),
			nonce: 0,
		}
	}

	#[test]
	fn test_header_only_block_has_no_merkle_root() {
		assert_eq!(Block::header_only(header()).merkle_root(), None);
	}

	#[test]
	fn test_single_transaction_merkle_root() {
		let tx = Transaction::default();
		let block = Block::new(header(), vec![tx.clone()]);
		assert_eq!(block.merkle_root(), Some(tx.hash()));
	}
}
