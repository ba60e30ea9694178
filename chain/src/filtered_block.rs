use primitives::hash::H256;
use indexed_header::IndexedBlockHeader;
use indexed_transaction::IndexedTransaction;

/// A header accompanied by the hashes of the transactions that matched a
/// remote filter, plus those matched transactions that were actually
/// downloaded. The transaction list may be shorter than the hash list when
/// some matches were already known.
#[derive(Debug, Clone)]
pub struct FilteredBlock {
	pub header: IndexedBlockHeader,
	pub matched_tx_hashes: Vec<H256>,
	pub transactions: Vec<IndexedTransaction>,
}

impl FilteredBlock {
	pub fn new(header: IndexedBlockHeader, matched_tx_hashes: Vec<H256>, transactions: Vec<IndexedTransaction>) -> Self {
		FilteredBlock {
			header: header,
			matched_tx_hashes: matched_tx_hashes,
			transactions: transactions,
		}
	}

	pub fn hash(&self) -> &H256 {
		&self.header.hash
	}
}
