use std::{fmt, cmp};
use primitives::hash::H256;
use transaction::Transaction;

#[derive(Default, Clone)]
pub struct IndexedTransaction {
	pub hash: H256,
	pub raw: Transaction,
}

impl fmt::Debug for IndexedTransaction {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("IndexedTransaction")
			.field("hash", &self.hash.reversed())
			.field("raw", &self.raw)
			.finish()
	}
}

impl From<Transaction> for IndexedTransaction {
	fn from(tx: Transaction) -> Self {
		Self::from_raw(tx)
	}
}

impl IndexedTransaction {
	pub fn new(hash: H256, transaction: Transaction) -> Self {
		IndexedTransaction {
			hash: hash,
			raw: transaction,
		}
	}

	/// Explicit conversion of the raw Transaction into IndexedTransaction.
	///
	/// Hashes the transaction.
	pub fn from_raw(transaction: Transaction) -> Self {
		let hash = transaction.hash();
		IndexedTransaction::new(hash, transaction)
	}
}

impl cmp::PartialEq for IndexedTransaction {
	fn eq(&self, other: &Self) -> bool {
		self.hash == other.hash
	}
}
