use chain::OutPoint;

/// The total sum of all changes a connected block made to the set of open
/// transaction outputs. Opaque to the chain core: produced by the UTXO hook
/// when a block connects and handed back to the store for persistence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionOutputChanges {
	pub created: Vec<OutPoint>,
	pub spent: Vec<OutPoint>,
}

impl TransactionOutputChanges {
	pub fn new(created: Vec<OutPoint>, spent: Vec<OutPoint>) -> Self {
		TransactionOutputChanges {
			created: created,
			spent: spent,
		}
	}
}
