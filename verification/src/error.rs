use primitives::compact::Compact;
use primitives::hash::H256;
use storage::Error as DBError;

#[derive(Debug, PartialEq)]
/// All possible verification errors
pub enum Error {
	/// Invalid proof-of-work (block hash does not satisfy nBits)
	Pow,
	/// Futuristic timestamp
	FuturisticTimestamp,
	/// Block's timestamp is not greater than the median of recent blocks
	Timestamp,
	/// Invalid merkle root
	MerkleRoot,
	/// A header-only block arrived while running in full-block mode
	HeaderInFullMode,
	/// Block at a checkpoint height carries the wrong hash
	Checkpoint { height: u32, hash: H256 },
	/// Block contains a transaction that is not final
	NonFinalTransaction,
	/// nBits do not match difficulty rules
	Difficulty { expected: Compact, actual: Compact },
	/// Side-branch block has no common ancestor with the best chain
	ForkWithoutAncestor,
	/// A partial-chain walk ran off the end of the store
	OrphanedSegment,
	/// Undo data needed to disconnect the block is no longer available
	Pruned(H256),
	/// Database error
	Database(DBError),
}

impl From<DBError> for Error {
	fn from(err: DBError) -> Self {
		Error::Database(err)
	}
}

impl Error {
	/// True for failures of the block itself rather than of the environment.
	/// These are the errors that abort an in-flight store transaction.
	pub fn is_verification(&self) -> bool {
		match *self {
			Error::Database(_) => false,
			_ => true,
		}
	}
}
