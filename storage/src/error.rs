use std::fmt;

#[derive(Debug, Clone, PartialEq)]
/// All possible storage errors.
pub enum Error {
	/// Low-level driver error.
	DatabaseDriverError(String),
	/// Stored header carries difficulty bits that do not decode to a target.
	InvalidDifficultyBits,
	/// The store was asked for its best block before one was set.
	NoBestBlock,
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match *self {
			Error::DatabaseDriverError(ref msg) => write!(f, "database driver error: {}", msg),
			Error::InvalidDifficultyBits => write!(f, "stored difficulty bits are not a valid target"),
			Error::NoBestBlock => write!(f, "best block is not set"),
		}
	}
}
