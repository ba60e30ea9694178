/// Below this lock-time value the lock is interpreted as a block height,
/// at or above it as a unix timestamp.
pub const LOCKTIME_THRESHOLD: u32 = 500000000;

/// Sequence value that marks a transaction input as final.
pub const SEQUENCE_FINAL: u32 = 0xffffffff;

/// Serialized size of a block header.
pub const HEADER_SIZE: usize = 80;
