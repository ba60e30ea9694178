//! Goldcoin consensus verification.
//!
//! Header pre-verification is done by the `HeaderVerifier`/`BlockVerifier`
//! structures. Contextual verification against the chain - difficulty
//! transitions and median timestamps - is done by the free functions in
//! `work_goldcoin` and `timestamp`, which walk parent links through a
//! `BlockStore`.

#[macro_use]
extern crate log;

extern crate chain;
extern crate network;
extern crate primitives;
extern crate storage;

#[cfg(test)]
extern crate db;

pub mod constants;
mod error;
mod timestamp;
mod verify_block;
mod verify_header;
mod work;
mod work_goldcoin;

pub use primitives::{bigint, hash, compact};

pub use error::Error;
pub use timestamp::median_timestamp_of_recent_blocks;
pub use verify_block::BlockVerifier;
pub use verify_header::HeaderVerifier;
pub use work::{is_valid_proof_of_work, is_valid_proof_of_work_hash};
pub use work_goldcoin::check_difficulty_transitions;
