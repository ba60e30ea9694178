#[macro_use]
extern crate lazy_static;

extern crate primitives;

mod consensus;
mod network;

pub use primitives::{hash, compact};

pub use consensus::ConsensusParams;
pub use network::Network;
