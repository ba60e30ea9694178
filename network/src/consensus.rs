use std::collections::HashMap;
use primitives::bigint::U256;
use primitives::hash::H256;
use Network;

/// Height of the first difficulty protocol hard fork: the retarget interval
/// drops from 504 to 60 blocks and the block spacing from 150s to 120s.
pub const JULY_FORK: u32 = 45000;
/// Height of the second hard fork: retargets switch to the 60-block
/// median-of-differences window.
pub const NOVEMBER_FORK: u32 = 103000;
/// Height at which the deadlock defence against the 51% protection system
/// activates.
pub const NOVEMBER_FORK2: u32 = 118800;
/// Height at which the 120-block average-time correction activates.
pub const MAY_FORK: u32 = 248000;
/// Height past which the difficulty retargets at every block, with
/// per-block rise/fall ceilings over 1, 60 and 240 blocks.
pub const JULY_FORK2: u32 = 251230;
/// Height at which the tightened 99/70 timespan bounds replaced the original
/// 4x bounds.
pub const DIFFICULTY_SWITCH_HEIGHT: u32 = 21000;

#[derive(Debug, Clone)]
/// Parameters that influence chain consensus.
pub struct ConsensusParams {
	/// Network.
	pub network: Network,
	/// First difficulty protocol fork height.
	pub july_fork: u32,
	/// Median-window protocol fork height.
	pub november_fork: u32,
	/// Deadlock defence fork height.
	pub november_fork2: u32,
	/// Average-window correction fork height.
	pub may_fork: u32,
	/// Per-block retarget fork height.
	pub july_fork2: u32,
	/// Height of the switch to the tightened timespan bounds.
	pub difficulty_switch_height: u32,
	/// Blocks the chain refuses to contradict, keyed by height.
	pub checkpoints: HashMap<u32, H256>,
}

impl ConsensusParams {
	pub fn new(network: Network) -> Self {
		ConsensusParams {
			network: network,
			july_fork: JULY_FORK,
			november_fork: NOVEMBER_FORK,
			november_fork2: NOVEMBER_FORK2,
			may_fork: MAY_FORK,
			july_fork2: JULY_FORK2,
			difficulty_switch_height: DIFFICULTY_SWITCH_HEIGHT,
			checkpoints: HashMap::new(),
		}
	}

	pub fn with_checkpoints(mut self, checkpoints: HashMap<u32, H256>) -> Self {
		self.checkpoints = checkpoints;
		self
	}

	/// Optimal interval between blocks, in seconds, for the era the given
	/// height falls into.
	pub fn target_spacing(&self, height: u32) -> u32 {
		if height < self.july_fork {
			(2.5 * 60.0) as u32
		} else {
			2 * 60
		}
	}

	/// Length of the retarget window, in seconds, for the era the given
	/// height falls into.
	pub fn target_timespan(&self, height: u32) -> u32 {
		if height < self.july_fork {
			(7 * 24 * 60 * 60) / 8
		} else {
			2 * 60 * 60
		}
	}

	/// Number of blocks between difficulty retargets at the given height.
	pub fn interval(&self, height: u32) -> u32 {
		self.target_timespan(height) / self.target_spacing(height)
	}

	/// True past `july_fork2`, where the difficulty changes at every block.
	pub fn retargets_every_block(&self, height: u32) -> bool {
		height > self.july_fork2
	}

	/// True when a block at the given height with the given hash does not
	/// contradict a hardcoded checkpoint.
	pub fn passes_checkpoint(&self, height: u32, hash: &H256) -> bool {
		match self.checkpoints.get(&height) {
			Some(checkpoint) => checkpoint == hash,
			None => true,
		}
	}

	/// Highest (easiest) admissible proof-of-work target.
	pub fn proof_of_work_limit(&self) -> U256 {
		self.network.max_bits()
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;
	use primitives::hash::H256;
	use Network;
	use super::ConsensusParams;

	#[test]
	fn test_interval_per_era() {
		let consensus = ConsensusParams::new(Network::Mainnet);
		assert_eq!(consensus.interval(0), 504);
		assert_eq!(consensus.interval(44999), 504);
		assert_eq!(consensus.interval(45000), 60);
		assert_eq!(consensus.interval(300000), 60);
	}

	#[test]
	fn test_target_timespan_per_era() {
		let consensus = ConsensusParams::new(Network::Mainnet);
		assert_eq!(consensus.target_timespan(0), 75600);
		assert_eq!(consensus.target_timespan(45000), 7200);
		assert_eq!(consensus.target_spacing(0), 150);
		assert_eq!(consensus.target_spacing(45000), 120);
	}

	#[test]
	fn test_passes_checkpoint() {
		let hash: H256 = 42.into();
		let mut checkpoints = HashMap::new();
		checkpoints.insert(1000, hash.clone());
		let consensus = ConsensusParams::new(Network::Unitest).with_checkpoints(checkpoints);

		assert!(consensus.passes_checkpoint(999, &hash));
		assert!(consensus.passes_checkpoint(1000, &hash));
		assert!(!consensus.passes_checkpoint(1000, &43.into()));
	}

	#[test]
	fn test_retargets_every_block() {
		let consensus = ConsensusParams::new(Network::Mainnet);
		assert!(!consensus.retargets_every_block(251230));
		assert!(consensus.retargets_every_block(251231));
	}
}
