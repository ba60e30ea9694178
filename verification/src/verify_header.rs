use chain::IndexedBlockHeader;
use network::ConsensusParams;
use primitives::bigint::U256;
use work::is_valid_proof_of_work;
use error::Error;
use constants::BLOCK_MAX_FUTURE;

/// Verification of a header in isolation: internal validity only, nothing
/// that needs chain context.
pub struct HeaderVerifier<'a> {
	pub proof_of_work: HeaderProofOfWork<'a>,
	pub timestamp: HeaderTimestamp<'a>,
}

impl<'a> HeaderVerifier<'a> {
	pub fn new(header: &'a IndexedBlockHeader, consensus: &'a ConsensusParams, current_time: u32) -> Self {
		HeaderVerifier {
			proof_of_work: HeaderProofOfWork::new(header, consensus),
			timestamp: HeaderTimestamp::new(header, current_time, BLOCK_MAX_FUTURE),
		}
	}

	pub fn check(&self) -> Result<(), Error> {
		self.proof_of_work.check()?;
		self.timestamp.check()?;
		Ok(())
	}
}

pub struct HeaderProofOfWork<'a> {
	header: &'a IndexedBlockHeader,
	max_target: U256,
}

impl<'a> HeaderProofOfWork<'a> {
	fn new(header: &'a IndexedBlockHeader, consensus: &ConsensusParams) -> Self {
		HeaderProofOfWork {
			header: header,
			max_target: consensus.proof_of_work_limit(),
		}
	}

	fn check(&self) -> Result<(), Error> {
		if is_valid_proof_of_work(&self.max_target, self.header.raw.bits, &self.header.hash) {
			Ok(())
		} else {
			Err(Error::Pow)
		}
	}
}

pub struct HeaderTimestamp<'a> {
	header: &'a IndexedBlockHeader,
	current_time: u32,
	max_future: u32,
}

impl<'a> HeaderTimestamp<'a> {
	fn new(header: &'a IndexedBlockHeader, current_time: u32, max_future: u32) -> Self {
		HeaderTimestamp {
			header: header,
			current_time: current_time,
			max_future: max_future,
		}
	}

	fn check(&self) -> Result<(), Error> {
		if self.header.raw.time > self.current_time + self.max_future {
			Err(Error::FuturisticTimestamp)
		} else {
			Ok(())
		}
	}
}
