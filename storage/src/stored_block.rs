use std::{cmp, fmt};
use chain::IndexedBlockHeader;
use primitives::bigint::U256;
use primitives::compact::Compact;
use primitives::hash::H256;
use block_store::BlockStore;
use error::Error;

/// Work contributed by a single block: 2^256 divided by (target + 1).
pub fn block_work(bits: Compact) -> Option<U256> {
	let target = match bits.to_u256() {
		Ok(target) => target,
		Err(_) => return None,
	};
	if target.is_zero() {
		return None;
	}

	let (denominator, overflow) = target.overflowing_add(U256::one());
	if overflow {
		return Some(U256::one());
	}

	Some(!target / denominator + U256::one())
}

/// A block header linked into the chain: the header itself plus the metadata
/// the tree needs to navigate and compare branches. Immutable once built.
#[derive(Clone)]
pub struct StoredBlock {
	pub header: IndexedBlockHeader,
	pub height: u32,
	pub chain_work: U256,
}

impl StoredBlock {
	pub fn new(header: IndexedBlockHeader, height: u32, chain_work: U256) -> Self {
		StoredBlock {
			header: header,
			height: height,
			chain_work: chain_work,
		}
	}

	/// The root of a new block tree.
	pub fn genesis(header: IndexedBlockHeader) -> Result<Self, Error> {
		let work = block_work(header.raw.bits).ok_or(Error::InvalidDifficultyBits)?;
		Ok(StoredBlock::new(header, 0, work))
	}

	/// Creates the stored block one link above this one.
	pub fn build(&self, header: IndexedBlockHeader) -> Result<StoredBlock, Error> {
		let work = block_work(header.raw.bits).ok_or(Error::InvalidDifficultyBits)?;
		Ok(StoredBlock::new(header, self.height + 1, self.chain_work + work))
	}

	pub fn hash(&self) -> &H256 {
		&self.header.hash
	}

	pub fn more_work_than(&self, other: &StoredBlock) -> bool {
		self.chain_work > other.chain_work
	}

	/// The parent stored block, looked up by previous-header hash. Blocks
	/// reference their parents by hash only, never by pointer.
	pub fn get_prev(&self, store: &dyn BlockStore) -> Result<Option<StoredBlock>, Error> {
		store.block(&self.header.raw.previous_header_hash)
	}
}

impl cmp::PartialEq for StoredBlock {
	fn eq(&self, other: &Self) -> bool {
		self.header.hash == other.header.hash
	}
}

impl fmt::Debug for StoredBlock {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("StoredBlock")
			.field("hash", &self.header.hash.reversed())
			.field("height", &self.height)
			.field("chain_work", &self.chain_work)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use chain::{BlockHeader, IndexedBlockHeader};
	use primitives::bigint::U256;
	use primitives::hash::H256;
	use super::{StoredBlock, block_work};

	fn header(prev: H256, bits: u32) -> IndexedBlockHeader {
		BlockHeader {
			version: 1,
			previous_header_hash: prev,
			merkle_root_hash: H256::default(),
			time: 100,
			bits: bits.into(),
			nonce: 0,
		}.into()
	}

	#[test]
	fn test_block_work() {
		// target = 0xffff << 208; work = 2^256 / (target + 1) = 2^32 / (2^16 - a hair)
		let work = block_work(0x1d00ffff.into()).unwrap();
		assert_eq!(work, U256::from(0x100010001u64));

		// invalid bits carry no work
		assert_eq!(block_work(0x01fedcba.into()), None);
		assert_eq!(block_work(0x01003456.into()), None);
	}

	#[test]
	fn test_build_accumulates_work_and_height() {
		let genesis = StoredBlock::genesis(header(H256::default(), 0x1d00ffff)).unwrap();
		assert_eq!(genesis.height, 0);

		let child = genesis.build(header(genesis.hash().clone(), 0x1d00ffff)).unwrap();
		assert_eq!(child.height, 1);
		assert_eq!(child.chain_work, genesis.chain_work * U256::from(2u64));
		assert!(child.more_work_than(&genesis));
		assert!(!genesis.more_work_than(&child));
	}
}
