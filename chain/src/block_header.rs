use std::fmt;
use byteorder::{ByteOrder, LittleEndian};
use crypto::dhash256;
use primitives::compact::Compact;
use primitives::hash::H256;
use constants::HEADER_SIZE;

#[derive(PartialEq, Clone)]
pub struct BlockHeader {
	pub version: u32,
	pub previous_header_hash: H256,
	pub merkle_root_hash: H256,
	pub time: u32,
	pub bits: Compact,
	pub nonce: u32,
}

impl BlockHeader {
	/// Compute hash of the block header.
	#[cfg(any(test, feature = "test-helpers"))]
	pub fn hash(&self) -> H256 {
		block_header_hash(self)
	}

	/// The fixed-layout hashing input: version, previous hash, merkle root,
	/// time, bits, nonce, all little-endian.
	pub fn hashing_input(&self) -> [u8; HEADER_SIZE] {
		let mut out = [0u8; HEADER_SIZE];
		LittleEndian::write_u32(&mut out[0..4], self.version);
		out[4..36].copy_from_slice(&*self.previous_header_hash);
		out[36..68].copy_from_slice(&*self.merkle_root_hash);
		LittleEndian::write_u32(&mut out[68..72], self.time);
		LittleEndian::write_u32(&mut out[72..76], self.bits.into());
		LittleEndian::write_u32(&mut out[76..80], self.nonce);
		out
	}
}

impl fmt::Debug for BlockHeader {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("BlockHeader")
			.field("version", &self.version)
			.field("previous_header_hash", &self.previous_header_hash.reversed())
			.field("merkle_root_hash", &self.merkle_root_hash.reversed())
			.field("time", &self.time)
			.field("bits", &self.bits)
			.field("nonce", &self.nonce)
			.finish()
	}
}

/// Compute hash of the block header.
pub(crate) fn block_header_hash(block_header: &BlockHeader) -> H256 {
	dhash256(&block_header.hashing_input())
}
