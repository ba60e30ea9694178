use chain::IndexedBlock;
use error::Error;

/// Verification of block contents in isolation. Only run when the contents
/// matter: full-block mode, or a transaction some listener cares about.
pub struct BlockVerifier<'a> {
	pub merkle_root: BlockMerkleRoot<'a>,
}

impl<'a> BlockVerifier<'a> {
	pub fn new(block: &'a IndexedBlock) -> Self {
		BlockVerifier {
			merkle_root: BlockMerkleRoot::new(block),
		}
	}

	pub fn check(&self) -> Result<(), Error> {
		self.merkle_root.check()?;
		Ok(())
	}
}

pub struct BlockMerkleRoot<'a> {
	block: &'a IndexedBlock,
}

impl<'a> BlockMerkleRoot<'a> {
	fn new(block: &'a IndexedBlock) -> Self {
		BlockMerkleRoot {
			block: block,
		}
	}

	fn check(&self) -> Result<(), Error> {
		match self.block.merkle_root() {
			Some(ref root) if *root == self.block.header.raw.merkle_root_hash => Ok(()),
			// a header-only block carries nothing to check
			None => Ok(()),
			Some(_) => Err(Error::MerkleRoot),
		}
	}
}
