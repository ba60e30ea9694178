extern crate primitives;
extern crate sha2;

use sha2::{Digest, Sha256};
use primitives::hash::H256;

/// SHA-256 of the input.
pub fn sha256(input: &[u8]) -> H256 {
	let mut result = H256::default();
	result.copy_from_slice(&Sha256::digest(input));
	result
}

/// Double SHA-256 of the input.
#[inline]
pub fn dhash256(input: &[u8]) -> H256 {
	sha256(&*sha256(input))
}

#[cfg(test)]
mod tests {
	use primitives::hash::H256;
	use super::dhash256;

	#[test]
	fn test_dhash256() {
		let expected = H256::from("9595c9df90075148eb06860365df33584b75bff782a510c6cd4883a419833d50");
		let result = dhash256(b"hello");
		assert_eq!(result, expected);
	}
}
