use primitives::bigint::U256;
use primitives::compact::Compact;
use primitives::hash::H256;

/// Returns true if hash is lower or equal than target represented by compact bits
pub fn is_valid_proof_of_work_hash(bits: Compact, hash: &H256) -> bool {
	let target = match bits.to_u256() {
		Ok(target) => target,
		_err => return false,
	};

	let value = U256::from(&*hash.reversed() as &[u8]);
	value <= target
}

/// Returns true if hash is lower or equal than target and target is lower or equal
/// than current network maximum
pub fn is_valid_proof_of_work(max_target: &U256, bits: Compact, hash: &H256) -> bool {
	let target = match bits.to_u256() {
		Ok(target) => target,
		_err => return false,
	};

	let value = U256::from(&*hash.reversed() as &[u8]);
	target <= *max_target && value <= target
}

#[cfg(test)]
mod tests {
	use primitives::bigint::U256;
	use primitives::compact::Compact;
	use primitives::hash::H256;
	use super::{is_valid_proof_of_work, is_valid_proof_of_work_hash};

	#[test]
	fn test_is_valid_proof_of_work_hash() {
		let bits = Compact::new(0x1d00ffff);
		// a hash of all 0x42 bytes is far above the target
		assert!(!is_valid_proof_of_work_hash(bits, &[0x42u8; 32].into()));
		assert!(is_valid_proof_of_work_hash(bits, &1.into()));
		// invalid encodings never validate
		assert!(!is_valid_proof_of_work_hash(Compact::new(0x04923456), &1.into()));
	}

	#[test]
	fn test_is_valid_proof_of_work_respects_maximum() {
		let low_hash: H256 = 1.into();
		let max_target: U256 = Compact::new(0x1d00ffff).to_u256().unwrap();

		assert!(is_valid_proof_of_work(&max_target, Compact::new(0x1d00ffff), &low_hash));
		assert!(is_valid_proof_of_work(&max_target, Compact::new(0x1c00ffff), &low_hash));
		// target above the network maximum is rejected even for a tiny hash
		assert!(!is_valid_proof_of_work(&max_target, Compact::new(0x1e00ffff), &low_hash));
	}
}
