use crypto::dhash256;
use primitives::hash::H256;

/// Hash of a pair of child nodes.
pub fn merkle_node_hash(left: &H256, right: &H256) -> H256 {
	let mut input = [0u8; 64];
	input[0..32].copy_from_slice(&**left);
	input[32..64].copy_from_slice(&**right);
	dhash256(&input)
}

/// Calculates the root of the merkle tree. An odd node at any level is paired
/// with itself, an empty tree has a zero root.
pub fn merkle_root<T>(hashes: &[T]) -> H256 where T: AsRef<H256> {
	if hashes.is_empty() {
		return H256::default();
	}
	if hashes.len() == 1 {
		return hashes[0].as_ref().clone();
	}

	let mut row: Vec<H256> = hashes.chunks(2)
		.map(|pair| match pair {
			[left, right] => merkle_node_hash(left.as_ref(), right.as_ref()),
			_ => merkle_node_hash(pair[0].as_ref(), pair[0].as_ref()),
		})
		.collect();

	while row.len() > 1 {
		row = row.chunks(2)
			.map(|pair| match pair {
				[left, right] => merkle_node_hash(left, right),
				_ => merkle_node_hash(&pair[0], &pair[0]),
			})
			.collect();
	}

	row[0].clone()
}
