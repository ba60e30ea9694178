use storage::{BlockStore, StoredBlock, Error as DBError};
use constants::MEDIAN_TIMESTAMP_SPAN;

/// Gets the median timestamp of the block and its recent ancestors, walking
/// parent links. A chain shorter than the span supplies what it has.
pub fn median_timestamp_of_recent_blocks(block: &StoredBlock, store: &dyn BlockStore) -> Result<u32, DBError> {
	let span = MEDIAN_TIMESTAMP_SPAN;
	let mut timestamps = [0u32; MEDIAN_TIMESTAMP_SPAN];
	let mut unused = span as i32 - 2;

	timestamps[span - 1] = block.header.raw.time;
	let mut cursor = block.clone();
	while unused >= 0 {
		cursor = match cursor.get_prev(store)? {
			Some(prev) => prev,
			None => break,
		};
		timestamps[unused as usize] = cursor.header.raw.time;
		unused -= 1;
	}

	timestamps[(unused + 1) as usize..span].sort();
	Ok(timestamps[(unused + (span as i32 - unused) / 2) as usize])
}
