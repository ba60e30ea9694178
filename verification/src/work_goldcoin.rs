use std::cmp;
use chain::IndexedBlockHeader;
use network::ConsensusParams;
use primitives::bigint::U256;
use primitives::compact::Compact;
use storage::{BlockStore, StoredBlock};
use error::Error;

/// Checks that the difficulty bits of the block following `parent` match the
/// multi-era retargeting rules.
///
/// Every backwards walk that runs off the store succeeds silently: a chain
/// restored from a checkpoint has no history below the checkpoint, and the
/// transition cannot be recomputed there.
pub fn check_difficulty_transitions(parent: &StoredBlock, header: &IndexedBlockHeader, store: &dyn BlockStore, consensus: &ConsensusParams) -> Result<(), Error> {
	let height = parent.height + 1;
	// The tightened timespan bounds apply from the protocol switch height
	// onwards; testnet always runs them.
	let new_protocol = height >= consensus.difficulty_switch_height || consensus.network.is_testnet();

	if height < consensus.july_fork {
		check_fixed_window_transition(parent, header, store, consensus, height, new_protocol)
	} else if height > consensus.november_fork {
		check_median_window_transition(parent, header, store, consensus, height, new_protocol)
	} else {
		check_fixed_window_transition(parent, header, store, consensus, height, new_protocol)
	}
}

/// The pre-median protocol: difficulty only changes at interval boundaries,
/// from the elapsed time between the two endpoint blocks of the window.
fn check_fixed_window_transition(parent: &StoredBlock, header: &IndexedBlockHeader, store: &dyn BlockStore, consensus: &ConsensusParams, height: u32, new_protocol: bool) -> Result<(), Error> {
	let is_testnet = consensus.network.is_testnet();
	let target_timespan = consensus.target_timespan(height) as i64;
	let target_spacing = consensus.target_spacing(height) as i64;
	let timespan_current = if new_protocol { target_timespan } else { target_timespan * 4 };
	let interval = (timespan_current / target_spacing) as u32;

	// Only change once per interval, or at the protocol switch height
	if height % interval != 0 && (height != consensus.difficulty_switch_height || is_testnet) {
		if is_testnet {
			return check_testnet_difficulty(parent, header, store, consensus, interval, target_spacing);
		}

		return verify_difficulty(decode_target(parent.header.raw.bits)?, header, consensus);
	}

	// Go back the full period unless it's the first retarget after genesis,
	// so that changing difficulty requires work over the whole window.
	let mut blocks_to_go_back = interval - 1;
	if height != interval {
		blocks_to_go_back = interval;
	}

	let first = match walk_back(parent, blocks_to_go_back, store)? {
		Some(block) => block,
		None => return Ok(()),
	};

	// Limit adjustment step
	let mut actual_timespan = parent.header.raw.time as i64 - first.header.raw.time as i64;
	trace!(target: "verification", "actual timespan before bounds: {}", actual_timespan);

	let timespan_max = if new_protocol { (timespan_current * 99) / 70 } else { timespan_current * 4 };
	let timespan_min = if new_protocol { (timespan_current * 70) / 99 } else { timespan_current / 4 };
	if actual_timespan < timespan_min {
		actual_timespan = timespan_min;
	}
	if actual_timespan > timespan_max {
		actual_timespan = timespan_max;
	}

	// Retarget
	let new_target = mul_div(decode_target(parent.header.raw.bits)?, actual_timespan as u64, timespan_current as u64);

	verify_difficulty(new_target, header, consensus)
}

/// The median protocol: the retarget is driven by the median of the last 59
/// solving times, corrected by the 120-block average, the deadlock defence
/// and, once retargeting runs at every block, per-block rise/fall ceilings.
fn check_median_window_transition(parent: &StoredBlock, header: &IndexedBlockHeader, store: &dyn BlockStore, consensus: &ConsensusParams, height: u32, new_protocol: bool) -> Result<(), Error> {
	let is_testnet = consensus.network.is_testnet();
	let target_timespan = consensus.target_timespan(height) as i64;
	let target_spacing = consensus.target_spacing(height) as i64;
	let timespan_current = if new_protocol { target_timespan } else { target_timespan * 4 };
	let interval = (timespan_current / target_spacing) as u32;

	// Only change once per interval, or at the protocol switch height.
	// Past july_fork2 difficulty changes at every block, so the gate only
	// applies before that.
	if height % interval != 0 && (height != consensus.difficulty_switch_height || is_testnet)
		&& height <= consensus.july_fork2 {
		if is_testnet {
			return check_testnet_difficulty(parent, header, store, consensus, interval, target_spacing);
		}

		return verify_difficulty(decode_target(parent.header.raw.bits)?, header, consensus);
	}

	// Go back the full period unless it's the first retarget after genesis.
	// The walked-to block takes no part in the median retarget; the walk is
	// kept for its silent return when the store does not reach that far.
	let mut blocks_to_go_back = interval - 1;
	if height != interval {
		blocks_to_go_back = interval;
	}

	if walk_back(parent, blocks_to_go_back, store)?.is_none() {
		return Ok(());
	}

	// The last 60 block timestamps, newest first, and the 59 solving times
	// between them. The median of those solving times drives the retarget.
	let mut last_60_block_times: Vec<i64> = Vec::with_capacity(60);
	let mut cursor = parent.clone();
	while last_60_block_times.len() < 60 {
		last_60_block_times.push(cursor.header.raw.time as i64);
		cursor = match cursor.get_prev(store)? {
			Some(block) => block,
			None => return Ok(()),
		};
	}

	let mut last_59_solving_times: Vec<i64> = (0..59)
		.map(|i| (last_60_block_times[i] - last_60_block_times[i + 1]).abs())
		.collect();
	last_59_solving_times.sort();

	info!(target: "verification", "median time between blocks is {}", last_59_solving_times[29]);
	let mut med_time = last_59_solving_times[29];
	let mut average_time: i64 = 120;
	let mut did_half_adjust = false;

	if height > consensus.may_fork {
		// The median alone misbehaves when the average time between blocks
		// grows far beyond the spacing while the median stays near it. The
		// last 120 blocks (should be 4 hours) correct for that.
		let mut last_120_block_times: Vec<i64> = Vec::with_capacity(120);
		let mut cursor = parent.clone();
		while last_120_block_times.len() < 120 {
			last_120_block_times.push(cursor.header.raw.time as i64);
			cursor = match cursor.get_prev(store)? {
				Some(block) => block,
				None => return Ok(()),
			};
		}

		let last_119_solving_times: Vec<i64> = (0..119)
			.map(|i| (last_120_block_times[i] - last_120_block_times[i + 1]).abs())
			.collect();

		let total: i64 = last_119_solving_times.iter().sum();
		average_time = total / 119;
		info!(target: "verification", "average time between blocks over the last 120 blocks is {}", average_time);

		if height <= consensus.july_fork2 {
			if average_time >= 180 {
				info!(target: "verification", "average time between blocks is too high, adjusting");
				med_time = 130;
			} else if average_time >= 108 && med_time < 120 {
				// the median alone would prompt a difficulty rise here;
				// limit the stepping to something reasonable
				info!(target: "verification", "median time between blocks is too low compared to average time, adjusting");
				med_time = 110;
			}
		} else {
			med_time = cmp::min(med_time, average_time);

			if average_time >= 180 && last_119_solving_times[0] >= 1200 && last_119_solving_times[1] >= 1200 {
				did_half_adjust = true;
				med_time = 240;
			}
		}
	}

	// A median above the spacing that the 51% defence will not let fall makes
	// difficulty drop without end. The deadlock signature is blocks solved
	// exactly ten minutes apart at a five-block distance.
	if height > consensus.november_fork2 && med_time >= 120 {
		let mut num_too_close = 0;
		let mut index = 1;
		while index != 55 {
			if (last_60_block_times[60 - index] - last_60_block_times[60 - (index + 5)]).abs() == 600 {
				num_too_close += 1;
			}
			index += 1;
		}

		if num_too_close > 0 {
			debug!(target: "verification", "deadlock detected, raising difficulty off the edge of the defence system");
			med_time = if height > consensus.july_fork2 { 119 } else { 110 };
		}
	}

	let actual_timespan;
	if height > consensus.july_fork2 {
		// 216 == 180/100 * 120, 122 == 102/100 * 120
		if average_time > 216 || med_time > 122 {
			med_time = if did_half_adjust {
				// the average time between blocks was far too high, allow a
				// dramatic difficulty fall
				(120 * 142) / 100
			} else {
				// otherwise only a 120/119 fall per block, as difficulty now
				// adjusts at every block
				121
			};
		} else if average_time < 117 || med_time < 117 {
			// limit the rise to 2% per block
			med_time = 117;
		}
		actual_timespan = med_time * 60;
	} else {
		let mut timespan = med_time * 60;
		let timespan_max = if new_protocol { (timespan_current * 99) / 70 } else { timespan_current * 4 };
		let timespan_min = if new_protocol { (timespan_current * 70) / 99 } else { timespan_current / 4 };
		if timespan < timespan_min {
			timespan = timespan_min;
		}
		if timespan > timespan_max {
			timespan = timespan_max;
		}
		actual_timespan = timespan;
	}

	let parent_target = decode_target(parent.header.raw.bits)?;
	let mut new_target = mul_div(parent_target, actual_timespan as u64, timespan_current as u64);

	if height > consensus.july_fork2 {
		// The possible rise and fall is limited over 1, 60 and 240 blocks,
		// so look the targets up at those depths. Depth 0 is the parent.
		let mut bits_60_ago = parent.header.raw.bits;
		let mut bits_240_ago = parent.header.raw.bits;
		let mut cursor = parent.clone();
		let mut counter = 0;
		loop {
			if counter == 60 {
				bits_60_ago = cursor.header.raw.bits;
			} else if counter == 240 {
				bits_240_ago = cursor.header.raw.bits;
				break;
			}

			cursor = match cursor.get_prev(store)? {
				Some(block) => block,
				None => return Ok(()),
			};
			counter += 1;
		}

		let target_60_ago = decode_target(bits_60_ago)?;
		let target_240_ago = decode_target(bits_240_ago)?;

		// Floor on decreases per block: 20% below the previous block at most
		// when no halving was authorized. 10/8 == 1.0/0.8
		let fall_limit = mul_div(parent_target, 10, 8);
		if !did_half_adjust && new_target > fall_limit {
			new_target = fall_limit;
		}

		// Ceilings on increases per block: 1.0/1.02 == 100/102 over 60 blocks
		let rise_limit_60 = mul_div(target_60_ago, 100, 102);
		if new_target < rise_limit_60 {
			new_target = rise_limit_60;
		}

		// 1.0/(1.02*4) == 100/408 over 240 blocks
		let rise_limit_240 = mul_div(target_240_ago, 100, 408);
		if new_target < rise_limit_240 {
			new_target = rise_limit_240;
		}
	}

	verify_difficulty(new_target, header, consensus)
}

/// On testnet, at non-transition points, a min-difficulty block is allowed
/// once twice the target spacing has passed since the parent. Otherwise the
/// block must repeat the target of the last block that was not itself mined
/// at minimum difficulty.
fn check_testnet_difficulty(parent: &StoredBlock, header: &IndexedBlockHeader, store: &dyn BlockStore, consensus: &ConsensusParams, interval: u32, target_spacing: i64) -> Result<(), Error> {
	let pow_limit = consensus.proof_of_work_limit();

	if header.raw.time as i64 > parent.header.raw.time as i64 + target_spacing * 2 {
		return verify_difficulty(pow_limit, header, consensus);
	}

	// Return the last non-special-min-difficulty-rules block
	let mut cursor = parent.clone();
	loop {
		if cursor.height % interval == 0 {
			break;
		}
		if decode_target(cursor.header.raw.bits)? != pow_limit {
			break;
		}

		cursor = match cursor.get_prev(store)? {
			Some(block) => block,
			None => return Ok(()),
		};
	}

	verify_difficulty(decode_target(cursor.header.raw.bits)?, header, consensus)
}

fn decode_target(bits: Compact) -> Result<U256, Error> {
	bits.to_u256().map_err(|_| Error::Pow)
}

/// Follows parent links `count` steps down, or `None` when the store ends.
fn walk_back(from: &StoredBlock, count: u32, store: &dyn BlockStore) -> Result<Option<StoredBlock>, Error> {
	let mut cursor = from.clone();
	for _ in 0..count {
		cursor = match cursor.get_prev(store)? {
			Some(block) => block,
			None => return Ok(None),
		};
	}
	Ok(Some(cursor))
}

/// Exact `value * num / den` that cannot overflow on the multiplication:
/// `(value / den) * num + (value % den) * num / den`. Saturates when the
/// true result does not fit 256 bits.
fn mul_div(value: U256, num: u64, den: u64) -> U256 {
	let num = U256::from(num);
	let den = U256::from(den);
	let quotient = value / den;
	let remainder = value % den;

	let (scaled, overflow) = quotient.overflowing_mul(num);
	if overflow {
		return U256::max_value();
	}

	match scaled.overflowing_add(remainder * num / den) {
		(result, false) => result,
		(_, true) => U256::max_value(),
	}
}

/// Caps the computed target at the proof-of-work limit, reduces it to the
/// 3-byte mantissa precision a header can carry, and requires equality with
/// the received bits.
fn verify_difficulty(computed: U256, header: &IndexedBlockHeader, consensus: &ConsensusParams) -> Result<(), Error> {
	let mut new_target = computed;

	// ceiling on the highest target value (lowest possible difficulty)
	let pow_limit = consensus.proof_of_work_limit();
	if new_target > pow_limit {
		info!(target: "verification", "difficulty hit proof of work limit: {:x}", new_target);
		new_target = pow_limit;
	}

	let received_bits = header.raw.bits;
	let received_target = decode_target(received_bits)?;
	let accuracy_bytes = (u32::from(received_bits) >> 24) as i32 - 3;

	// The calculated target is to a higher precision than received, so reduce it
	let mask = if accuracy_bytes >= 0 {
		U256::from(0xffffffu64) << (accuracy_bytes as usize * 8)
	} else {
		U256::from(0xffffffu64) >> ((-accuracy_bytes) as usize * 8)
	};

	let masked = new_target & mask;
	if masked != received_target {
		return Err(Error::Difficulty {
			expected: Compact::from_u256(masked),
			actual: received_bits,
		});
	}

	Ok(())
}
