use byteorder::{ByteOrder, LittleEndian};
use crypto::dhash256;
use primitives::hash::H256;
use constants::{LOCKTIME_THRESHOLD, SEQUENCE_FINAL};

#[derive(Debug, PartialEq, Eq, Clone, Hash, Default)]
pub struct OutPoint {
	pub hash: H256,
	pub index: u32,
}

impl OutPoint {
	pub fn null() -> Self {
		OutPoint {
			hash: H256::default(),
			index: u32::max_value(),
		}
	}

	pub fn is_null(&self) -> bool {
		self.hash.is_zero() && self.index == u32::max_value()
	}
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct TransactionInput {
	pub previous_output: OutPoint,
	pub script_sig: Vec<u8>,
	pub sequence: u32,
}

impl TransactionInput {
	pub fn is_final(&self) -> bool {
		self.sequence == SEQUENCE_FINAL
	}
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct TransactionOutput {
	pub value: u64,
	pub script_pubkey: Vec<u8>,
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Transaction {
	pub version: u32,
	pub inputs: Vec<TransactionInput>,
	pub outputs: Vec<TransactionOutput>,
	pub lock_time: u32,
}

impl Transaction {
	pub fn hash(&self) -> H256 {
		dhash256(&self.hashing_input())
	}

	pub fn is_coinbase(&self) -> bool {
		self.inputs.len() == 1 && self.inputs[0].previous_output.is_null()
	}

	/// A transaction is final in a block when its lock time has passed relative
	/// to the block height and timestamp, or when every input is final.
	pub fn is_final_in_block(&self, block_height: u32, block_time: u32) -> bool {
		if self.lock_time == 0 {
			return true;
		}

		let max_lock_time = if self.lock_time < LOCKTIME_THRESHOLD {
			block_height
		} else {
			block_time
		};

		if self.lock_time < max_lock_time {
			return true;
		}

		self.inputs.iter().all(TransactionInput::is_final)
	}

	fn hashing_input(&self) -> Vec<u8> {
		let mut out = Vec::with_capacity(64);
		append_u32(&mut out, self.version);

		append_u64(&mut out, self.inputs.len() as u64);
		for input in &self.inputs {
			out.extend_from_slice(&*input.previous_output.hash);
			append_u32(&mut out, input.previous_output.index);
			append_u64(&mut out, input.script_sig.len() as u64);
			out.extend_from_slice(&input.script_sig);
			append_u32(&mut out, input.sequence);
		}

		append_u64(&mut out, self.outputs.len() as u64);
		for output in &self.outputs {
			append_u64(&mut out, output.value);
			append_u64(&mut out, output.script_pubkey.len() as u64);
			out.extend_from_slice(&output.script_pubkey);
		}

		append_u32(&mut out, self.lock_time);
		out
	}
}

fn append_u32(out: &mut Vec<u8>, value: u32) {
	let mut word = [0u8; 4];
	LittleEndian::write_u32(&mut word, value);
	out.extend_from_slice(&word);
}

fn append_u64(out: &mut Vec<u8>, value: u64) {
	let mut word = [0u8; 8];
	LittleEndian::write_u64(&mut word, value);
	out.extend_from_slice(&word);
}
