//! Compact representation of an unsigned 256-bit difficulty target.

use std::fmt;
use bigint::U256;

/// The 32-bit floating-point-like target encoding: one exponent byte and a
/// 3-byte mantissa with a sign bit at 0x00800000.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Compact(u32);

impl fmt::Debug for Compact {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{:#010x}", self.0)
	}
}

impl From<u32> for Compact {
	fn from(u: u32) -> Self {
		Compact(u)
	}
}

impl From<Compact> for u32 {
	fn from(c: Compact) -> Self {
		c.0
	}
}

impl Compact {
	pub fn new(u: u32) -> Self {
		Compact(u)
	}

	pub fn max_value() -> Self {
		u32::max_value().into()
	}

	/// Computes the target. Returns `Err` on negative or overflowing encodings,
	/// carrying the decoded magnitude.
	pub fn to_u256(&self) -> Result<U256, U256> {
		let size = self.0 >> 24;
		let mut word = self.0 & 0x007fffff;

		let result = if size <= 3 {
			word >>= 8 * (3 - size);
			word.into()
		} else {
			U256::from(word) << (8 * (size - 3))
		};

		let is_negative = word != 0 && (self.0 & 0x00800000) != 0;
		let is_overflow = word != 0 && ((size > 34) ||
			(word > 0xff && size > 33) ||
			(word > 0xffff && size > 32));

		if is_negative || is_overflow {
			Err(result)
		} else {
			Ok(result)
		}
	}

	pub fn from_u256(val: U256) -> Self {
		let mut size = (val.bits() + 7) / 8;
		let mut compact = if size <= 3 {
			(val.low_u64() << (8 * (3 - size))) as u32
		} else {
			let bn = val >> (8 * (size - 3));
			bn.low_u32()
		};

		if (compact & 0x00800000) != 0 {
			compact >>= 8;
			size += 1;
		}

		assert_eq!(compact & !0x007fffff, 0);
		assert!(size < 256);
		Compact(compact | (size as u32) << 24)
	}
}

#[cfg(test)]
mod tests {
	use bigint::U256;
	use super::Compact;

	#[test]
	fn test_compact_to_u256() {
		assert_eq!(Compact::new(0x01003456).to_u256(), Ok(0u64.into()));
		assert_eq!(Compact::new(0x01123456).to_u256(), Ok(0x12u64.into()));
		assert_eq!(Compact::new(0x02008000).to_u256(), Ok(0x80u64.into()));
		assert_eq!(Compact::new(0x05009234).to_u256(), Ok(0x92340000u64.into()));
		assert_eq!(Compact::new(0x20123456).to_u256(), Ok(U256::from(0x123456u64) << (8 * 0x1d)));

		// negative encodings are rejected
		assert!(Compact::new(0x01fedcba).to_u256().is_err());
		assert!(Compact::new(0x04923456).to_u256().is_err());
	}

	#[test]
	fn test_from_u256() {
		let test1 = U256::from(1000u64);
		assert_eq!(Compact::new(0x0203e800), Compact::from_u256(test1));

		let test2 = (U256::from(1u64) << 224) - U256::from(1u64);
		assert_eq!(Compact::new(0x1d00ffff), Compact::from_u256(test2));
	}

	#[test]
	fn test_compact_roundtrip() {
		for bits in &[0x1d00ffffu32, 0x1e0fffff, 0x1b0404cb, 0x207fffff] {
			let compact = Compact::new(*bits);
			let target = compact.to_u256().unwrap();
			assert_eq!(compact, Compact::from_u256(target));
		}
	}
}
