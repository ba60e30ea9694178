//! Unsigned 256-bit integer used for difficulty targets and chain work.

construct_uint! {
	pub struct U256(4);
}
