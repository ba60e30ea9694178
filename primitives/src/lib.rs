extern crate rustc_hex as hex;
#[macro_use]
extern crate uint;

pub mod bigint;
pub mod compact;
pub mod hash;
