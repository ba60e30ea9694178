use primitives::bigint::U256;
use primitives::compact::Compact;

lazy_static! {
	static ref MAX_BITS_MAINNET: U256 = Compact::new(0x1e0fffff)
		.to_u256().expect("hardcoded value should decode without errors");
	static ref MAX_BITS_TESTNET: U256 = Compact::new(0x1e0fffff)
		.to_u256().expect("hardcoded value should decode without errors");
	static ref MAX_BITS_REGTEST: U256 = Compact::new(0x207fffff)
		.to_u256().expect("hardcoded value should decode without errors");
}

/// Network magic type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
	/// The original and main network for production deployments.
	Mainnet,
	/// The test network.
	Testnet,
	/// Any other network, for private deployments.
	Regtest,
	/// Isolated network used in unit tests.
	Unitest,
}

impl Network {
	pub fn id(&self) -> &'static str {
		match *self {
			Network::Mainnet => "main",
			Network::Testnet => "test",
			Network::Regtest => "regtest",
			Network::Unitest => "unitest",
		}
	}

	/// Highest (easiest) admissible proof-of-work target.
	pub fn max_bits(&self) -> U256 {
		match *self {
			Network::Mainnet => MAX_BITS_MAINNET.clone(),
			Network::Testnet => MAX_BITS_TESTNET.clone(),
			Network::Regtest | Network::Unitest => MAX_BITS_REGTEST.clone(),
		}
	}

	pub fn is_testnet(&self) -> bool {
		*self == Network::Testnet
	}
}
