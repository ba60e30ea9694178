extern crate byteorder;
extern crate primitives;
extern crate glccrypto as crypto;

pub mod constants;

mod block;
mod block_header;
mod filtered_block;
mod merkle_root;
mod transaction;

mod indexed_block;
mod indexed_header;
mod indexed_transaction;

pub use primitives::{hash, bigint, compact};

pub use block::Block;
pub use block_header::BlockHeader;
pub use filtered_block::FilteredBlock;
pub use merkle_root::{merkle_root, merkle_node_hash};
pub use transaction::{Transaction, TransactionInput, TransactionOutput, OutPoint};

pub use indexed_block::IndexedBlock;
pub use indexed_header::IndexedBlockHeader;
pub use indexed_transaction::IndexedTransaction;
