use std::collections::HashSet;
use std::sync::Arc;
use parking_lot::{Mutex, RwLock};
use time::get_time;
use chain::{FilteredBlock, IndexedBlock, IndexedTransaction};
use network::ConsensusParams;
use primitives::hash::H256;
use storage::{BlockStore, UndoableBlockStore, StoredBlock};
use verification::{check_difficulty_transitions, median_timestamp_of_recent_blocks, BlockVerifier, HeaderVerifier, Error};
use hooks::{StoreHook, HeaderStoreHook, UndoableStoreHook, UtxoHook, NullUtxo};
use listener::{ChainListener, ListenerRegistry, NewBlockType};
use orphan_pool::{OrphanBlock, OrphanPool};

/// The lightweight chain: verifies headers only.
pub type SpvBlockChain<TStore> = BlockChain<TStore, HeaderStoreHook, NullUtxo>;

/// The full-validation chain: maintains the unspent-output set through a
/// `UtxoHook` over an undoable store.
pub type FullBlockChain<TStore, TUtxo> = BlockChain<TStore, UndoableStoreHook, TUtxo>;

/// Links received blocks into the block tree, keeps track of the best
/// chain, and notifies the attached listeners.
pub struct BlockChain<TStore, THook, TUtxo>
	where TStore: BlockStore, THook: StoreHook<TStore>, TUtxo: UtxoHook
{
	params: ConsensusParams,
	store: TStore,
	store_hook: THook,
	utxo: TUtxo,
	/// Serialises every mutating operation: ingestion, reorganization and
	/// orphan reprocessing.
	data: Mutex<ChainData>,
	/// Tracks the top of the best known chain. Guarded separately from the
	/// ingestion lock so clients can read the best height quickly whilst
	/// the chain is downloading.
	chain_head: RwLock<StoredBlock>,
	listeners: ListenerRegistry,
}

struct ChainData {
	orphan_blocks: OrphanPool,
	stats_last_time: u64,
	stats_blocks_added: u64,
}

impl<TStore: BlockStore> BlockChain<TStore, HeaderStoreHook, NullUtxo> {
	/// Chain that verifies headers only, over a plain block store.
	pub fn new_spv(params: ConsensusParams, store: TStore) -> Result<Self, Error> {
		BlockChain::with_hooks(params, store, HeaderStoreHook, NullUtxo)
	}
}

impl<TStore: UndoableBlockStore, TUtxo: UtxoHook> BlockChain<TStore, UndoableStoreHook, TUtxo> {
	/// Chain that fully verifies transactions through the given UTXO hook,
	/// over an undoable block store.
	pub fn new_full(params: ConsensusParams, store: TStore, utxo: TUtxo) -> Result<Self, Error> {
		BlockChain::with_hooks(params, store, UndoableStoreHook, utxo)
	}
}

impl<TStore, THook, TUtxo> BlockChain<TStore, THook, TUtxo>
	where TStore: BlockStore, THook: StoreHook<TStore>, TUtxo: UtxoHook
{
	/// Constructs a chain over the given store and hook pair. The store must
	/// already hold its best block - seeding the genesis block is the
	/// embedder's task.
	pub fn with_hooks(params: ConsensusParams, store: TStore, store_hook: THook, utxo: TUtxo) -> Result<Self, Error> {
		let chain_head = store.best_block()?;
		info!(target: "chain", "chain head is at height {}: {:?}", chain_head.height, chain_head.hash().reversed());

		Ok(BlockChain {
			params: params,
			store: store,
			store_hook: store_hook,
			utxo: utxo,
			data: Mutex::new(ChainData {
				orphan_blocks: OrphanPool::default(),
				stats_last_time: now_ms(),
				stats_blocks_added: 0,
			}),
			chain_head: RwLock::new(chain_head),
			listeners: ListenerRegistry::default(),
		})
	}

	/// Processes a received block and tries to add it to the chain. Returns
	/// `Ok(false)` when the block is fine but cannot be connected at this
	/// time, and an error when there is something wrong with it.
	pub fn add_block(&self, block: IndexedBlock) -> Result<bool, Error> {
		let mut data = self.data.lock();
		let result = self.add(&mut data, block, None, None, true);
		self.finish(result)
	}

	/// Processes a received filtered block: a header plus the hashes that
	/// matched the remote filter and those matched transactions that were
	/// downloaded. There may be fewer transactions than hashes; the hash of
	/// every carried transaction is dropped from the notification set.
	pub fn add_filtered_block(&self, block: FilteredBlock) -> Result<bool, Error> {
		let mut data = self.data.lock();
		let FilteredBlock { header, matched_tx_hashes, transactions } = block;

		let mut hashes: HashSet<H256> = matched_tx_hashes.into_iter().collect();
		for tx in &transactions {
			let was_matched = hashes.remove(&tx.hash);
			assert!(was_matched, "filtered transaction is not part of the matched set");
		}

		let block = IndexedBlock::header_only(header);
		let result = self.add(&mut data, block, Some(hashes), Some(transactions), true);
		self.finish(result)
	}

	/// The block at the head of the current best chain: the block
	/// representing the greatest amount of cumulative work done.
	pub fn chain_head(&self) -> StoredBlock {
		self.chain_head.read().clone()
	}

	/// The height of the best known chain, convenience for
	/// `chain_head().height`.
	pub fn best_chain_height(&self) -> u32 {
		self.chain_head.read().height
	}

	/// The store the chain was constructed with; can be used to iterate
	/// over the chain.
	pub fn block_store(&self) -> &TStore {
		&self.store
	}

	pub fn consensus_params(&self) -> &ConsensusParams {
		&self.params
	}

	pub fn add_listener(&self, listener: Arc<dyn ChainListener>) {
		self.listeners.add(listener);
	}

	pub fn remove_listener(&self, listener: &Arc<dyn ChainListener>) -> bool {
		self.listeners.remove(listener)
	}

	/// True when the given block is currently held in the orphan pool.
	pub fn is_orphan(&self, hash: &H256) -> bool {
		self.data.lock().orphan_blocks.contains(hash)
	}

	/// Walks backwards through the known orphan blocks to find the
	/// bottom-most one reachable from the given hash.
	pub fn orphan_root(&self, hash: &H256) -> Option<IndexedBlock> {
		self.data.lock().orphan_blocks.root_of(hash).cloned()
	}

	/// An estimate of when the given height will be reached, in milliseconds
	/// since the epoch, assuming a perfect ten-minute average per block.
	/// Useful for turning lock times into human readable times. A height in
	/// the past is still estimated rather than looked up.
	pub fn estimate_block_time(&self, height: u32) -> i64 {
		let head = self.chain_head.read();
		let offset = height as i64 - head.height as i64;
		head.header.raw.time as i64 * 1000 + 1000 * 60 * 10 * offset
	}

	/// Rolls back any in-flight store transaction on verification failure
	/// before surfacing the error.
	fn finish(&self, result: Result<bool, Error>) -> Result<bool, Error> {
		match result {
			Err(err) => {
				if err.is_verification() {
					self.store_hook.not_setting_chain_head(&self.store)?;
				}
				Err(err)
			},
			ok => ok,
		}
	}

	// filtered_tx_hashes and the hashes of filtered_transactions are mutually exclusive
	fn add(&self, data: &mut ChainData, block: IndexedBlock, filtered_tx_hashes: Option<HashSet<H256>>, filtered_transactions: Option<Vec<IndexedTransaction>>, try_connecting: bool) -> Result<bool, Error> {
		let now = now_ms();
		if now.saturating_sub(data.stats_last_time) > 1000 {
			// more than a second passed since last stats logging
			if data.stats_blocks_added > 1 {
				info!(target: "chain", "{} blocks per second", data.stats_blocks_added);
			}
			data.stats_last_time = now;
			data.stats_blocks_added = 0;
		}

		// Quick check for duplicates, to avoid the expensive split search
		// further down. This happens a lot when orphans are reconnected by
		// the brute force rounds below.
		if block.header == self.chain_head().header {
			return Ok(true);
		}
		if try_connecting && data.orphan_blocks.contains(block.hash()) {
			return Ok(false);
		}

		// Running with full blocks means every block must carry transactions
		if self.utxo.should_verify_transactions() && block.transactions.is_none() {
			return Err(Error::HeaderInFullMode);
		}

		// Does this block contain any transactions we might care about?
		// Checked up front so the merkle verification can be skipped when
		// the contents aren't interesting, which saves a lot of time for
		// big blocks.
		let mut contents_important = self.utxo.should_verify_transactions();
		if block.transactions.is_some() {
			contents_important = contents_important || self.contains_relevant_transactions(&block);
		}

		// Prove the block is internally valid: hash below target, timestamp
		// sane. Contents are only checked when something cares about them;
		// presence in a valid connecting block is otherwise taken as proof
		// of validity.
		let verified = HeaderVerifier::new(&block.header, &self.params, current_time()).check()
			.and_then(|_| if contents_important { BlockVerifier::new(&block).check() } else { Ok(()) });
		if let Err(err) = verified {
			error!(target: "chain", "failed to verify block {:?}: {:?}", block.hash().reversed(), err);
			return Err(err);
		}

		// Try linking it to a place in the currently known blocks
		match self.store_hook.stored_block(&self.store, &block.header.raw.previous_header_hash)? {
			None => {
				// The previous block is unknown, probably because the chain
				// is still downloading and a block was solved meanwhile. Put
				// it to one side and try to connect it later.
				assert!(try_connecting, "orphan reprocessing lost a connectable parent");
				warn!(target: "chain", "block does not connect: {:?} prev {:?}",
					block.hash().reversed(), block.header.raw.previous_header_hash.reversed());
				data.orphan_blocks.insert(OrphanBlock::new(block, filtered_tx_hashes, filtered_transactions));
				return Ok(false);
			},
			Some(stored_prev) => {
				// It connects to somewhere on the chain, not necessarily the
				// top of the best known chain.
				check_difficulty_transitions(&stored_prev, &block.header, &self.store, &self.params)?;
				self.connect_block(block, &stored_prev, filtered_tx_hashes, filtered_transactions)?;
			},
		}

		if try_connecting {
			self.try_connecting_orphans(data)?;
		}

		data.stats_blocks_added += 1;
		Ok(true)
	}

	// expensive_checks enables checks that require looking further back in
	// the chain than the parent when connecting, like the median timestamp
	// check. It follows should_verify_transactions() for now.
	fn connect_block(&self, block: IndexedBlock, stored_prev: &StoredBlock, filtered_tx_hashes: Option<HashSet<H256>>, filtered_transactions: Option<Vec<IndexedTransaction>>) -> Result<(), Error> {
		let expensive_checks = self.utxo.should_verify_transactions();
		let height = stored_prev.height + 1;

		// A block that fails a checkpoint lock-in never connects anywhere
		if !self.params.passes_checkpoint(height, block.hash()) {
			return Err(Error::Checkpoint { height: height, hash: block.hash().clone() });
		}

		if self.utxo.should_verify_transactions() && !block.is_final(height) {
			return Err(Error::NonFinalTransaction);
		}

		let head = self.chain_head();
		if *stored_prev == head {
			// This block connects to the best known block: a normal
			// continuation of the system.
			if expensive_checks && block.header.raw.time <= median_timestamp_of_recent_blocks(&head, &self.store)? {
				return Err(Error::Timestamp);
			}

			let tx_out_changes = if self.utxo.should_verify_transactions() {
				Some(self.utxo.connect_transactions(height, &block)?)
			} else {
				None
			};

			let new_stored_block = self.store_hook.add_to_store(&self.store, stored_prev, &block.header, tx_out_changes)?;
			self.set_chain_head(&new_stored_block)?;
			debug!(target: "chain", "chain is now {} blocks high", new_stored_block.height);

			// Notify the listeners of the new block so the depth and work of
			// their stored transactions can be updated. Wallets need to know
			// how deep each transaction is, so coinbases aren't used before
			// maturity.
			let mut first = true;
			for listener in self.listeners.snapshot() {
				if let Some(transactions) = block.transactions.as_ref().or(filtered_transactions.as_ref()) {
					send_transactions_to_listener(&new_stored_block, NewBlockType::BestChain, &listener, transactions, !first);
				}
				if let Some(ref hashes) = filtered_tx_hashes {
					for hash in hashes {
						listener.notify_transaction_in_block(hash, &new_stored_block, NewBlockType::BestChain);
					}
				}
				listener.notify_new_best_block(&new_stored_block);
				first = false;
			}
		} else {
			// This block connects somewhere other than the top of the best
			// known chain.
			let new_block = stored_prev.build(block.header.clone())?;
			let have_new_best_chain = new_block.more_work_than(&head);

			if have_new_best_chain {
				info!(target: "chain", "block is causing a re-organize");
			} else {
				match find_split(&new_block, &head, &self.store)? {
					Some(ref split_point) if *split_point == new_block => {
						// A block that was already seen and linked into the
						// chain below the head. Re-processing it would
						// confuse wallets, so skip.
						warn!(target: "chain", "saw duplicated block in main chain at height {}: {:?}",
							new_block.height, new_block.hash().reversed());
						return Ok(());
					},
					None => return Err(Error::ForkWithoutAncestor),
					Some(split_point) => {
						// Not spending any transactions yet, this is a fork
						self.store_hook.add_to_store(&self.store, stored_prev, &block.header, None)?;
						info!(target: "chain", "block forks the chain at height {}/block {:?}, but it did not cause a reorganize: {:?}",
							split_point.height, split_point.hash().reversed(), new_block.hash().reversed());
					},
				}
			}

			// There may be no transactions when only a header was received,
			// which happens during fast catchup. Otherwise the transactions
			// are sent to the listeners FIRST, even when a reorganization is
			// about to happen, marked as a side chain so wallets know not to
			// try and spend them until they become activated.
			if block.transactions.is_some() || filtered_transactions.is_some() {
				let mut first = true;
				for listener in self.listeners.snapshot() {
					if let Some(transactions) = block.transactions.as_ref().or(filtered_transactions.as_ref()) {
						send_transactions_to_listener(&new_block, NewBlockType::SideChain, &listener, transactions, !first);
					}
					if let Some(ref hashes) = filtered_tx_hashes {
						for hash in hashes {
							listener.notify_transaction_in_block(hash, &new_block, NewBlockType::SideChain);
						}
					}
					first = false;
				}
			}

			if have_new_best_chain {
				self.handle_new_best_chain(stored_prev, &new_block, &block, expensive_checks)?;
			}
		}

		Ok(())
	}

	/// Called as part of connecting a block when the new block results in a
	/// different chain having higher total work.
	fn handle_new_best_chain(&self, stored_prev: &StoredBlock, new_chain_head: &StoredBlock, block: &IndexedBlock, expensive_checks: bool) -> Result<(), Error> {
		// This chain has overtaken the one we currently believe is best.
		// First calculate the block at which they diverged: only the chain
		// beyond it needs examining.
		let head = self.chain_head();
		let split_point = find_split(new_chain_head, &head, &self.store)?
			.ok_or(Error::ForkWithoutAncestor)?;
		info!(target: "chain", "re-organize after split at height {}", split_point.height);
		info!(target: "chain", "old chain head: {:?}", head.hash().reversed());
		info!(target: "chain", "new chain head: {:?}", new_chain_head.hash().reversed());
		info!(target: "chain", "split at block: {:?}", split_point.hash().reversed());

		let old_blocks = get_partial_chain(&head, &split_point, &self.store)?;
		let new_blocks = get_partial_chain(new_chain_head, &split_point, &self.store)?;

		let mut stored_new_head = split_point.clone();
		if self.utxo.should_verify_transactions() {
			// Disconnect each transaction in the old part of the chain that
			// is no longer in the new main chain. A pruned failure here is
			// not locally recoverable: the data needed to reorganize this
			// deep is gone, and the operator has to rescan.
			for old_block in &old_blocks {
				self.utxo.disconnect_transactions(old_block)?;
			}

			// Walk the new blocks in ascending chronological order
			for cursor in new_blocks.iter().rev() {
				if expensive_checks {
					let cursor_prev = cursor.get_prev(&self.store)?.ok_or(Error::OrphanedSegment)?;
					if cursor.header.raw.time <= median_timestamp_of_recent_blocks(&cursor_prev, &self.store)? {
						return Err(Error::Timestamp);
					}
				}

				let tx_out_changes = if cursor != new_chain_head {
					self.utxo.connect_stored_transactions(cursor)?
				} else {
					// the submitted block object is still at hand for the
					// tip, so it needs no re-read from the store
					self.utxo.connect_transactions(new_chain_head.height, block)?
				};
				stored_new_head = self.store_hook.add_to_store(&self.store, &stored_new_head, &cursor.header, Some(tx_out_changes))?;
			}
		} else {
			// (finally) write the new head to the block store
			stored_new_head = self.store_hook.add_to_store(&self.store, stored_prev, &new_chain_head.header, None)?;
		}

		// Inform the listeners, so the set of currently spendable
		// transactions can be updated: previous spends may have been undone
		// and new coins may have arrived.
		self.listeners.for_each_tolerant(|listener| {
			listener.reorganize(&split_point, &old_blocks, &new_blocks);
		});

		// Update the pointer to the best known block
		self.set_chain_head(&stored_new_head)
	}

	/// For each block in the orphan pool, see if it can now be fit on top of
	/// the chain and if so, do so. Rounds repeat until a full pass connects
	/// nothing: insertion order approximates parents-before-children for
	/// short orphan chains, the repetition covers the rest.
	fn try_connecting_orphans(&self, data: &mut ChainData) -> Result<(), Error> {
		loop {
			let mut blocks_connected_this_round = 0;

			for hash in data.orphan_blocks.hashes() {
				let orphan = match data.orphan_blocks.get(&hash) {
					Some(orphan) => orphan.clone(),
					None => continue,
				};

				trace!(target: "chain", "trying to connect {:?}", hash.reversed());
				if self.store_hook.stored_block(&self.store, &orphan.block.header.raw.previous_header_hash)?.is_none() {
					// this is still an unconnected/orphan block
					trace!(target: "chain", "  but it is not connectable right now");
					continue;
				}

				// `false` here ensures the duplicate-orphan short-circuit
				// does not fire while reprocessing
				self.add(data, orphan.block, orphan.filtered_tx_hashes, orphan.filtered_transactions, false)?;
				data.orphan_blocks.remove(&hash);
				blocks_connected_this_round += 1;
			}

			if blocks_connected_this_round == 0 {
				break;
			}
			info!(target: "chain", "connected {} orphan blocks", blocks_connected_this_round);
		}

		Ok(())
	}

	/// True when any attached listener considers any transaction in the
	/// block relevant.
	fn contains_relevant_transactions(&self, block: &IndexedBlock) -> bool {
		let transactions = match block.transactions {
			Some(ref transactions) => transactions,
			None => return false,
		};

		let listeners = self.listeners.snapshot();
		transactions.iter().any(|tx| listeners.iter().any(|listener| listener.is_transaction_relevant(tx)))
	}

	fn set_chain_head(&self, new_head: &StoredBlock) -> Result<(), Error> {
		self.store_hook.do_set_chain_head(&self.store, new_head)?;
		*self.chain_head.write() = new_head.clone();
		Ok(())
	}
}

fn send_transactions_to_listener(block: &StoredBlock, block_type: NewBlockType, listener: &Arc<dyn ChainListener>, transactions: &[IndexedTransaction], clone: bool) {
	for tx in transactions {
		if listener.is_transaction_relevant(tx) {
			// Listeners may hold on to the delivered transaction. When
			// several listeners share one block, every listener after the
			// first gets its own copy, so their views cannot alias.
			let duplicated;
			let tx = if clone {
				duplicated = tx.clone();
				&duplicated
			} else {
				tx
			};
			listener.receive_from_block(tx, block, block_type);
		}
	}
}

/// Locates the point in the chain at which two branches diverge. Returns
/// the new head or the old head themselves when the branches do not
/// actually diverge, and `None` when either cursor walks off the store
/// without the branches meeting.
fn find_split<TStore: BlockStore>(new_chain_head: &StoredBlock, old_chain_head: &StoredBlock, store: &TStore) -> Result<Option<StoredBlock>, Error> {
	let mut current_chain_cursor = old_chain_head.clone();
	let mut new_chain_cursor = new_chain_head.clone();
	// Loop until the block both chains have in common is found. Example:
	//
	//    A -> B -> C -> D
	//         \--> E -> F -> G
	//
	// here the split is B: old chain head = D and new chain head = G.
	while current_chain_cursor != new_chain_cursor {
		if current_chain_cursor.height > new_chain_cursor.height {
			current_chain_cursor = match current_chain_cursor.get_prev(store)? {
				Some(block) => block,
				None => return Ok(None),
			};
		} else {
			new_chain_cursor = match new_chain_cursor.get_prev(store)? {
				Some(block) => block,
				None => return Ok(None),
			};
		}
	}

	Ok(Some(current_chain_cursor))
}

/// Returns the contiguous blocks between `higher` and `lower`, ordered tip
/// first. Higher is included, lower is not.
fn get_partial_chain<TStore: BlockStore>(higher: &StoredBlock, lower: &StoredBlock, store: &TStore) -> Result<Vec<StoredBlock>, Error> {
	assert!(higher.height > lower.height, "higher and lower are reversed");

	let mut results = Vec::new();
	let mut cursor = higher.clone();
	loop {
		results.push(cursor.clone());
		cursor = cursor.get_prev(store)?.ok_or(Error::OrphanedSegment)?;
		if cursor == *lower {
			break;
		}
	}

	Ok(results)
}

fn now_ms() -> u64 {
	let now = get_time();
	now.sec as u64 * 1000 + now.nsec as u64 / 1_000_000
}

fn current_time() -> u32 {
	get_time().sec as u32
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;
	use parking_lot::Mutex;
	use chain::{merkle_root, BlockHeader, FilteredBlock, IndexedBlock, IndexedBlockHeader, IndexedTransaction,
		OutPoint, Transaction, TransactionInput, TransactionOutput};
	use db::MemoryBlockStore;
	use network::{Network, ConsensusParams};
	use primitives::hash::H256;
	use storage::{BlockStore, StoredBlock, TransactionOutputChanges};
	use verification::Error;
	use hooks::UtxoHook;
	use listener::{ChainListener, NewBlockType};
	use super::{BlockChain, SpvBlockChain, FullBlockChain};

	const TEST_BITS: u32 = 0x207fffff;
	const GENESIS_TIME: u32 = 1_000_000;

	fn test_hash(n: u32) -> H256 {
		let mut hash = H256::default();
		hash[0] = n as u8;
		hash[1] = (n >> 8) as u8;
		hash[2] = (n >> 16) as u8;
		hash[3] = (n >> 24) as u8;
		hash[4] = 1;
		hash
	}

	fn simple_tx(n: u32) -> Transaction {
		Transaction {
			version: 1,
			inputs: vec![TransactionInput {
				previous_output: OutPoint { hash: test_hash(10_000 + n), index: 0 },
				script_sig: Vec::new(),
				sequence: 0,
			}],
			outputs: vec![TransactionOutput { value: 50, script_pubkey: Vec::new() }],
			lock_time: 0,
		}
	}

	fn make_block(prev: &H256, time: u32, nonce: u32, transactions: Option<Vec<Transaction>>) -> IndexedBlock {
		let transactions: Option<Vec<IndexedTransaction>> = transactions
			.map(|txs| txs.into_iter().map(Into::into).collect());
		let merkle_root_hash = transactions.as_ref()
			.map(|txs| merkle_root(&txs.iter().map(|tx| &tx.hash).collect::<Vec<&H256>>()))
			.unwrap_or_default();

		let header = IndexedBlockHeader::new(test_hash(nonce), BlockHeader {
			version: 1,
			previous_header_hash: prev.clone(),
			merkle_root_hash: merkle_root_hash,
			time: time,
			bits: TEST_BITS.into(),
			nonce: nonce,
		});
		IndexedBlock::new(header, transactions)
	}

	fn genesis_block() -> StoredBlock {
		StoredBlock::genesis(IndexedBlockHeader::new(test_hash(0), BlockHeader {
			version: 1,
			previous_header_hash: H256::default(),
			merkle_root_hash: H256::default(),
			time: GENESIS_TIME,
			bits: TEST_BITS.into(),
			nonce: 0,
		})).unwrap()
	}

	fn spv_chain() -> SpvBlockChain<MemoryBlockStore> {
		let store = MemoryBlockStore::init(genesis_block());
		BlockChain::new_spv(ConsensusParams::new(Network::Unitest), store).unwrap()
	}

	#[derive(Debug, Clone, PartialEq)]
	enum Event {
		Received(H256, H256, NewBlockType),
		HashOnly(H256, H256, NewBlockType),
		NewBest(H256),
		Reorganized(H256, Vec<H256>, Vec<H256>),
	}

	#[derive(Default)]
	struct Recorder {
		all_relevant: bool,
		events: Mutex<Vec<Event>>,
	}

	impl Recorder {
		fn relevant() -> Self {
			Recorder {
				all_relevant: true,
				events: Mutex::default(),
			}
		}

		fn events(&self) -> Vec<Event> {
			self.events.lock().clone()
		}
	}

	impl ChainListener for Recorder {
		fn is_transaction_relevant(&self, _tx: &IndexedTransaction) -> bool {
			self.all_relevant
		}

		fn receive_from_block(&self, tx: &IndexedTransaction, block: &StoredBlock, block_type: NewBlockType) {
			self.events.lock().push(Event::Received(tx.hash.clone(), block.hash().clone(), block_type));
		}

		fn notify_transaction_in_block(&self, tx_hash: &H256, block: &StoredBlock, block_type: NewBlockType) {
			self.events.lock().push(Event::HashOnly(tx_hash.clone(), block.hash().clone(), block_type));
		}

		fn notify_new_best_block(&self, block: &StoredBlock) {
			self.events.lock().push(Event::NewBest(block.hash().clone()));
		}

		fn reorganize(&self, split: &StoredBlock, old_blocks: &[StoredBlock], new_blocks: &[StoredBlock]) {
			self.events.lock().push(Event::Reorganized(
				split.hash().clone(),
				old_blocks.iter().map(|b| b.hash().clone()).collect(),
				new_blocks.iter().map(|b| b.hash().clone()).collect(),
			));
		}
	}

	#[test]
	fn test_straight_extension_header_only() {
		let chain = spv_chain();
		let recorder = Arc::new(Recorder::default());
		chain.add_listener(recorder.clone());

		let genesis_hash = chain.chain_head().hash().clone();
		let block = make_block(&genesis_hash, GENESIS_TIME + 150, 1, None);
		assert_eq!(chain.add_block(block.clone()).unwrap(), true);

		assert_eq!(chain.best_chain_height(), 1);
		assert_eq!(chain.chain_head().hash(), block.hash());
		assert_eq!(recorder.events(), vec![Event::NewBest(block.hash().clone())]);
	}

	#[test]
	fn test_orphan_then_parent_connects_both() {
		let chain = spv_chain();
		let genesis_hash = chain.chain_head().hash().clone();

		let first = make_block(&genesis_hash, GENESIS_TIME + 150, 1, None);
		let second = make_block(first.hash(), GENESIS_TIME + 300, 2, None);

		// the child arrives before its parent and waits in the orphan pool
		assert_eq!(chain.add_block(second.clone()).unwrap(), false);
		assert!(chain.is_orphan(second.hash()));
		assert_eq!(chain.best_chain_height(), 0);

		// resubmitting an orphan is not an error, just not connected
		assert_eq!(chain.add_block(second.clone()).unwrap(), false);

		// the parent arrives and the orphan is drained on top of it
		assert_eq!(chain.add_block(first).unwrap(), true);
		assert_eq!(chain.best_chain_height(), 2);
		assert_eq!(chain.chain_head().hash(), second.hash());
		assert!(!chain.is_orphan(second.hash()));
	}

	#[test]
	fn test_orphan_root_walks_orphan_chain() {
		let chain = spv_chain();

		let unknown_parent = test_hash(999);
		let bottom = make_block(&unknown_parent, GENESIS_TIME + 150, 1, None);
		let top = make_block(bottom.hash(), GENESIS_TIME + 300, 2, None);
		assert_eq!(chain.add_block(bottom.clone()).unwrap(), false);
		assert_eq!(chain.add_block(top.clone()).unwrap(), false);

		assert_eq!(chain.orphan_root(top.hash()), Some(bottom));
		assert_eq!(chain.orphan_root(&test_hash(1000)), None);
	}

	#[test]
	fn test_fork_without_reorg_notifies_side_chain() {
		let chain = spv_chain();
		let genesis_hash = chain.chain_head().hash().clone();

		let a = make_block(&genesis_hash, GENESIS_TIME + 150, 1, None);
		let b = make_block(a.hash(), GENESIS_TIME + 300, 2, None);
		let c = make_block(b.hash(), GENESIS_TIME + 450, 3, None);
		for block in vec![a.clone(), b.clone(), c.clone()] {
			assert_eq!(chain.add_block(block).unwrap(), true);
		}

		let recorder = Arc::new(Recorder::relevant());
		chain.add_listener(recorder.clone());

		// a competing block below the head is stored but does not win
		let side = make_block(a.hash(), GENESIS_TIME + 320, 4, Some(vec![simple_tx(1)]));
		assert_eq!(chain.add_block(side.clone()).unwrap(), true);

		assert_eq!(chain.chain_head().hash(), c.hash());
		assert_eq!(chain.best_chain_height(), 3);
		assert_eq!(chain.block_store().block(side.hash()).unwrap().map(|b| b.height), Some(2));

		let tx_hash = side.transactions.as_ref().unwrap()[0].hash.clone();
		assert_eq!(recorder.events(), vec![
			Event::Received(tx_hash, side.hash().clone(), NewBlockType::SideChain),
		]);
	}

	#[test]
	fn test_reorg_switches_to_heavier_branch() {
		let chain = spv_chain();
		let genesis_hash = chain.chain_head().hash().clone();

		let a = make_block(&genesis_hash, GENESIS_TIME + 150, 1, None);
		let b = make_block(a.hash(), GENESIS_TIME + 300, 2, None);
		let c = make_block(b.hash(), GENESIS_TIME + 450, 3, None);
		for block in vec![a.clone(), b.clone(), c.clone()] {
			chain.add_block(block).unwrap();
		}

		let side_b = make_block(a.hash(), GENESIS_TIME + 320, 4, None);
		let side_c = make_block(side_b.hash(), GENESIS_TIME + 470, 5, None);
		chain.add_block(side_b.clone()).unwrap();
		chain.add_block(side_c.clone()).unwrap();
		// equal work does not displace the head
		assert_eq!(chain.chain_head().hash(), c.hash());

		let recorder = Arc::new(Recorder::default());
		chain.add_listener(recorder.clone());

		let side_d = make_block(side_c.hash(), GENESIS_TIME + 620, 6, None);
		assert_eq!(chain.add_block(side_d.clone()).unwrap(), true);

		assert_eq!(chain.chain_head().hash(), side_d.hash());
		assert_eq!(chain.best_chain_height(), 4);
		assert_eq!(recorder.events(), vec![
			Event::Reorganized(
				a.hash().clone(),
				vec![c.hash().clone(), b.hash().clone()],
				vec![side_d.hash().clone(), side_c.hash().clone(), side_b.hash().clone()],
			),
		]);
	}

	#[test]
	fn test_resubmitting_head_is_idempotent() {
		let chain = spv_chain();
		let recorder = Arc::new(Recorder::default());
		chain.add_listener(recorder.clone());

		let genesis_hash = chain.chain_head().hash().clone();
		let block = make_block(&genesis_hash, GENESIS_TIME + 150, 1, None);
		chain.add_block(block.clone()).unwrap();
		let events_after_first = recorder.events();

		assert_eq!(chain.add_block(block.clone()).unwrap(), true);
		assert_eq!(chain.best_chain_height(), 1);
		assert_eq!(recorder.events(), events_after_first);
	}

	#[test]
	fn test_resubmitting_buried_main_chain_block_is_skipped() {
		let chain = spv_chain();
		let genesis_hash = chain.chain_head().hash().clone();

		let a = make_block(&genesis_hash, GENESIS_TIME + 150, 1, None);
		let b = make_block(a.hash(), GENESIS_TIME + 300, 2, None);
		chain.add_block(a.clone()).unwrap();
		chain.add_block(b).unwrap();

		let recorder = Arc::new(Recorder::default());
		chain.add_listener(recorder.clone());
		let stored = chain.block_store().len();

		assert_eq!(chain.add_block(a).unwrap(), true);
		assert_eq!(chain.block_store().len(), stored);
		assert_eq!(recorder.events(), Vec::new());
	}

	#[test]
	fn test_checkpoint_mismatch_is_rejected() {
		use std::collections::HashMap;

		let mut checkpoints = HashMap::new();
		checkpoints.insert(1, test_hash(42));
		let params = ConsensusParams::new(Network::Unitest).with_checkpoints(checkpoints);
		let store = MemoryBlockStore::init(genesis_block());
		let chain = BlockChain::new_spv(params, store).unwrap();

		let genesis_hash = chain.chain_head().hash().clone();
		let block = make_block(&genesis_hash, GENESIS_TIME + 150, 1, None);
		match chain.add_block(block) {
			Err(Error::Checkpoint { height: 1, .. }) => (),
			other => panic!("expected checkpoint mismatch, got {:?}", other),
		}
		assert_eq!(chain.best_chain_height(), 0);
	}

	#[test]
	fn test_filtered_block_delivers_matches_and_hashes() {
		let chain = spv_chain();
		let recorder = Arc::new(Recorder::relevant());
		chain.add_listener(recorder.clone());

		let genesis_hash = chain.chain_head().hash().clone();
		let matched_tx: IndexedTransaction = simple_tx(1).into();
		let unmatched_hash = test_hash(77);

		let header = IndexedBlockHeader::new(test_hash(1), BlockHeader {
			version: 1,
			previous_header_hash: genesis_hash,
			merkle_root_hash: H256::default(),
			time: GENESIS_TIME + 150,
			bits: TEST_BITS.into(),
			nonce: 1,
		});
		let block_hash = header.hash.clone();
		let filtered = FilteredBlock::new(header,
			vec![matched_tx.hash.clone(), unmatched_hash.clone()],
			vec![matched_tx.clone()]);

		assert_eq!(chain.add_filtered_block(filtered).unwrap(), true);
		assert_eq!(chain.best_chain_height(), 1);
		assert_eq!(recorder.events(), vec![
			Event::Received(matched_tx.hash.clone(), block_hash.clone(), NewBlockType::BestChain),
			Event::HashOnly(unmatched_hash, block_hash.clone(), NewBlockType::BestChain),
			Event::NewBest(block_hash),
		]);
	}

	#[test]
	#[should_panic]
	fn test_filtered_block_with_foreign_transaction_is_asserted() {
		let chain = spv_chain();
		let genesis_hash = chain.chain_head().hash().clone();

		let header = IndexedBlockHeader::new(test_hash(1), BlockHeader {
			version: 1,
			previous_header_hash: genesis_hash,
			merkle_root_hash: H256::default(),
			time: GENESIS_TIME + 150,
			bits: TEST_BITS.into(),
			nonce: 1,
		});
		// the carried transaction hash is not in the matched set
		let filtered = FilteredBlock::new(header, vec![test_hash(77)], vec![simple_tx(1).into()]);
		let _ = chain.add_filtered_block(filtered);
	}

	#[test]
	fn test_duplication_across_multiple_listeners() {
		let chain = spv_chain();
		let first = Arc::new(Recorder::relevant());
		let second = Arc::new(Recorder::relevant());
		chain.add_listener(first.clone());
		chain.add_listener(second.clone());

		let genesis_hash = chain.chain_head().hash().clone();
		let block = make_block(&genesis_hash, GENESIS_TIME + 150, 1, Some(vec![simple_tx(1)]));
		chain.add_block(block.clone()).unwrap();

		let tx_hash = block.transactions.as_ref().unwrap()[0].hash.clone();
		let expected = vec![
			Event::Received(tx_hash, block.hash().clone(), NewBlockType::BestChain),
			Event::NewBest(block.hash().clone()),
		];
		assert_eq!(first.events(), expected);
		assert_eq!(second.events(), expected);
	}

	#[test]
	fn test_estimate_block_time_uses_ten_minute_spacing() {
		let chain = spv_chain();
		let head_time = GENESIS_TIME as i64 * 1000;
		assert_eq!(chain.estimate_block_time(0), head_time);
		assert_eq!(chain.estimate_block_time(6), head_time + 6 * 10 * 60 * 1000);
	}

	#[derive(Default)]
	struct MockUtxo {
		log: Mutex<Vec<String>>,
		fail_disconnect: bool,
	}

	impl MockUtxo {
		fn failing_disconnect() -> Self {
			MockUtxo {
				log: Mutex::default(),
				fail_disconnect: true,
			}
		}
	}

	impl UtxoHook for MockUtxo {
		fn should_verify_transactions(&self) -> bool {
			true
		}

		fn connect_transactions(&self, height: u32, block: &IndexedBlock) -> Result<TransactionOutputChanges, Error> {
			self.log.lock().push(format!("connect {} {:?}", height, block.hash()));
			Ok(TransactionOutputChanges::default())
		}

		fn connect_stored_transactions(&self, block: &StoredBlock) -> Result<TransactionOutputChanges, Error> {
			self.log.lock().push(format!("connect stored {:?}", block.hash()));
			Ok(TransactionOutputChanges::default())
		}

		fn disconnect_transactions(&self, block: &StoredBlock) -> Result<(), Error> {
			if self.fail_disconnect {
				return Err(Error::Pruned(block.hash().clone()));
			}
			self.log.lock().push(format!("disconnect {:?}", block.hash()));
			Ok(())
		}
	}

	fn full_chain(utxo: MockUtxo) -> FullBlockChain<MemoryBlockStore, MockUtxo> {
		let store = MemoryBlockStore::init(genesis_block());
		BlockChain::new_full(ConsensusParams::new(Network::Unitest), store, utxo).unwrap()
	}

	#[test]
	fn test_full_mode_rejects_header_only_block() {
		let chain = full_chain(MockUtxo::default());
		let genesis_hash = chain.chain_head().hash().clone();
		let block = make_block(&genesis_hash, GENESIS_TIME + 150, 1, None);
		assert_eq!(chain.add_block(block), Err(Error::HeaderInFullMode));
	}

	#[test]
	fn test_full_mode_connects_transactions_on_extension() {
		let chain = full_chain(MockUtxo::default());
		let genesis_hash = chain.chain_head().hash().clone();

		let block = make_block(&genesis_hash, GENESIS_TIME + 150, 1, Some(vec![simple_tx(1)]));
		assert_eq!(chain.add_block(block.clone()).unwrap(), true);
		assert_eq!(chain.best_chain_height(), 1);
		assert_eq!(*chain.utxo.log.lock(), vec![format!("connect 1 {:?}", block.hash())]);
	}

	#[test]
	fn test_full_mode_rejects_early_timestamp() {
		let chain = full_chain(MockUtxo::default());
		let genesis_hash = chain.chain_head().hash().clone();
		chain.add_block(make_block(&genesis_hash, GENESIS_TIME + 150, 1, Some(vec![simple_tx(1)]))).unwrap();

		// not strictly above the median of the recent blocks
		let late = make_block(chain.chain_head().hash(), GENESIS_TIME, 2, Some(vec![simple_tx(2)]));
		assert_eq!(chain.add_block(late), Err(Error::Timestamp));
	}

	#[test]
	fn test_full_mode_rejects_non_final_transaction() {
		let chain = full_chain(MockUtxo::default());
		let genesis_hash = chain.chain_head().hash().clone();

		let mut tx = simple_tx(1);
		tx.lock_time = 100;
		let block = make_block(&genesis_hash, GENESIS_TIME + 150, 1, Some(vec![tx]));
		assert_eq!(chain.add_block(block), Err(Error::NonFinalTransaction));
	}

	#[test]
	fn test_full_mode_reorg_disconnects_and_reconnects() {
		let chain = full_chain(MockUtxo::default());
		let genesis_hash = chain.chain_head().hash().clone();

		let a = make_block(&genesis_hash, GENESIS_TIME + 150, 1, Some(vec![simple_tx(1)]));
		chain.add_block(a.clone()).unwrap();

		let side_a = make_block(&genesis_hash, GENESIS_TIME + 160, 2, Some(vec![simple_tx(2)]));
		chain.add_block(side_a.clone()).unwrap();
		assert_eq!(chain.chain_head().hash(), a.hash());

		chain.utxo.log.lock().clear();
		let side_b = make_block(side_a.hash(), GENESIS_TIME + 320, 3, Some(vec![simple_tx(3)]));
		chain.add_block(side_b.clone()).unwrap();

		assert_eq!(chain.chain_head().hash(), side_b.hash());
		assert_eq!(*chain.utxo.log.lock(), vec![
			format!("disconnect {:?}", a.hash()),
			format!("connect stored {:?}", side_a.hash()),
			format!("connect 2 {:?}", side_b.hash()),
		]);
	}

	#[test]
	fn test_pruned_reorg_fails_without_moving_head() {
		let chain = full_chain(MockUtxo::failing_disconnect());
		let genesis_hash = chain.chain_head().hash().clone();

		let a = make_block(&genesis_hash, GENESIS_TIME + 150, 1, Some(vec![simple_tx(1)]));
		chain.add_block(a.clone()).unwrap();

		let side_a = make_block(&genesis_hash, GENESIS_TIME + 160, 2, Some(vec![simple_tx(2)]));
		chain.add_block(side_a.clone()).unwrap();

		let side_b = make_block(side_a.hash(), GENESIS_TIME + 320, 3, Some(vec![simple_tx(3)]));
		assert_eq!(chain.add_block(side_b), Err(Error::Pruned(a.hash().clone())));
		assert_eq!(chain.chain_head().hash(), a.hash());
	}
}
