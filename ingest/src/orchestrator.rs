//! The ingestion orchestrator.
//!
//! A single logical worker per chain: blocks are applied strictly
//! sequentially in height order, because balances are delta-chained and the
//! checkpoint must never pass a block whose effects are not durable. Only
//! the *fetch* stage is concurrent — a batch of upcoming heights is
//! requested in parallel and consumed in ascending order.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;

use tally_chain::{ChainBlock, ChainError, ChainSource};
use tally_store::{AccountStore, CheckpointStore, LedgerStore};
use tally_types::RewardSchedule;

use crate::shutdown::DrainSignal;
use crate::{BlockProcessor, IngestConfig, IngestError, IngestMetrics, ProgressTracker};

/// Lifecycle of one ingestion session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IngestState {
    /// Reading the tip and the resume checkpoint.
    Starting,
    /// Applying blocks.
    Running,
    /// Shutdown requested; the in-flight block finishes, no new block starts.
    Draining,
    /// Terminal.
    Stopped,
}

pub struct Ingestor {
    config: IngestConfig,
    chain: Arc<dyn ChainSource>,
    store: Arc<dyn LedgerStore>,
    blocks: BlockProcessor,
    metrics: Arc<IngestMetrics>,
    state: IngestState,
}

impl Ingestor {
    pub fn new(
        config: IngestConfig,
        schedule: RewardSchedule,
        chain: Arc<dyn ChainSource>,
        store: Arc<dyn LedgerStore>,
    ) -> Self {
        let blocks = BlockProcessor::new(Arc::clone(&store), Arc::clone(&chain), schedule);
        Self {
            config,
            chain,
            store,
            blocks,
            metrics: Arc::new(IngestMetrics::new()),
            state: IngestState::Starting,
        }
    }

    pub fn state(&self) -> IngestState {
        self.state
    }

    pub fn metrics(&self) -> Arc<IngestMetrics> {
        Arc::clone(&self.metrics)
    }

    fn transition(&mut self, next: IngestState) {
        tracing::debug!(from = ?self.state, to = ?next, "ingest state transition");
        self.state = next;
    }

    /// Run the ingestion loop until the drain signal is raised or a fatal
    /// error occurs.
    ///
    /// The drain signal is honoured only at block boundaries: once a block
    /// starts it always runs to completion or failure, so the checkpoint is
    /// never advanced past a partially-applied block.
    pub async fn run(&mut self, mut drain: DrainSignal) -> Result<(), IngestError> {
        self.transition(IngestState::Starting);

        let tip = self.chain.tip_height().await?;
        let mut height = self
            .store
            .resume_height(&self.config.chain_id, self.config.start_height)?;
        self.metrics.checkpoint_height.set(height as i64);
        let mut progress = ProgressTracker::new(tip);

        tracing::info!(
            chain = %self.config.chain_id,
            tip,
            resume_height = height,
            "ingestion session starting"
        );
        self.transition(IngestState::Running);

        'session: loop {
            if drain.is_raised() {
                self.transition(IngestState::Draining);
                break 'session;
            }

            // Prefetch the next batch concurrently. Results are consumed
            // strictly in ascending height order below.
            let first = height + 1;
            let batch_size = self.config.batch_size.max(1);
            let mut fetches: VecDeque<(u64, FetchHandle)> = (first..first + batch_size)
                .map(|h| {
                    let chain = Arc::clone(&self.chain);
                    (
                        h,
                        tokio::spawn(async move { chain.block_with_transactions(h).await }),
                    )
                })
                .collect();

            let mut caught_up = false;
            while let Some((fetch_height, handle)) = fetches.pop_front() {
                if drain.is_raised() {
                    self.transition(IngestState::Draining);
                    for (_, rest) in fetches.drain(..) {
                        rest.abort();
                    }
                    break 'session;
                }

                let fetched = handle
                    .await
                    .map_err(|e| IngestError::Task(e.to_string()))??;
                let Some(block) = fetched else {
                    // Past the source's tip: drop the rest of the batch and
                    // wait for the chain to grow.
                    for (_, rest) in fetches.drain(..) {
                        rest.abort();
                    }
                    caught_up = true;
                    tracing::debug!(height = fetch_height, "past chain tip, waiting");
                    break;
                };

                let started = Instant::now();
                let outcome = self.blocks.process(&block).await?;
                self.store.advance(&self.config.chain_id, block.number)?;
                height = block.number;

                progress.record_block();
                self.metrics.blocks_ingested.inc();
                self.metrics
                    .transactions_applied
                    .inc_by(outcome.transactions_applied);
                self.metrics
                    .duplicates_skipped
                    .inc_by(outcome.duplicates_skipped);
                self.metrics.checkpoint_height.set(height as i64);
                self.metrics
                    .block_process_time_ms
                    .observe(started.elapsed().as_secs_f64() * 1000.0);

                if self.config.progress_log_interval > 0
                    && progress.blocks() % self.config.progress_log_interval == 0
                {
                    self.metrics
                        .account_count
                        .set(self.store.account_count()? as i64);
                    tracing::info!(
                        height,
                        session_blocks = progress.blocks(),
                        blocks_per_sec = format!("{:.2}", progress.blocks_per_second()),
                        eta_secs = progress.eta_seconds(height),
                        "ingestion progress"
                    );
                }
            }

            if caught_up {
                let wait = Duration::from_secs(self.config.poll_interval_secs.max(1));
                tokio::select! {
                    _ = drain.raised() => {
                        self.transition(IngestState::Draining);
                        break 'session;
                    }
                    _ = tokio::time::sleep(wait) => {}
                }
            }
        }

        self.transition(IngestState::Stopped);
        tracing::info!(
            height,
            session_blocks = progress.blocks(),
            "ingestion session stopped"
        );
        Ok(())
    }
}

type FetchHandle = JoinHandle<Result<Option<ChainBlock>, ChainError>>;
