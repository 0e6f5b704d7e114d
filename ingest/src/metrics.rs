//! Prometheus metrics for the ingestion pipeline.
//!
//! The [`IngestMetrics`] struct owns a dedicated [`Registry`] so embedders
//! can encode it into the Prometheus text exposition format.

use prometheus::{
    register_histogram_with_registry, register_int_counter_with_registry,
    register_int_gauge_with_registry, Histogram, HistogramOpts, IntCounter, IntGauge, Opts,
    Registry,
};

/// Central collection of all pipeline-level Prometheus metrics.
pub struct IngestMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Total blocks fully applied and checkpointed.
    pub blocks_ingested: IntCounter,
    /// Total transactions applied to the ledger.
    pub transactions_applied: IntCounter,
    /// Total transactions skipped as already journaled.
    pub duplicates_skipped: IntCounter,

    // ── Gauges ──────────────────────────────────────────────────────────
    /// Last checkpointed block height.
    pub checkpoint_height: IntGauge,
    /// Number of tracked ledger accounts.
    pub account_count: IntGauge,

    // ── Histograms ──────────────────────────────────────────────────────
    /// Wall-clock time spent applying one block, in milliseconds.
    pub block_process_time_ms: Histogram,
}

impl IngestMetrics {
    /// Create a fresh set of metrics, all registered under a new
    /// [`Registry`].
    pub fn new() -> Self {
        let registry = Registry::new();

        let blocks_ingested = register_int_counter_with_registry!(
            Opts::new("tally_blocks_ingested_total", "Total blocks ingested"),
            registry
        )
        .expect("failed to register blocks_ingested counter");

        let transactions_applied = register_int_counter_with_registry!(
            Opts::new(
                "tally_transactions_applied_total",
                "Total transactions applied to the ledger"
            ),
            registry
        )
        .expect("failed to register transactions_applied counter");

        let duplicates_skipped = register_int_counter_with_registry!(
            Opts::new(
                "tally_duplicates_skipped_total",
                "Total transactions skipped as already journaled"
            ),
            registry
        )
        .expect("failed to register duplicates_skipped counter");

        let checkpoint_height = register_int_gauge_with_registry!(
            Opts::new("tally_checkpoint_height", "Last checkpointed block height"),
            registry
        )
        .expect("failed to register checkpoint_height gauge");

        let account_count = register_int_gauge_with_registry!(
            Opts::new("tally_account_count", "Number of tracked ledger accounts"),
            registry
        )
        .expect("failed to register account_count gauge");

        let block_process_time_ms = register_histogram_with_registry!(
            HistogramOpts::new(
                "tally_block_process_time_ms",
                "Block application time in milliseconds"
            )
            .buckets(prometheus::exponential_buckets(1.0, 2.0, 14).unwrap()),
            registry
        )
        .expect("failed to register block_process_time_ms histogram");

        Self {
            registry,
            blocks_ingested,
            transactions_applied,
            duplicates_skipped,
            checkpoint_height,
            account_count,
            block_process_time_ms,
        }
    }
}

impl Default for IngestMetrics {
    fn default() -> Self {
        Self::new()
    }
}
