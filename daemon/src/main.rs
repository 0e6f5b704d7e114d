//! Tally daemon — entry point for running the ingestion pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use tally_chain::{ChainSource, HttpChainSource};
use tally_ingest::{IngestConfig, Ingestor, ShutdownController};
use tally_store_lmdb::LmdbLedgerStore;
use tally_types::RewardSchedule;
use tally_utils::LogFormat;

#[derive(Parser)]
#[command(name = "tally-daemon", about = "Tally chain-ledger ingestion daemon")]
struct Cli {
    /// Chain identifier used as the checkpoint key.
    #[arg(long, env = "TALLY_CHAIN_ID")]
    chain_id: Option<String>,

    /// JSON-RPC endpoint of the chain data source.
    #[arg(long, env = "TALLY_RPC_URL")]
    rpc_url: Option<String>,

    /// Access credential for the chain data source.
    #[arg(long, default_value = "", env = "TALLY_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Data directory for ledger storage.
    #[arg(long, env = "TALLY_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Height the checkpoint is initialised to on first run; ingestion
    /// begins one block above it.
    #[arg(long, env = "TALLY_START_HEIGHT")]
    start_height: Option<u64>,

    /// Number of consecutive blocks fetched concurrently per batch.
    #[arg(long, env = "TALLY_BATCH_SIZE")]
    batch_size: Option<u64>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "info", env = "TALLY_LOG_LEVEL")]
    log_level: String,

    /// Log format: "human" or "json".
    #[arg(long, default_value = "human", env = "TALLY_LOG_FORMAT")]
    log_format: String,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file_config: Option<IngestConfig> = if let Some(ref config_path) = cli.config {
        match IngestConfig::from_toml_file(&config_path.display().to_string()) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                eprintln!(
                    "failed to load config file {}: {e}, using CLI defaults",
                    config_path.display()
                );
                None
            }
        }
    } else {
        None
    };

    let base = file_config.unwrap_or_default();
    let config = IngestConfig {
        chain_id: cli.chain_id.unwrap_or(base.chain_id),
        rpc_url: cli.rpc_url.unwrap_or(base.rpc_url),
        api_key: cli.api_key,
        data_dir: cli.data_dir.unwrap_or(base.data_dir),
        start_height: cli.start_height.unwrap_or(base.start_height),
        batch_size: cli.batch_size.unwrap_or(base.batch_size),
        log_level: cli.log_level,
        log_format: cli.log_format,
        ..base
    };

    tally_utils::init_logging(LogFormat::from_config(&config.log_format), &config.log_level);

    tracing::info!(
        chain = %config.chain_id,
        rpc = %config.rpc_url,
        data_dir = %config.data_dir.display(),
        batch_size = config.batch_size,
        "starting Tally daemon"
    );

    let store = Arc::new(LmdbLedgerStore::open(&config.data_dir)?);
    let chain: Arc<dyn ChainSource> =
        Arc::new(HttpChainSource::new(&config.rpc_url, &config.api_key));

    let controller = ShutdownController::new();
    let drain = controller.drain_signal();
    let mut ingestor = Ingestor::new(config, RewardSchedule::mainnet(), chain, store);

    let mut pipeline = tokio::spawn(async move { ingestor.run(drain).await });

    tokio::select! {
        // The pipeline only returns on its own when a fatal error occurs;
        // surface it and exit so the supervisor can restart us.
        result = &mut pipeline => {
            result??;
        }
        _ = controller.wait_for_signal() => {
            tracing::info!("shutdown requested — letting the in-flight block finish");
            pipeline.await??;
        }
    }

    tracing::info!("Tally daemon exited cleanly");
    Ok(())
}
