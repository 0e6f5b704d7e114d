use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("store error: {0}")]
    Store(#[from] tally_store::StoreError),

    #[error("chain error: {0}")]
    Chain(#[from] tally_chain::ChainError),

    #[error("config error: {0}")]
    Config(String),

    #[error("fetch task failed: {0}")]
    Task(String),
}
