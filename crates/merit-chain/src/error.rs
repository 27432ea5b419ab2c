use thiserror::Error;

pub type ChainResult<T> = Result<T, ChainError>;

/// Errors that can occur while reading chain state
#[derive(Error, Debug)]
pub enum ChainError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Response decode error: {0}")]
    Decode(String),

    #[error("Indexer error: {0}")]
    Indexer(String),

    #[error("All holdings sources failed: live: {primary}; indexer: {secondary}")]
    SourcesExhausted { primary: String, secondary: String },
}

impl ChainError {
    /// Whether a retry with identical arguments can plausibly succeed.
    /// RPC-level errors and decode failures will reproduce; transport and
    /// indexer failures may not.
    pub fn is_transient(&self) -> bool {
        matches!(self, ChainError::Transport(_) | ChainError::Indexer(_))
    }
}
