//! Error types for oracle-backed mode operations

use thiserror::Error;

/// Every variant is terminal for the top-level operation that produced it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModeError {
    #[error("Malformed hex input: {0}")]
    MalformedHexInput(String),

    #[error("Oracle invocation failed: {0}")]
    OracleInvocationFailed(String),

    #[error("Insufficient data for mode: need at least 2 blocks, got {blocks}")]
    InsufficientDataForMode { blocks: usize },

    #[error("Invalid custom value: expected 32 hex characters, got {len}")]
    InvalidCustomValue { len: usize },

    #[error("Invalid block size (must be > 0)")]
    InvalidBlockSize,

    #[error("Port range exhausted: no port for round {index} from starting port {start}")]
    PortRangeExhausted { start: u16, index: usize },
}

pub type Result<T> = std::result::Result<T, ModeError>;

impl From<hex::FromHexError> for ModeError {
    fn from(err: hex::FromHexError) -> Self {
        ModeError::MalformedHexInput(err.to_string())
    }
}
