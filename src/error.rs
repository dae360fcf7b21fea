//! Error types for the cracmd client

use ethers::types::H256;
use thiserror::Error;

/// Main error type for the client
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Broadcast rejected by node: {0}")]
    Broadcast(String),

    #[error("Transaction {tx_hash:?} reverted on-chain")]
    Reverted { tx_hash: H256 },

    #[error("Timeout waiting for {operation}")]
    Timeout { operation: String },
}

impl ClientError {
    /// Process exit code for this error kind.
    ///
    /// Each kind maps to a distinct non-zero code so callers can tell
    /// "node down" from "on-chain revert" without parsing logs.
    pub fn exit_code(&self) -> i32 {
        match self {
            ClientError::Config(_) => 2,
            ClientError::Connection(_) => 3,
            ClientError::Signing(_) => 4,
            ClientError::Broadcast(_) => 5,
            ClientError::Reverted { .. } => 6,
            ClientError::Timeout { .. } => 7,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct_and_nonzero() {
        let errors = [
            ClientError::Config("x".into()),
            ClientError::Connection("x".into()),
            ClientError::Signing("x".into()),
            ClientError::Broadcast("x".into()),
            ClientError::Reverted { tx_hash: H256::zero() },
            ClientError::Timeout { operation: "x".into() },
        ];

        let mut codes: Vec<i32> = errors.iter().map(|e| e.exit_code()).collect();
        assert!(codes.iter().all(|&c| c != 0));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }
}
