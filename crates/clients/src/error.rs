use ethers::types::Address;
use thiserror::Error;

/// Errors returned by the service clients
#[derive(Debug, Error)]
pub enum ClientError {
    /// JSON-RPC transport or method error
    #[error(transparent)]
    Rpc(#[from] jsonrpsee::core::ClientError),

    /// REST request could not be sent or its body read
    #[error(transparent)]
    Request(#[from] reqwest::Error),

    /// REST endpoint answered with a non-success status
    #[error("http {status}: {body}")]
    Http {
        /// Status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Response body is not what the endpoint documents
    #[error(transparent)]
    Decode(#[from] serde_json::Error),

    /// Polling gave up
    #[error("timed out after {secs}s waiting for {what}")]
    Timeout {
        /// What was waited for
        what: String,
        /// Seconds waited
        secs: u64,
    },

    /// The order bundle has no segments
    #[error("order bundle of {sponsor:?} has no segments")]
    EmptyBundle {
        /// Sponsor of the bundle
        sponsor: Address,
    },

    /// The orchestrator returned no order path for the intent
    #[error("no order path for account {account:?}")]
    NoOrderPath {
        /// Account the intent was requested for
        account: Address,
    },
}
