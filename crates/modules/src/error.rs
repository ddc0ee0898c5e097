use ethers::types::Address;
use thiserror::Error;

/// Errors raised while building module data
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModuleError {
    /// No call to execute
    #[error("at least one execution is required")]
    NoExecutions,

    /// Threshold is zero or larger than the number of signers
    #[error("invalid threshold {threshold} for {signers} signers")]
    InvalidThreshold {
        /// The requested threshold
        threshold: u64,
        /// Number of owners or guardians
        signers: usize,
    },

    /// The same signer is listed twice
    #[error("duplicate signer {0:?}")]
    DuplicateSigner(Address),

    /// Malformed DER encoded signature
    #[error("invalid DER signature: {0}")]
    InvalidDerSignature(String),

    /// The client data JSON does not contain the response type
    #[error("client data JSON does not contain the webauthn.get type")]
    MissingResponseType,

    /// A value does not fit in the type it is encoded as
    #[error("{field} does not fit in {bits} bits")]
    Overflow {
        /// Name of the field
        field: &'static str,
        /// Width of the encoded type
        bits: usize,
    },

    /// A compressed payload ends early or copies from before its start
    #[error("malformed compressed data at byte {0}")]
    MalformedCompression(usize),

    /// The session has no digest for the chain it is enabled on
    #[error("no session digest for chain {0}")]
    MissingChainDigest(u64),

    /// Smart sessions signature mode that does not carry the expected data
    #[error("{0} mode cannot encode this signature")]
    UnsupportedSessionMode(String),
}
