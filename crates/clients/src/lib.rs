//! Clients of the services the workflows talk to
//!
//! The bundler and paymaster speak JSON-RPC ([jsonrpsee]); the orchestrator and the automations
//! service are REST APIs authenticated with an `x-api-key` header ([reqwest]).

pub mod automations;
pub mod bundler;
mod error;
pub mod health;
pub mod orchestrator;
pub mod paymaster;

pub use automations::AutomationsClient;
pub use bundler::BundlerClient;
pub use error::ClientError;
pub use health::{ensure_bundler_ready, ensure_paymaster_ready};
pub use orchestrator::OrchestratorClient;
pub use paymaster::PaymasterClient;

/// Header carrying the API key of the REST services
pub const API_KEY_HEADER: &str = "x-api-key";
