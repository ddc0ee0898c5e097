//! End-to-end smart account workflows
//!
//! [SmartAccountClient] prepares, signs and sends user operations for a Safe7579 account. Every
//! other module is one workflow built on top of it: install a module, use it to authorize an
//! operation (or hand the account to an external service) and return what the services report.

mod account;
pub mod auto_savings;
pub mod automation;
pub mod deadman_switch;
pub mod funding;
pub mod intent;
pub mod scheduled_orders;
pub mod scheduled_transfers;
pub mod smart_sessions;
pub mod social_recovery;
mod utils;
pub mod webauthn;

pub use account::{Endpoints, HttpSmartAccountClient, SmartAccountClient, CALL_GAS_BUFFER};
pub use automation::AutomationsConfig;
pub use utils::{named_chain, unix_millis, unix_seconds};
