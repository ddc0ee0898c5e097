//! ERC-7579 module encodings for Safe7579 accounts
//!
//! Every function here is pure: it turns module configuration into the bytes the account,
//! the modules and the entry point expect. Nothing talks to a node.

pub mod account;
pub mod auto_savings;
pub mod deadman_switch;
pub mod erc1271;
mod error;
pub mod execution;
pub mod intent;
pub mod module;
pub mod ownable;
pub mod registry;
pub mod scheduled;
pub mod smart_sessions;
pub mod social_recovery;
pub mod webauthn;
pub mod zip;

pub use account::Safe7579Account;
pub use error::ModuleError;
pub use execution::{encode_execute, validator_nonce_key};
pub use module::{
    install_module_action, install_module_call, is_module_installed_call, uninstall_module_action,
    uninstall_module_call, CallType, HookType, Module, ModuleType, SENTINEL,
};
