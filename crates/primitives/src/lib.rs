//! Modular smart account primitive types
//!
//! This crate contains the entry point v0.7 user operation types, packing and hashing helpers,
//! the signing wallet, chain/token tables and the deployment addresses used by the workflows.

pub mod chain;
pub mod constants;
pub mod deployments;
mod execution;
mod user_operation;
mod utils;
mod wallet;

pub use chain::token_address;
pub use deployments::Deployments;
pub use execution::Execution;
pub use user_operation::{
    GasPrice, GasPriceTiers, PackedUserOperation, UserOperation, UserOperationByHash,
    UserOperationGasEstimation, UserOperationHash, UserOperationReceipt,
};
pub use utils::{
    as_checksum_addr, get_address, pack_factory_data, pack_paymaster_data, pack_uint128,
    unpack_factory_data, unpack_paymaster_data, unpack_uint128,
};
pub use wallet::Wallet;
