//! Transaction type for account abstraction (ERC-4337), entry point v0.7

mod hash;
mod packed;
mod rpc;

use crate::utils::{
    as_checksum_addr, as_checksum_addr_opt, pack_factory_data, pack_paymaster_data, pack_uint128,
};
use ethers::types::{Address, Bytes, H256, U256};
pub use hash::UserOperationHash;
pub use packed::PackedUserOperation;
pub use rpc::{
    GasPrice, GasPriceTiers, UserOperationByHash, UserOperationGasEstimation,
    UserOperationReceipt,
};
use serde::{Deserialize, Serialize};

/// User operation in the shape the bundler and paymaster JSON-RPC APIs expect
///
/// Factory and paymaster fields are optional and omitted from the JSON when absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperation {
    /// Sender of the user operation
    #[serde(serialize_with = "as_checksum_addr")]
    pub sender: Address,

    /// Nonce (anti replay protection), the upper 192 bits select the validator
    pub nonce: U256,

    /// Factory deploying the account (only if the account is not deployed yet)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "as_checksum_addr_opt"
    )]
    pub factory: Option<Address>,

    /// Calldata for the factory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factory_data: Option<Bytes>,

    /// The data that is passed to the sender during the main execution call
    pub call_data: Bytes,

    /// The amount of gas to allocate for the main execution call
    pub call_gas_limit: U256,

    /// The amount of gas to allocate for the verification step
    pub verification_gas_limit: U256,

    /// The amount of gas to pay bundler to compensate for the pre-verification execution and
    /// calldata
    pub pre_verification_gas: U256,

    /// Maximum fee per gas (similar to EIP-1559)
    pub max_fee_per_gas: U256,

    /// Maximum priority fee per gas (similar to EIP-1559)
    pub max_priority_fee_per_gas: U256,

    /// Paymaster sponsoring the user operation
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "as_checksum_addr_opt"
    )]
    pub paymaster: Option<Address>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_verification_gas_limit: Option<U256>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_post_op_gas_limit: Option<U256>,

    /// Extra data sent to the paymaster
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_data: Option<Bytes>,

    /// Data passed to the account along with the nonce during the verification step
    pub signature: Bytes,
}

impl UserOperation {
    /// Factory address followed by factory data, empty when there is no factory
    pub fn init_code(&self) -> Bytes {
        match self.factory {
            Some(factory) => {
                pack_factory_data(factory, self.factory_data.clone().unwrap_or_default()).into()
            }
            None => Bytes::default(),
        }
    }

    /// Paymaster address, gas limits and paymaster data, empty when there is no paymaster
    pub fn paymaster_and_data(&self) -> Bytes {
        match self.paymaster {
            Some(paymaster) => pack_paymaster_data(
                paymaster,
                self.paymaster_verification_gas_limit.unwrap_or_default(),
                self.paymaster_post_op_gas_limit.unwrap_or_default(),
                &self.paymaster_data.clone().unwrap_or_default(),
            )
            .into(),
            None => Bytes::default(),
        }
    }

    /// Packs the user operation into its on-chain representation
    pub fn pack(&self) -> PackedUserOperation {
        PackedUserOperation {
            sender: self.sender,
            nonce: self.nonce,
            init_code: self.init_code(),
            call_data: self.call_data.clone(),
            account_gas_limits: H256(pack_uint128(
                self.verification_gas_limit,
                self.call_gas_limit,
            )),
            pre_verification_gas: self.pre_verification_gas,
            gas_fees: H256(pack_uint128(self.max_priority_fee_per_gas, self.max_fee_per_gas)),
            paymaster_and_data: self.paymaster_and_data(),
            signature: self.signature.clone(),
        }
    }

    /// Calculates the hash of the user operation
    ///
    /// # Arguments
    /// * `entry_point` - The entry point contract address
    /// * `chain_id` - The chain id of the network the user operation is sent to
    ///
    /// # Returns
    /// * `UserOperationHash` - The hash the account validators sign
    pub fn hash(&self, entry_point: &Address, chain_id: u64) -> UserOperationHash {
        self.pack().hash(entry_point, chain_id).into()
    }

    // Builder pattern helpers

    /// Sets the sender of the user operation
    pub fn sender(mut self, sender: Address) -> Self {
        self.sender = sender;
        self
    }

    /// Sets the nonce of the user operation
    pub fn nonce(mut self, nonce: U256) -> Self {
        self.nonce = nonce;
        self
    }

    /// Sets the factory and the factory data of the user operation
    pub fn factory(mut self, factory: Address, factory_data: Bytes) -> Self {
        self.factory = Some(factory);
        self.factory_data = Some(factory_data);
        self
    }

    /// Removes the factory (the account is already deployed)
    pub fn without_factory(mut self) -> Self {
        self.factory = None;
        self.factory_data = None;
        self
    }

    /// Sets the call data of the user operation
    pub fn call_data(mut self, call_data: Bytes) -> Self {
        self.call_data = call_data;
        self
    }

    /// Sets the call gas limit of the user operation
    pub fn call_gas_limit(mut self, call_gas_limit: U256) -> Self {
        self.call_gas_limit = call_gas_limit;
        self
    }

    /// Sets the verification gas limit of the user operation
    pub fn verification_gas_limit(mut self, verification_gas_limit: U256) -> Self {
        self.verification_gas_limit = verification_gas_limit;
        self
    }

    /// Sets the pre-verification gas of the user operation
    pub fn pre_verification_gas(mut self, pre_verification_gas: U256) -> Self {
        self.pre_verification_gas = pre_verification_gas;
        self
    }

    /// Sets the max fee per gas of the user operation
    pub fn max_fee_per_gas(mut self, max_fee_per_gas: U256) -> Self {
        self.max_fee_per_gas = max_fee_per_gas;
        self
    }

    /// Sets the max priority fee per gas of the user operation
    pub fn max_priority_fee_per_gas(mut self, max_priority_fee_per_gas: U256) -> Self {
        self.max_priority_fee_per_gas = max_priority_fee_per_gas;
        self
    }

    /// Sets the paymaster, its gas limits and the paymaster data
    pub fn paymaster(
        mut self,
        paymaster: Address,
        verification_gas_limit: U256,
        post_op_gas_limit: U256,
        paymaster_data: Bytes,
    ) -> Self {
        self.paymaster = Some(paymaster);
        self.paymaster_verification_gas_limit = Some(verification_gas_limit);
        self.paymaster_post_op_gas_limit = Some(post_op_gas_limit);
        self.paymaster_data = Some(paymaster_data);
        self
    }

    /// Sets the paymaster verification gas limit of the user operation
    pub fn paymaster_verification_gas_limit(mut self, gas: U256) -> Self {
        self.paymaster_verification_gas_limit = Some(gas);
        self
    }

    /// Sets the paymaster post-op gas limit of the user operation
    pub fn paymaster_post_op_gas_limit(mut self, gas: U256) -> Self {
        self.paymaster_post_op_gas_limit = Some(gas);
        self
    }

    /// Sets the paymaster data of the user operation
    pub fn paymaster_data(mut self, paymaster_data: Bytes) -> Self {
        self.paymaster_data = Some(paymaster_data);
        self
    }

    /// Sets the signature of the user operation
    pub fn signature(mut self, signature: Bytes) -> Self {
        self.signature = signature;
        self
    }
}
