//! Packed user operation (the on-chain representation used by entry point v0.7)

use super::UserOperation;
use crate::utils::{unpack_factory_data, unpack_paymaster_data, unpack_uint128};
use ethers::{
    abi::AbiEncode,
    contract::{EthAbiCodec, EthAbiType},
    types::{Address, Bytes, H256, U256},
    utils::keccak256,
};
use std::ops::Deref;

/// User operation in the layout the entry point hashes and executes
#[derive(Clone, Debug, Default, PartialEq, Eq, EthAbiCodec, EthAbiType)]
pub struct PackedUserOperation {
    pub sender: Address,
    pub nonce: U256,
    /// Factory address followed by the factory calldata (empty if the account exists)
    pub init_code: Bytes,
    pub call_data: Bytes,
    /// `verificationGasLimit (uint128) ‖ callGasLimit (uint128)`
    pub account_gas_limits: H256,
    pub pre_verification_gas: U256,
    /// `maxPriorityFeePerGas (uint128) ‖ maxFeePerGas (uint128)`
    pub gas_fees: H256,
    /// Paymaster address, its two gas limits (uint128 each) and the paymaster data
    pub paymaster_and_data: Bytes,
    pub signature: Bytes,
}

/// Packed user operation without signature, dynamic fields replaced with their hashes
#[derive(EthAbiCodec, EthAbiType)]
struct PackedUserOperationNoSignature {
    pub sender: Address,
    pub nonce: U256,
    pub init_code: H256,
    pub call_data: H256,
    pub account_gas_limits: H256,
    pub pre_verification_gas: U256,
    pub gas_fees: H256,
    pub paymaster_and_data: H256,
}

impl From<&PackedUserOperation> for PackedUserOperationNoSignature {
    fn from(value: &PackedUserOperation) -> Self {
        Self {
            sender: value.sender,
            nonce: value.nonce,
            init_code: keccak256(value.init_code.deref()).into(),
            call_data: keccak256(value.call_data.deref()).into(),
            account_gas_limits: value.account_gas_limits,
            pre_verification_gas: value.pre_verification_gas,
            gas_fees: value.gas_fees,
            paymaster_and_data: keccak256(value.paymaster_and_data.deref()).into(),
        }
    }
}

impl PackedUserOperation {
    /// Encodes the user operation without signature (used for calculating the hash)
    pub fn pack_without_signature(&self) -> Bytes {
        PackedUserOperationNoSignature::from(self).encode().into()
    }

    /// Calculates the hash of the user operation
    pub fn hash(&self, entry_point: &Address, chain_id: u64) -> H256 {
        keccak256(
            [
                keccak256(self.pack_without_signature().deref()).to_vec(),
                entry_point.encode(),
                U256::from(chain_id).encode(),
            ]
            .concat(),
        )
        .into()
    }
}

impl From<PackedUserOperation> for UserOperation {
    fn from(value: PackedUserOperation) -> Self {
        let (verification_gas_limit, call_gas_limit) =
            unpack_uint128(value.account_gas_limits.as_bytes());
        let (max_priority_fee_per_gas, max_fee_per_gas) =
            unpack_uint128(value.gas_fees.as_bytes());

        let mut uo = UserOperation::default()
            .sender(value.sender)
            .nonce(value.nonce)
            .call_data(value.call_data)
            .call_gas_limit(call_gas_limit)
            .verification_gas_limit(verification_gas_limit)
            .pre_verification_gas(value.pre_verification_gas)
            .max_fee_per_gas(max_fee_per_gas)
            .max_priority_fee_per_gas(max_priority_fee_per_gas)
            .signature(value.signature);

        if !value.init_code.is_empty() {
            let (factory, factory_data) = unpack_factory_data(&value.init_code);
            uo = uo.factory(factory, factory_data);
        }

        if !value.paymaster_and_data.is_empty() {
            let (paymaster, verification_gas_limit, post_op_gas_limit, paymaster_data) =
                unpack_paymaster_data(&value.paymaster_and_data);
            uo = uo.paymaster(paymaster, verification_gas_limit, post_op_gas_limit, paymaster_data);
        }

        uo
    }
}
