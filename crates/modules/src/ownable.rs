//! Ownable validator: k-of-n ECDSA owners

use crate::{module::Module, ModuleError};
use ethers::{
    abi::{encode, AbiEncode, Token},
    types::{Address, Bytes, U256},
};
use modulor_contracts::ownable_validator_api::SetThresholdCall;
use modulor_primitives::Execution;

/// Well formed ECDSA signature used for gas estimation before the owners sign
pub const MOCK_SIGNATURE: [u8; 65] = [
    0xe8, 0xb9, 0x47, 0x48, 0x58, 0x0c, 0xa0, 0xb4, 0x99, 0x3c, 0x9a, 0x1b, 0x86, 0xb5, 0xbe, 0x85,
    0x1b, 0xfc, 0x07, 0x6f, 0xf5, 0xce, 0x3a, 0x1f, 0xf6, 0x5b, 0xf1, 0x63, 0x92, 0xac, 0xfc, 0xb8,
    0x00, 0xf9, 0xb4, 0xf1, 0xae, 0xf1, 0x55, 0x5c, 0x7f, 0xce, 0x55, 0x99, 0xff, 0xfb, 0x17, 0xe7,
    0xc6, 0x35, 0x50, 0x21, 0x54, 0xa0, 0x33, 0x3b, 0xa2, 0x1f, 0x3a, 0xe4, 0x91, 0x83, 0x9a, 0xf5,
    0x1c,
];

/// Sorts the signers and checks the threshold against them
pub(crate) fn sorted_signers(
    signers: &[Address],
    threshold: u64,
) -> Result<Vec<Address>, ModuleError> {
    if threshold == 0 || threshold as usize > signers.len() {
        return Err(ModuleError::InvalidThreshold { threshold, signers: signers.len() });
    }

    let mut sorted = signers.to_vec();
    sorted.sort();
    if let Some(pair) = sorted.windows(2).find(|pair| pair[0] == pair[1]) {
        return Err(ModuleError::DuplicateSigner(pair[0]));
    }

    Ok(sorted)
}

/// `abi.encode(uint256 threshold, address[] owners)` with the owners sorted ascending
pub fn encode_validation_data(owners: &[Address], threshold: u64) -> Result<Bytes, ModuleError> {
    let owners = sorted_signers(owners, threshold)?;
    Ok(encode(&[
        Token::Uint(U256::from(threshold)),
        Token::Array(owners.into_iter().map(Token::Address).collect()),
    ])
    .into())
}

pub fn ownable_validator(
    address: Address,
    owners: &[Address],
    threshold: u64,
) -> Result<Module, ModuleError> {
    Ok(Module::validator(address, encode_validation_data(owners, threshold)?))
}

/// One mock signature per required owner
pub fn ownable_mock_signature(threshold: u64) -> Bytes {
    MOCK_SIGNATURE.repeat(threshold as usize).into()
}

/// Changes the number of owner signatures the validator requires
pub fn set_threshold_action(validator: Address, threshold: u64) -> Execution {
    Execution::call(validator, SetThresholdCall { threshold: U256::from(threshold) }.encode())
}
