//! Social recovery validator: guardians co-sign account operations

use crate::{
    module::Module,
    ownable::{sorted_signers, MOCK_SIGNATURE},
    ModuleError,
};
use ethers::{
    abi::{encode, Token},
    types::{Address, Bytes, U256},
};

/// Validator with `abi.encode(uint256 threshold, address[] guardians)` init data, guardians sorted
pub fn social_recovery_validator(
    address: Address,
    guardians: &[Address],
    threshold: u64,
) -> Result<Module, ModuleError> {
    let guardians = sorted_signers(guardians, threshold)?;
    let init_data = encode(&[
        Token::Uint(U256::from(threshold)),
        Token::Array(guardians.into_iter().map(Token::Address).collect()),
    ]);
    Ok(Module::validator(address, init_data.into()))
}

pub fn social_recovery_mock_signature(threshold: u64) -> Bytes {
    MOCK_SIGNATURE.repeat(threshold as usize).into()
}

/// Concatenation of the guardians' 65 byte signatures, in the given order
pub fn combine_guardian_signatures(signatures: &[Bytes]) -> Bytes {
    signatures.iter().flat_map(|signature| signature.iter().copied()).collect::<Vec<u8>>().into()
}
