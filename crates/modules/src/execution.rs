//! ERC-7579 `execute` encoding and validator nonce keys

use crate::{module::CallType, ModuleError};
use ethers::{
    abi::{encode, AbiEncode, Token, Tokenizable},
    types::{Address, Bytes, U256},
};
use modulor_contracts::account_api::ExecuteCall;
use modulor_primitives::Execution;

/// Execution mode word: call type in the first byte, default exec type, no selector or payload
pub fn execution_mode(call_type: CallType) -> [u8; 32] {
    let mut mode = [0u8; 32];
    mode[0] = call_type as u8;
    mode
}

/// Execution calldata for the given mode
///
/// A single call is packed as `target ‖ value ‖ data`, a batch is `abi.encode(Execution[])`.
pub fn encode_execution_calldata(executions: &[Execution]) -> Result<(CallType, Bytes), ModuleError> {
    match executions {
        [] => Err(ModuleError::NoExecutions),
        [execution] => {
            let mut value = [0u8; 32];
            execution.value.to_big_endian(&mut value);
            let packed =
                [execution.to.as_bytes(), &value[..], execution.data.as_ref()].concat();
            Ok((CallType::Call, packed.into()))
        }
        executions => {
            let batch = Token::Array(executions.iter().cloned().map(Tokenizable::into_token).collect());
            Ok((CallType::Batch, encode(&[batch]).into()))
        }
    }
}

/// `execute(bytes32,bytes)` call data for one or more calls
pub fn encode_execute(executions: &[Execution]) -> Result<Bytes, ModuleError> {
    let (call_type, execution_calldata) = encode_execution_calldata(executions)?;
    Ok(ExecuteCall { mode: execution_mode(call_type), execution_calldata }.encode().into())
}

/// Nonce key routing validation to the validator (`validator ‖ bytes4(0)` as a uint192)
pub fn validator_nonce_key(validator: Address) -> U256 {
    let mut key = [0u8; 24];
    key[..20].copy_from_slice(validator.as_bytes());
    U256::from_big_endian(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn transfer() -> Execution {
        Execution::new(
            "0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238".parse().unwrap(),
            U256::from(5),
            "0xa9059cbb".parse().unwrap(),
        )
    }

    #[test]
    fn single_execution_is_packed() {
        let (call_type, calldata) = encode_execution_calldata(&[transfer()]).unwrap();
        assert_eq!(call_type, CallType::Call);
        assert_eq!(calldata.len(), 20 + 32 + 4);
        assert_eq!(calldata[51], 5);
        assert_eq!(&calldata[52..], &[0xa9, 0x05, 0x9c, 0xbb]);

        let call = encode_execute(&[transfer()]).unwrap();
        assert_eq!(&call[..4], &[0xe9, 0xae, 0x5c, 0x53]);
        assert_eq!(&call[4..36], &[0u8; 32]);
    }

    #[test]
    fn batch_execution_is_abi_encoded() {
        let (call_type, calldata) =
            encode_execution_calldata(&[transfer(), transfer()]).unwrap();
        assert_eq!(call_type, CallType::Batch);
        // offset of the array, then its length
        assert_eq!(calldata[31], 0x20);
        assert_eq!(calldata[63], 2);

        let call = encode_execute(&[transfer(), transfer()]).unwrap();
        assert_eq!(call[4], 0x01);
        assert_eq!(&call[5..36], &[0u8; 31]);
    }

    #[test]
    fn empty_execution_fails() {
        assert_eq!(encode_execute(&[]), Err(ModuleError::NoExecutions));
    }

    #[test]
    fn nonce_key() {
        let validator: Address = "0x2483DA3A338895199E5e538530213157e931Bf06".parse().unwrap();
        let key = validator_nonce_key(validator);
        assert_eq!(
            key,
            U256::from_str_radix("2483DA3A338895199E5e538530213157e931Bf0600000000", 16).unwrap()
        );
        let mut word = [0u8; 32];
        key.to_big_endian(&mut word);
        assert_eq!(&word[..8], &[0u8; 8]);
        assert_eq!(&word[8..28], validator.as_bytes());
        assert_eq!(&word[28..], &[0u8; 4]);

        // the entry point places the key in the upper 192 bits of the nonce
        (key << 64).to_big_endian(&mut word);
        assert_eq!(&word[..20], validator.as_bytes());
    }
}
