use crate::gen::EntryPointAPIErrors;
use ethers::{
    abi::AbiDecode,
    prelude::ContractError,
    providers::{JsonRpcError, Middleware, MiddlewareError, ProviderError},
    types::Bytes,
};
use regex::Regex;
use std::str::FromStr;
use thiserror::Error;

/// Errors of the contract wrappers
#[derive(Debug, Error, Clone)]
pub enum ContractsError {
    /// Contract call reverted with a reason
    #[error("execution reverted: {0}")]
    ExecutionReverted(String),

    /// There is no revert when there should be
    #[error("{function} should revert")]
    NoRevert {
        /// function
        function: String,
    },

    /// Provider error
    #[error("provider error: {inner}")]
    Provider {
        /// The inner error message
        inner: String,
    },

    /// ABI error
    #[error("abi error: {inner}")]
    ABI {
        /// The inner error message
        inner: String,
    },

    /// Data decoding error
    #[error("decode error: {inner}")]
    Decode {
        /// The inner error message
        inner: String,
    },

    /// Any other error
    #[error("other error: {inner}")]
    Other {
        /// The inner error message
        inner: String,
    },
}

impl ContractsError {
    /// Maps a contract call error, decoding entry point custom errors from revert data
    pub fn from_contract_error<M: Middleware>(
        err: ContractError<M>,
    ) -> Result<EntryPointAPIErrors, Self> {
        match err {
            ContractError::DecodingError(e) => Err(Self::Decode { inner: e.to_string() }),
            ContractError::AbiError(e) => Err(Self::ABI { inner: e.to_string() }),
            ContractError::MiddlewareError { e } => Self::from_middleware_error::<M>(e),
            ContractError::ProviderError { e } => Self::from_provider_error(&e),
            ContractError::Revert(data) => decode_revert_error(data),
            _ => Err(Self::Other { inner: err.to_string() }),
        }
    }

    pub fn from_provider_error(err: &ProviderError) -> Result<EntryPointAPIErrors, Self> {
        match err {
            ProviderError::JsonRpcClientError(err) => err
                .as_error_response()
                .map(Self::from_json_rpc_error)
                .unwrap_or(Err(Self::Provider {
                    inner: format!("unknown json-rpc client error: {err:?}"),
                })),
            ProviderError::HTTPError(err) => {
                Err(Self::Provider { inner: format!("HTTP error: {err:?}") })
            }
            _ => Err(Self::Provider { inner: format!("unknown provider error: {err:?}") }),
        }
    }

    /// Revert data of an `eth_call` is carried in the `data` field of the JSON-RPC error
    pub fn from_json_rpc_error(err: &JsonRpcError) -> Result<EntryPointAPIErrors, Self> {
        let Some(value) = err.data.as_ref() else {
            return Err(Self::Provider {
                inner: format!("json-rpc error doesn't contain data field: {err:?}"),
            });
        };

        let serde_json::Value::String(data) = value else {
            return Err(Self::Decode {
                inner: format!("json-rpc return data is not a string: {value:?}"),
            });
        };

        let re = Regex::new(r"0x[0-9a-fA-F]+").expect("Regex rules valid");
        let hex = re.find(data).ok_or_else(|| Self::Decode {
            inner: format!("hex string not found in {data:?}"),
        })?;
        let bytes = Bytes::from_str(hex.as_str()).map_err(|e| Self::Decode {
            inner: format!("string {data:?} could not be converted to bytes: {e:?}"),
        })?;

        decode_revert_error(bytes)
    }

    pub fn from_middleware_error<M: Middleware>(
        err: M::Error,
    ) -> Result<EntryPointAPIErrors, Self> {
        if let Some(err) = err.as_error_response() {
            return Self::from_json_rpc_error(err);
        }

        if let Some(err) = err.as_provider_error() {
            return Self::from_provider_error(err);
        }

        Err(Self::Provider { inner: format!("middleware error: {err:?}") })
    }
}

// `require(false, "reason")` reverts with the `Error(string)` selector which the generated
// error enum does not know about
pub fn decode_revert_string(data: &Bytes) -> Option<String> {
    if data.len() < 4 {
        return None;
    }
    let (error_sig, reason) = data.split_at(4);
    if error_sig == [0x08, 0xc3, 0x79, 0xa0] {
        <String as AbiDecode>::decode(reason).ok()
    } else {
        None
    }
}

pub fn decode_revert_error(data: Bytes) -> Result<EntryPointAPIErrors, ContractsError> {
    match EntryPointAPIErrors::decode(data.as_ref()) {
        Ok(res) => Ok(res),
        Err(e) => {
            if let Some(reason) = decode_revert_string(&data) {
                return Err(ContractsError::ExecutionReverted(reason));
            }
            Err(ContractsError::Decode {
                inner: format!("revert data can't be decoded to an entry point error: {e:?}"),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_sender_address_result() -> eyre::Result<()> {
        let data = Bytes::from_str("0x6ca7b806000000000000000000000000a9b3d1c9c1e3f8c0fbb48f0ff8a4d6e2c6dd3f55")?;
        match decode_revert_error(data)? {
            EntryPointAPIErrors::SenderAddressResult(res) => assert_eq!(
                res.sender,
                "0xa9b3d1c9c1e3f8c0fbb48f0ff8a4d6e2c6dd3f55".parse::<ethers::types::Address>()?
            ),
            other => panic!("unexpected error {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn decode_failed_op() -> eyre::Result<()> {
        let data = Bytes::from_str("0x220266b600000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000040000000000000000000000000000000000000000000000000000000000000001e41413430206f76657220766572696669636174696f6e4761734c696d69740000")?;
        match decode_revert_error(data)? {
            EntryPointAPIErrors::FailedOp(f) => assert_eq!(f.reason, "AA40 over verificationGasLimit"),
            other => panic!("unexpected error {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn decode_require_reason() -> eyre::Result<()> {
        let data = Bytes::from_str("0x08c379a00000000000000000000000000000000000000000000000000000000000000020000000000000000000000000000000000000000000000000000000000000001841413934206761732076616c756573206f766572666c6f770000000000000000")?;
        assert_eq!(decode_revert_string(&data), Some("AA94 gas values overflow".to_string()));
        assert!(matches!(
            decode_revert_error(data),
            Err(ContractsError::ExecutionReverted(reason)) if reason == "AA94 gas values overflow"
        ));
        Ok(())
    }

    #[test]
    fn json_rpc_error_with_revert_data() {
        let err = JsonRpcError {
            code: 3,
            message: "execution reverted".into(),
            data: Some(serde_json::json!(
                "Reverted 0x6ca7b806000000000000000000000000a9b3d1c9c1e3f8c0fbb48f0ff8a4d6e2c6dd3f55"
            )),
        };
        assert!(matches!(
            ContractsError::from_json_rpc_error(&err),
            Ok(EntryPointAPIErrors::SenderAddressResult(_))
        ));

        let err = JsonRpcError { code: -32000, message: "oops".into(), data: None };
        assert!(matches!(
            ContractsError::from_json_rpc_error(&err),
            Err(ContractsError::Provider { .. })
        ));
    }
}
