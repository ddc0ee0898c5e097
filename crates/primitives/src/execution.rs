use crate::utils::as_checksum_addr;
use ethers::{
    contract::EthAbiType,
    types::{Address, Bytes, U256},
};
use serde::{Deserialize, Serialize};

/// A single call executed by the smart account
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, EthAbiType)]
pub struct Execution {
    #[serde(serialize_with = "as_checksum_addr")]
    pub to: Address,
    #[serde(default)]
    pub value: U256,
    #[serde(default)]
    pub data: Bytes,
}

impl Execution {
    pub fn new(to: Address, value: U256, data: Bytes) -> Self {
        Self { to, value, data }
    }

    /// Call without value
    pub fn call(to: Address, data: impl Into<Bytes>) -> Self {
        Self { to, value: U256::zero(), data: data.into() }
    }
}
