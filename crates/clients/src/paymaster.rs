//! ERC-7677 paymaster web service client

use crate::ClientError;
use ethers::types::{Address, Bytes, U256};
use jsonrpsee::{
    core::RpcResult,
    http_client::{HttpClient, HttpClientBuilder},
    proc_macros::rpc,
};
use modulor_primitives::UserOperation;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Who sponsors the user operation
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sponsor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Paymaster fields used during gas estimation
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymasterStubData {
    pub paymaster: Address,
    pub paymaster_data: Bytes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_verification_gas_limit: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_post_op_gas_limit: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsor: Option<Sponsor>,
    /// The stub is already the final paymaster data
    #[serde(default)]
    pub is_final: bool,
}

/// Final paymaster fields
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymasterData {
    pub paymaster: Address,
    pub paymaster_data: Bytes,
}

/// The ERC-7677 `pm` namespace RPC methods trait
#[rpc(client, server, namespace = "pm")]
pub trait PaymasterApi {
    #[method(name = "getPaymasterStubData")]
    async fn get_paymaster_stub_data(
        &self,
        user_operation: UserOperation,
        entry_point: Address,
        chain_id: String,
        paymaster_context: Value,
    ) -> RpcResult<PaymasterStubData>;

    #[method(name = "getPaymasterData")]
    async fn get_paymaster_data(
        &self,
        user_operation: UserOperation,
        entry_point: Address,
        chain_id: String,
        paymaster_context: Value,
    ) -> RpcResult<PaymasterData>;
}

#[derive(Clone, Debug)]
pub struct PaymasterClient {
    client: HttpClient,
    pub url: String,
    /// Sponsorship context passed with every request
    pub context: Value,
}

impl PaymasterClient {
    pub fn new(url: &str) -> Result<Self, ClientError> {
        let client = HttpClientBuilder::default().build(url)?;
        Ok(Self { client, url: url.into(), context: Value::Object(Default::default()) })
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = context;
        self
    }

    pub async fn get_paymaster_stub_data(
        &self,
        user_operation: &UserOperation,
        entry_point: Address,
        chain_id: u64,
    ) -> Result<PaymasterStubData, ClientError> {
        let stub = PaymasterApiClient::get_paymaster_stub_data(
            &self.client,
            user_operation.clone(),
            entry_point,
            format!("{chain_id:#x}"),
            self.context.clone(),
        )
        .await?;
        debug!("Paymaster stub data: {stub:?}");
        Ok(stub)
    }

    pub async fn get_paymaster_data(
        &self,
        user_operation: &UserOperation,
        entry_point: Address,
        chain_id: u64,
    ) -> Result<PaymasterData, ClientError> {
        let data = PaymasterApiClient::get_paymaster_data(
            &self.client,
            user_operation.clone(),
            entry_point,
            format!("{chain_id:#x}"),
            self.context.clone(),
        )
        .await?;
        debug!("Paymaster data: {data:?}");
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_data_defaults() {
        let stub: PaymasterStubData = serde_json::from_str(
            r#"{"paymaster": "0x0000000000000039cd5e8aE05257CE51C473ddd1", "paymasterData": "0x"}"#,
        )
        .unwrap();
        assert!(!stub.is_final);
        assert_eq!(stub.paymaster_verification_gas_limit, None);
        assert!(stub.paymaster_data.is_empty());
    }

    #[test]
    fn stub_data_with_sponsor() {
        let stub: PaymasterStubData = serde_json::from_str(
            r#"{
                "paymaster": "0x0000000000000039cd5e8aE05257CE51C473ddd1",
                "paymasterData": "0xdeadbeef",
                "paymasterVerificationGasLimit": "0x186a0",
                "paymasterPostOpGasLimit": "0xc350",
                "sponsor": {"name": "Mock"},
                "isFinal": true
            }"#,
        )
        .unwrap();
        assert!(stub.is_final);
        assert_eq!(stub.paymaster_verification_gas_limit, Some(U256::from(100_000)));
        assert_eq!(stub.sponsor.map(|s| s.name), Some("Mock".into()));
    }
}
