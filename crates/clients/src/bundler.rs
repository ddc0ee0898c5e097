//! ERC-4337 bundler JSON-RPC client

use crate::ClientError;
use ethers::types::{Address, U64};
use jsonrpsee::{
    core::RpcResult,
    http_client::{HttpClient, HttpClientBuilder},
    proc_macros::rpc,
};
use modulor_primitives::{
    constants::bundler::{RECEIPT_POLL_INTERVAL, RECEIPT_TIMEOUT},
    GasPriceTiers, UserOperation, UserOperationByHash, UserOperationGasEstimation,
    UserOperationHash, UserOperationReceipt,
};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, trace};

/// The ERC-4337 `eth` namespace RPC methods trait
#[rpc(client, server, namespace = "eth")]
pub trait BundlerApi {
    /// Retrieve the current [EIP-155](https://eips.ethereum.org/EIPS/eip-155) chain ID.
    #[method(name = "chainId")]
    async fn chain_id(&self) -> RpcResult<U64>;

    /// Get the supported entry points for [UserOperations](UserOperation).
    #[method(name = "supportedEntryPoints")]
    async fn supported_entry_points(&self) -> RpcResult<Vec<Address>>;

    /// Send a [UserOperation](UserOperation).
    #[method(name = "sendUserOperation")]
    async fn send_user_operation(
        &self,
        user_operation: UserOperation,
        entry_point: Address,
    ) -> RpcResult<UserOperationHash>;

    /// Estimate the gas limits of a user operation carrying a dummy signature.
    #[method(name = "estimateUserOperationGas")]
    async fn estimate_user_operation_gas(
        &self,
        user_operation: UserOperation,
        entry_point: Address,
    ) -> RpcResult<UserOperationGasEstimation>;

    /// Retrieve the receipt of a [UserOperation](UserOperation), `None` while it is not included.
    #[method(name = "getUserOperationReceipt")]
    async fn get_user_operation_receipt(
        &self,
        user_operation_hash: UserOperationHash,
    ) -> RpcResult<Option<UserOperationReceipt>>;

    /// Retrieve a [UserOperation](UserOperation) by its hash.
    #[method(name = "getUserOperationByHash")]
    async fn get_user_operation_by_hash(
        &self,
        user_operation_hash: UserOperationHash,
    ) -> RpcResult<Option<UserOperationByHash>>;
}

/// Gas price oracle of pimlico compatible bundlers
#[rpc(client, server, namespace = "pimlico")]
pub trait PimlicoApi {
    #[method(name = "getUserOperationGasPrice")]
    async fn get_user_operation_gas_price(&self) -> RpcResult<GasPriceTiers>;
}

/// Bundler bound to one entry point
#[derive(Clone, Debug)]
pub struct BundlerClient {
    client: HttpClient,
    pub url: String,
    pub entry_point: Address,
    /// Interval between two receipt checks
    pub poll_interval: Duration,
    /// Time to wait for a receipt
    pub timeout: Duration,
}

impl BundlerClient {
    /// Create a new bundler client
    ///
    /// # Arguments
    /// * `url` - Bundler JSON-RPC endpoint
    /// * `entry_point` - Entry point the user operations are sent to
    ///
    /// # Returns
    /// * `Self` - The client polling with the default interval and timeout
    pub fn new(url: &str, entry_point: Address) -> Result<Self, ClientError> {
        let client = HttpClientBuilder::default().build(url)?;
        Ok(Self {
            client,
            url: url.into(),
            entry_point,
            poll_interval: Duration::from_millis(RECEIPT_POLL_INTERVAL),
            timeout: Duration::from_secs(RECEIPT_TIMEOUT),
        })
    }

    pub fn with_polling(mut self, poll_interval: Duration, timeout: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.timeout = timeout;
        self
    }

    pub async fn chain_id(&self) -> Result<u64, ClientError> {
        Ok(BundlerApiClient::chain_id(&self.client).await?.as_u64())
    }

    pub async fn supported_entry_points(&self) -> Result<Vec<Address>, ClientError> {
        Ok(BundlerApiClient::supported_entry_points(&self.client).await?)
    }

    pub async fn send_user_operation(
        &self,
        user_operation: &UserOperation,
    ) -> Result<UserOperationHash, ClientError> {
        trace!("Sending user operation: {user_operation:?}");
        let hash = BundlerApiClient::send_user_operation(
            &self.client,
            user_operation.clone(),
            self.entry_point,
        )
        .await?;
        info!("User operation {hash} sent to {}", self.url);
        Ok(hash)
    }

    pub async fn estimate_user_operation_gas(
        &self,
        user_operation: &UserOperation,
    ) -> Result<UserOperationGasEstimation, ClientError> {
        let estimation = BundlerApiClient::estimate_user_operation_gas(
            &self.client,
            user_operation.clone(),
            self.entry_point,
        )
        .await?;
        debug!("Gas estimation: {estimation:?}");
        Ok(estimation)
    }

    pub async fn get_user_operation_receipt(
        &self,
        user_operation_hash: UserOperationHash,
    ) -> Result<Option<UserOperationReceipt>, ClientError> {
        Ok(BundlerApiClient::get_user_operation_receipt(&self.client, user_operation_hash).await?)
    }

    pub async fn get_user_operation_by_hash(
        &self,
        user_operation_hash: UserOperationHash,
    ) -> Result<Option<UserOperationByHash>, ClientError> {
        Ok(BundlerApiClient::get_user_operation_by_hash(&self.client, user_operation_hash).await?)
    }

    /// Slow, standard and fast fee suggestions
    pub async fn gas_price(&self) -> Result<GasPriceTiers, ClientError> {
        Ok(PimlicoApiClient::get_user_operation_gas_price(&self.client).await?)
    }

    /// Polls the receipt until the user operation is included or the timeout elapses
    pub async fn wait_for_user_operation_receipt(
        &self,
        user_operation_hash: UserOperationHash,
    ) -> Result<UserOperationReceipt, ClientError> {
        let deadline = Instant::now() + self.timeout;

        loop {
            if let Some(receipt) = self.get_user_operation_receipt(user_operation_hash).await? {
                info!(
                    "User operation {user_operation_hash} included in {:?} (success: {})",
                    receipt.tx_receipt.transaction_hash, receipt.success
                );
                return Ok(receipt);
            }

            if Instant::now() >= deadline {
                return Err(ClientError::Timeout {
                    what: format!("receipt of {user_operation_hash}"),
                    secs: self.timeout.as_secs(),
                });
            }
            sleep(self.poll_interval).await;
        }
    }
}
