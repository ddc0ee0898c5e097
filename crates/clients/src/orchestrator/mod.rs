//! Orchestrator REST client: plans, accepts and settles intent bundles

mod hash;
mod types;

pub use hash::{
    compact_domain_separator, multichain_compact_type, order_bundle_domain_separator,
    order_bundle_hash, order_bundle_struct_hash,
};
pub use types::{
    BundleResult, BundleStatus, BundleSubmission, Exec, IntentCost, MetaIntent, OrderBundle,
    OrderPath, Quantity, Segment, SignedOrderBundle, TokenReceived, TokenSpent, TokenTransfer,
    Witness,
};

use crate::{ClientError, API_KEY_HEADER};
use ethers::types::Address;
use modulor_primitives::constants::orchestrator::{STATUS_POLL_INTERVAL, URL};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};
use types::{IntentCostResponse, OrderPathResponse, PostBundlesRequest, PostBundlesResponse};

#[derive(Clone, Debug)]
pub struct OrchestratorClient {
    http: Client,
    url: String,
    api_key: String,
    /// Interval between two bundle status checks
    pub poll_interval: Duration,
}

impl OrchestratorClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_url(URL, api_key)
    }

    pub fn with_url(url: &str, api_key: &str) -> Self {
        Self {
            http: Client::new(),
            url: url.trim_end_matches('/').into(),
            api_key: api_key.into(),
            poll_interval: Duration::from_millis(STATUS_POLL_INTERVAL),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.header(API_KEY_HEADER, &self.api_key).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!("Orchestrator response ({status}): {body}");

        if !status.is_success() {
            return Err(ClientError::Http { status: status.as_u16(), body });
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Order paths able to fulfil `intent` for `account`, cheapest first
    pub async fn get_order_path(
        &self,
        account: Address,
        intent: &MetaIntent,
    ) -> Result<Vec<OrderPath>, ClientError> {
        let request =
            self.http.post(format!("{}/accounts/{account:?}/bundles/path", self.url)).json(intent);
        let response: OrderPathResponse = self.send(request).await?;
        info!("Orchestrator planned {} order path(s) for {account:?}", response.order_bundles.len());
        Ok(response.order_bundles)
    }

    /// Fee quote of `intent` for `account`, without planning a bundle
    pub async fn get_intent_cost(
        &self,
        account: Address,
        intent: &MetaIntent,
    ) -> Result<IntentCost, ClientError> {
        let request =
            self.http.post(format!("{}/accounts/{account:?}/bundles/cost", self.url)).json(intent);
        let response: IntentCostResponse = self.send(request).await?;
        debug!("Intent cost for {account:?}: {:?}", response.intent_cost);
        Ok(response.intent_cost)
    }

    pub async fn post_signed_order_bundles(
        &self,
        bundles: &[BundleSubmission],
    ) -> Result<Vec<BundleResult>, ClientError> {
        let request =
            self.http.post(format!("{}/bundles", self.url)).json(&PostBundlesRequest { bundles });
        let response: PostBundlesResponse = self.send(request).await?;
        for result in response.bundle_results.iter() {
            info!("Bundle {} posted ({})", result.bundle_id, result.status);
        }
        Ok(response.bundle_results)
    }

    pub async fn get_bundle_status(&self, bundle_id: Quantity) -> Result<BundleResult, ClientError> {
        self.send(self.http.get(format!("{}/bundles/{bundle_id}", self.url))).await
    }

    /// Polls the bundle while it is pending
    pub async fn wait_for_bundle(&self, bundle_id: Quantity) -> Result<BundleResult, ClientError> {
        let mut result = self.get_bundle_status(bundle_id).await?;
        while result.status == BundleStatus::Pending {
            sleep(self.poll_interval).await;
            result = self.get_bundle_status(bundle_id).await?;
            debug!("Bundle {bundle_id} status: {}", result.status);
        }

        info!("Bundle {bundle_id} settled with status {}", result.status);
        Ok(result)
    }
}
