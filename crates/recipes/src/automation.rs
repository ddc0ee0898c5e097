//! Automations service helpers shared by the scheduled workflows

use crate::SmartAccountClient;
use ethers::{
    abi::AbiEncode,
    providers::Middleware,
    types::{Address, U256},
};
use modulor_clients::automations::{
    Automation, AutomationAccount, AutomationLog, AutomationRequest, AutomationsClient,
};
use modulor_contracts::token_api::MintCall;
use modulor_primitives::{constants::automations::URL, Execution, Wallet};
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;

/// Time given to the service to run the automation before its logs are read
pub const LOGS_DELAY: Duration = Duration::from_secs(10);

/// Automations service endpoint and key
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AutomationsConfig {
    pub url: String,
    pub api_key: String,
}

impl AutomationsConfig {
    pub fn new(api_key: &str) -> Self {
        Self { url: URL.into(), api_key: api_key.into() }
    }

    /// Client acting for the (deployed) account, whose operations `validator` checks
    pub fn client<M: Middleware + 'static>(
        &self,
        account: &SmartAccountClient<M>,
        validator: Address,
    ) -> AutomationsClient {
        let automation_account =
            AutomationAccount::safe(account.address, account.chain_id, validator);
        AutomationsClient::with_url(&self.url, &self.api_key, automation_account)
    }
}

/// Creates the automation and activates it with the owner's ERC-1271 signature of its hash
pub async fn create_signed_automation<M: Middleware + 'static>(
    client: &SmartAccountClient<M>,
    automations: &AutomationsClient,
    request: &AutomationRequest,
    owner: &Wallet,
) -> eyre::Result<Automation> {
    let automation = automations.create_automation(request).await?;
    let signature = client.sign_erc1271(automation.hash, owner).await?;
    Ok(automations.sign_automation(&automation.id, &signature).await?)
}

/// Waits for the service to pick the automation up and returns its logs
pub async fn logs_after_delay(
    automations: &AutomationsClient,
    automation_id: &str,
) -> eyre::Result<Vec<AutomationLog>> {
    info!("Waiting {LOGS_DELAY:?} before reading the logs of automation {automation_id}");
    sleep(LOGS_DELAY).await;
    let logs = automations.get_automation_logs(automation_id).await?;
    info!("Automation {automation_id} has {} log(s)", logs.len());
    Ok(logs)
}

/// Mints test tokens to the account
pub fn mint_action(token: Address, to: Address, amount: U256) -> Execution {
    Execution::call(token, MintCall { to, amount }.encode())
}
