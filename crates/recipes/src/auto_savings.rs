//! Saving a share of every incoming token transfer into a vault

use crate::{
    automation::{create_signed_automation, mint_action, AutomationsConfig},
    Endpoints, HttpSmartAccountClient,
};
use ethers::types::{Address, Bytes, U256};
use modulor_clients::automations::{Action, AutomationLog, AutomationRequest};
use modulor_modules::{
    auto_savings::{auto_save_selector, auto_savings_executor, AutoSavingsConfig},
    ownable::ownable_validator,
    Safe7579Account,
};
use modulor_primitives::{
    constants::{
        automations::AUTO_SAVINGS_BUILDER_URL,
        testnet::{MOCK_USDC, SAVINGS_VAULT},
    },
    Deployments, Wallet,
};
use tracing::info;

/// Percentage of each incoming amount that is saved
pub const PERCENTAGE: u16 = 1;
pub const MAX_EXECUTIONS: u64 = 10;
pub const MINT_AMOUNT: u64 = 10;

/// Dynamic action completing `autoSave(token, amountReceived, ...)` through the calldata builder
pub fn auto_save_dynamic_action(executor: Address) -> Action {
    Action::Dynamic {
        target: executor,
        value: U256::zero(),
        call_data_builder_url: AUTO_SAVINGS_BUILDER_URL.into(),
        function_selector: Bytes::from(auto_save_selector().to_vec()),
        params: None,
    }
}

/// Installs auto savings for mock USDC and triggers it with a mint
pub async fn run(
    endpoints: &Endpoints,
    deployments: Deployments,
    automations: &AutomationsConfig,
) -> eyre::Result<Vec<AutomationLog>> {
    let owner = Wallet::random();
    let account = Safe7579Account::new(owner.address(), &deployments).with_validator(
        ownable_validator(deployments.ownable_validator, &[owner.address()], 1)?,
    );
    let client = HttpSmartAccountClient::connect(endpoints, deployments, account).await?;
    let executor = client.deployments.auto_savings;

    let token: Address = MOCK_USDC.parse()?;
    let config = AutoSavingsConfig {
        token,
        percentage: PERCENTAGE,
        vault: SAVINGS_VAULT.parse()?,
        sqrt_price_limit_x96: 0,
    };
    client.install_module(&auto_savings_executor(executor, &[config]), &owner).await?;

    let request =
        AutomationRequest::event_based("", vec![auto_save_dynamic_action(executor)], MAX_EXECUTIONS);
    let service = automations.client(&client, client.deployments.ownable_validator);
    let automation = create_signed_automation(&client, &service, &request, &owner).await?;

    client.send_calls(&[mint_action(token, client.address, MINT_AMOUNT.into())], &owner).await?;
    info!("Minted {MINT_AMOUNT} to {:?}, reading logs", client.address);
    Ok(service.get_automation_logs(&automation.id).await?)
}
