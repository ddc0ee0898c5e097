//! Recurring token transfers run by the automations service through a session key

use crate::{
    automation::{create_signed_automation, logs_after_delay, mint_action, AutomationsConfig},
    smart_sessions::ownable_session,
    unix_millis, unix_seconds, Endpoints, HttpSmartAccountClient,
};
use ethers::types::{Address, U256};
use modulor_clients::automations::{Action, AutomationLog, AutomationRequest};
use modulor_modules::{
    ownable::ownable_validator,
    scheduled::{
        execute_order_action, scheduled_executor, scheduled_transfer_data,
        scheduled_transfers_selector, Schedule, ScheduledTransfer,
    },
    smart_sessions::{permission_id, smart_sessions_validator, sudo_action},
    Safe7579Account,
};
use modulor_primitives::{
    constants::{
        automations::{EVERY_MINUTE, SESSION_KEY},
        testnet::{MOCK_TOKEN_DECIMALS, MOCK_USDC, TRANSFER_RECIPIENT},
    },
    Deployments, Wallet,
};

/// Seconds between two transfers
pub const INTERVAL: u64 = 60;
pub const EXECUTIONS: u16 = 2;
/// Test tokens minted to the account
pub const MINT_AMOUNT: u64 = 10;

/// Schedules two transfers of one mock USDC and lets the service execute them
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
    let executor = client.deployments.scheduled_transfers;

    // the service signs `executeOrder` calls with its own session key
    let session = ownable_session(&client.deployments, SESSION_KEY.parse()?)?.with_action(
        sudo_action(client.deployments.sudo_policy, executor, scheduled_transfers_selector()),
    );
    let sessions =
        smart_sessions_validator(client.deployments.smart_sessions, vec![session.clone()]);
    client.install_module(&sessions, &owner).await?;

    let token: Address = MOCK_USDC.parse()?;
    let transfer = ScheduledTransfer {
        recipient: TRANSFER_RECIPIENT.parse()?,
        token,
        amount: U256::exp10(MOCK_TOKEN_DECIMALS as usize),
    };
    let schedule = Schedule { interval: INTERVAL, executions: EXECUTIONS, start: unix_seconds()? };
    let module = scheduled_executor(executor, schedule, &scheduled_transfer_data(&transfer))?;
    client.install_module(&module, &owner).await?;

    client
        .send_calls(&[mint_action(token, client.address, MINT_AMOUNT.into())], &owner)
        .await?;

    // first job of a freshly installed executor
    let job = execute_order_action(executor, U256::zero());
    let actions =
        vec![Action::Static { target: job.to, value: job.value, call_data: job.data }];
    let request =
        AutomationRequest::time_based(EVERY_MINUTE, unix_millis()?, actions, EXECUTIONS.into())
            .with_permission_id(permission_id(&session));

    let service = automations.client(&client, client.deployments.smart_sessions);
    let automation = create_signed_automation(&client, &service, &request, &owner).await?;
    logs_after_delay(&service, &automation.id).await
}
