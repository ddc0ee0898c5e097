//! Recurring swaps whose call data is built by the automations service when they run

use crate::{
    automation::{create_signed_automation, logs_after_delay, mint_action, AutomationsConfig},
    unix_millis, unix_seconds, Endpoints, HttpSmartAccountClient,
};
use ethers::types::{Address, Bytes, U256};
use modulor_clients::automations::{Action, ActionParams, AutomationLog, AutomationRequest};
use modulor_modules::{
    ownable::ownable_validator,
    scheduled::{
        scheduled_executor, scheduled_orders_selector, swap_order_data, OrderType,
        RecurringOrder, Schedule,
    },
    Safe7579Account,
};
use modulor_primitives::{
    constants::{
        automations::{EVERY_MINUTE, SCHEDULED_ORDERS_BUILDER_URL},
        testnet::{MOCK_TOKEN_DECIMALS, MOCK_USDC, MOCK_USDT},
    },
    Deployments, Wallet,
};
use serde_json::json;

pub const INTERVAL: u64 = 60;
pub const EXECUTIONS: u16 = 2;
pub const MINT_AMOUNT: u64 = 10;

/// Dynamic action completing `executeOrder(jobId, ...)` through the calldata builder
pub fn execute_order_dynamic_action(executor: Address, job_id: u64) -> Action {
    let mut params = ActionParams::default();
    params.static_params.insert("jobId".into(), json!(job_id));
    Action::Dynamic {
        target: executor,
        value: U256::zero(),
        call_data_builder_url: SCHEDULED_ORDERS_BUILDER_URL.into(),
        function_selector: Bytes::from(scheduled_orders_selector().to_vec()),
        params: Some(params),
    }
}

/// Schedules two buys of one mock USDC paid in mock USDT
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
    let executor = client.deployments.scheduled_orders;

    let sell_token: Address = MOCK_USDT.parse()?;
    let order = RecurringOrder {
        buy_token: MOCK_USDC.parse()?,
        sell_token,
        amount: U256::exp10(MOCK_TOKEN_DECIMALS as usize),
        order_type: OrderType::Buy,
        sqrt_price_limit_x96: U256::zero(),
    };
    let schedule = Schedule { interval: INTERVAL, executions: EXECUTIONS, start: unix_seconds()? };
    let module = scheduled_executor(executor, schedule, &swap_order_data(&order)?)?;
    client.install_module(&module, &owner).await?;

    client
        .send_calls(&[mint_action(sell_token, client.address, MINT_AMOUNT.into())], &owner)
        .await?;

    let request = AutomationRequest::time_based(
        EVERY_MINUTE,
        unix_millis()?,
        vec![execute_order_dynamic_action(executor, 0)],
        EXECUTIONS.into(),
    );
    let service = automations.client(&client, client.deployments.ownable_validator);
    let automation = create_signed_automation(&client, &service, &request, &owner).await?;
    logs_after_delay(&service, &automation.id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn dynamic_action_json() {
        let action = execute_order_dynamic_action(Address::repeat_byte(0x40), 0);
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({
                "type": "dynamic",
                "target": "0x4040404040404040404040404040404040404040",
                "value": 0,
                "callDataBuilderUrl": SCHEDULED_ORDERS_BUILDER_URL,
                "functionSelector": "0xc32da55d",
                "params": {"static": {"jobId": 0}}
            })
        );
    }
}
