//! Scheduled transfers and scheduled orders executors
//!
//! Both executors store jobs created on install: `uint48 interval ‖ uint16 executions ‖
//! uint48 start ‖ bytes data` (packed). The automations service later calls `executeOrder`
//! for the job when it is due.

use crate::{module::Module, ModuleError};
use ethers::{
    abi::{encode, AbiEncode, Token},
    contract::EthCall,
    types::{Address, Bytes, Selector, U256},
};
use modulor_contracts::{scheduled_orders_api, scheduled_transfers_api};
use modulor_primitives::Execution;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

const MAX_UINT48: u64 = (1 << 48) - 1;

/// Periodic token transfer
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledTransfer {
    pub recipient: Address,
    /// Zero for the native token
    pub token: Address,
    /// Amount in the token's base units
    pub amount: U256,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    #[default]
    Buy,
    Sell,
}

/// Periodic swap between two tokens
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringOrder {
    pub buy_token: Address,
    pub sell_token: Address,
    pub amount: U256,
    pub order_type: OrderType,
    pub sqrt_price_limit_x96: U256,
}

/// Interval, repetitions and start of a job
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    /// Seconds between two executions
    pub interval: u64,
    pub executions: u16,
    /// Unix timestamp of the first execution
    pub start: u64,
}

/// `abi.encode(address recipient, address token, uint256 amount)`
pub fn scheduled_transfer_data(transfer: &ScheduledTransfer) -> Bytes {
    encode(&[
        Token::Address(transfer.recipient),
        Token::Address(transfer.token),
        Token::Uint(transfer.amount),
    ])
    .into()
}

/// `abi.encode(address tokenIn, address tokenOut, uint256 amountIn, uint160 sqrtPriceLimitX96)`
///
/// A buy order spends the sell token to get the buy token, a sell order the opposite.
pub fn swap_order_data(order: &RecurringOrder) -> Result<Bytes, ModuleError> {
    if order.sqrt_price_limit_x96.bits() > 160 {
        return Err(ModuleError::Overflow { field: "sqrtPriceLimitX96", bits: 160 });
    }

    let (token_in, token_out) = match order.order_type {
        OrderType::Buy => (order.sell_token, order.buy_token),
        OrderType::Sell => (order.buy_token, order.sell_token),
    };
    Ok(encode(&[
        Token::Address(token_in),
        Token::Address(token_out),
        Token::Uint(order.amount),
        Token::Uint(order.sqrt_price_limit_x96),
    ])
    .into())
}

/// Executor creating one job on install
pub fn scheduled_executor(
    address: Address,
    schedule: Schedule,
    execution_data: &[u8],
) -> Result<Module, ModuleError> {
    if schedule.interval > MAX_UINT48 {
        return Err(ModuleError::Overflow { field: "interval", bits: 48 });
    }
    if schedule.start > MAX_UINT48 {
        return Err(ModuleError::Overflow { field: "start", bits: 48 });
    }

    let init_data = [
        &schedule.interval.to_be_bytes()[2..],
        &schedule.executions.to_be_bytes()[..],
        &schedule.start.to_be_bytes()[2..],
        execution_data,
    ]
    .concat();
    Ok(Module::executor(address, init_data.into()))
}

/// Runs a due scheduled transfer
pub fn execute_order_action(executor: Address, job_id: U256) -> Execution {
    Execution::call(executor, scheduled_transfers_api::ExecuteOrderCall { job_id }.encode())
}

/// `executeOrder(uint256)`
pub fn scheduled_transfers_selector() -> Selector {
    scheduled_transfers_api::ExecuteOrderCall::selector()
}

/// `executeOrder(uint256,uint160,uint256,uint24)`, completed by a calldata builder
pub fn scheduled_orders_selector() -> Selector {
    scheduled_orders_api::ExecuteOrderCall::selector()
}
