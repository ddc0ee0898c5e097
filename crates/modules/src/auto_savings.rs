//! Auto savings executor: moves a share of incoming tokens into a vault

use crate::module::Module;
use ethers::{
    abi::{encode, Token},
    contract::EthCall,
    types::{Address, Selector, U256},
};
use modulor_contracts::auto_savings_api::AutoSaveCall;
use serde::{Deserialize, Serialize};

/// Savings rule for one token
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoSavingsConfig {
    pub token: Address,
    /// Share of each incoming amount to save
    pub percentage: u16,
    /// ERC-4626 vault receiving the savings
    pub vault: Address,
    pub sqrt_price_limit_x96: u128,
}

/// Executor with `abi.encode(address[] tokens, (uint16, address, uint128)[] configs)` init data
pub fn auto_savings_executor(
    address: Address,
    configs: &[AutoSavingsConfig],
) -> Module {
    let tokens = configs.iter().map(|config| Token::Address(config.token)).collect();
    let configs = configs
        .iter()
        .map(|config| {
            Token::Tuple(vec![
                Token::Uint(U256::from(config.percentage)),
                Token::Address(config.vault),
                Token::Uint(U256::from(config.sqrt_price_limit_x96)),
            ])
        })
        .collect();
    Module::executor(address, encode(&[Token::Array(tokens), Token::Array(configs)]).into())
}

/// `autoSave(address,uint256,uint160,uint256,uint24)`, completed by a calldata builder
pub fn auto_save_selector() -> Selector {
    AutoSaveCall::selector()
}
