//! Token tables for the supported chains
use alloy_chains::NamedChain;
use ethers::types::Address;
use strum_macros::{Display, EnumString};
use thiserror::Error;

/// Tokens the workflows move around
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString, Display)]
#[strum(ascii_case_insensitive, serialize_all = "UPPERCASE")]
pub enum Token {
    Usdc,
    Weth,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("unknown token {0}")]
    UnknownToken(String),
    #[error("{token} is not available on chain {chain}")]
    Unsupported { token: Token, chain: NamedChain },
}

const WETH_OP_STACK: &str = "0x4200000000000000000000000000000000000006";

fn lookup(token: Token, chain: NamedChain) -> Option<&'static str> {
    use NamedChain::*;
    use Token::*;

    Some(match (token, chain) {
        (Usdc, Mainnet) => "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
        (Usdc, Base) => "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913",
        (Usdc, Optimism) => "0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85",
        (Usdc, Arbitrum) => "0xaf88d065e77c8cC2239327C5EDb3A432268e5831",
        (Usdc, Polygon) => "0x3c499c542cEF5E3811e1192ce70d8cC03d5c3359",
        (Usdc, Sepolia) => "0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238",
        (Usdc, BaseSepolia) => "0x036CbD53842c5426634e7929541eC2318f3dCF7e",
        (Usdc, OptimismSepolia) => "0x5fd84259d66Cd46123540766Be93DFE6D43130D7",
        (Usdc, ArbitrumSepolia) => "0x75faf114eafb1BDbe2F0316DF893fd58CE46AA4d",
        (Weth, Mainnet) => "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2",
        (Weth, Arbitrum) => "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1",
        (Weth, Polygon) => "0x7ceB23fD6bC0adD59E62ac25578270cFf1b9f619",
        (Weth, Sepolia) => "0xfFf9976782d46CC05630D1f6eBAb18b2324d6B14",
        (Weth, ArbitrumSepolia) => "0x980B62Da83eFf3D4576C647993b0c1D7faf17c73",
        (Weth, Base | Optimism | BaseSepolia | OptimismSepolia) => WETH_OP_STACK,
        _ => return None,
    })
}

/// Returns the address of a token (by symbol, e.g. `USDC`) on the given chain
///
/// # Arguments
/// * `symbol` - Token symbol (case insensitive)
/// * `chain` - The chain
///
/// # Returns
/// * `Address` - The token address, or an error if the token is unknown or not deployed there
pub fn token_address(symbol: &str, chain: NamedChain) -> Result<Address, ChainError> {
    let token: Token =
        symbol.parse().map_err(|_| ChainError::UnknownToken(symbol.to_string()))?;
    lookup(token, chain)
        .and_then(|addr| addr.parse().ok())
        .ok_or(ChainError::Unsupported { token, chain })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usdc_addresses() {
        assert_eq!(
            token_address("USDC", NamedChain::Base).unwrap(),
            "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913".parse::<Address>().unwrap()
        );
        assert_eq!(
            token_address("usdc", NamedChain::ArbitrumSepolia).unwrap(),
            "0x75faf114eafb1BDbe2F0316DF893fd58CE46AA4d".parse::<Address>().unwrap()
        );
    }

    #[test]
    fn weth_on_op_stack() {
        assert_eq!(
            token_address("WETH", NamedChain::Optimism).unwrap(),
            token_address("WETH", NamedChain::BaseSepolia).unwrap()
        );
    }

    #[test]
    fn unsupported_pairs() {
        assert_eq!(
            token_address("USDC", NamedChain::Dev),
            Err(ChainError::Unsupported { token: Token::Usdc, chain: NamedChain::Dev })
        );
        assert!(matches!(token_address("DAI", NamedChain::Mainnet), Err(ChainError::UnknownToken(_))));
    }
}
