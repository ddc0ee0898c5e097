use crate::utils::{parse_address, parse_intent_mode, parse_u256, validate_private_key};
use clap::Parser;
use ethers::types::{Address, U256};
use expanded_pathbuf::ExpandedPathBuf;
use modulor_clients::{ensure_bundler_ready, ensure_paymaster_ready, BundlerClient};
use modulor_primitives::{
    constants::{automations, local, orchestrator, testnet::TRANSFER_RECIPIENT},
    Deployments, Wallet,
};
use modulor_recipes::{intent::IntentMode, AutomationsConfig, Endpoints};
use std::time::Duration;

/// Chain, bundler and paymaster CLI args
#[derive(Debug, Clone, Parser)]
pub struct EndpointArgs {
    /// Ethereum execution client RPC endpoint.
    #[clap(long, env = "RPC_URL", default_value = local::RPC_URL)]
    pub rpc_url: String,

    /// Bundler RPC endpoint.
    #[clap(long, env = "BUNDLER_URL", default_value = local::BUNDLER_URL)]
    pub bundler_url: String,

    /// Paymaster RPC endpoint, user operations are not sponsored without it.
    #[clap(long, env = "PAYMASTER_URL")]
    pub paymaster_url: Option<String>,

    /// JSON file overriding (some of) the default contract addresses.
    #[clap(long)]
    pub deployments: Option<ExpandedPathBuf>,

    /// Seconds to wait for the bundler and paymaster to answer before starting.
    ///
    /// By default, the services are not checked.
    #[clap(long, default_value_t = 0)]
    pub ready_timeout: u64,
}

impl EndpointArgs {
    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            rpc_url: self.rpc_url.clone(),
            bundler_url: self.bundler_url.clone(),
            paymaster_url: self.paymaster_url.clone(),
        }
    }

    pub fn deployments(&self) -> eyre::Result<Deployments> {
        match &self.deployments {
            Some(path) => Deployments::from_file(path.clone()),
            None => Ok(Deployments::default()),
        }
    }

    /// Waits for the services when a ready timeout is set
    pub async fn wait_until_ready(&self, deployments: &Deployments) -> eyre::Result<()> {
        if self.ready_timeout == 0 {
            return Ok(());
        }

        let timeout = Duration::from_secs(self.ready_timeout);
        let bundler = BundlerClient::new(&self.bundler_url, deployments.entry_point)?;
        ensure_bundler_ready(&bundler, timeout).await?;
        if let Some(url) = &self.paymaster_url {
            ensure_paymaster_ready(url, timeout).await?;
        }
        Ok(())
    }
}

/// Endpoints of the second chain of multichain workflows
#[derive(Debug, Clone, Default, Parser, PartialEq)]
pub struct SecondChainArgs {
    /// Second chain RPC endpoint.
    #[clap(long = "second-chain.rpc-url", env = "SECOND_RPC_URL")]
    pub second_rpc_url: Option<String>,

    /// Second chain bundler endpoint.
    #[clap(long = "second-chain.bundler-url", env = "SECOND_BUNDLER_URL")]
    pub second_bundler_url: Option<String>,

    /// Second chain paymaster endpoint.
    #[clap(long = "second-chain.paymaster-url", env = "SECOND_PAYMASTER_URL")]
    pub second_paymaster_url: Option<String>,
}

impl SecondChainArgs {
    pub fn endpoints(&self) -> eyre::Result<Endpoints> {
        match (&self.second_rpc_url, &self.second_bundler_url) {
            (Some(rpc_url), Some(bundler_url)) => Ok(Endpoints {
                rpc_url: rpc_url.clone(),
                bundler_url: bundler_url.clone(),
                paymaster_url: self.second_paymaster_url.clone(),
            }),
            _ => Err(eyre::eyre!("the second chain needs an RPC and a bundler endpoint")),
        }
    }
}

/// Automations service CLI args
#[derive(Debug, Clone, Parser, PartialEq)]
pub struct AutomationsArgs {
    /// Automations API endpoint.
    #[clap(long = "automations.url", env = "AUTOMATIONS_URL", default_value = automations::URL)]
    pub automations_url: String,

    /// Automations API key.
    #[clap(long = "automations.api-key", env = "AUTOMATIONS_API_KEY", hide_env_values = true)]
    pub automations_api_key: String,
}

impl AutomationsArgs {
    pub fn config(&self) -> AutomationsConfig {
        AutomationsConfig {
            url: self.automations_url.clone(),
            api_key: self.automations_api_key.clone(),
        }
    }
}

/// Intent CLI args
#[derive(Debug, Clone, Parser, PartialEq)]
pub struct IntentArgs {
    /// Orchestrator API endpoint.
    #[clap(long = "orchestrator.url", env = "ORCHESTRATOR_URL", default_value = orchestrator::URL)]
    pub orchestrator_url: String,

    /// Orchestrator API key.
    #[clap(long = "orchestrator.api-key", env = "ORCHESTRATOR_API_KEY", hide_env_values = true)]
    pub orchestrator_api_key: String,

    /// Private key of the wallet funding the account (hex, with or without `0x`).
    #[clap(
        long,
        env = "FUNDING_PRIVATE_KEY",
        hide_env_values = true,
        value_parser = validate_private_key
    )]
    pub funding_private_key: String,

    /// Target chain RPC endpoint, required unless the mode is `same-chain`.
    #[clap(long, env = "TARGET_RPC_URL")]
    pub target_rpc_url: Option<String>,

    /// Sets the intent mode: `same-chain`, `cross-chain`, `deploy-on-fill` or `session-key`.
    ///
    /// By default, this option is set to `same-chain`.
    #[clap(long, default_value = "same-chain", value_parser = parse_intent_mode)]
    pub mode: IntentMode,

    /// USDC (base units) sent to the account before the intent.
    #[clap(long, value_parser = parse_u256)]
    pub funding_amount: Option<U256>,

    /// Recipient of the transfer executed on the target chain.
    #[clap(long, default_value = TRANSFER_RECIPIENT, value_parser = parse_address)]
    pub recipient: Address,
}

impl IntentArgs {
    pub fn funding_wallet(&self) -> eyre::Result<Wallet> {
        Wallet::from_private_key(&self.funding_private_key)
    }
}
