use super::args::{AutomationsArgs, EndpointArgs, IntentArgs, SecondChainArgs};
use crate::utils::validate_private_key;
use clap::Parser;
use modulor_clients::OrchestratorClient;
use modulor_primitives::{Deployments, Wallet};
use modulor_recipes::{
    auto_savings, deadman_switch,
    intent::{self, IntentSetup},
    scheduled_orders, scheduled_transfers, smart_sessions, social_recovery,
    webauthn::{self, RecordedAuthenticator},
    Endpoints,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Prints the outcome of a workflow as JSON
fn print_json<T: Serialize>(value: &T) -> eyre::Result<()> {
    serde_json::to_writer_pretty(std::io::stdout(), value)?;
    println!();
    Ok(())
}

async fn prepare(endpoints: &EndpointArgs) -> eyre::Result<(Endpoints, Deployments)> {
    let deployments = endpoints.deployments()?;
    endpoints.wait_until_ready(&deployments).await?;
    Ok((endpoints.endpoints(), deployments))
}

/// Install a session key and use it to send a user operation
#[derive(Debug, Parser)]
pub struct SmartSessionsCommand {
    #[clap(flatten)]
    endpoints: EndpointArgs,

    /// Enable the session at deployment, without any owner signature.
    #[clap(long)]
    pub zero_signatures: bool,

    /// Enable the session on this chain and the second one with a single owner signature.
    #[clap(
        long,
        conflicts_with = "zero_signatures",
        requires_all = ["second_rpc_url", "second_bundler_url"]
    )]
    pub multichain: bool,

    #[clap(flatten)]
    pub second_chain: SecondChainArgs,
}

impl SmartSessionsCommand {
    /// Execute the command
    pub async fn execute(self) -> eyre::Result<()> {
        let (endpoints, deployments) = prepare(&self.endpoints).await?;
        if self.multichain {
            let chains = [endpoints, self.second_chain.endpoints()?];
            return print_json(&smart_sessions::run_multichain(&chains, deployments).await?);
        }

        let receipt = if self.zero_signatures {
            smart_sessions::run_zero_signatures(&endpoints, deployments).await?
        } else {
            smart_sessions::run(&endpoints, deployments).await?
        };
        print_json(&receipt)
    }
}

/// Recover an account with its guardians
#[derive(Debug, Parser)]
pub struct SocialRecoveryCommand {
    #[clap(flatten)]
    endpoints: EndpointArgs,

    /// Number of (randomly generated) guardians, all of them sign.
    #[clap(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(1..))]
    guardians: u8,
}

impl SocialRecoveryCommand {
    /// Execute the command
    pub async fn execute(self) -> eyre::Result<()> {
        let (endpoints, deployments) = prepare(&self.endpoints).await?;
        let guardians = (0..self.guardians).map(|_| Wallet::random()).collect();
        print_json(&social_recovery::run(&endpoints, deployments, guardians).await?)
    }
}

/// Hand an idle account over to a nominee
#[derive(Debug, Parser)]
pub struct DeadmanSwitchCommand {
    #[clap(flatten)]
    endpoints: EndpointArgs,

    /// Private key of the nominee, a random one is generated when missing.
    #[clap(
        long,
        env = "NOMINEE_PRIVATE_KEY",
        hide_env_values = true,
        value_parser = validate_private_key
    )]
    nominee_private_key: Option<String>,
}

impl DeadmanSwitchCommand {
    /// Execute the command
    pub async fn execute(self) -> eyre::Result<()> {
        let (endpoints, deployments) = prepare(&self.endpoints).await?;
        let nominee = match &self.nominee_private_key {
            Some(key) => Wallet::from_private_key(key)?,
            None => Wallet::random(),
        };
        info!("Nominee {:?}", nominee.address());
        print_json(&deadman_switch::run(&endpoints, deployments, nominee).await?)
    }
}

/// Authorize a user operation with a passkey
#[derive(Debug, Parser)]
pub struct WebAuthnCommand {
    #[clap(flatten)]
    endpoints: EndpointArgs,

    /// JSON file with a recorded credential and assertion.
    #[clap(long)]
    assertion: PathBuf,
}

impl WebAuthnCommand {
    /// Execute the command
    pub async fn execute(self) -> eyre::Result<()> {
        let (endpoints, deployments) = prepare(&self.endpoints).await?;
        let authenticator = RecordedAuthenticator::from_file(&self.assertion)?;
        print_json(&webauthn::run(&endpoints, deployments, &authenticator).await?)
    }
}

/// Schedule recurring token transfers
#[derive(Debug, Parser)]
pub struct ScheduledTransfersCommand {
    #[clap(flatten)]
    endpoints: EndpointArgs,

    #[clap(flatten)]
    automations: AutomationsArgs,
}

impl ScheduledTransfersCommand {
    /// Execute the command
    pub async fn execute(self) -> eyre::Result<()> {
        let (endpoints, deployments) = prepare(&self.endpoints).await?;
        let logs =
            scheduled_transfers::run(&endpoints, deployments, &self.automations.config()).await?;
        print_json(&logs)
    }
}

/// Schedule recurring swaps
#[derive(Debug, Parser)]
pub struct ScheduledOrdersCommand {
    #[clap(flatten)]
    endpoints: EndpointArgs,

    #[clap(flatten)]
    automations: AutomationsArgs,
}

impl ScheduledOrdersCommand {
    /// Execute the command
    pub async fn execute(self) -> eyre::Result<()> {
        let (endpoints, deployments) = prepare(&self.endpoints).await?;
        let logs =
            scheduled_orders::run(&endpoints, deployments, &self.automations.config()).await?;
        print_json(&logs)
    }
}

/// Save a share of incoming tokens
#[derive(Debug, Parser)]
pub struct AutoSavingsCommand {
    #[clap(flatten)]
    endpoints: EndpointArgs,

    #[clap(flatten)]
    automations: AutomationsArgs,
}

impl AutoSavingsCommand {
    /// Execute the command
    pub async fn execute(self) -> eyre::Result<()> {
        let (endpoints, deployments) = prepare(&self.endpoints).await?;
        let logs = auto_savings::run(&endpoints, deployments, &self.automations.config()).await?;
        print_json(&logs)
    }
}

/// Have the orchestrator fill a token transfer
#[derive(Debug, Parser)]
pub struct IntentCommand {
    #[clap(flatten)]
    endpoints: EndpointArgs,

    #[clap(flatten)]
    intent: IntentArgs,
}

impl IntentCommand {
    /// Execute the command
    pub async fn execute(self) -> eyre::Result<()> {
        let (source, deployments) = prepare(&self.endpoints).await?;
        let setup = IntentSetup {
            source,
            target_rpc_url: self.intent.target_rpc_url.clone(),
            orchestrator: OrchestratorClient::with_url(
                &self.intent.orchestrator_url,
                &self.intent.orchestrator_api_key,
            ),
            funding: self.intent.funding_wallet()?,
            funding_amount: self.intent.funding_amount,
            recipient: self.intent.recipient,
            mode: self.intent.mode,
        };
        print_json(&intent::run(&setup, deployments).await?)
    }
}
