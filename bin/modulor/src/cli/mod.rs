use crate::utils::run_until_ctrl_c;
use clap::{value_parser, Parser, Subcommand};
use dotenv::dotenv;

pub mod args;
pub mod commands;

/// The main Modulor CLI interface
#[derive(Debug, Parser)]
#[command(author, version, about = "Modulor", long_about = None)]
pub struct Cli {
    /// The command to execute
    #[clap(subcommand)]
    command: Commands,

    /// The verbosity level
    #[clap(long, short, global = true, default_value_t = 2, value_parser = value_parser!(u8).range(..=4))]
    verbosity: u8,
}

impl Cli {
    /// Get the log level based on the verbosity level
    pub fn get_log_level(&self) -> String {
        match self.verbosity {
            0 => "error",
            1 => "warn",
            2 => "info",
            3 => "debug",
            _ => "trace",
        }
        .into()
    }
}

/// Workflows to run
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install a session key and use it to send a user operation
    #[command(name = "smart-sessions")]
    SmartSessions(commands::SmartSessionsCommand),

    /// Recover an account with its guardians
    #[command(name = "social-recovery")]
    SocialRecovery(commands::SocialRecoveryCommand),

    /// Hand an idle account over to a nominee
    #[command(name = "deadman-switch")]
    DeadmanSwitch(commands::DeadmanSwitchCommand),

    /// Authorize a user operation with a passkey
    #[command(name = "webauthn")]
    WebAuthn(commands::WebAuthnCommand),

    /// Schedule recurring token transfers
    #[command(name = "scheduled-transfers")]
    ScheduledTransfers(commands::ScheduledTransfersCommand),

    /// Schedule recurring swaps
    #[command(name = "scheduled-orders")]
    ScheduledOrders(commands::ScheduledOrdersCommand),

    /// Save a share of incoming tokens
    #[command(name = "auto-savings")]
    AutoSavings(commands::AutoSavingsCommand),

    /// Have the orchestrator fill a token transfer
    ///
    /// Same-chain, cross-chain, deploy-on-fill, or signed by a session key.
    #[command(name = "intent")]
    Intent(Box<commands::IntentCommand>),
}

impl Commands {
    pub async fn execute(self) -> eyre::Result<()> {
        match self {
            Commands::SmartSessions(command) => command.execute().await,
            Commands::SocialRecovery(command) => command.execute().await,
            Commands::DeadmanSwitch(command) => command.execute().await,
            Commands::WebAuthn(command) => command.execute().await,
            Commands::ScheduledTransfers(command) => command.execute().await,
            Commands::ScheduledOrders(command) => command.execute().await,
            Commands::AutoSavings(command) => command.execute().await,
            Commands::Intent(command) => command.execute().await,
        }
    }
}

pub fn run() -> eyre::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    let rust_log = match std::env::var("RUST_LOG") {
        Ok(val) => format!("{val},modulor={}", cli.get_log_level()),
        Err(_) => format!("modulor={}", cli.get_log_level()),
    };
    std::env::set_var("RUST_LOG", rust_log);
    tracing_subscriber::fmt::init();

    let rt = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    rt.block_on(run_until_ctrl_c(cli.command.execute()))
}
