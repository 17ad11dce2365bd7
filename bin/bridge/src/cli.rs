//! Contains the bridge CLI.

use crate::{
    commands::{DepositsCommand, NetworkCommand, RetryablesCommand, WithdrawalsCommand},
    flags::GlobalArgs,
};
use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

/// Resolves Arbitrum bridge messages.
#[derive(Parser, Clone, Debug)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Cli {
    /// Global arguments for the CLI.
    #[command(flatten)]
    pub(crate) global: GlobalArgs,
    /// The subcommand to run.
    #[command(subcommand)]
    pub(crate) command: Commands,
}

/// Subcommands of the CLI.
#[derive(Subcommand, Clone, Debug)]
pub(crate) enum Commands {
    /// Retryable tickets created by a parent chain transaction.
    Retryables(RetryablesCommand),
    /// ETH deposits made by a parent chain transaction.
    Deposits(DepositsCommand),
    /// Withdrawals sent by a child chain transaction.
    Withdrawals(WithdrawalsCommand),
    /// Prints the resolved network configuration.
    Network(NetworkCommand),
}

impl Cli {
    /// Runs the CLI until the command completes or ctrl-c is received.
    pub(crate) async fn run(self) -> Result<()> {
        init_tracing_subscriber(self.global.v)?;
        let Self { global, command } = self;
        tokio::select! {
            res = command.run(&global) => res,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!(target: "cli", "interrupted");
                Ok(())
            }
        }
    }
}

impl Commands {
    async fn run(self, args: &GlobalArgs) -> Result<()> {
        match self {
            Self::Retryables(cmd) => cmd.run(args).await,
            Self::Deposits(cmd) => cmd.run(args).await,
            Self::Withdrawals(cmd) => cmd.run(args).await,
            Self::Network(cmd) => cmd.run(args),
        }
    }
}

/// Installs the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` directives take precedence over the verbosity level.
pub(crate) fn init_tracing_subscriber(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
}
