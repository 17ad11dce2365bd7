//! `arb-bridge` resolves the status of Arbitrum bridge messages from the transaction that sent
//! them.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

use clap::Parser;

mod cli;
mod commands;
mod flags;

#[tokio::main]
async fn main() {
    if let Err(err) = cli::Cli::parse().run().await {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}
