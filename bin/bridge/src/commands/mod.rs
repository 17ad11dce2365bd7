//! Contains subcommands for the bridge CLI.

mod retryables;
pub(crate) use retryables::RetryablesCommand;

mod deposits;
pub(crate) use deposits::DepositsCommand;

mod withdrawals;
pub(crate) use withdrawals::WithdrawalsCommand;

mod network;
pub(crate) use network::NetworkCommand;
