use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use gelfchunk_client::PoolStrategy;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send log lines as chunked GELF messages.
    Send(SendArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub enum StrategyArg {
    /// One encoder per concurrent writer, reused across messages.
    #[default]
    Checkout,
    /// A single encoder shared behind a lock.
    Shared,
}

impl From<StrategyArg> for PoolStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Checkout => PoolStrategy::Checkout,
            StrategyArg::Shared => PoolStrategy::Shared,
        }
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Collector address (host:port).
    #[arg(env = "GELFCHUNK_SERVER")]
    pub server: String,
    /// Payload given inline. Each line is sent as one message.
    #[arg(long, conflicts_with = "file")]
    pub data: Option<String>,
    /// Read payload lines from file. Stdin is used when neither --data nor --file is set.
    #[arg(long, conflicts_with = "data")]
    pub file: Option<PathBuf>,
    /// Gzip level: -1 (default) or 0 through 9.
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub level: i32,
    /// How concurrent writers share encoders.
    #[arg(long, value_enum, default_value_t = StrategyArg::Checkout)]
    pub strategy: StrategyArg,
    /// Route lines through a pool of N buffered writer threads.
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,
    /// Local address to send from. Default: ephemeral port on the unspecified address.
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<SocketAddr>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
