/*
[INPUT]:  Process arguments
[OUTPUT]: Parsed command tree (wss -> kline SYMBOL INTERVAL)
[POS]:    CLI layer - command-line surface
[UPDATE]: When adding commands or flags
*/

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "binance-wss",
    version,
    about = "Access binance APIs",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Extra configuration file (toml, yaml or json)
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config_path: Option<PathBuf>,
    /// Tracing filter, overrides RUST_LOG and the config file
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Access binance secured websocket API
    ///
    /// https://github.com/binance/binance-spot-api-docs/blob/master/web-socket-streams.md
    #[command(arg_required_else_help = true)]
    Wss {
        #[command(subcommand)]
        command: WssCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum WssCommand {
    /// Connect to the kline/candlestick stream for the given SYMBOL and INTERVAL
    #[command(arg_required_else_help = true)]
    Kline(KlineArgs),
}

#[derive(Args, Debug, Clone)]
pub struct KlineArgs {
    /// Trading pair, passed through as-is (e.g. btcusdt)
    pub symbol: String,
    /// Candle interval, passed through as-is (e.g. 1m)
    pub interval: String,
    /// Set verbose output
    #[arg(short, long)]
    pub verbose: bool,
    /// Event line format, overrides the config file
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,
}
