use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "addr-watch")]
#[command(version = "0.1.0")]
#[command(about = "Watch a Bitcoin address for pending transfers and notify by SMS", long_about = None)]
pub struct Cli {
    /// Directory holding config.toml and logs, defaults to ~/.addrwatch/addr-watch
    #[arg(short, long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Also write log output to stderr
    #[arg(long, default_value_t = false)]
    pub console: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
#[command(rename_all = "kebab-case")]
pub enum Commands {
    /// Poll the memory pool until the address sends, then send one SMS
    Watch {
        /// Address to watch, overrides the config file
        #[arg(short, long, value_parser = parse_address)]
        address: Option<String>,

        /// Phone number to notify
        #[arg(short, long)]
        to: Option<String>,

        /// Seconds between polls
        #[arg(short, long, value_name = "SECS")]
        interval: Option<u64>,

        /// Stop after this many polls without a match
        #[arg(long, value_name = "N")]
        max_cycles: Option<u64>,
    },

    /// Poll once and print whether the address sends or receives
    Check {
        #[arg(short, long, value_parser = parse_address)]
        address: Option<String>,
    },

    /// Print the flattened transaction history of an address
    History {
        #[arg(value_name = "ADDRESS", value_parser = parse_address)]
        address: String,
    },

    /// Send a single test SMS with the configured provider
    Sms {
        #[arg(short, long)]
        to: Option<String>,

        #[arg(long)]
        text: Option<String>,
    },
}

impl Commands {
    // Long running commands keep a log file, one-shot ones log to stderr
    pub fn logs_to_file(&self) -> bool {
        matches!(self, Commands::Watch { .. })
    }
}

fn parse_address(s: &str) -> Result<String, String> {
    watch_util::parse_watch_address(s)
}
