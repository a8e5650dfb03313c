//! Command line configuration and logging setup.

use crate::{
    dashboard::RefreshPolicy,
    network::{AddressBook, AddressBookError, Network},
    primitives::Address,
};
use env_logger::{Builder, Env};
use log::LevelFilter;
use std::{io::Write, path::PathBuf, time::Duration};
use structopt::StructOpt;
use url::Url;

#[derive(StructOpt, Debug)]
#[structopt(name = "KANDY Client")]
pub struct ConfigCli {
    #[structopt(
        long = "rpc-url",
        help = "JSON-RPC endpoint of the node or wallet",
        default_value = "https://api.avax.network/ext/bc/C/rpc",
        env = "KANDY_CLIENT_RPC_URL"
    )]
    pub rpc_url:                 Url,
    #[structopt(
        long = "network",
        help = "Network name or chain id",
        default_value = "avax",
        env = "KANDY_CLIENT_NETWORK"
    )]
    pub network:                 Network,
    #[structopt(
        long = "addresses",
        help = "TOML file with the protocol contract addresses per network",
        env = "KANDY_CLIENT_ADDRESSES"
    )]
    pub addresses:               Option<PathBuf>,
    #[structopt(
        long = "account",
        help = "Account to inspect and to send transactions from. Defaults to the first account \
                of the endpoint",
        env = "KANDY_CLIENT_ACCOUNT"
    )]
    pub account:                 Option<Address>,
    #[structopt(
        long = "rpc-timeout",
        help = "Time (in seconds) for JSON-RPC request timeouts",
        default_value = "30",
        env = "KANDY_CLIENT_RPC_TIMEOUT"
    )]
    pub rpc_timeout:             u64,
    #[structopt(
        long = "poll-interval",
        help = "Interval in milliseconds between transaction receipt polls",
        default_value = "4000",
        env = "KANDY_CLIENT_POLL_INTERVAL"
    )]
    pub poll_interval:           u64,
    #[structopt(
        long = "allowance-refresh-delay",
        help = "Time (in ms) to wait after an approval before reading the allowance back",
        default_value = "2000",
        env = "KANDY_CLIENT_ALLOWANCE_REFRESH_DELAY"
    )]
    pub allowance_refresh_delay: u64,
    #[structopt(
        long = "balance-refresh-delay",
        help = "Time (in ms) to wait after a wrap before fetching balances again",
        default_value = "10000",
        env = "KANDY_CLIENT_BALANCE_REFRESH_DELAY"
    )]
    pub balance_refresh_delay:   u64,
    #[structopt(
        long = "print-config",
        help = "Print out config struct",
        env = "KANDY_CLIENT_PRINT_CONFIG"
    )]
    pub print_config:            bool,
    #[structopt(long = "debug", short = "d", help = "Debug mode", env = "KANDY_CLIENT_DEBUG")]
    pub debug:                   bool,
    #[structopt(long = "trace", help = "Trace mode", env = "KANDY_CLIENT_TRACE")]
    pub trace:                   bool,
    #[structopt(
        long = "no-log-timestamp",
        help = "Do not output timestamp in log output",
        env = "KANDY_CLIENT_NO_LOG_TIMESTAMP"
    )]
    pub no_log_timestamp:        bool,
    #[structopt(subcommand)]
    pub command:                 Command,
}

#[derive(StructOpt, Debug, PartialEq, Eq)]
pub enum Command {
    /// Show KANDY, sKANDY and wsKANDY balances
    Balances,
    /// Show balances together with staking and wrapping allowances
    Account,
    /// List the bonds offered on the network
    Bonds,
    /// Show the account's position in a bond
    Bond {
        #[structopt(help = "Bond name, e.g. 'mim' or 'mim_time_lp'")]
        name: String,
    },
    /// Show the account's holdings of a zap token
    Token {
        #[structopt(help = "Token name, e.g. 'MIM' or 'AVAX'")]
        name: String,
    },
    /// Show the time left until the next rebase and the market price
    Rebase,
    /// Preview the result of wrapping or unwrapping an amount
    WrapPreview {
        #[structopt(long = "unwrap", help = "Preview an unwrap instead of a wrap")]
        unwrap: bool,
        value:  Option<String>,
    },
    /// Approve wsKANDY to spend sKANDY
    ApproveWrap,
    /// Wrap sKANDY into wsKANDY
    Wrap { value: String },
    /// Unwrap wsKANDY into sKANDY
    Unwrap { value: String },
}

impl ConfigCli {
    pub fn refresh_policy(&self) -> RefreshPolicy {
        RefreshPolicy {
            allowance_delay: Duration::from_millis(self.allowance_refresh_delay),
            balance_delay:   Duration::from_millis(self.balance_refresh_delay),
        }
    }

    /// The configured address book, or an empty one when no file is given.
    pub fn address_book(&self) -> Result<AddressBook, AddressBookError> {
        match &self.addresses {
            Some(path) => AddressBook::load(path),
            None => Ok(AddressBook::default()),
        }
    }
}

/// Sets up a logger that logs to stderr.
pub fn setup_logger(trace: bool, debug: bool, no_log_timestamp: bool) {
    let env = if trace {
        Env::default().filter_or("LOG_LEVEL", "trace")
    } else if debug {
        Env::default().filter_or("LOG_LEVEL", "debug")
    } else {
        Env::default().filter_or("LOG_LEVEL", "info")
    };

    let mut log_builder = Builder::from_env(env);
    if no_log_timestamp {
        log_builder.format_timestamp(None);
    } else {
        log_builder.format(|buf, record| {
            writeln!(buf, "{}: {}: {}", buf.timestamp_nanos(), record.level(), record.args())
        });
    }
    log_builder.filter(Some("hyper"), LevelFilter::Error);
    log_builder.filter(Some("reqwest"), LevelFilter::Error);
    log_builder.filter(Some("h2"), LevelFilter::Error);
    log_builder.init();
}
