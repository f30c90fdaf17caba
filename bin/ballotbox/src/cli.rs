use std::path::PathBuf;

use clap::Parser;
use tracing::level_filters::LevelFilter;
use url::Url;

#[derive(Parser)]
#[command(name = "ballotbox")]
#[command(
    author,
    version,
    about = "Provision the ballot contract stack on a target network"
)]
pub struct Cli {
    /// The target environment name.
    ///
    /// Recognized networks: mainnet, rinkeby, mumbai, development. An
    /// unrecognized name deploys with the development parameters and keeps
    /// its own address book entries.
    #[arg(env = "BALLOTBOX_NETWORK", default_value = "development")]
    pub network: String,

    /// The verbosity level.
    #[arg(short, long, env = "BALLOTBOX_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    /// JSON-RPC endpoint of the provisioning service.
    #[arg(
        long,
        alias = "rpc",
        env = "BALLOTBOX_ENDPOINT",
        default_value = "http://127.0.0.1:8545/"
    )]
    pub endpoint: Url,

    /// Path of the address book file updated after each successful step.
    #[arg(long, env = "BALLOTBOX_ADDRESS_BOOK", default_value = ".addresses.env")]
    pub address_book: PathBuf,

    /// Path to an existing Ballotbox.toml configuration file to load.
    ///
    /// When provided, the run uses the configuration from this file instead
    /// of the other arguments.
    #[arg(long, alias = "conf", env = "BALLOTBOX_CONFIG")]
    pub config: Option<PathBuf>,
}
