use clap::Parser;

/// Wallet-authenticated gateway to the storage node and the allow-list contract.
#[derive(Parser)]
pub struct Cli {
    /// The path to a YAML config file. Environment variables prefixed with `WALLETGATE__`
    /// override its values.
    #[clap(short, long, env = "WALLETGATE_CONFIG_FILE")]
    pub config_file: Option<String>,
}
