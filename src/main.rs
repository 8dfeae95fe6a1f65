use clap::Parser;
use std::process::exit;
use tracing_subscriber::EnvFilter;
use walletgate::args::Cli;
use walletgate::config::Config;
use walletgate::run::run;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = match Config::load(cli.config_file.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid config: {e}");
            exit(1);
        }
    };
    if let Err(e) = run(config).await {
        eprintln!("Failed to run server: {e:#}");
        exit(1);
    } else {
        Ok(())
    }
}
