use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use wcp_domain::config::Config;
use wcp_server::cli::{Cli, Command, ConfigCommand, MigrateCommand};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None | Some(Command::Serve) => {
            init_tracing();
            let config = Arc::new(Config::from_env());
            wcp_server::run::run_server(config).await
        }
        Some(Command::Doctor) => {
            let config = Config::from_env();
            let passed = wcp_server::cli::doctor::run(&config).await?;
            if !passed {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Show)) => {
            wcp_server::cli::config::show(&Config::from_env());
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Validate)) => {
            if !wcp_server::cli::config::validate(&Config::from_env()) {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Migrate(MigrateCommand::Up)) => wcp_server::cli::migrate::up(&Config::from_env()).await,
        Some(Command::Migrate(MigrateCommand::Down)) => wcp_server::cli::migrate::down(&Config::from_env()).await,
        Some(Command::Migrate(MigrateCommand::Status)) => {
            wcp_server::cli::migrate::status(&Config::from_env()).await
        }
        Some(Command::Version) => {
            println!("wcp-server {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,wcp_server=debug")))
        .json()
        .init();
}
