use std::process::ExitCode;

use clap::Parser;
use registro_core::DataProvider;
use tracing_subscriber::EnvFilter;

mod commands;
mod settings;

use commands::Command;

/// Manage subdomain registrations through the registry API.
///
/// Connection settings come from `DNS_ADMIN_*` environment variables.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Resource name, overriding DNS_ADMIN_RESOURCE
    #[arg(long, global = true)]
    resource: Option<String>,

    #[command(subcommand)]
    command: Command,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match settings::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::from(2);
        }
    };

    if matches!(cli.command, Command::Check) {
        tracing::info!(api_url = %config.api_url, resource = %config.resource, "Configuration is valid.");
        return ExitCode::SUCCESS;
    }

    let resource = cli.resource.unwrap_or_else(|| config.resource.clone());
    let provider = DataProvider::from_config(&config);

    let output = commands::run(&provider, &resource, cli.command).and_then(|value| {
        serde_json::to_string_pretty(&value).map_err(anyhow::Error::from)
    });
    match output {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
