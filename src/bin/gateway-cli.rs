use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use std::path::{Path, PathBuf};

use grain_gateway::config::load_config;
use grain_gateway::lifecycle::{build_catalog, build_route_table};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Management CLI for the Grain Gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[arg(short, long, default_value = "CHANGE_ME_IN_PRODUCTION")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a config file and print its route table
    Check {
        #[arg(short, long, default_value = "gateway.toml")]
        config: PathBuf,
    },
    /// Check gateway status
    Status,
    /// List registered routes
    Routes,
    /// List registered codecs
    Codecs,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let endpoint = match cli.command {
        Commands::Check { config } => return check(&config),
        Commands::Status => "status",
        Commands::Routes => "routes",
        Commands::Codecs => "codecs",
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let res = reqwest::Client::new()
        .get(format!("{}/admin/{}", cli.url.trim_end_matches('/'), endpoint))
        .headers(headers)
        .send()
        .await?;
    print_response(res).await
}

fn check(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = match load_config(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid config {}: {}", path.display(), e);
            std::process::exit(1);
        }
    };
    let catalog = build_catalog(&config);
    let table = build_route_table(&config, &catalog)?;

    println!("{} is valid: {} interfaces, {} routes", path.display(), catalog.len(), table.len());
    for (key, invoker) in table.entries() {
        println!(
            "  {:<7} {:<40} → {} ({})",
            key.verb.to_string(),
            key.pattern,
            invoker.method(),
            invoker.key_shape()
        );
    }
    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
