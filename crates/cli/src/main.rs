//! podlens CLI
//!
//! A command-line client for the pod resource metrics gateway: current
//! usage, historical efficiency analysis and per-pod trends.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{analysis, health, pods};
use std::path::PathBuf;

/// Used when neither the flag, the environment nor the config file name a gateway
const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Pod resource metrics CLI
#[derive(Parser)]
#[command(name = "podlens")]
#[command(author, version, about = "CLI for the pod resource metrics gateway", long_about = None)]
pub struct Cli {
    /// Gateway URL (can also be set via PODLENS_API_URL env var)
    #[arg(long, env = "PODLENS_API_URL")]
    pub api_url: Option<String>,

    /// Config file (defaults to ~/.config/podlens/config.json)
    #[arg(long, env = "PODLENS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List namespaces known to the metrics backend
    Namespaces,

    /// Show current usage against requests and limits
    Pods {
        /// Filter by namespace
        #[arg(long, short)]
        namespace: Option<String>,
    },

    /// Show the historical efficiency analysis
    Analysis {
        /// Filter by namespace
        #[arg(long, short)]
        namespace: Option<String>,
    },

    /// Show usage trends of a single pod
    Trends {
        /// Namespace of the pod
        #[arg(long, short)]
        namespace: Option<String>,

        /// Pod name
        #[arg(long, short)]
        pod: String,

        /// Days of history to analyze
        #[arg(long, short)]
        days: Option<u32>,
    },

    /// Show gateway health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => config::Config::load_from(path)?,
        None => config::Config::load()?,
    };

    let api_url = cli
        .api_url
        .clone()
        .or_else(|| config.api_url.clone())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let client = client::ApiClient::new(&api_url)?;

    match cli.command {
        Commands::Namespaces => {
            pods::list_namespaces(&client, cli.format).await?;
        }
        Commands::Pods { namespace } => {
            let namespace = config.namespace_or_default(namespace);
            pods::show_pods(&client, namespace, cli.format).await?;
        }
        Commands::Analysis { namespace } => {
            let namespace = config.namespace_or_default(namespace);
            analysis::show_analysis(&client, namespace, cli.format).await?;
        }
        Commands::Trends {
            namespace,
            pod,
            days,
        } => {
            let Some(namespace) = config.namespace_or_default(namespace) else {
                anyhow::bail!("--namespace is required (or set default_namespace in the config file)");
            };
            analysis::show_trends(&client, &namespace, &pod, days, cli.format).await?;
        }
        Commands::Health => {
            health::show_health(&client, cli.format).await?;
        }
    }

    Ok(())
}
