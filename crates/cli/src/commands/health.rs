//! Gateway health command

use anyhow::Result;
use colored::Colorize;
use tabled::Tabled;

use crate::client::{ApiClient, GatewayHealth};
use crate::output::{color_status, format_timestamp, print_json, print_table, OutputFormat};

#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Component")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
}

pub async fn show_health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let health: GatewayHealth = client.get("health", &[]).await?;

    if let OutputFormat::Json = format {
        return print_json(&health);
    }

    println!("{}", "Gateway Health".bold());
    println!("{}", "=".repeat(50));
    println!("Status:                 {}", color_status(&health.status));
    println!("Metrics backend:        {}", health.metrics_backend.cyan());
    println!("Metrics client:         {}", color_status(&health.metrics_client));
    println!("Checked at:             {}", format_timestamp(&health.timestamp).dimmed());

    if !health.features.is_empty() {
        println!();
        println!("{}", "Features".bold());
        println!("{}", "-".repeat(50));
        for (feature, enabled) in &health.features {
            let state = if *enabled {
                "enabled".green()
            } else {
                "disabled".red()
            };
            println!("{:<24}{}", feature, state);
        }
    }

    println!();
    print_table(
        health
            .components
            .iter()
            .map(|(name, status)| ComponentRow {
                name: name.clone(),
                status: color_status(status),
            })
            .collect(),
    );

    Ok(())
}
