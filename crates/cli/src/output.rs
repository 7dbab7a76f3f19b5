//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use podlens_lib::{ResourceMetrics, RiskLevel, Trend};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print the raw response as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a rounded table, or a notice when there are no rows
pub fn print_table<T: Tabled>(rows: Vec<T>) {
    if rows.is_empty() {
        println!("{}", "No items found".yellow());
        return;
    }
    println!("{}", Table::new(rows).with(Style::rounded()));
}

pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Usage as a share of the request, `-` when no request is set
pub fn percent_of_request(metrics: &ResourceMetrics) -> String {
    if metrics.request_value > 0.0 {
        format_percent(metrics.request_percentage)
    } else {
        "-".to_string()
    }
}

/// Color an efficiency by provisioning band
pub fn color_efficiency(value: f64) -> String {
    let formatted = format_percent(value);
    if value == 0.0 {
        formatted.dimmed().to_string()
    } else if value < 30.0 {
        formatted.yellow().to_string()
    } else if value > 80.0 {
        formatted.red().to_string()
    } else {
        formatted.green().to_string()
    }
}

pub fn color_trend(trend: Trend) -> String {
    let label = trend.as_str();
    match trend {
        Trend::Increasing => label.red().to_string(),
        Trend::Decreasing => label.blue().to_string(),
        Trend::Stable => label.green().to_string(),
        Trend::Unknown | Trend::InsufficientData => label.dimmed().to_string(),
    }
}

pub fn color_risk(risk: RiskLevel) -> String {
    let label = risk.as_str();
    match risk {
        RiskLevel::High => label.red().bold().to_string(),
        RiskLevel::Medium => label.yellow().to_string(),
        RiskLevel::Low => label.green().to_string(),
        RiskLevel::Unknown => label.dimmed().to_string(),
    }
}

/// Color status based on value
pub fn color_status(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "healthy" | "available" => status.green().to_string(),
        "degraded" => status.yellow().to_string(),
        "unhealthy" => status.red().to_string(),
        _ => status.to_string(),
    }
}

/// Format an RFC 3339 timestamp for display
pub fn format_timestamp(ts: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(ts) {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        ts.to_string()
    }
}
