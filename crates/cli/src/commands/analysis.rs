//! Historical analysis and pod trend commands

use anyhow::Result;
use colored::Colorize;
use podlens_lib::format::{format_cpu, format_memory};
use podlens_lib::{HistoricalAnalysisList, PodTrendAnalysis};
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{
    color_efficiency, color_risk, color_trend, format_percent, print_info, print_json,
    print_table, print_warning, OutputFormat,
};

/// Row for the analysis table
#[derive(Tabled)]
struct AnalysisRow {
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Pod")]
    pod: String,
    #[tabled(rename = "Container")]
    container: String,
    #[tabled(rename = "CPU Avg")]
    cpu_average: String,
    #[tabled(rename = "CPU Eff")]
    cpu_efficiency: String,
    #[tabled(rename = "CPU Trend")]
    cpu_trend: String,
    #[tabled(rename = "Mem Avg")]
    memory_average: String,
    #[tabled(rename = "Mem Eff")]
    memory_efficiency: String,
    #[tabled(rename = "Mem Trend")]
    memory_trend: String,
}

/// Row for the per-container trends table
#[derive(Tabled)]
struct TrendRow {
    #[tabled(rename = "Container")]
    container: String,
    #[tabled(rename = "CPU Avg")]
    cpu_average: String,
    #[tabled(rename = "CPU P95")]
    cpu_p95: String,
    #[tabled(rename = "CPU Trend")]
    cpu_trend: String,
    #[tabled(rename = "Mem Avg")]
    memory_average: String,
    #[tabled(rename = "Mem P95")]
    memory_p95: String,
    #[tabled(rename = "Mem Trend")]
    memory_trend: String,
}

/// Show the historical analysis with its summary
pub async fn show_analysis(
    client: &ApiClient,
    namespace: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let query: Vec<(&str, String)> = namespace.map(|ns| ("namespace", ns)).into_iter().collect();
    let result: HistoricalAnalysisList = client.get("api/pods/analysis", &query).await?;

    if let OutputFormat::Json = format {
        return print_json(&result);
    }

    println!("{}", "Historical Analysis".bold());
    println!("{}", "=".repeat(50));
    println!(
        "Window:                 {} to {}",
        result.time_range.start.format("%Y-%m-%d %H:%M"),
        result.time_range.end.format("%Y-%m-%d %H:%M")
    );
    println!();

    print_table(
        result
            .historical_metrics
            .iter()
            .map(|m| AnalysisRow {
                namespace: m.namespace.clone(),
                pod: m.pod_name.clone(),
                container: m.container_name.clone(),
                cpu_average: format_cpu(m.cpu.average),
                cpu_efficiency: color_efficiency(m.analysis.cpu_efficiency),
                cpu_trend: color_trend(m.cpu.trend),
                memory_average: format_memory(m.memory.average),
                memory_efficiency: color_efficiency(m.analysis.memory_efficiency),
                memory_trend: color_trend(m.memory.trend),
            })
            .collect(),
    );

    let summary = &result.summary;
    println!();
    println!("{}", "Summary".bold());
    println!("{}", "-".repeat(50));
    println!("Containers analyzed:    {}", summary.total_pods_analyzed);
    println!("Over-provisioned:       {}", summary.over_provisioned_pods);
    println!("Under-provisioned:      {}", summary.under_provisioned_pods);
    println!("Well optimized:         {}", summary.well_optimized_pods);
    println!("Average efficiency:     {}", format_percent(summary.average_efficiency));
    if !summary.most_common_recommendation.is_empty() {
        println!();
        print_info(&summary.most_common_recommendation);
    }

    Ok(())
}

/// Show growth trends and risk of one pod
pub async fn show_trends(
    client: &ApiClient,
    namespace: &str,
    pod: &str,
    days: Option<u32>,
    format: OutputFormat,
) -> Result<()> {
    let mut query = vec![("namespace", namespace.to_string()), ("pod", pod.to_string())];
    if let Some(days) = days {
        query.push(("days", days.to_string()));
    }
    let result: PodTrendAnalysis = client.get("api/pods/trends", &query).await?;

    if let OutputFormat::Json = format {
        return print_json(&result);
    }

    println!("{}", "Pod Trends".bold());
    println!("{}", "=".repeat(50));
    println!("Pod:                    {}", result.pod_name.cyan());
    println!("Namespace:              {}", result.namespace.cyan());
    println!("Days analyzed:          {}", result.days_analyzed);
    println!();

    print_table(
        result
            .containers
            .iter()
            .map(|c| TrendRow {
                container: c.container_name.clone(),
                cpu_average: format_cpu(c.cpu.average),
                cpu_p95: format_cpu(c.cpu.p95),
                cpu_trend: color_trend(c.cpu.trend),
                memory_average: format_memory(c.memory.average),
                memory_p95: format_memory(c.memory.p95),
                memory_trend: color_trend(c.memory.trend),
            })
            .collect(),
    );

    let summary = &result.summary;
    println!();
    println!("Overall trend:          {}", color_trend(summary.overall_trend));
    println!("Risk level:             {}", color_risk(summary.risk_level));
    match summary.next_review_date {
        Some(date) => println!("Next review:            {}", date.format("%Y-%m-%d")),
        None => println!("Next review:            {}", "-".dimmed()),
    }

    if !summary.resource_recommendations.is_empty() {
        println!();
        println!("{}", "Recommendations".bold());
        println!("{}", "-".repeat(50));
        for rec in &summary.resource_recommendations {
            print_warning(rec);
        }
    }

    Ok(())
}
