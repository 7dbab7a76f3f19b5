//! Namespace listing and current usage

use anyhow::Result;
use podlens_lib::{NamespaceList, PodMetricsList};
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{percent_of_request, print_json, print_table, OutputFormat};

#[derive(Tabled)]
struct NamespaceRow {
    #[tabled(rename = "Namespace")]
    name: String,
}

/// Row for the current usage table
#[derive(Tabled)]
struct PodRow {
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Pod")]
    pod: String,
    #[tabled(rename = "Container")]
    container: String,
    #[tabled(rename = "CPU")]
    cpu: String,
    #[tabled(rename = "CPU Req")]
    cpu_request: String,
    #[tabled(rename = "CPU Lim")]
    cpu_limit: String,
    #[tabled(rename = "CPU %Req")]
    cpu_percentage: String,
    #[tabled(rename = "Memory")]
    memory: String,
    #[tabled(rename = "Mem Req")]
    memory_request: String,
    #[tabled(rename = "Mem Lim")]
    memory_limit: String,
    #[tabled(rename = "Mem %Req")]
    memory_percentage: String,
}

pub async fn list_namespaces(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let result: NamespaceList = client.get("api/namespaces", &[]).await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => print_table(
            result
                .namespaces
                .into_iter()
                .map(|name| NamespaceRow { name })
                .collect(),
        ),
    }

    Ok(())
}

/// Show current usage, optionally for one namespace
pub async fn show_pods(
    client: &ApiClient,
    namespace: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let query: Vec<(&str, String)> = namespace.map(|ns| ("namespace", ns)).into_iter().collect();
    let result: PodMetricsList = client.get("api/pods", &query).await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => print_table(
            result
                .pods
                .into_iter()
                .map(|pod| PodRow {
                    cpu_percentage: percent_of_request(&pod.cpu),
                    memory_percentage: percent_of_request(&pod.memory),
                    namespace: pod.namespace,
                    pod: pod.name,
                    container: pod.container_name,
                    cpu: pod.cpu.usage,
                    cpu_request: pod.cpu.request,
                    cpu_limit: pod.cpu.limit,
                    memory: pod.memory.usage,
                    memory_request: pod.memory.request,
                    memory_limit: pod.memory.limit,
                })
                .collect(),
        ),
    }

    Ok(())
}
