//! CLI integration tests

use mockito::{Matcher, Server};
use std::io::Write;
use std::process::{Command, Output};

/// Run the built binary with an isolated config and no inherited gateway URL
fn podlens(args: &[&str]) -> Output {
    let config_dir = tempfile::tempdir().expect("Failed to create temp dir");
    Command::new(env!("CARGO_BIN_EXE_podlens"))
        .args(args)
        .env_remove("PODLENS_API_URL")
        .env("PODLENS_CONFIG", config_dir.path().join("config.json"))
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

const ANALYSIS_BODY: &str = r#"{
  "historicalMetrics": [{
    "podName": "web-1",
    "namespace": "shop",
    "containerName": "nginx",
    "cpu": {"usage": [], "requests": [], "limits": [], "average": 0.05, "peak": 0.1, "minimum": 0.01, "p95": 0.08, "p99": 0.09, "trend": "increasing"},
    "memory": {"usage": [], "requests": [], "limits": [], "average": 67108864.0, "peak": 67108864.0, "minimum": 67108864.0, "p95": 67108864.0, "p99": 67108864.0, "trend": "stable"},
    "analysis": {
      "cpuEfficiency": 0.0,
      "memoryEfficiency": 25.0,
      "resourceWaste": {"cpuOverProvisioned": false, "memoryOverProvisioned": true, "cpuUnderProvisioned": false, "memoryUnderProvisioned": false, "cpuWastePercentage": 0.0, "memoryWastePercentage": 75.0},
      "recommendations": ["Consider reducing memory requests - current efficiency: 25.0%"],
      "patterns": {"peakHours": [], "lowUsageHours": [], "dailyVariation": 1.0, "weeklyVariation": 0.0}
    }
  }],
  "generatedAt": "2024-03-08T00:00:00Z",
  "timeRange": {"start": "2024-03-01T00:00:00Z", "end": "2024-03-08T00:00:00Z"},
  "summary": {"totalPodsAnalyzed": 1, "overProvisionedPods": 1, "underProvisionedPods": 0, "wellOptimizedPods": 0, "averageEfficiency": 12.5, "totalRecommendations": 1, "mostCommonRecommendation": "Consider reducing memory requests - current efficiency: 25.0%"}
}"#;

#[test]
fn test_cli_help() {
    let output = podlens(&["--help"]);
    let stdout = stdout(&output);

    assert!(output.status.success(), "CLI help should succeed");
    for command in ["namespaces", "pods", "analysis", "trends", "health"] {
        assert!(stdout.contains(command), "Should show {} command", command);
    }
    assert!(stdout.contains("--api-url"));
    assert!(stdout.contains("PODLENS_API_URL"));
    assert!(stdout.contains("--format"));
}

#[test]
fn test_cli_version() {
    let output = podlens(&["--version"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("podlens"));
}

#[test]
fn test_trends_requires_pod() {
    let output = podlens(&["trends", "--namespace", "shop"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("--pod"));
}

#[test]
fn test_invalid_command() {
    let output = podlens(&["invalid-command"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("error"));
}

#[test]
fn test_namespaces_json() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/api/namespaces")
        .with_header("content-type", "application/json")
        .with_body(r#"{"namespaces":["shop","billing"]}"#)
        .create();

    let output = podlens(&["--api-url", &server.url(), "--format", "json", "namespaces"]);
    mock.assert();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["namespaces"], serde_json::json!(["shop", "billing"]));
}

#[test]
fn test_pods_table_passes_namespace() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/api/pods")
        .match_query(Matcher::UrlEncoded("namespace".into(), "shop".into()))
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"pods":[{"name":"web-1","namespace":"shop","containerName":"nginx",
            "cpu":{"usage":"250m","request":"500m","limit":"0m","usageValue":0.25,"requestValue":0.5,"limitValue":0.0,"requestPercentage":50.0},
            "memory":{"usage":"128Mi","request":"0Mi","limit":"0Mi","usageValue":134217728.0,"requestValue":0.0,"limitValue":0.0,"requestPercentage":0.0}}]}"#,
        )
        .create();

    let output = podlens(&["--api-url", &server.url(), "pods", "--namespace", "shop"]);
    mock.assert();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let stdout = stdout(&output);
    assert!(stdout.contains("web-1"));
    assert!(stdout.contains("250m"));
    assert!(stdout.contains("50.0%"));
    assert!(stdout.contains("128Mi"));
}

#[test]
fn test_analysis_table_shows_summary() {
    let mut server = Server::new();
    server
        .mock("GET", "/api/pods/analysis")
        .with_header("content-type", "application/json")
        .with_body(ANALYSIS_BODY)
        .create();

    let output = podlens(&["--api-url", &server.url(), "analysis"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let stdout = stdout(&output);
    assert!(stdout.contains("nginx"));
    assert!(stdout.contains("increasing"));
    assert!(stdout.contains("25.0%"));
    assert!(stdout.contains("Over-provisioned:       1"));
    assert!(stdout.contains("Consider reducing memory requests"));
}

#[test]
fn test_trends_forwards_days() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/api/pods/trends")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("namespace".into(), "shop".into()),
            Matcher::UrlEncoded("pod".into(), "web-1".into()),
            Matcher::UrlEncoded("days".into(), "3".into()),
        ]))
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"podName":"web-1","namespace":"shop","containers":[],"daysAnalyzed":3,
            "generatedAt":"2024-03-08T00:00:00Z",
            "summary":{"overallTrend":"increasing","resourceRecommendations":["CPU usage is trending upward - monitor for potential scaling needs"],"riskLevel":"high","nextReviewDate":"2024-03-11T00:00:00Z"}}"#,
        )
        .create();

    let output = podlens(&[
        "--api-url",
        &server.url(),
        "trends",
        "--namespace",
        "shop",
        "--pod",
        "web-1",
        "--days",
        "3",
    ]);
    mock.assert();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let stdout = stdout(&output);
    assert!(stdout.contains("Risk level:             high"));
    assert!(stdout.contains("2024-03-11"));
    assert!(stdout.contains("trending upward"));
}

#[test]
fn test_api_error_message_is_reported() {
    let mut server = Server::new();
    server
        .mock("GET", "/api/pods/trends")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":"No trend data found for the specified pod","code":"not_found"}"#)
        .create();

    let output = podlens(&[
        "--api-url",
        &server.url(),
        "trends",
        "--namespace",
        "shop",
        "--pod",
        "ghost",
    ]);

    assert!(!output.status.success());
    let stderr = stderr(&output);
    assert!(stderr.contains("404"));
    assert!(stderr.contains("No trend data found for the specified pod"));
}

#[test]
fn test_config_file_supplies_url_and_namespace() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/api/pods/analysis")
        .match_query(Matcher::UrlEncoded("namespace".into(), "billing".into()))
        .with_header("content-type", "application/json")
        .with_body(ANALYSIS_BODY)
        .create();

    let mut config = tempfile::NamedTempFile::new().unwrap();
    write!(
        config,
        r#"{{"api_url": "{}", "default_namespace": "billing"}}"#,
        server.url()
    )
    .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_podlens"))
        .args(["--format", "json", "analysis"])
        .env_remove("PODLENS_API_URL")
        .env("PODLENS_CONFIG", config.path())
        .output()
        .expect("Failed to execute command");
    mock.assert();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["summary"]["totalPodsAnalyzed"], 1);
}

#[test]
fn test_health_table() {
    let mut server = Server::new();
    server
        .mock("GET", "/health")
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"status":"healthy","timestamp":"2024-03-08T00:00:00+00:00","metricsClient":"available",
            "metricsBackend":"vmagent","features":{"historicalAnalysis":true,"trendAnalysis":false},
            "components":{"metrics_backend":"degraded"}}"#,
        )
        .create();

    let output = podlens(&["--api-url", &server.url(), "health"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let stdout = stdout(&output);
    assert!(stdout.contains("vmagent"));
    assert!(stdout.contains("trendAnalysis"));
    assert!(stdout.contains("disabled"));
    assert!(stdout.contains("metrics_backend"));
    assert!(stdout.contains("degraded"));
}
