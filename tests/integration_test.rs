// Integration tests for recon-pilot
use anyhow::Result;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use recon_pilot::artifacts;
use recon_pilot::config::Scope;
use recon_pilot::ct_log::CtClient;
use recon_pilot::dns::RecordSource;
use recon_pilot::output::Console;
use recon_pilot::rules::RuleSet;
use recon_pilot::runner::{run_recon, RunOptions};
use recon_pilot::types::RecordKind;

use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// DNS answers served from memory
#[derive(Default)]
struct StaticRecords {
    answers: HashMap<(String, RecordKind), Vec<String>>,
}

impl StaticRecords {
    fn with(mut self, host: &str, kind: RecordKind, values: &[&str]) -> Self {
        self.answers.insert(
            (host.to_string(), kind),
            values.iter().map(|v| v.to_string()).collect(),
        );
        self
    }
}

#[async_trait]
impl RecordSource for StaticRecords {
    async fn lookup(&self, host: &str, kind: RecordKind) -> Result<Vec<String>> {
        match self.answers.get(&(host.to_string(), kind)) {
            Some(values) => Ok(values.clone()),
            None => anyhow::bail!("NXDOMAIN"),
        }
    }
}

/// Console sink that breaks once `marker` has been written
struct BrokenPipeAfter {
    marker: &'static str,
    seen: String,
}

impl Write for BrokenPipeAfter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.seen.push_str(&String::from_utf8_lossy(buf));
        if self.seen.contains(self.marker) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "reader went away"));
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn scope_for(server: &MockServer, domains: &[&str], seeds: &[&str]) -> Scope {
    let toml_content = format!(
        r#"
org = "Acme Corp"
domains = {domains:?}
notes = "integration test"

[seeds]
hosts = {seeds:?}

[sources]
ct_url = "{uri}/"
ct_delay_ms = 0
request_timeout_secs = 5
        "#,
        domains = domains,
        seeds = seeds,
        uri = server.uri(),
    );

    Scope::from_toml(&toml_content).expect("valid scope")
}

async fn mount_ct(server: &MockServer, domain: &str, body: Value) {
    Mock::given(method("GET"))
        .and(query_param("q", format!("%.{}", domain)))
        .and(query_param("output", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn options(out: &Path, day: u32) -> RunOptions {
    let mut opts = RunOptions::new(out);
    opts.started_at = Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap();
    opts
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_end_to_end_run() {
    let server = MockServer::start().await;
    mount_ct(
        &server,
        "example.com",
        json!([
            {"common_name": "www.example.com", "name_value": "example.com\nwww.example.com\n*.example.com"},
            {"common_name": "shop.example.com", "name_value": "SHOP.example.com\nevil.com"},
            {"common_name": null, "name_value": "api.example.com"}
        ]),
    )
    .await;

    let out = TempDir::new().unwrap();
    let scope = scope_for(&server, &["example.com"], &["VPN.example.com ", "partner.example.net"]);
    let rules = RuleSet::builtin().unwrap();
    let ct = CtClient::from_config(&scope.sources).unwrap();
    let dns = StaticRecords::default()
        .with("www.example.com", RecordKind::A, &["192.0.2.10"])
        .with("shop.example.com", RecordKind::Cname, &["acme-shop.herokuapp.com."])
        .with("api.example.com", RecordKind::Cname, &["edge.example.org."]);

    let mut console = Console::silent();
    let outcome = run_recon(&scope, &rules, &ct, &dns, &options(out.path(), 1), &mut console)
        .await
        .unwrap();

    assert_eq!(outcome.run_name, "run-20240501-120000Z");
    assert_eq!(
        outcome.hosts,
        vec!["api.example.com", "shop.example.com", "vpn.example.com", "www.example.com"]
    );

    let artifacts_dir = outcome.run_dir.join(artifacts::ARTIFACTS_DIR);

    // CT results are filtered to scope
    let ct_hosts = read_json(&artifacts_dir.join("ct_example.com.json"));
    assert_eq!(ct_hosts, json!(["api.example.com", "shop.example.com", "www.example.com"]));

    let seeds = read_json(&artifacts_dir.join(artifacts::SEED_HOSTS_FILE));
    assert_eq!(seeds, json!(["vpn.example.com"]));

    let inventory = read_json(&artifacts_dir.join(artifacts::INVENTORY_FILE));
    assert_eq!(inventory.as_array().unwrap().len(), 4);

    let records = read_json(&artifacts_dir.join(artifacts::DNS_RECORDS_FILE));
    let shop = records
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["host"] == "shop.example.com")
        .unwrap();
    assert_eq!(shop["records"]["CNAME"], json!(["acme-shop.herokuapp.com."]));

    let issues = read_json(&artifacts_dir.join(artifacts::DNS_ISSUES_FILE));
    assert_eq!(
        issues,
        json!([{"host": "shop.example.com", "type": "dangling_cname_potential", "evidence": ["acme-shop.herokuapp.com."]}])
    );

    assert_eq!(outcome.findings.len(), 1);
    assert_eq!(outcome.findings[0].title, "Potential Dangling CNAME");
    assert_eq!(outcome.findings[0].asset, "shop.example.com");

    // First run has nothing to compare
    let delta = read_json(&artifacts_dir.join(artifacts::DELTA_FILE));
    assert_eq!(delta["previous_run"], Value::Null);
    assert_eq!(delta["new_count"], 0);
    assert_eq!(delta["new_hosts"], json!([]));
    assert_eq!(outcome.stats.total_subdomains, 4);
    assert_eq!(outcome.stats.new_subdomains, 0);

    // Reports
    let md = fs::read_to_string(&outcome.casefile_md).unwrap();
    assert!(md.contains("# ReconPilot Casefile: Acme Corp"));
    assert!(md.contains("First run"));
    assert!(md.contains("| `www.example.com` | A:1 |"));
    assert!(md.contains("| `vpn.example.com` | (no records) |"));

    let html_path = outcome.casefile_html.as_ref().unwrap();
    let html = fs::read_to_string(html_path).unwrap();
    assert!(html.contains("<title>ReconPilot Casefile - Acme Corp</title>"));

    // Manifest covers every artifact
    let manifest = read_json(&artifacts_dir.join(artifacts::MANIFEST_FILE));
    for name in [
        "ct_example.com.json",
        artifacts::SEED_HOSTS_FILE,
        artifacts::INVENTORY_FILE,
        artifacts::DNS_RECORDS_FILE,
        artifacts::DNS_ISSUES_FILE,
        artifacts::FINDINGS_FILE,
        artifacts::DELTA_FILE,
    ] {
        assert_eq!(manifest[name].as_str().unwrap().len(), 64, "{}", name);
    }
}

#[tokio::test]
async fn test_second_run_reports_delta() {
    let server = MockServer::start().await;
    mount_ct(&server, "example.com", json!([{"name_value": "a.example.com\nb.example.com"}])).await;

    let out = TempDir::new().unwrap();
    let scope = scope_for(&server, &["example.com"], &[]);
    let rules = RuleSet::builtin().unwrap();
    let ct = CtClient::from_config(&scope.sources).unwrap();
    let dns = StaticRecords::default();
    let mut console = Console::silent();

    let first = run_recon(&scope, &rules, &ct, &dns, &options(out.path(), 1), &mut console)
        .await
        .unwrap();
    assert!(first.delta.previous_run.is_none());

    server.reset().await;
    mount_ct(&server, "example.com", json!([{"name_value": "b.example.com\nc.example.com"}])).await;

    let second = run_recon(&scope, &rules, &ct, &dns, &options(out.path(), 2), &mut console)
        .await
        .unwrap();

    assert_eq!(second.delta.previous_run.as_deref(), Some("run-20240501-120000Z"));
    assert_eq!(second.delta.new_hosts, vec!["c.example.com"]);
    assert_eq!(second.delta.removed_hosts, vec!["a.example.com"]);
    assert_eq!(second.stats.new_subdomains, 1);

    let md = fs::read_to_string(&second.casefile_md).unwrap();
    assert!(md.contains("Compared against `run-20240501-120000Z`."));
    assert!(md.contains("- `c.example.com`"));

    // Runs are immutable: the same stamp cannot be reused
    let again = run_recon(&scope, &rules, &ct, &dns, &options(out.path(), 2), &mut console).await;
    assert!(again.is_err());
}

#[tokio::test]
async fn test_malformed_previous_inventory_treated_as_empty() {
    let server = MockServer::start().await;
    mount_ct(&server, "example.com", json!([{"name_value": "a.example.com"}])).await;

    let out = TempDir::new().unwrap();
    let broken = out.path().join("run-20240401-000000Z").join(artifacts::ARTIFACTS_DIR);
    fs::create_dir_all(&broken).unwrap();
    fs::write(broken.join(artifacts::INVENTORY_FILE), "{ not json").unwrap();

    let scope = scope_for(&server, &["example.com"], &[]);
    let ct = CtClient::from_config(&scope.sources).unwrap();
    let mut console = Console::silent();

    let outcome = run_recon(
        &scope,
        &RuleSet::builtin().unwrap(),
        &ct,
        &StaticRecords::default(),
        &options(out.path(), 1),
        &mut console,
    )
    .await
    .unwrap();

    assert_eq!(outcome.delta.previous_run.as_deref(), Some("run-20240401-000000Z"));
    assert_eq!(outcome.delta.new_hosts, vec!["a.example.com"]);
    assert!(outcome.delta.removed_hosts.is_empty());
}

#[tokio::test]
async fn test_ct_failure_yields_zero_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("q", "%.example.com"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("q", "%.acme.io"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let scope = scope_for(&server, &["example.com", "acme.io"], &["www.acme.io"]);
    let ct = CtClient::from_config(&scope.sources).unwrap();
    let mut console = Console::silent();

    let outcome = run_recon(
        &scope,
        &RuleSet::builtin().unwrap(),
        &ct,
        &StaticRecords::default(),
        &options(out.path(), 1),
        &mut console,
    )
    .await
    .unwrap();

    assert_eq!(outcome.hosts, vec!["www.acme.io"]);
    let artifacts_dir = outcome.run_dir.join(artifacts::ARTIFACTS_DIR);
    assert_eq!(read_json(&artifacts_dir.join("ct_example.com.json")), json!([]));
    assert_eq!(read_json(&artifacts_dir.join("ct_acme.io.json")), json!([]));
}

#[tokio::test]
async fn test_wildcard_exposure_finding() {
    let server = MockServer::start().await;
    let names: Vec<String> = (0..30).map(|i| format!("svc{}.example.com", i)).collect();
    mount_ct(&server, "example.com", json!([{"name_value": names.join("\n")}])).await;

    let out = TempDir::new().unwrap();
    let scope = scope_for(&server, &["example.com"], &[]);
    let ct = CtClient::from_config(&scope.sources).unwrap();
    let mut console = Console::silent();

    let mut opts = options(out.path(), 1);
    opts.write_html = false;

    let outcome = run_recon(
        &scope,
        &RuleSet::builtin().unwrap(),
        &ct,
        &StaticRecords::default(),
        &opts,
        &mut console,
    )
    .await
    .unwrap();

    assert!(outcome.casefile_html.is_none());
    assert_eq!(outcome.findings.len(), 1);
    assert_eq!(outcome.findings[0].title, "Potential Wildcard Exposure");
    assert_eq!(outcome.findings[0].asset, "example.com");
    assert_eq!(outcome.findings[0].evidence, "30 subdomains observed in CT for example.com");
}

#[tokio::test]
async fn test_aborted_run_is_not_used_as_previous_run() {
    let server = MockServer::start().await;
    mount_ct(&server, "example.com", json!([{"name_value": "a.example.com"}])).await;

    let out = TempDir::new().unwrap();
    let completed = out.path().join("run-20240401-000000Z").join(artifacts::ARTIFACTS_DIR);
    fs::create_dir_all(&completed).unwrap();
    fs::write(completed.join(artifacts::INVENTORY_FILE), r#"["a.example.com"]"#).unwrap();

    let scope = scope_for(&server, &["example.com"], &[]);
    let rules = RuleSet::builtin().unwrap();
    let ct = CtClient::from_config(&scope.sources).unwrap();
    let dns = StaticRecords::default();

    // Console output fails after CT artifacts are already written
    let mut broken = Console::to_writer(Box::new(BrokenPipeAfter {
        marker: "resolving",
        seen: String::new(),
    }));
    let aborted = run_recon(&scope, &rules, &ct, &dns, &options(out.path(), 1), &mut broken).await;
    assert!(aborted.is_err());

    let mut entries: Vec<String> = fs::read_dir(out.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    entries.sort();
    assert_eq!(entries, vec!["run-20240401-000000Z"]);

    let mut console = Console::silent();
    let next = run_recon(&scope, &rules, &ct, &dns, &options(out.path(), 2), &mut console)
        .await
        .unwrap();

    assert_eq!(next.delta.previous_run.as_deref(), Some("run-20240401-000000Z"));
    assert!(next.delta.new_hosts.is_empty());
    assert!(next.delta.removed_hosts.is_empty());
}
