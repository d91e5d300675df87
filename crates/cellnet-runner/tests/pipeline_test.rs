//! End-to-end tests: scenario file in, planned network and report out.

use std::path::{Path, PathBuf};
use std::process::Command;

use cellnet_model::{OwnerId, SiteId, Technology};
use cellnet_radio::ValueDomain;
use cellnet_runner::{execute, Pipeline, PlanScenario, RunRequest, RunnerError};
use tempfile::TempDir;

const SCENARIO: &str = r#"
owners:
  - { id: acme, name: Acme, email: noc@acme.example }
  - { id: beta, name: Beta, email: ops@beta.example }
settings:
  acme:
    radio_plan:
      seed: 11
sites:
  - { owner: acme, id: a, position: { lon: 0.00, lat: 0.0 }, height_m: 30.0, technology: 2G }
  - { owner: acme, id: b, position: { lon: 0.02, lat: 0.0 }, height_m: 30.0, technology: 2G }
  - { owner: acme, id: c, position: { lon: 0.04, lat: 0.0 }, height_m: 30.0, technology: 2G }
  - { owner: acme, id: e, position: { lon: 0.07, lat: 0.0 }, height_m: 30.0, technology: 2G }
  - { owner: beta, id: x, position: { lon: 0.00, lat: 0.03 }, height_m: 40.0, technology: 2G }
terrain:
  kind: flat
  elevation_m: 5.0
"#;

fn write_scenario(dir: &Path) -> PathBuf {
    let path = dir.join("scenario.yaml");
    std::fs::write(&path, SCENARIO).unwrap();
    path
}

fn request(scenario: PathBuf, pipeline: Pipeline, output: Option<PathBuf>) -> RunRequest {
    RunRequest {
        scenario,
        owner: OwnerId::from("acme"),
        sites: vec![SiteId::from("a"), SiteId::from("b"), SiteId::from("c")],
        pipeline,
        domains: Vec::new(),
        seed: None,
        output,
    }
}

// ============================================================================
// Library runs
// ============================================================================

#[test]
fn test_links_pipeline_writes_reloadable_scenario() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("planned.yaml");
    let run = execute(&request(write_scenario(dir.path()), Pipeline::Links, Some(out.clone())))
        .unwrap();

    let links = run.report.links.as_ref().expect("links report");
    assert!(run.report.radio.is_none());
    assert_eq!(links.synthesis.backbone_link_ids.len(), 2);
    assert!(links.synthesis.boundary_private_link_id.is_some());
    assert!(links.synthesis.boundary_public_link_id.is_some());
    assert_eq!(links.synthesis.created_link_ids.len(), 4);
    assert_eq!(links.adjustment.links.len(), 4);
    assert!(links.adjustment.links.iter().all(|l| l.converged));

    let reloaded = PlanScenario::from_file(&out).unwrap();
    assert_eq!(reloaded.network.links.len(), 4);
    assert_eq!(reloaded.network.sites.len(), 5);

    // The written scenario can be planned again.
    let again = execute(&request(out, Pipeline::Links, None)).unwrap();
    let again = again.report.links.unwrap();
    assert_eq!(again.synthesis.deleted_link_ids.len(), 3);
    assert_eq!(again.synthesis.created_link_ids.len(), 3);
}

#[test]
fn test_radio_pipeline_assigns_every_2g_domain() {
    let dir = TempDir::new().unwrap();
    let run = execute(&request(write_scenario(dir.path()), Pipeline::Radio, None)).unwrap();

    let radio = run.report.radio.as_ref().expect("radio report");
    let domains: Vec<_> = radio.domains.iter().map(|d| d.domain).collect();
    assert_eq!(domains, ValueDomain::ALL.to_vec());
    assert!(radio.domains.iter().all(|d| d.seed == 11));

    assert_eq!(radio.domains[0].committed.len(), 3);
    assert_eq!(radio.domains[1].committed.len(), 3);
    assert!(radio.domains[2].skipped);

    for site in run.scenario.network.sites.iter().filter(|s| s.owner.as_str() == "acme") {
        let selected = ["a", "b", "c"].contains(&site.id.as_str());
        assert_eq!(site.channel.is_some(), selected, "{}", site.id);
        assert_eq!(site.cell_id.is_some(), selected, "{}", site.id);
        assert_eq!(site.technology, Technology::TwoG);
    }
}

#[test]
fn test_radio_pipeline_honours_domain_filter_and_seed() {
    let dir = TempDir::new().unwrap();
    let scenario = write_scenario(dir.path());

    let mut req = request(scenario, Pipeline::Radio, None);
    req.domains = vec![ValueDomain::TwoGCellId];
    req.seed = Some(99);

    let first = execute(&req).unwrap();
    let second = execute(&req).unwrap();

    let report = first.report.radio.as_ref().unwrap();
    assert_eq!(report.domains.len(), 1);
    assert_eq!(report.domains[0].seed, 99);
    assert!(first.scenario.network.sites.iter().all(|s| s.channel.is_none()));
    assert_eq!(first.report.radio, second.report.radio);
}

#[test]
fn test_plan_pipeline_writes_json_by_extension() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("planned.json");
    execute(&request(write_scenario(dir.path()), Pipeline::Plan, Some(out.clone()))).unwrap();

    let text = std::fs::read_to_string(&out).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert!(doc["generated_at"].is_string());
    assert_eq!(doc["pipeline"], "plan");
    assert!(doc["report"]["links"].is_object());
    assert!(doc["report"]["radio"]["domains"].is_array());
    assert_eq!(doc["terrain"]["kind"], "flat");

    let reloaded = PlanScenario::from_file(&out).unwrap();
    assert_eq!(reloaded.network.links.len(), 4);
}

#[test]
fn test_unknown_site_is_reported() {
    let dir = TempDir::new().unwrap();
    let mut req = request(write_scenario(dir.path()), Pipeline::Links, None);
    req.sites.push(SiteId::from("nope"));

    let err = execute(&req).unwrap_err();
    assert!(matches!(err, RunnerError::Link(_)), "{err}");
}

// ============================================================================
// Binary
// ============================================================================

#[test]
fn test_cli_radio_run() {
    let dir = TempDir::new().unwrap();
    let scenario = write_scenario(dir.path());
    let out = dir.path().join("out.yaml");

    let status = Command::new(env!("CARGO_BIN_EXE_cellnet"))
        .args(["radio", "--scenario"])
        .arg(&scenario)
        .args(["--owner", "acme", "--sites", "a,b", "--domain", "arfcn,bsic", "--seed", "3"])
        .arg("--output")
        .arg(&out)
        .status()
        .expect("Failed to run cellnet");
    assert!(status.success());

    let planned = PlanScenario::from_file(&out).unwrap();
    let assigned = planned
        .network
        .sites
        .iter()
        .filter(|s| s.channel.is_some() && s.cell_id.is_some())
        .count();
    assert_eq!(assigned, 2);
}

#[test]
fn test_cli_prints_yaml_and_fails_on_bad_input() {
    let dir = TempDir::new().unwrap();
    let scenario = write_scenario(dir.path());

    let ok = Command::new(env!("CARGO_BIN_EXE_cellnet"))
        .args(["links", "--scenario"])
        .arg(&scenario)
        .args(["--owner", "acme", "--sites", "a,b,c"])
        .output()
        .expect("Failed to run cellnet");
    assert!(ok.status.success());
    let stdout = String::from_utf8_lossy(&ok.stdout);
    assert!(stdout.contains("generated_at:"));
    assert!(stdout.contains("backbone_link_ids:"));

    let bad = Command::new(env!("CARGO_BIN_EXE_cellnet"))
        .args(["links", "--scenario"])
        .arg(&scenario)
        .args(["--owner", "nobody", "--sites", "a"])
        .output()
        .expect("Failed to run cellnet");
    assert!(!bad.status.success());
    assert!(String::from_utf8_lossy(&bad.stderr).contains("error"));
}
