use anyhow::{Context, Result};
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const SENSOR_RULE: &str = r#"
@prefix ex: <http://example.org/> .
@prefix sh: <http://www.w3.org/ns/shacl#> .

ex:SensorShape a sh:NodeShape ;
    sh:targetClass ex:Sensor ;
    sh:property [ sh:path ex:hasReading ; sh:minCount 1 ] .
"#;

const SENSOR_OK: &str = r#"{
  "@context": {"ex": "http://example.org/"},
  "@graph": [{"@id": "ex:s1", "@type": "ex:Sensor", "ex:hasReading": {"@id": "ex:r1"}}]
}"#;

const SENSOR_SILENT: &str = r#"{
  "@context": {"ex": "http://example.org/"},
  "@graph": [{"@id": "ex:s1", "@type": "ex:Sensor"}]
}"#;

const SUPPLY_POINTS: &str =
    "CGP;Supply Point Name;Potencia\nCGP-1;SP-1;5.75\nCGP-2;SP-2;3.45\n";

/// Isolated working directory: registry and config land in a tempdir.
struct DigichecksTestEnv {
    _tmp: TempDir,
    root: PathBuf,
}

impl DigichecksTestEnv {
    fn new() -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let root = tmp.path().to_path_buf();
        Ok(Self { _tmp: tmp, root })
    }

    fn write(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.root.join(name);
        fs::write(&path, content)?;
        Ok(path)
    }

    fn digichecks(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("digichecks"));
        cmd.current_dir(&self.root)
            .env_remove("DIGICHECKS_FERNET_KEY")
            .env_remove("DIGICHECKS_REGISTRY")
            .env_remove("DIGICHECKS_CONFIG")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Runs the command and returns the last word of stdout (the created id).
    fn created_id(&self, args: &[&str]) -> Result<String> {
        let output = self.digichecks().args(args).output()?;
        assert!(
            output.status.success(),
            "{}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout)?
            .split_whitespace()
            .last()
            .map(str::to_string)
            .context("No id printed")
    }

    fn hosted_check(&self) -> Result<(String, String)> {
        let company = self.created_id(&["companies", "add", "--name", "acme"])?;
        let rule = self.write("sensors.ttl", SENSOR_RULE)?;
        let check = self.created_id(&[
            "checks",
            "add",
            "--company",
            company.as_str(),
            "--name",
            "Sensors report readings",
            "--rule-file",
            path_str(&rule),
        ])?;
        Ok((company, check))
    }
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap_or_default()
}

#[test]
fn test_vault_keygen_prints_a_fernet_key() -> Result<()> {
    let env = DigichecksTestEnv::new()?;
    let output = env.digichecks().args(["vault", "keygen"]).output()?;
    assert!(output.status.success());
    let key = String::from_utf8(output.stdout)?;
    assert_eq!(key.trim().len(), 44);
    Ok(())
}

#[test]
fn test_convert_csv_to_jsonld() -> Result<()> {
    let env = DigichecksTestEnv::new()?;
    let input = env.write("points.csv", SUPPLY_POINTS)?;

    let output = env
        .digichecks()
        .args(["convert", "--input", path_str(&input), "--type", "csv"])
        .output()?;
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let document: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert!(document["@context"].is_array());
    let nodes = document["@graph"].as_array().context("@graph missing")?;
    assert_eq!(nodes.len(), 2);
    assert!(
        nodes
            .iter()
            .all(|n| n["@type"] == "realia_otl:ElectricitySupplyPoint")
    );
    Ok(())
}

#[test]
fn test_convert_rejects_unknown_dataset_type() -> Result<()> {
    let env = DigichecksTestEnv::new()?;
    let input = env.write("points.csv", SUPPLY_POINTS)?;

    env.digichecks()
        .args(["convert", "--input", path_str(&input), "--type", "parquet"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unsupported dataset type 'parquet'"));
    Ok(())
}

#[test]
fn test_hosted_check_passes_and_fails() -> Result<()> {
    let env = DigichecksTestEnv::new()?;
    let (company, check) = env.hosted_check()?;
    assert!(env.root.join("registry.yaml").exists());

    let ok = env.write("ok.jsonld", SENSOR_OK)?;
    env.digichecks()
        .args([
            "run",
            "--company",
            company.as_str(),
            "--check",
            check.as_str(),
            "--document",
            path_str(&ok),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Result: Pass"))
        .stdout(predicate::str::contains("Conforms: True"));

    let silent = env.write("silent.jsonld", SENSOR_SILENT)?;
    env.digichecks()
        .args([
            "run",
            "--company",
            company.as_str(),
            "--check",
            check.as_str(),
            "--document",
            path_str(&silent),
        ])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Result: Fail"))
        .stdout(predicate::str::contains("ex:s1"));
    Ok(())
}

#[test]
fn test_run_json_output() -> Result<()> {
    let env = DigichecksTestEnv::new()?;
    let (company, check) = env.hosted_check()?;
    let ok = env.write("ok.jsonld", SENSOR_OK)?;

    let output = env
        .digichecks()
        .args([
            "run",
            "--company",
            company.as_str(),
            "--check",
            check.as_str(),
            "--document",
            path_str(&ok),
            "--format",
            "json",
        ])
        .output()?;
    assert!(output.status.success());

    let verdict: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(verdict["check_id"], check.as_str());
    assert_eq!(verdict["check_result"], "Pass");
    Ok(())
}

#[test]
fn test_checks_are_scoped_to_their_company() -> Result<()> {
    let env = DigichecksTestEnv::new()?;
    let (company, check) = env.hosted_check()?;
    let other = env.created_id(&["companies", "add", "--name", "globex"])?;
    let ok = env.write("ok.jsonld", SENSOR_OK)?;

    env.digichecks()
        .args(["checks", "list", "--company", company.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains(check.as_str()))
        .stdout(predicate::str::contains("digichecks_hosted"));

    env.digichecks()
        .args([
            "run",
            "--company",
            other.as_str(),
            "--check",
            check.as_str(),
            "--document",
            path_str(&ok),
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not found"));
    Ok(())
}

#[test]
fn test_connector_requires_vault_key_and_stores_ciphertext() -> Result<()> {
    let env = DigichecksTestEnv::new()?;
    let company = env.created_id(&["companies", "add", "--name", "acme"])?;
    let add = |cmd: &mut Command| {
        cmd.args([
            "connectors",
            "add",
            "--company",
            company.as_str(),
            "--name",
            "rules api",
            "--username",
            "alice",
            "--password",
            "hunter2-very-secret",
        ]);
    };

    let mut cmd = env.digichecks();
    add(&mut cmd);
    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("No vault key configured"));

    let key_output = env.digichecks().args(["vault", "keygen"]).output()?;
    let key = String::from_utf8(key_output.stdout)?.trim().to_string();

    let mut cmd = env.digichecks();
    add(&mut cmd);
    cmd.env("DIGICHECKS_FERNET_KEY", &key)
        .assert()
        .success()
        .stdout(predicate::str::contains("Connector created: cn_"));

    let registry = fs::read_to_string(env.root.join("registry.yaml"))?;
    assert!(registry.contains("alice"));
    assert!(!registry.contains("hunter2-very-secret"));
    Ok(())
}
