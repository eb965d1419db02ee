use evidence_test_utils::ProjectFixture;
use serde_json::{json, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn mcp_evidence_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_mcp-evidence"))
}

fn command(home: &Path) -> Command {
    let mut cmd = Command::new(mcp_evidence_bin());
    cmd.env("HOME", home)
        .env("EVIDENCE_MCP_HOME", home.join(".evidence_mcp"))
        .env_remove("EVIDENCE_PROJECT_PATH")
        .env_remove("EVIDENCE_DATA_PATH")
        .env_remove("EVIDENCE_RESULT_LIMIT");
    cmd
}

fn run_cli(home: &Path, args: &[&str]) -> Output {
    command(home)
        .args(args)
        .output()
        .expect("failed to execute mcp-evidence")
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "command failed\nstdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap_or_else(|err| {
        panic!(
            "failed to parse JSON output: {}\nstdout:\n{}",
            err,
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

#[test]
fn sources_json_lists_discovered_tables() {
    let home = TempDir::new().unwrap();
    let project = ProjectFixture::sample().unwrap();
    let project_path = project.path().to_string_lossy().to_string();

    let output = run_cli(
        home.path(),
        &["sources", "--json", "--project-path", &project_path],
    );
    let sources = stdout_json(&output);

    let names: Vec<&str> = sources
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["maniac_neon_prod", "sales"]);
    assert_eq!(sources[1]["tables"], json!(["customers", "orders"]));
}

#[test]
fn query_json_returns_records() {
    let home = TempDir::new().unwrap();
    let project = ProjectFixture::sample().unwrap();

    let output = command(home.path())
        .env("EVIDENCE_PROJECT_PATH", project.path())
        .args([
            "query",
            "--json",
            "SELECT code, uses FROM \"maniac_neon_prod_referral_codes copy\" ORDER BY code",
        ])
        .output()
        .unwrap();
    let records = stdout_json(&output);

    assert_eq!(records[0]["code"], "ALPHA");
    assert_eq!(records[1]["code"], "BRAVO");
}

#[test]
fn query_error_exits_nonzero_with_engine_message() {
    let home = TempDir::new().unwrap();
    let project = ProjectFixture::sample().unwrap();
    let project_path = project.path().to_string_lossy().to_string();

    let output = run_cli(
        home.path(),
        &[
            "query",
            "--project-path",
            &project_path,
            "SELECT * FROM nosuchtable",
        ],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: Query failed"), "stderr:\n{}", stderr);
    assert!(stderr.contains("nosuchtable"), "stderr:\n{}", stderr);
}

#[test]
fn missing_project_path_is_explained() {
    let home = TempDir::new().unwrap();

    let output = run_cli(home.path(), &["sources"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No Evidence project given"), "stderr:\n{}", stderr);
    assert!(stderr.contains("EVIDENCE_PROJECT_PATH"));
}

#[test]
fn unrendered_project_suggests_npm_run_sources() {
    let home = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let project_path = project.path().to_string_lossy().to_string();

    let output = run_cli(home.path(), &["sources", "--project-path", &project_path]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("npm run sources"), "stderr:\n{}", stderr);
}

#[test]
fn serve_answers_over_stdio() {
    let home = TempDir::new().unwrap();
    let project = ProjectFixture::sample().unwrap();

    let mut child = command(home.path())
        .args(["serve", "--project-path"])
        .arg(project.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    {
        let stdin = child.stdin.as_mut().unwrap();
        let requests = [
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {"name": "cli-test", "version": "0.0.0"}
            }}),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call", "params": {
                "name": "evidence-query",
                "arguments": {"query": "SELECT COUNT(*) AS n FROM sales_orders"}
            }}),
        ];
        for request in requests {
            writeln!(stdin, "{}", request).unwrap();
        }
    }
    drop(child.stdin.take());

    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let responses: Vec<Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(responses.len(), 2, "stdout:\n{}", stdout);
    assert_eq!(responses[0]["result"]["serverInfo"]["name"], "evidence-mcp-server");

    let text = responses[1]["result"]["content"][0]["text"].as_str().unwrap();
    let rows: Value = serde_json::from_str(text).unwrap();
    assert_eq!(rows, json!([{"n": 5}]));
}
