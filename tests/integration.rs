use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn docq_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("docq");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let docs_dir = root.join("docs");
    fs::create_dir_all(&docs_dir).unwrap();
    fs::write(
        docs_dir.join("alpha.md"),
        "# Alpha Document\n\nHow to get started with the network.\n\n1. Install the wallet\n2. Request tokens",
    )
    .unwrap();
    fs::write(
        docs_dir.join("beta.txt"),
        "Beta notes.\n\nThe public mainnet is live and open to everyone.",
    )
    .unwrap();

    let config_content = format!(
        r#"[docs]
dir = "{}/docs"

[store]
dir = "{}/store"

[chunking]
chunk_size = 1000
overlap = 150

[retrieval]
max_snippet_chars = 1500
"#,
        root.display(),
        root.display()
    );

    let config_path = config_dir.join("docq.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_docq(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = docq_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run docq binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_sync_ingests_documents() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_docq(&config_path, &["sync"]);
    assert!(success, "sync failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("added: 2 source(s)"));
    assert!(stdout.contains("removed: 0 source(s)"));
    assert!(stdout.contains("ok"));
}

#[test]
fn test_sync_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout1, _, _) = run_docq(&config_path, &["sync"]);
    assert!(stdout1.contains("added: 2 source(s)"));

    // Unchanged directory: second sync must be a no-op.
    let (stdout2, _, success) = run_docq(&config_path, &["sync"]);
    assert!(success);
    assert!(stdout2.contains("added: 0 source(s)"));
    assert!(stdout2.contains("removed: 0 source(s)"));
}

#[test]
fn test_sync_detects_deleted_file() {
    let (tmp, config_path) = setup_test_env();

    run_docq(&config_path, &["sync"]);

    fs::remove_file(tmp.path().join("docs").join("alpha.md")).unwrap();
    let (stdout, _, success) = run_docq(&config_path, &["sync"]);
    assert!(success);
    assert!(stdout.contains("added: 0 source(s)"));
    assert!(stdout.contains("removed: 1 source(s)"));
    assert!(stdout.contains("alpha.md"));
}

#[test]
fn test_sync_detects_modified_file() {
    let (tmp, config_path) = setup_test_env();

    run_docq(&config_path, &["sync"]);

    fs::write(
        tmp.path().join("docs").join("beta.txt"),
        "Beta notes, rewritten with different content entirely.",
    )
    .unwrap();
    let (stdout, _, success) = run_docq(&config_path, &["sync"]);
    assert!(success);
    assert!(stdout.contains("added: 1 source(s)"));
    assert!(stdout.contains("beta.txt"));
    assert!(stdout.contains("removed: 0 source(s)"));
}

#[test]
fn test_sync_rebuild() {
    let (_tmp, config_path) = setup_test_env();

    run_docq(&config_path, &["sync"]);
    // --rebuild re-ingests everything even though nothing changed.
    let (stdout, _, success) = run_docq(&config_path, &["sync", "--rebuild"]);
    assert!(success);
    assert!(stdout.contains("added: 2 source(s)"));
}

#[test]
fn test_sync_missing_docs_dir_is_not_an_error() {
    let (tmp, config_path) = setup_test_env();

    fs::remove_dir_all(tmp.path().join("docs")).unwrap();
    let (stdout, stderr, success) = run_docq(&config_path, &["sync"]);
    assert!(success, "stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("added: 0 source(s)"));
    assert!(stdout.contains("removed: 0 source(s)"));
}

#[test]
fn test_status_reports_counts() {
    let (_tmp, config_path) = setup_test_env();

    run_docq(&config_path, &["sync"]);
    let (stdout, _, success) = run_docq(&config_path, &["status"]);
    assert!(success);
    assert!(stdout.contains("sources: 2"));
}

#[test]
fn test_ask_empty_message_short_circuits() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_docq(
        &config_path,
        &["ask", "   ", "--api-key", "test-key-never-used"],
    );
    assert!(success);
    assert!(stdout.contains("Please send a non-empty message."));
}

#[test]
fn test_ask_without_api_key_short_circuits() {
    let (_tmp, config_path) = setup_test_env();

    let binary = docq_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(["ask", "how do I start"])
        .env_remove("FIREWORKS_API_KEY")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Please provide your Fireworks AI API key."));
}

#[test]
fn test_ask_with_empty_knowledge_base() {
    let (tmp, config_path) = setup_test_env();

    // Empty the docs dir before anything is ingested.
    fs::remove_file(tmp.path().join("docs").join("alpha.md")).unwrap();
    fs::remove_file(tmp.path().join("docs").join("beta.txt")).unwrap();

    let (stdout, _, success) = run_docq(
        &config_path,
        &["ask", "anything", "--api-key", "test-key-never-used"],
    );
    assert!(success);
    assert!(stdout.contains("The knowledge base is empty. Please add documents."));
}

#[test]
fn test_invalid_config_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("docq.toml");
    fs::write(
        &config_path,
        r#"[docs]
dir = "./docs"

[store]
dir = "./store"

[chunking]
chunk_size = 100
overlap = 90
"#,
    )
    .unwrap();

    let (_, stderr, success) = run_docq(&config_path, &["status"]);
    assert!(!success);
    assert!(stderr.contains("overlap"));
}
