use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn cigar_api_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("cigar-api");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_content = format!(
        r#"[db]
url = "sqlite://{}/data/cigars.sqlite"

[server]
bind = "127.0.0.1:0"
"#,
        root.display()
    );

    let config_path = config_dir.join("cigar-api.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn write_catalog(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn run_cigar_api(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = cigar_api_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env_remove("CIGAR_API_DB_URL")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run cigar-api binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_import_reports_per_item_results() {
    let (tmp, config_path) = setup_test_env();
    let catalog = write_catalog(
        tmp.path(),
        "catalog.json",
        r#"[
            {"brand_name": "Acme", "line_name": "Robusto", "strength_level_numeric": 3},
            {"brand_name": "Acme", "line_name": "Toro", "strength_level_numeric": "bold"},
            {"brand_name": "Acme", "line_name": "Churchill"}
        ]"#,
    );

    let (stdout, stderr, success) =
        run_cigar_api(&config_path, &["import", catalog.to_str().unwrap()]);
    assert!(success, "import failed: stdout={}, stderr={}", stdout, stderr);

    let results: Value = serde_json::from_str(&stdout).unwrap();
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["action"], "inserted");
    assert_eq!(results[1]["status"], "error");
    assert_eq!(results[1]["line"], "Toro");
    assert_eq!(results[2]["status"], "success");
}

#[test]
fn test_import_twice_updates() {
    let (tmp, config_path) = setup_test_env();
    let catalog = write_catalog(
        tmp.path(),
        "catalog.json",
        r#"[{"brand_name": "Acme", "line_name": "Robusto"}]"#,
    );

    let (_, _, success1) = run_cigar_api(&config_path, &["import", catalog.to_str().unwrap()]);
    assert!(success1, "First import failed");

    let (stdout, stderr, success2) =
        run_cigar_api(&config_path, &["import", catalog.to_str().unwrap()]);
    assert!(success2, "Second import failed: {}", stderr);
    let results: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(results[0]["action"], "updated");
}

#[test]
fn test_import_rejects_non_array_file() {
    let (tmp, config_path) = setup_test_env();
    let catalog = write_catalog(
        tmp.path(),
        "catalog.json",
        r#"{"brand_name": "Acme", "line_name": "Robusto"}"#,
    );

    let (_, stderr, success) = run_cigar_api(&config_path, &["import", catalog.to_str().unwrap()]);
    assert!(!success, "import of a non-array file should fail");
    assert!(stderr.contains("must be an array"), "stderr={}", stderr);
    assert!(
        !tmp.path().join("data").exists(),
        "database must not be opened for a rejected file"
    );
}

#[test]
fn test_import_missing_file_fails() {
    let (tmp, config_path) = setup_test_env();
    let missing = tmp.path().join("missing.json");

    let (_, stderr, success) = run_cigar_api(&config_path, &["import", missing.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.contains("Failed to read import file"), "stderr={}", stderr);
}

#[test]
fn test_import_without_database_url_fails() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("cigar-api.toml");
    fs::write(&config_path, "[server]\nbind = \"127.0.0.1:0\"\n").unwrap();
    let catalog = write_catalog(tmp.path(), "catalog.json", "[]");

    let (_, stderr, success) = run_cigar_api(&config_path, &["import", catalog.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.contains("no database url configured"), "stderr={}", stderr);
}

#[test]
fn test_import_reads_database_url_from_dotenv() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("cigar-api.toml");
    fs::write(&config_path, "[server]\nbind = \"127.0.0.1:0\"\n").unwrap();
    let db_path = tmp.path().join("env-data").join("cigars.sqlite");
    fs::write(
        tmp.path().join(".env"),
        format!("CIGAR_API_DB_URL=sqlite://{}\n", db_path.display()),
    )
    .unwrap();
    let catalog = write_catalog(
        tmp.path(),
        "catalog.json",
        r#"[{"brand_name": "Acme", "line_name": "Robusto"}]"#,
    );

    let output = Command::new(cigar_api_binary())
        .current_dir(tmp.path())
        .arg("--config")
        .arg(&config_path)
        .arg("import")
        .arg(&catalog)
        .env_remove("CIGAR_API_DB_URL")
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        output.status.success(),
        "import failed: stdout={}, stderr={}",
        stdout,
        stderr
    );

    let results: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(results[0]["action"], "inserted");
    assert!(db_path.exists(), "database should be created at the .env url");
}
