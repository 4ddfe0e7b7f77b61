use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Variables that change store or notifier selection.
const AMBIENT_VARS: &[&str] = &[
    "GITHUB_ACTIONS",
    "GITHUB_OUTPUT",
    "ACCESS_TOKEN",
    "REFRESH_TOKEN",
    "AMOUNT",
    "MONEYCARD_ID",
    "TEAMS_WEBHOOK_URL",
    "TEAMS_TENANT_ID",
    "TEAMS_CLIENT_ID",
    "TEAMS_CLIENT_SECRET",
    "TEAMS_USER_ID",
    "TENBIS_CONFIG",
    "TENBIS_LOG_DIR",
    "TENBIS_API_BASE",
    "RUST_LOG",
];

/// Write a credential file into `dir` and return its path.
pub fn write_config(dir: &Path, config: serde_json::Value) -> PathBuf {
    let path = dir.join("config.json");
    std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    path
}

pub fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

/// Run the CLI inside `dir` with a clean environment plus `envs`.
pub fn run_cli_in(dir: &Path, args: &[&str], envs: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tenbis"));
    cmd.args(args).current_dir(dir);
    for var in AMBIENT_VARS {
        cmd.env_remove(var);
    }
    cmd.envs(envs.iter().copied());
    cmd.output().expect("Failed to execute CLI")
}

/// Same as [`run_cli_in`] but off the async runtime, so a mock server on
/// the test runtime keeps answering.
pub async fn run_cli_async(dir: &Path, args: &[&str], envs: &[(&str, &str)]) -> Output {
    let dir = dir.to_path_buf();
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    let envs: Vec<(String, String)> = envs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    tokio::task::spawn_blocking(move || {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let envs: Vec<(&str, &str)> = envs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        run_cli_in(&dir, &args, &envs)
    })
    .await
    .unwrap()
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}
