use assert_cmd::Command;

fn redgraph() -> Command {
    let mut cmd = Command::cargo_bin("redgraph").expect("binary built");
    cmd.env_remove("REDGRAPH_URL")
        .env_remove("REDGRAPH_GRAPH")
        .env_remove("REDGRAPH_CONFIG");
    cmd
}

#[test]
fn help_lists_commands() {
    let output = redgraph().arg("--help").output().expect("run redgraph");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in [
        "query",
        "labels",
        "properties",
        "relationship-types",
        "list",
        "delete",
        "config",
    ] {
        assert!(stdout.contains(command), "missing {command} in help");
    }
}

#[test]
fn config_json_reflects_file_and_overrides() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "default_graph = \"movies\"\n[connection]\nurl = \"redis://db:6379/\"\nread_timeout_ms = 250\n",
    )
    .expect("write config");

    let output = redgraph()
        .args(["--config", path.to_str().expect("utf8 path")])
        .args(["--url", "redis://other:6380/", "--format", "json", "config"])
        .output()
        .expect("run redgraph");
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(json["url"], "redis://other:6380/");
    assert_eq!(json["default_graph"], "movies");
    assert_eq!(json["read_timeout_ms"], 250);
}

#[test]
fn config_write_persists_the_url() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("config.toml");
    let status = redgraph()
        .args(["--config", path.to_str().expect("utf8 path")])
        .args(["--url", "redis://saved:6379/", "config", "--write"])
        .output()
        .expect("run redgraph")
        .status;
    assert!(status.success());
    let written = std::fs::read_to_string(&path).expect("config written");
    assert!(written.contains("redis://saved:6379/"));
}

#[test]
fn query_without_graph_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = redgraph()
        .args(["--config", dir.path().join("none.toml").to_str().expect("utf8 path")])
        .args(["query", "RETURN 1"])
        .output()
        .expect("run redgraph");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no graph given"));
}
