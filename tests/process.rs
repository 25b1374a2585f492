//! Runs the `driver-care` binary as a child process.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

fn write_config(contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("driver-care-{}.toml", uuid::Uuid::new_v4()));
    std::fs::write(&path, contents).unwrap();
    path
}

fn service() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_driver-care"));
    cmd.env_remove("DRIVER_CARE_CONFIG")
        .env("RUST_LOG", "warn")
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

#[tokio::test]
async fn test_invalid_config_exits_non_zero() {
    let path = write_config(
        r#"
        [server]
        bind_address = "127.0.0.1:0"

        [simulation]
        tick_ms = 0
        "#,
    );

    let output = tokio::time::timeout(
        Duration::from_secs(30),
        service().arg("--config").arg(&path).output(),
    )
    .await
    .expect("process did not exit")
    .unwrap();

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("simulation.tick_ms"), "stderr: {stderr}");

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_missing_config_file_exits_non_zero() {
    let path = std::env::temp_dir().join(format!("driver-care-{}-absent.toml", uuid::Uuid::new_v4()));

    let status = tokio::time::timeout(
        Duration::from_secs(30),
        service().stderr(Stdio::null()).arg("--config").arg(&path).status(),
    )
    .await
    .expect("process did not exit")
    .unwrap();

    assert_eq!(status.code(), Some(1));
}

#[cfg(unix)]
#[tokio::test]
async fn test_valid_config_runs_until_sigint() {
    let path = write_config(
        r#"
        [server]
        bind_address = "127.0.0.1:0"

        [simulation]
        autostart = true
        tick_ms = 100
        "#,
    );

    let mut child = service().arg("--config").arg(&path).spawn().unwrap();

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(child.try_wait().unwrap().is_none(), "service exited before any signal");

    let pid = child.id().unwrap().to_string();
    let killed = Command::new("kill").args(["-INT", &pid]).status().await.unwrap();
    assert!(killed.success());

    let status = tokio::time::timeout(Duration::from_secs(10), child.wait())
        .await
        .expect("service did not stop after SIGINT")
        .unwrap();
    assert!(status.success(), "exit status: {status}");

    let _ = std::fs::remove_file(&path);
}
