//! SIGINT handling: flush, kill the in-flight command, exit 130

#![cfg(unix)]

use super::*;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use serial_test::serial;
use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

#[test]
#[serial]
fn test_sigint_flushes_checkpoint_and_exits_130() {
    let temp = create_workspace(&[("README.md", "# site")]).unwrap();
    write_manifest(
        temp.path(),
        r#"{"tasks": [
            {"id": "first", "file": "README.md"},
            {"id": "slow", "command": "sleep 60"},
            {"id": "never", "file": "README.md"}
        ]}"#,
    )
    .unwrap();

    let mut child = Command::new(env!("CARGO_BIN_EXE_taskcheck"))
        .args(["run", "-m", "tasks.json", "--checkpoint-every", "1", "--timeout-secs", "60"])
        .current_dir(temp.path())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    // The handler is installed before this line is printed.
    let stdout = child.stdout.take().unwrap();
    let mut lines = BufReader::new(stdout).lines();
    for line in lines.by_ref() {
        if line.unwrap().contains("Progress: 1/3") {
            break;
        }
    }

    let start = Instant::now();
    kill(Pid::from_raw(child.id() as i32), Signal::SIGINT).unwrap();
    // Keep draining so the child never blocks on a full pipe.
    let rest: Vec<String> = lines.map_while(Result::ok).collect();
    let status = child.wait().unwrap();

    assert!(start.elapsed() < Duration::from_secs(10));
    assert_eq!(status.code(), Some(130));
    assert!(rest.iter().any(|l| l.contains("Interrupted")));

    let report = read_report(&temp.path().join("results.json")).unwrap();
    let ids: Vec<_> = report.results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["first"]);
    assert!(temp.path().join("summary.md").exists());
}
