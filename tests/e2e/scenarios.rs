//! Library-level run scenarios

use super::*;
use std::time::{Duration, Instant};
use taskcheck::config::RunConfig;
use taskcheck::manifest;
use taskcheck::models::{RunReport, TaskStatus};
use taskcheck::runner::{RunOptions, Runner, Silent};

fn config_for(dir: &std::path::Path) -> RunConfig {
    RunConfig {
        base_dir: dir.to_path_buf(),
        results_path: dir.join("results.json"),
        progress_path: dir.join("progress.json"),
        summary_path: dir.join("summary.md"),
        ..RunConfig::default()
    }
}

fn run_all(dir: &std::path::Path, manifest_json: &str, config: &RunConfig) -> RunReport {
    let path = write_manifest(dir, manifest_json).unwrap();
    let tasks = manifest::load(&path).unwrap();
    Runner::new(&tasks, config)
        .run(RunOptions::default(), &mut Silent)
        .unwrap()
        .report
}

fn status_of(report: &RunReport, id: &str) -> TaskStatus {
    report
        .results
        .iter()
        .find(|r| r.id == id)
        .map(|r| r.status())
        .unwrap()
}

#[test]
fn test_three_task_manifest() {
    let temp = create_workspace(&[("README.md", "# site"), ("config.json", "{}")]).unwrap();
    let config = config_for(temp.path());
    let report = run_all(temp.path(), THREE_TASKS, &config);

    assert_eq!(status_of(&report, "a"), TaskStatus::Completed);
    assert_eq!(status_of(&report, "b"), TaskStatus::Failed);
    assert_eq!(report.results[1].result.details["content_found"], false);
    assert_eq!(status_of(&report, "c"), TaskStatus::Pending);
    assert_eq!(
        report.results[2].result.note(),
        Some("Requires manual verification")
    );

    let p = &report.progress;
    assert_eq!((p.completed, p.failed, p.pending, p.skipped, p.total), (1, 1, 1, 0, 3));
}

#[test]
fn test_every_checker_kind() {
    let temp = create_workspace(ALL_KINDS_FILES).unwrap();
    let config = config_for(temp.path());
    let report = run_all(temp.path(), ALL_KINDS, &config);

    assert_eq!(status_of(&report, "exists"), TaskStatus::Completed);
    assert_eq!(status_of(&report, "size"), TaskStatus::Failed);
    assert_eq!(status_of(&report, "json"), TaskStatus::Completed);
    assert_eq!(status_of(&report, "sql"), TaskStatus::Completed);
    assert_eq!(status_of(&report, "conflicts"), TaskStatus::Completed);
    assert_eq!(status_of(&report, "search"), TaskStatus::Completed);
    assert_eq!(status_of(&report, "manual"), TaskStatus::Pending);
    assert_eq!(status_of(&report, "mystery"), TaskStatus::Pending);
    if cfg!(unix) {
        assert_eq!(status_of(&report, "cmd"), TaskStatus::Completed);
    }
    assert!(report.progress.is_consistent());
}

#[cfg(unix)]
#[test]
fn test_command_scenarios() {
    let temp = create_workspace(&[]).unwrap();
    let mut config = config_for(temp.path());
    config.command_timeout = Duration::from_secs(1);

    let start = Instant::now();
    let report = run_all(
        temp.path(),
        r#"{"tasks": [{"id": "d", "command": "echo hello"}, {"id": "e", "command": "sleep 30"}]}"#,
        &config,
    );

    assert!(start.elapsed() < Duration::from_secs(5));
    let d = &report.results[0].result;
    assert_eq!(d.status, TaskStatus::Completed);
    assert_eq!(d.details["command_output"], "hello\n");
    let e = &report.results[1].result;
    assert_eq!(e.status, TaskStatus::Failed);
    assert_eq!(e.details["note"], "timeout");
}

#[test]
fn test_windows_merge_like_single_run() {
    let temp = create_workspace(ALL_KINDS_FILES).unwrap();
    let config = config_for(temp.path());
    let path = write_manifest(temp.path(), ALL_KINDS).unwrap();
    let tasks = manifest::load(&path).unwrap();
    let runner = Runner::new(&tasks, &config);

    let whole = runner.run(RunOptions::default(), &mut Silent).unwrap().report;
    for k in 0..=tasks.len() {
        let mut first = runner
            .run(
                RunOptions {
                    start: 0,
                    limit: Some(k),
                    resume: false,
                },
                &mut Silent,
            )
            .unwrap()
            .report;
        let second = runner
            .run(
                RunOptions {
                    start: k,
                    limit: None,
                    resume: false,
                },
                &mut Silent,
            )
            .unwrap()
            .report;
        first.merge(second);
        assert_eq!(first.progress, whole.progress, "split at {k}");
    }
}

#[test]
fn test_missing_id_gets_positional_placeholder() {
    let temp = create_workspace(&[]).unwrap();
    let config = config_for(temp.path());
    let report = run_all(
        temp.path(),
        r#"{"tasks": [{"manual": true}, {"id": "x", "manual": true}]}"#,
        &config,
    );
    assert_eq!(report.results[0].id, "UNKNOWN_0");
    assert_eq!(report.results[1].id, "x");
}
