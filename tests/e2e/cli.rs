//! Binary-level tests: exit codes, output files, subcommands

use super::*;
use taskcheck::models::TaskStatus;

#[test]
fn test_run_writes_all_outputs() {
    let temp = create_workspace(&[("README.md", "# site"), ("config.json", "{}")]).unwrap();
    write_manifest(temp.path(), THREE_TASKS).unwrap();

    let output = run_taskcheck(temp.path(), &["run", "--manifest", "tasks.json"]).unwrap();
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));

    let report = read_report(&temp.path().join("results.json")).unwrap();
    assert_eq!(report.progress.total, 3);
    assert_eq!(report.progress.failed, 1);
    assert!(temp.path().join("progress.json").exists());

    let summary = std::fs::read_to_string(temp.path().join("summary.md")).unwrap();
    assert!(summary.contains("## Failed Tasks (1)"));
    assert!(summary.contains("| qa | 1 | 0 | 0 | 1 | 0 | 0.0% | 0.0% |"));

    let out = stdout(&output);
    assert!(out.contains("Summary:"));
    assert!(out.contains("By category:"));
}

#[test]
fn test_failing_tasks_still_exit_zero() {
    let temp = create_workspace(&[]).unwrap();
    write_manifest(
        temp.path(),
        r#"{"tasks": [{"id": "gone", "file": "missing.txt"}]}"#,
    )
    .unwrap();

    let output = run_taskcheck(temp.path(), &["run", "-m", "tasks.json", "--quiet"]).unwrap();
    assert_eq!(output.status.code(), Some(0));
    let report = read_report(&temp.path().join("results.json")).unwrap();
    assert_eq!(report.results[0].status(), TaskStatus::Failed);
}

#[test]
fn test_manifest_errors_exit_one() {
    let temp = create_workspace(&[]).unwrap();

    for (content, expected) in [
        ("{not json", "not valid JSON"),
        ("[1, 2]", "must be a JSON object"),
        (r#"{"steps": []}"#, "no `tasks` key"),
        (r#"{"tasks": {}}"#, "must be an array"),
    ] {
        write_manifest(temp.path(), content).unwrap();
        let output = run_taskcheck(temp.path(), &["run", "--manifest", "tasks.json"]).unwrap();
        assert_eq!(output.status.code(), Some(1), "{content}");
        assert!(stderr(&output).contains(expected), "{}", stderr(&output));
    }

    let output = run_taskcheck(temp.path(), &["run", "--manifest", "absent.json"]).unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(!temp.path().join("results.json").exists());
}

#[test]
fn test_usage_error_exits_two() {
    let temp = create_workspace(&[]).unwrap();
    let output = run_taskcheck(temp.path(), &["run"]).unwrap();
    assert_eq!(output.status.code(), Some(2));

    let output = run_taskcheck(
        temp.path(),
        &["run", "-m", "tasks.json", "--priority", "urgent"],
    )
    .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_window_flags_and_custom_paths() {
    let temp = create_workspace(super::ALL_KINDS_FILES).unwrap();
    write_manifest(temp.path(), ALL_KINDS).unwrap();

    let output = run_taskcheck(
        temp.path(),
        &[
            "run",
            "-m",
            "tasks.json",
            "--start",
            "2",
            "--limit",
            "3",
            "--results",
            "out/r.json",
            "--progress",
            "out/p.json",
            "--summary",
            "out/s.md",
        ],
    )
    .unwrap();
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));

    let report = read_report(&temp.path().join("out/r.json")).unwrap();
    let ids: Vec<_> = report.results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["json", "sql", "conflicts"]);
    assert_eq!(report.progress.last_processed_index, Some(4));
    assert!(temp.path().join("out/p.json").exists());
    assert!(temp.path().join("out/s.md").exists());
}

#[test]
fn test_filters_from_config_file() {
    let temp = create_workspace(super::ALL_KINDS_FILES).unwrap();
    write_manifest(temp.path(), ALL_KINDS).unwrap();
    std::fs::write(
        temp.path().join("taskcheck.toml"),
        "categories = [\"data\"]\ncheckpoint_every = 2\n",
    )
    .unwrap();

    let output = run_taskcheck(temp.path(), &["run", "-m", "tasks.json"]).unwrap();
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));

    let report = read_report(&temp.path().join("results.json")).unwrap();
    assert_eq!(report.progress.skipped, 7);
    assert_eq!(report.progress.completed, 2);
    assert!(report.progress.is_consistent());
}

#[test]
fn test_bad_config_exits_one() {
    let temp = create_workspace(&[]).unwrap();
    write_manifest(temp.path(), THREE_TASKS).unwrap();
    std::fs::write(temp.path().join("taskcheck.toml"), "timeout = 5\n").unwrap();

    let output = run_taskcheck(temp.path(), &["run", "-m", "tasks.json"]).unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("taskcheck.toml"));
}

#[test]
fn test_resume_continues_from_results() {
    let temp = create_workspace(super::ALL_KINDS_FILES).unwrap();
    write_manifest(temp.path(), ALL_KINDS).unwrap();

    let first = run_taskcheck(temp.path(), &["run", "-m", "tasks.json", "--limit", "4"]).unwrap();
    assert_eq!(first.status.code(), Some(0));

    let second = run_taskcheck(temp.path(), &["run", "-m", "tasks.json", "--resume"]).unwrap();
    assert_eq!(second.status.code(), Some(0), "{}", stderr(&second));
    assert!(stdout(&second).contains("Resuming at task 4"));

    let report = read_report(&temp.path().join("results.json")).unwrap();
    assert_eq!(report.progress.total, 9);
    let indices: Vec<_> = report.results.iter().map(|r| r.index).collect();
    assert_eq!(indices, (0..9).collect::<Vec<_>>());
}

#[test]
fn test_resume_against_other_manifest_exits_one() {
    let temp = create_workspace(super::ALL_KINDS_FILES).unwrap();
    write_manifest(temp.path(), ALL_KINDS).unwrap();
    run_taskcheck(temp.path(), &["run", "-m", "tasks.json", "--limit", "2"]).unwrap();

    write_manifest(temp.path(), THREE_TASKS).unwrap();
    let output = run_taskcheck(temp.path(), &["run", "-m", "tasks.json", "--resume"]).unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("checkpoint records task"));
}

#[test]
fn test_parallel_run_keeps_manifest_order() {
    let temp = create_workspace(super::ALL_KINDS_FILES).unwrap();
    write_manifest(temp.path(), ALL_KINDS).unwrap();

    let output = run_taskcheck(temp.path(), &["run", "-m", "tasks.json", "--jobs", "4"]).unwrap();
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));

    let report = read_report(&temp.path().join("results.json")).unwrap();
    let indices: Vec<_> = report.results.iter().map(|r| r.index).collect();
    assert_eq!(indices, (0..9).collect::<Vec<_>>());
}

#[test]
fn test_inspect_lists_routing() {
    let temp = create_workspace(&[]).unwrap();
    write_manifest(temp.path(), ALL_KINDS).unwrap();

    let output = run_taskcheck(temp.path(), &["inspect", "-m", "tasks.json", "--verbose"]).unwrap();
    assert_eq!(output.status.code(), Some(0));
    let out = stdout(&output);
    assert!(out.contains("9 tasks"));
    assert!(out.contains("By checker:"));
    assert!(out.contains("no_conflicts"));
    assert!(out.contains("mystery"));
    // Inspect never writes results.
    assert!(!temp.path().join("results.json").exists());
}

#[test]
fn test_report_rerenders_summary() {
    let temp = create_workspace(&[("README.md", "# site"), ("config.json", "{}")]).unwrap();
    write_manifest(temp.path(), THREE_TASKS).unwrap();
    run_taskcheck(temp.path(), &["run", "-m", "tasks.json", "--quiet"]).unwrap();
    std::fs::remove_file(temp.path().join("summary.md")).unwrap();

    let output = run_taskcheck(
        temp.path(),
        &["report", "--results", "results.json", "--summary", "again.md"],
    )
    .unwrap();
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));

    let summary = std::fs::read_to_string(temp.path().join("again.md")).unwrap();
    assert!(summary.contains("## Completed Tasks (1)"));
    assert!(summary.contains("## Pending Tasks (1)"));
}

#[test]
fn test_report_missing_results_exits_one() {
    let temp = create_workspace(&[]).unwrap();
    let output = run_taskcheck(temp.path(), &["report", "-r", "nope.json"]).unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to read results file"));
}

#[cfg(unix)]
#[test]
fn test_timeout_flag_bounds_command() {
    let temp = create_workspace(&[]).unwrap();
    write_manifest(
        temp.path(),
        r#"{"tasks": [{"id": "e", "command": "sleep 30"}]}"#,
    )
    .unwrap();

    let start = std::time::Instant::now();
    let output = run_taskcheck(
        temp.path(),
        &["run", "-m", "tasks.json", "--timeout-secs", "1"],
    )
    .unwrap();
    assert!(start.elapsed() < std::time::Duration::from_secs(10));
    assert_eq!(output.status.code(), Some(0));

    let report = read_report(&temp.path().join("results.json")).unwrap();
    assert_eq!(report.results[0].status(), TaskStatus::Failed);
    assert_eq!(report.results[0].result.details["note"], "timeout");
}
