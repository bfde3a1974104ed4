//! Manifest fixtures

/// One passing exists-check, one failing content search, one manual task.
pub const THREE_TASKS: &str = r#"{
  "tasks": [
    {"id": "a", "category": "files", "priority": "high", "description": "README present", "file": "README.md", "check": "exists"},
    {"id": "b", "category": "config", "priority": "medium", "description": "Token configured", "file": "config.json", "search": "missing_token"},
    {"id": "c", "category": "qa", "priority": "low", "description": "Review checkout by hand", "manual": true}
  ]
}"#;

/// Every checker kind once, plus an entry with no recognisable shape.
pub const ALL_KINDS: &str = r#"{
  "tasks": [
    {"id": "exists", "category": "files", "file": "README.md"},
    {"id": "size", "category": "files", "file": "empty.txt", "check": "file_size"},
    {"id": "json", "category": "data", "file": "config.json", "check": "json"},
    {"id": "sql", "category": "data", "file": "schema.sql", "check": "sql"},
    {"id": "conflicts", "category": "files", "file": "merged.py", "check": "no_conflicts"},
    {"id": "search", "category": "files", "file": "README.md", "search": "Launch"},
    {"id": "manual", "category": "qa", "manual": true, "command": "false"},
    {"id": "cmd", "category": "build", "command": "echo built"},
    {"id": "mystery", "category": "qa", "description": "no shape"}
  ]
}"#;

/// Files the ALL_KINDS manifest expects in its base directory.
pub const ALL_KINDS_FILES: &[(&str, &str)] = &[
    ("README.md", "# Launch checklist\n"),
    ("empty.txt", ""),
    ("config.json", r#"{"token": "abc"}"#),
    ("schema.sql", "create table members (id serial primary key);\n"),
    ("merged.py", "print('resolved')\n"),
];
