use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};

static SEQ: AtomicU64 = AtomicU64::new(0);

fn make_temp_dir(tag: &str) -> PathBuf {
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!(
        "ccaudit-hook-{tag}-{}-{seq}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn run_hook(home: &Path, name: &str, stdin: &str, extra_env: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ccaudit"));
    cmd.env("HOME", home);
    cmd.env_remove("CCAUDIT_CONFIG");
    cmd.env_remove("CCAUDIT_UI_COLOR");
    cmd.env_remove("CCAUDIT_UI_MAX_FINDINGS");
    cmd.env_remove("CCAUDIT_AUDIT_ROOT");
    cmd.env_remove("CCAUDIT_COMPACT_THRESHOLD");
    cmd.env_remove("CCAUDIT_COMPACT_INTERVAL");
    cmd.env_remove("CCAUDIT_ARCHIVE_MAX_LINES");
    cmd.env_remove("COMPACT_THRESHOLD");
    cmd.env_remove("COMPACT_INTERVAL");
    cmd.env_remove("CLAUDE_SESSION_ID");
    for (k, v) in extra_env {
        cmd.env(k, v);
    }
    cmd.args(["hook", name]);
    cmd.stdin(Stdio::piped());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let mut child = cmd.spawn().expect("spawn ccaudit");
    child
        .stdin
        .take()
        .expect("stdin handle")
        .write_all(stdin.as_bytes())
        .expect("write stdin");
    child.wait_with_output().expect("wait for ccaudit")
}

fn bash_event(working_dir: &Path, command: &str) -> String {
    serde_json::json!({
        "tool_name": "Bash",
        "tool_input": { "command": command },
        "working_directory": working_dir.to_str().unwrap(),
    })
    .to_string()
}

fn write_event(working_dir: &Path, file_path: &str) -> String {
    serde_json::json!({
        "tool_name": "Write",
        "tool_input": { "file_path": file_path },
        "working_directory": working_dir.to_str().unwrap(),
    })
    .to_string()
}

#[test]
fn dangerous_command_is_blocked_with_exit_two() {
    let home = make_temp_dir("home");
    let work = make_temp_dir("danger");

    let out = run_hook(
        &home,
        "validate-command",
        &bash_event(&work, "rm -rf /usr/local"),
        &[],
    );
    assert_eq!(out.status.code(), Some(2));

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("[安全检查] 命令被阻止"), "stderr={stderr}");
    assert!(stderr.contains("rm -rf 危险路径"), "stderr={stderr}");

    let _ = std::fs::remove_dir_all(&home);
    let _ = std::fs::remove_dir_all(&work);
}

#[test]
fn safe_command_passes_and_is_logged() {
    let home = make_temp_dir("home");
    let work = make_temp_dir("safe");

    let out = run_hook(
        &home,
        "validate-command",
        &bash_event(&work, "cargo build --release"),
        &[],
    );
    assert_eq!(out.status.code(), Some(0));

    let log_dir = work.join(".claude/logs");
    let logs: Vec<_> = std::fs::read_dir(&log_dir)
        .expect("log dir")
        .filter_map(Result::ok)
        .collect();
    assert_eq!(logs.len(), 1);
    let content = std::fs::read_to_string(logs[0].path()).unwrap();
    let line: serde_json::Value = serde_json::from_str(content.lines().next().unwrap()).unwrap();
    assert_eq!(line["command"], "cargo build --release");
    assert_eq!(line["blocked"], false);

    let _ = std::fs::remove_dir_all(&home);
    let _ = std::fs::remove_dir_all(&work);
}

#[test]
fn malformed_event_json_fails_open() {
    let home = make_temp_dir("home");

    for name in [
        "validate-command",
        "protect-files",
        "check-secrets",
        "suggest-compact",
        "auto-archive",
        "session-start",
    ] {
        let out = run_hook(&home, name, "{not valid json", &[]);
        assert_eq!(out.status.code(), Some(0), "hook {name} should fail open");
    }

    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn empty_stdin_fails_open() {
    let home = make_temp_dir("home");
    let out = run_hook(&home, "validate-command", "", &[]);
    assert_eq!(out.status.code(), Some(0));
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn protected_file_is_blocked_but_gitignore_passes() {
    let home = make_temp_dir("home");
    let work = make_temp_dir("protect");

    let blocked = run_hook(&home, "protect-files", &write_event(&work, "/repo/.env"), &[]);
    assert_eq!(blocked.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&blocked.stderr);
    assert!(stderr.contains("[文件保护] 操作被阻止"), "stderr={stderr}");

    let allowed = run_hook(
        &home,
        "protect-files",
        &write_event(&work, "/repo/.gitignore"),
        &[],
    );
    assert_eq!(allowed.status.code(), Some(0));

    let _ = std::fs::remove_dir_all(&home);
    let _ = std::fs::remove_dir_all(&work);
}

#[test]
fn compact_reminder_fires_at_the_threshold() {
    let home = make_temp_dir("home");
    let work = make_temp_dir("compact");
    let session = format!("failopen-compact-{}-{}", std::process::id(), SEQ.fetch_add(1, Ordering::Relaxed));
    let env: &[(&str, &str)] = &[
        ("CLAUDE_SESSION_ID", session.as_str()),
        ("CCAUDIT_COMPACT_THRESHOLD", "2"),
        ("CCAUDIT_COMPACT_INTERVAL", "20"),
    ];

    let first = run_hook(&home, "suggest-compact", &bash_event(&work, "ls"), env);
    assert_eq!(first.status.code(), Some(0));
    assert!(
        !String::from_utf8_lossy(&first.stderr).contains("[CompactReminder]"),
        "no reminder below the threshold"
    );

    let second = run_hook(&home, "suggest-compact", &bash_event(&work, "ls"), env);
    assert_eq!(second.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&second.stderr);
    assert!(stderr.contains("[CompactReminder]"), "stderr={stderr}");
    assert!(stderr.contains("2 次工具调用"), "stderr={stderr}");

    let _ = std::fs::remove_dir_all(&home);
    let _ = std::fs::remove_dir_all(&work);
}

#[test]
fn session_start_emits_additional_context() {
    let home = make_temp_dir("home");
    let work = make_temp_dir("session");
    std::fs::create_dir_all(work.join("memory-bank")).unwrap();
    std::fs::write(
        work.join("memory-bank/progress.md"),
        "## 当前阶段: Dev\n- [ ] 实现解析器\n- [x] 设计评审\n",
    )
    .unwrap();

    let event = serde_json::json!({
        "working_directory": work.to_str().unwrap(),
    })
    .to_string();
    let out = run_hook(&home, "session-start", &event, &[]);
    assert_eq!(out.status.code(), Some(0));

    let payload: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap_or_else(|e| {
        panic!(
            "invalid json: {e}\nstdout={:?}",
            String::from_utf8_lossy(&out.stdout)
        )
    });
    let context = payload["hookSpecificOutput"]["additionalContext"]
        .as_str()
        .expect("additionalContext string");
    assert!(context.contains("1 个待完成任务"), "context={context}");
    assert!(context.contains("当前阶段: Dev"), "context={context}");

    let _ = std::fs::remove_dir_all(&home);
    let _ = std::fs::remove_dir_all(&work);
}

#[test]
fn session_start_without_progress_emits_nothing() {
    let home = make_temp_dir("home");
    let work = make_temp_dir("blank");

    let event = serde_json::json!({
        "working_directory": work.to_str().unwrap(),
    })
    .to_string();
    let out = run_hook(&home, "session-start", &event, &[]);
    assert_eq!(out.status.code(), Some(0));
    assert!(out.stdout.is_empty());

    let _ = std::fs::remove_dir_all(&home);
    let _ = std::fs::remove_dir_all(&work);
}

#[test]
fn auto_archive_warns_past_the_line_limit() {
    let home = make_temp_dir("home");
    let work = make_temp_dir("archive");
    std::fs::create_dir_all(work.join("memory-bank")).unwrap();
    std::fs::write(work.join("memory-bank/progress.md"), "line\n".repeat(10)).unwrap();

    let env: &[(&str, &str)] = &[("CCAUDIT_ARCHIVE_MAX_LINES", "5")];
    let out = run_hook(
        &home,
        "auto-archive",
        &write_event(&work, "memory-bank/progress.md"),
        env,
    );
    assert_eq!(out.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("[Auto-Archive]"), "stderr={stderr}");
    assert!(stderr.contains("阈值: 5"), "stderr={stderr}");

    let _ = std::fs::remove_dir_all(&home);
    let _ = std::fs::remove_dir_all(&work);
}
