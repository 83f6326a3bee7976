//! Bash command screening before execution. Destructive commands are
//! blocked; risky but legitimate ones only warn. Every command is
//! appended to a daily JSONL log under `.claude/logs/`.

use std::path::Path;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

use crate::hooks::{Decision, HookEvent};

struct CommandPattern {
    regex: Regex,
    desc: &'static str,
}

fn patterns(defs: &[(&str, &'static str)]) -> Vec<CommandPattern> {
    defs.iter()
        .map(|(p, desc)| CommandPattern {
            regex: Regex::new(p).unwrap_or_else(|e| panic!("{e}")),
            desc,
        })
        .collect()
}

static DANGEROUS_PATTERNS: LazyLock<Vec<CommandPattern>> = LazyLock::new(|| {
    patterns(&[
        (r"rm\s+(-rf|-fr|--force).*[/~]", "rm -rf 危险路径"),
        (r"rm\s+(-rf|-fr|--force).*\$HOME", "rm -rf HOME"),
        (r"chmod\s+777", "过于宽松的权限"),
        (r">\s*/dev/sd[a-z]", "直接写磁盘"),
        (r"mkfs\.", "格式化磁盘"),
        (r"dd\s+if=.*of=/dev/", "dd 写入设备"),
        (r":\(\)\{\s*:\|:&\s*\};:", "Fork bomb"),
        (r"del\s+/s\s+/q\s+[A-Z]:\\", "Windows 危险删除"),
        (r"rmdir\s+/s\s+/q\s+[A-Z]:\\", "Windows 危险删除"),
        (r"format\s+[A-Z]:", "Windows 格式化"),
    ])
});

static SENSITIVE_PATTERNS: LazyLock<Vec<CommandPattern>> = LazyLock::new(|| {
    patterns(&[
        (r"git\s+push.*--force", "force push"),
        (r"git\s+reset\s+--hard", "hard reset"),
        (r"(?i)drop\s+database", "drop database"),
        (r"(?i)truncate\s+table", "truncate table"),
    ])
});

#[derive(Serialize)]
struct LogEntry<'a> {
    timestamp: String,
    command: String,
    blocked: bool,
    reason: &'a str,
}

fn truncate_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

/// Appends the command to `.claude/logs/commands_YYYYMMDD.log`.
/// Log failures never block the command.
fn log_command(working_dir: &Path, command: &str, blocked: bool, reason: &str) {
    let result: Result<()> = (|| {
        let log_dir = working_dir.join(".claude/logs");
        std::fs::create_dir_all(&log_dir)?;

        let now = OffsetDateTime::now_utc();
        let day = now.format(format_description!("[year][month][day]"))?;
        let log_file = log_dir.join(format!("commands_{day}.log"));

        let entry = LogEntry {
            timestamp: now.format(&Rfc3339)?,
            command: truncate_chars(command, 200),
            blocked,
            reason,
        };
        let line = serde_json::to_string(&entry)? + "\n";

        use std::io::Write;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    })();
    if let Err(err) = result {
        eprintln!("[validate-command] 日志写入失败: {err}");
    }
}

fn check_command(command: &str) -> Option<String> {
    for p in DANGEROUS_PATTERNS.iter() {
        if p.regex.is_match(command) {
            return Some(format!("匹配危险模式: {}", p.desc));
        }
    }

    for p in SENSITIVE_PATTERNS.iter() {
        if p.regex.is_match(command) {
            eprintln!(
                "[Hook 警告] 敏感操作 ({}): {}...",
                p.desc,
                truncate_chars(command, 50)
            );
        }
    }
    None
}

pub fn run(event: &HookEvent) -> Result<Decision> {
    let command = event.command();
    if command.is_empty() {
        return Ok(Decision::Allow);
    }

    let blocked_reason = check_command(command);
    let working_dir = event.working_dir();
    log_command(
        &working_dir,
        command,
        blocked_reason.is_some(),
        blocked_reason.as_deref().unwrap_or(""),
    );

    if let Some(reason) = blocked_reason {
        eprintln!("[安全检查] 命令被阻止: {reason}");
        eprintln!("命令: {}...", truncate_chars(command, 100));
        return Ok(Decision::Block { reason });
    }
    Ok(Decision::Allow)
}
