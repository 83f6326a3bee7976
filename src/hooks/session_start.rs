//! Loads memory-bank context at session start and hands it back to the
//! assistant as additional context.

use std::path::Path;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use crate::hooks::{Decision, HookEvent};

static PENDING_TASK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^- \[ \]").unwrap_or_else(|e| panic!("{e}"))
});
static COMPLETED_TASK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^- \[x\]").unwrap_or_else(|e| panic!("{e}"))
});
static CURRENT_PHASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"## 当前阶段[：:]\s*(.+)").unwrap_or_else(|e| panic!("{e}"))
});

fn summarize_progress(working_dir: &Path) -> Vec<String> {
    let progress_file = working_dir.join("memory-bank/progress.md");
    let Some(content) = crate::fsutil::read_text_file(&progress_file) else {
        return Vec::new();
    };

    let mut lines = Vec::new();

    let pending = PENDING_TASK.find_iter(&content).count();
    let completed = COMPLETED_TASK.find_iter(&content).count();
    if pending > 0 {
        lines.push(format!("发现 {pending} 个待完成任务, {completed} 个已完成"));
    }

    if let Some(cap) = CURRENT_PHASE.captures(&content) {
        let phase = cap.get(1).map_or("", |m| m.as_str()).trim();
        lines.push(format!("当前阶段: {phase}"));
    }

    lines
}

pub fn run(event: &HookEvent) -> Result<Decision> {
    let lines = summarize_progress(&event.working_dir());
    if lines.is_empty() {
        return Ok(Decision::Allow);
    }

    for line in &lines {
        eprintln!("[SessionStart] {line}");
    }
    Ok(Decision::AllowWithContext {
        context: lines.join("\n"),
    })
}
