//! Context-compaction reminders driven by a per-session tool-call
//! counter, with a supplementary reminder when the pipeline role
//! recorded in progress.md changes.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use crate::config::HookSettings;
use crate::hooks::{Decision, HookEvent};
use crate::session;

static ROLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(PM|Lead|Dev|QA|Designer)\b").unwrap_or_else(|e| panic!("{e}"))
});

fn counter_file() -> PathBuf {
    session::scratch_file("claude-tool-count")
}

fn phase_file() -> PathBuf {
    session::scratch_file("claude-phase")
}

fn read_count() -> u64 {
    crate::fsutil::read_text_file(&counter_file())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(0)
}

fn write_count(count: u64) -> Result<()> {
    std::fs::write(counter_file(), count.to_string())?;
    Ok(())
}

/// Compares the most recent role marker in progress.md against the one
/// recorded for this session. Any failure is treated as "no switch".
fn detect_phase_switch(working_dir: &Path) -> Option<(String, String)> {
    let candidates = [
        working_dir.join("memory-bank/progress.md"),
        working_dir.join("progress.md"),
    ];
    let content = candidates
        .iter()
        .find_map(|p| crate::fsutil::read_text_file(p))?;

    let current = ROLE_PATTERN
        .find_iter(&content)
        .last()?
        .as_str()
        .to_lowercase();

    let phase_file = phase_file();
    let last = crate::fsutil::read_text_file(&phase_file).map(|s| s.trim().to_lowercase());
    std::fs::write(&phase_file, &current).ok()?;

    match last {
        Some(last) if !last.is_empty() && last != current => Some((last, current)),
        _ => None,
    }
}

pub fn run(event: &HookEvent, settings: &HookSettings) -> Result<Decision> {
    let threshold = settings.compact_threshold;
    let interval = settings.compact_interval.max(1);

    let count = read_count() + 1;
    write_count(count)?;

    if count == threshold {
        eprintln!(
            "[CompactReminder] ⚠️ 已进行 {threshold} 次工具调用，建议在任务完成时执行上下文压缩"
        );
        eprintln!("[CompactReminder] 💡 /iterate 模式: 将在下一个任务完成点自动保存状态");
    }

    if count > threshold && (count - threshold) % interval == 0 {
        eprintln!("[CompactReminder] ⚠️ 已进行 {count} 次工具调用，上下文压力较大");
        eprintln!("[CompactReminder] 💡 /iterate 模式: 请在当前任务完成后触发自动压缩");
    }

    if count >= threshold * 2 && (count - threshold * 2) % 10 == 0 {
        eprintln!("[CompactReminder] 🔴 已进行 {count} 次工具调用，上下文接近极限！");
        eprintln!(
            "[CompactReminder] 🔴 立即保存状态并执行压缩（/checkpoint → /clear → /catchup）"
        );
    }

    if let Some((from, to)) = detect_phase_switch(&event.working_dir()) {
        eprintln!("[CompactReminder] 🔄 检测到阶段切换: {from} → {to}");
        eprintln!("[CompactReminder] 💡 阶段切换是压缩的好时机，建议先保存进度再压缩");
    }

    Ok(Decision::Allow)
}
