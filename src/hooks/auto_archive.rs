//! Reminds the user to archive progress.md once it grows past the
//! configured line count.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::HookSettings;
use crate::hooks::{Decision, HookEvent};

/// memory-bank/progress.md wins over a root-level progress.md.
fn find_progress_file(working_dir: &Path) -> Option<PathBuf> {
    [
        working_dir.join("memory-bank/progress.md"),
        working_dir.join("progress.md"),
    ]
    .into_iter()
    .find(|p| p.exists())
}

fn check_and_warn(progress_file: &Path, max_lines: usize) {
    let Some(content) = crate::fsutil::read_text_file(progress_file) else {
        return;
    };
    let line_count = content.split('\n').count();

    if line_count > max_lines {
        eprintln!("\n[Auto-Archive] ⚠️ progress.md 已有 {line_count} 行 (阈值: {max_lines})");
        eprintln!("[Auto-Archive] 建议运行 /checkpoint --archive 进行归档");
        eprintln!("[Auto-Archive] 或手动将历史记录移至 memory-bank/archive/\n");
    }
}

pub fn run(event: &HookEvent, settings: &HookSettings) -> Result<Decision> {
    let tool_name = event.tool_name();
    if tool_name != "Write" && tool_name != "Edit" {
        return Ok(Decision::Allow);
    }

    if !event.file_path().contains("progress") {
        return Ok(Decision::Allow);
    }

    if let Some(progress_file) = find_progress_file(&event.working_dir()) {
        check_and_warn(&progress_file, settings.archive_max_lines);
    }
    Ok(Decision::Allow)
}
