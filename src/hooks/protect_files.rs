//! Blocks edits to secret-bearing files and the `.git` directory.

use anyhow::Result;

use crate::hooks::{Decision, HookEvent};

const PROTECTED_PATTERNS: [&str; 8] = [
    ".env",
    ".env.local",
    ".env.production",
    "*.key",
    "*.pem",
    "credentials.json",
    "secrets.json",
    ".git/",
];

fn is_protected(file_path: &str) -> Option<String> {
    let normalized = file_path.replace('\\', "/").to_lowercase();
    let file_name = normalized.rsplit('/').next().unwrap_or(&normalized);

    for pattern in PROTECTED_PATTERNS {
        if let Some(ext) = pattern.strip_prefix('*') {
            if file_name.ends_with(ext) {
                return Some(format!("受保护的文件类型: {pattern}"));
            }
        } else if let Some(dir) = pattern.strip_suffix('/') {
            // Must match a directory component, so ".git/" catches
            // ".git/config" but not ".gitignore".
            if normalized.contains(&format!("/{dir}/")) || normalized.starts_with(&format!("{dir}/"))
            {
                return Some(format!("受保护的目录: {pattern}"));
            }
        } else if file_name == pattern {
            return Some(format!("受保护的文件: {pattern}"));
        }
    }
    None
}

pub fn run(event: &HookEvent) -> Result<Decision> {
    let file_path = event.file_path();
    if file_path.is_empty() {
        return Ok(Decision::Allow);
    }

    if let Some(reason) = is_protected(file_path) {
        eprintln!("[文件保护] 操作被阻止: {reason}");
        eprintln!("文件: {file_path}");
        eprintln!("如果确实需要修改，请手动操作。");
        return Ok(Decision::Block { reason });
    }
    Ok(Decision::Allow)
}
