use std::path::{Path, PathBuf};

use globset::Glob;
use serde_json::Value;
use walkdir::WalkDir;

/// Reads a file as UTF-8, returning None on any I/O failure.
pub fn read_text_file(path: &Path) -> Option<String> {
    std::fs::read_to_string(path).ok()
}

/// Reads and parses a JSON file, returning None on I/O or parse failure.
pub fn read_json(path: &Path) -> Option<Value> {
    let text = read_text_file(path)?;
    serde_json::from_str(&text).ok()
}

/// Recursively lists files under `dir` whose file name matches `pattern`
/// (glob syntax, e.g. `*.md` or `*.{json,yaml,yml}`). Unreadable entries
/// are skipped; a missing directory yields an empty list. Results are
/// sorted for stable output.
pub fn list_files(dir: &Path, pattern: &str) -> Vec<PathBuf> {
    let Ok(glob) = Glob::new(pattern) else {
        return Vec::new();
    };
    let matcher = glob.compile_matcher();

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        if matcher.is_match(entry.file_name()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    files
}
