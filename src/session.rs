//! Session identity for hook handlers. The host assistant exports
//! `CLAUDE_SESSION_ID`; scratch files carry the full id so that
//! parallel sessions never share counters.

/// Session id, or "default" when the host did not provide one.
pub fn session_id() -> String {
    std::env::var("CLAUDE_SESSION_ID").unwrap_or_else(|_| "default".to_string())
}

/// Path of a session-scoped scratch file in the system temp directory.
pub fn scratch_file(prefix: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("{prefix}-{}.txt", session_id()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_file_lands_in_temp_dir() {
        let path = scratch_file("ccaudit-test-count");
        assert!(path.starts_with(std::env::temp_dir()));
        assert!(path.extension().is_some_and(|e| e == "txt"));
    }
}
