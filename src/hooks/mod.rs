//! Lifecycle hook handlers. Each handler receives the JSON envelope the
//! host assistant pipes over stdin and returns a [`Decision`]. Handlers
//! must fail open: the CLI boundary maps any parse or handler error to
//! [`Decision::Allow`] so a broken hook never blocks the user.

pub mod auto_archive;
pub mod check_secrets;
pub mod protect_files;
pub mod session_start;
pub mod suggest_compact;
pub mod validate_command;

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolInput {
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookEvent {
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub tool_input: ToolInput,
    #[serde(default)]
    pub working_directory: Option<String>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

impl HookEvent {
    pub fn parse(input: &str) -> Option<Self> {
        serde_json::from_str(input).ok()
    }

    pub fn tool_name(&self) -> &str {
        self.tool_name.as_deref().unwrap_or("")
    }

    pub fn command(&self) -> &str {
        self.tool_input.command.as_deref().unwrap_or("")
    }

    pub fn file_path(&self) -> &str {
        self.tool_input.file_path.as_deref().unwrap_or("")
    }

    /// Working directory of the tool call, falling back to the
    /// process's own.
    pub fn working_dir(&self) -> PathBuf {
        match &self.working_directory {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Exit 0.
    Allow,
    /// Exit 2; the reason is fed back to the assistant via stderr.
    Block { reason: String },
    /// Exit 0 with a hookSpecificOutput JSON payload on stdout.
    AllowWithContext { context: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_envelope() {
        let event = HookEvent::parse(
            r#"{"tool_name": "Bash", "tool_input": {"command": "ls"}, "working_directory": "/tmp"}"#,
        )
        .unwrap();
        assert_eq!(event.tool_name(), "Bash");
        assert_eq!(event.command(), "ls");
        assert_eq!(event.working_dir(), PathBuf::from("/tmp"));
    }

    #[test]
    fn tolerates_missing_and_extra_fields() {
        let event = HookEvent::parse(r#"{"session_id": "abc", "unknown": 1}"#).unwrap();
        assert_eq!(event.tool_name(), "");
        assert_eq!(event.command(), "");
        assert_eq!(event.file_path(), "");
    }

    #[test]
    fn malformed_json_is_none() {
        assert!(HookEvent::parse("{ nope").is_none());
        assert!(HookEvent::parse("").is_none());
    }
}
