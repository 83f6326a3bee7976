//! Structure validation of a plugin bundle: hooks.json shape, agent and
//! command frontmatter, skill layout. Errors fail CI; warnings do not.

pub mod frontmatter;

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::validate::frontmatter::Frontmatter;

/// The ten official lifecycle events.
pub const VALID_LIFECYCLES: [&str; 10] = [
    "PreToolUse",
    "PostToolUse",
    "Notification",
    "UserPromptSubmit",
    "Stop",
    "SubagentStop",
    "SessionStart",
    "SessionEnd",
    "PreCompact",
    "PostCompact",
];

const VALID_MODELS: [&str; 3] = ["opus", "sonnet", "haiku"];

#[derive(Debug, Clone, Default)]
pub struct SectionResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl SectionResult {
    fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// Result of one file (or one logical section) within a target.
#[derive(Debug, Clone)]
pub struct FileResult {
    pub label: String,
    pub result: SectionResult,
}

#[derive(Debug, Clone)]
pub struct TargetOutcome {
    pub title: &'static str,
    pub file_count: usize,
    pub files: Vec<FileResult>,
    /// Set when the target could not be examined at all.
    pub fatal: Option<String>,
    /// Message printed when the target has nothing to check.
    pub empty_note: Option<String>,
}

impl TargetOutcome {
    pub fn has_errors(&self) -> bool {
        self.fatal.is_some() || self.files.iter().any(|f| !f.result.errors.is_empty())
    }

    pub fn warning_count(&self) -> usize {
        self.files.iter().map(|f| f.result.warnings.len()).sum()
    }
}

static NODE_QUOTED_SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"node\s+["']([^"']+)["']"#).unwrap_or_else(|e| panic!("{e}"))
});
static NODE_BARE_SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"node\s+(\S+)").unwrap_or_else(|e| panic!("{e}"))
});

/// Script path referenced by a `node ...` hook command, if any.
fn extract_script_path(command: &str) -> Option<&str> {
    if let Some(cap) = NODE_QUOTED_SCRIPT.captures(command) {
        return cap.get(1).map(|m| m.as_str());
    }
    NODE_BARE_SCRIPT
        .captures(command)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

fn validate_hooks_json(plugin_root: &Path) -> SectionResult {
    let mut res = SectionResult::default();
    let hooks_path = plugin_root.join("hooks/hooks.json");

    if !hooks_path.exists() {
        res.error("hooks.json 文件不存在");
        return res;
    }
    let Some(content) = crate::fsutil::read_text_file(&hooks_path) else {
        res.error("无法读取文件");
        return res;
    };
    let data: Value = match serde_json::from_str(&content) {
        Ok(data) => data,
        Err(err) => {
            res.error(format!("JSON 格式错误: {err}"));
            return res;
        }
    };

    let Some(hooks) = data.get("hooks") else {
        res.error("缺少 hooks 字段");
        return res;
    };
    let Some(hooks) = hooks.as_object() else {
        res.error("缺少 hooks 字段");
        return res;
    };

    for (lifecycle, groups) in hooks {
        if !VALID_LIFECYCLES.contains(&lifecycle.as_str()) {
            res.warning(format!("未知的生命周期: {lifecycle}"));
        }

        let Some(groups) = groups.as_array() else {
            res.error(format!("{lifecycle}: 应为数组格式"));
            continue;
        };

        for (i, group) in groups.iter().enumerate() {
            let Some(inner) = group.get("hooks").and_then(Value::as_array) else {
                res.error(format!("{lifecycle}[{i}]: 缺少 hooks 数组"));
                continue;
            };

            for (j, hook) in inner.iter().enumerate() {
                if hook.get("type").and_then(Value::as_str).is_none_or(str::is_empty) {
                    res.error(format!("{lifecycle}[{i}].hooks[{j}]: 缺少 type"));
                }

                let Some(command) =
                    hook.get("command").and_then(Value::as_str).filter(|c| !c.is_empty())
                else {
                    res.error(format!("{lifecycle}[{i}].hooks[{j}]: 缺少 command"));
                    continue;
                };

                if command.contains("node") {
                    if let Some(script) = extract_script_path(command) {
                        let resolved = script
                            .replace("${CLAUDE_PLUGIN_ROOT}", &plugin_root.display().to_string());
                        if !Path::new(&resolved).exists() {
                            let base = Path::new(script)
                                .file_name()
                                .map(|n| n.to_string_lossy().to_string())
                                .unwrap_or_else(|| script.to_string());
                            res.error(format!("{lifecycle}: 脚本不存在 - {base}"));
                        }
                    }
                }

                if let Some(timeout) = hook.get("timeout") {
                    let positive = timeout.as_f64().is_some_and(|t| t > 0.0);
                    if !positive {
                        res.warning(format!("{lifecycle}[{i}].hooks[{j}]: timeout 应为正数"));
                    }
                }
            }
        }
    }

    res
}

fn validate_hook_scripts(plugin_root: &Path) -> (SectionResult, usize) {
    let mut res = SectionResult::default();
    let scripts_dir = plugin_root.join("scripts/node/hooks");

    if !scripts_dir.exists() {
        res.warning(format!("脚本目录不存在: {}", scripts_dir.display()));
        return (res, 0);
    }

    let files = crate::fsutil::list_files(&scripts_dir, "*.js");
    for path in &files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let Some(content) = crate::fsutil::read_text_file(path) else {
            res.error(format!("{name}: 无法读取"));
            continue;
        };
        if content.trim().len() < 50 {
            res.warning(format!("{name}: 文件内容过少"));
        }
        if !content.starts_with("#!/usr/bin/env node") {
            res.warning(format!("{name}: 建议添加 shebang (#!/usr/bin/env node)"));
        }
    }

    let count = files.len();
    (res, count)
}

pub fn validate_hooks(plugin_root: &Path) -> TargetOutcome {
    let json_result = validate_hooks_json(plugin_root);
    let (scripts_result, count) = validate_hook_scripts(plugin_root);

    TargetOutcome {
        title: "Hooks",
        file_count: count,
        files: vec![
            FileResult {
                label: "hooks/hooks.json".to_string(),
                result: json_result,
            },
            FileResult {
                label: "scripts/node/hooks/".to_string(),
                result: scripts_result,
            },
        ],
        fatal: None,
        empty_note: None,
    }
}

fn validate_agent_file(path: &Path) -> SectionResult {
    let mut res = SectionResult::default();
    let Some(content) = crate::fsutil::read_text_file(path) else {
        res.error("无法读取文件");
        return res;
    };

    if !content.starts_with("---") {
        res.error("缺少 YAML frontmatter");
        return res;
    }
    let Some(fm) = Frontmatter::parse(&content) else {
        res.error("YAML frontmatter 格式错误");
        return res;
    };

    for field in ["name", "description", "tools"] {
        if !fm.has(field) {
            res.error(format!("缺少必需字段: {field}"));
        }
    }

    if let Some(name) = fm.get_str("name").filter(|n| !n.is_empty()) {
        let expected = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        if name != expected {
            res.warning(format!("name \"{name}\" 与文件名 \"{expected}\" 不一致"));
        }
    }

    if let Some(model) = fm.get_str("model").filter(|m| !m.is_empty()) {
        if !VALID_MODELS.contains(&model) {
            res.error(format!(
                "无效的 model 值: {model}，应为 {}",
                VALID_MODELS.join("/")
            ));
        }
    }

    if let Some(desc) = fm.get_str("description") {
        if !desc.is_empty() && desc.chars().count() < 20 {
            res.warning("description 过短，建议至少 20 字符");
        }
    }

    let body_len = frontmatter::body_of(&content).map_or(0, |b| b.trim().len());
    if body_len < 100 {
        res.warning("文件内容过少，建议添加更多说明");
    }

    res
}

pub fn validate_agents(plugin_root: &Path) -> TargetOutcome {
    let agents_dir = plugin_root.join("agents");
    if !agents_dir.exists() {
        return TargetOutcome {
            title: "Agents",
            file_count: 0,
            files: Vec::new(),
            fatal: Some(format!("目录不存在: {}", agents_dir.display())),
            empty_note: None,
        };
    }

    let files = crate::fsutil::list_files(&agents_dir, "*.md");
    if files.is_empty() {
        return TargetOutcome {
            title: "Agents",
            file_count: 0,
            files: Vec::new(),
            fatal: None,
            empty_note: Some("未找到 agent 文件".to_string()),
        };
    }

    let results = files
        .iter()
        .map(|path| FileResult {
            label: rel_label(&agents_dir, path),
            result: validate_agent_file(path),
        })
        .collect::<Vec<_>>();

    TargetOutcome {
        title: "Agents",
        file_count: files.len(),
        files: results,
        fatal: None,
        empty_note: None,
    }
}

fn validate_command_file(path: &Path) -> SectionResult {
    let mut res = SectionResult::default();
    let Some(content) = crate::fsutil::read_text_file(path) else {
        res.error("无法读取文件");
        return res;
    };

    if content.trim().is_empty() {
        res.error("文件内容为空");
        return res;
    }
    if !content.starts_with("---") {
        res.error("缺少 YAML frontmatter");
        return res;
    }
    let Some(fm) = Frontmatter::parse(&content) else {
        res.error("YAML frontmatter 格式错误");
        return res;
    };

    if !fm.has("allowed-tools") {
        res.error("缺少必需字段: allowed-tools");
    }

    if let Some(tools) = fm.get_str("allowed-tools") {
        if tools.contains(',') {
            let has_space = tools.split(',').map(str::trim).any(|p| p.contains(' '));
            if has_space {
                res.warning("allowed-tools 中存在可能的格式问题");
            }
        }
    }

    let body_len = frontmatter::body_of(&content).map_or(0, |b| b.trim().len());
    if body_len < 50 {
        res.warning("文件内容过少，建议添加更多说明");
    }

    res
}

pub fn validate_commands(plugin_root: &Path) -> TargetOutcome {
    let commands_dir = plugin_root.join("commands");
    if !commands_dir.exists() {
        return TargetOutcome {
            title: "Commands",
            file_count: 0,
            files: Vec::new(),
            fatal: Some(format!("目录不存在: {}", commands_dir.display())),
            empty_note: None,
        };
    }

    let files = crate::fsutil::list_files(&commands_dir, "*.md");
    if files.is_empty() {
        return TargetOutcome {
            title: "Commands",
            file_count: 0,
            files: Vec::new(),
            fatal: None,
            empty_note: Some("未找到 command 文件".to_string()),
        };
    }

    let results = files
        .iter()
        .map(|path| FileResult {
            label: rel_label(&commands_dir, path),
            result: validate_command_file(path),
        })
        .collect::<Vec<_>>();

    TargetOutcome {
        title: "Commands",
        file_count: files.len(),
        files: results,
        fatal: None,
        empty_note: None,
    }
}

fn validate_skill_file(path: &Path) -> SectionResult {
    let mut res = SectionResult::default();
    let Some(content) = crate::fsutil::read_text_file(path) else {
        res.error("无法读取文件");
        return res;
    };

    if content.trim().is_empty() {
        res.error("文件内容为空");
        return res;
    }
    if !content.starts_with("---") {
        res.error("缺少 YAML frontmatter");
        return res;
    }
    let Some(fm) = Frontmatter::parse(&content) else {
        res.error("YAML frontmatter 格式错误");
        return res;
    };

    for field in ["name", "description"] {
        if !fm.has(field) {
            res.error(format!("缺少必需字段: {field}"));
        }
    }

    if let Some(desc) = fm.get_str("description") {
        if !desc.is_empty() && desc.chars().count() < 20 {
            res.warning("description 过短，建议至少 20 字符");
        }
    }

    let body_len = frontmatter::body_of(&content).map_or(0, |b| b.trim().len());
    if body_len < 50 {
        res.warning("文件内容过少，建议添加更多说明");
    }

    let dir_name = path
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    if let Some(name) = fm.get_str("name").filter(|n| !n.is_empty()) {
        if name != dir_name {
            res.warning(format!("name \"{name}\" 与目录名 \"{dir_name}\" 不一致"));
        }
    }

    res
}

pub fn validate_skills(plugin_root: &Path) -> TargetOutcome {
    let skills_dir = plugin_root.join("skills");
    if !skills_dir.exists() {
        return TargetOutcome {
            title: "Skills",
            file_count: 0,
            files: Vec::new(),
            fatal: Some(format!("目录不存在: {}", skills_dir.display())),
            empty_note: None,
        };
    }

    let files = crate::fsutil::list_files(&skills_dir, "SKILL.md");
    if files.is_empty() {
        return TargetOutcome {
            title: "Skills",
            file_count: 0,
            files: Vec::new(),
            fatal: None,
            empty_note: Some("未找到 SKILL.md 文件".to_string()),
        };
    }

    let results = files
        .iter()
        .map(|path| FileResult {
            label: rel_label(&skills_dir, path),
            result: validate_skill_file(path),
        })
        .collect::<Vec<_>>();

    TargetOutcome {
        title: "Skills",
        file_count: files.len(),
        files: results,
        fatal: None,
        empty_note: None,
    }
}

fn rel_label(base: &Path, path: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}
