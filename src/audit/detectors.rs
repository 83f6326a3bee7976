//! The eight configuration checks. Each one reads its slice of the
//! plugin tree through `fsutil` and emits findings; missing or broken
//! input files simply produce no findings.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use serde_json::Value;

use crate::audit::AuditContext;
use crate::core::{Finding, Severity};

fn truncate_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

/// Walks every hook entry of hooks/hooks.json, yielding
/// (lifecycle, hook object) pairs.
fn each_hook<'a>(hooks_data: &'a Value) -> Vec<(&'a str, &'a Value)> {
    let mut out = Vec::new();
    let Some(hooks) = hooks_data.get("hooks").and_then(Value::as_object) else {
        return out;
    };
    for (lifecycle, entries) in hooks {
        let Some(entries) = entries.as_array() else {
            continue;
        };
        for entry in entries {
            let Some(inner) = entry.get("hooks").and_then(Value::as_array) else {
                continue;
            };
            for hook in inner {
                out.push((lifecycle.as_str(), hook));
            }
        }
    }
    out
}

static BACKTICK_EXEC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"`[^`]+`").unwrap_or_else(|e| panic!("{e}"))
});

pub fn check_hook_injection(ctx: &AuditContext) -> Result<Vec<Finding>> {
    let hooks_path = ctx.plugin_root.join("hooks/hooks.json");
    let Some(hooks_data) = crate::fsutil::read_json(&hooks_path) else {
        return Ok(Vec::new());
    };
    let file = ctx.rel(&hooks_path);

    let mut findings = Vec::new();
    for (lifecycle, hook) in each_hook(&hooks_data) {
        let Some(command) = hook.get("command").and_then(Value::as_str) else {
            continue;
        };
        let mut hits: Vec<&str> = Vec::new();
        if command.contains("$(") {
            hits.push("$(...) 命令替换");
        }
        if BACKTICK_EXEC.is_match(command) {
            hits.push("反引号命令替换");
        }
        for desc in hits {
            findings.push(Finding::new(
                Severity::Critical,
                "Hook 命令注入",
                &file,
                format!("{lifecycle}: {desc} in \"{}...\"", truncate_chars(command, 60)),
            ));
        }
    }
    Ok(findings)
}

static BASH_WILDCARD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^Bash\(\*\)$").unwrap_or_else(|e| panic!("{e}"))
});

pub fn check_permissions(ctx: &AuditContext) -> Result<Vec<Finding>> {
    let settings_path = ctx.plugin_root.join("settings.json");
    let Some(settings) = crate::fsutil::read_json(&settings_path) else {
        return Ok(Vec::new());
    };
    let file = ctx.rel(&settings_path);

    let mut findings = Vec::new();
    if let Some(allow) = settings.get("allow").and_then(Value::as_array) {
        for rule in allow {
            if let Some(rule) = rule.as_str() {
                if BASH_WILDCARD.is_match(rule) {
                    findings.push(Finding::new(
                        Severity::High,
                        "权限过宽",
                        &file,
                        "Bash(*) 无限制通配符，建议使用精确匹配",
                    ));
                }
            }
        }
    }
    Ok(findings)
}

pub fn check_deny_list(ctx: &AuditContext) -> Result<Vec<Finding>> {
    let settings_path = ctx.plugin_root.join("settings.json");
    let Some(settings) = crate::fsutil::read_json(&settings_path) else {
        return Ok(Vec::new());
    };
    let file = ctx.rel(&settings_path);

    let deny = settings
        .get("deny")
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()));
    let deny_str = serde_json::to_string(&deny)?.to_lowercase();

    let standard_deny_rules = [
        ("force", "git push --force"),
        ("reset --hard", "git reset --hard"),
        ("rm -rf", "rm -rf"),
    ];

    let missing: Vec<&str> = standard_deny_rules
        .iter()
        .filter(|(keyword, _)| !deny_str.contains(keyword))
        .map(|(_, desc)| *desc)
        .collect();

    let mut findings = Vec::new();
    if !missing.is_empty() {
        let severity = if missing.len() >= 3 {
            Severity::High
        } else {
            Severity::Medium
        };
        findings.push(Finding::new(
            severity,
            "Deny 清单",
            &file,
            format!(
                "缺少 {} 项标准拒绝规则: {}",
                missing.len(),
                missing.join(", ")
            ),
        ));
    }
    Ok(findings)
}

static FRONTMATTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A---\n(.*?)\n---").unwrap_or_else(|e| panic!("{e}"))
});
static AGENT_BASH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)allowed-tools:.*Bash").unwrap_or_else(|e| panic!("{e}"))
});
static AGENT_MAX_TURNS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"maxTurns:\s*(\d+)").unwrap_or_else(|e| panic!("{e}"))
});
static AGENT_SKILLS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)skills:").unwrap_or_else(|e| panic!("{e}"))
});

pub fn check_agent_permissions(ctx: &AuditContext) -> Result<Vec<Finding>> {
    let agents_dir = ctx.plugin_root.join("agents");
    let mut findings = Vec::new();

    for path in crate::fsutil::list_files(&agents_dir, "*.md") {
        let Some(content) = crate::fsutil::read_text_file(&path) else {
            continue;
        };
        let Some(cap) = FRONTMATTER.captures(&content) else {
            continue;
        };
        let frontmatter = cap.get(1).map_or("", |m| m.as_str());

        let has_bash = AGENT_BASH.is_match(frontmatter);
        let max_turns = AGENT_MAX_TURNS
            .captures(frontmatter)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0);
        let has_skill = AGENT_SKILLS.is_match(frontmatter);

        if has_bash && max_turns > 20 && !has_skill {
            findings.push(Finding::new(
                Severity::Medium,
                "Agent 过度授权",
                ctx.rel(&path),
                format!("Bash 权限 + maxTurns={max_turns} + 无 skill 约束"),
            ));
        }
    }
    Ok(findings)
}

static MCP_SECRET_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"(?i)["']?(?:api[_-]?key|apikey)["']?\s*[:=]\s*["'][^"']{10,}"#,
        r#"(?i)["']?(?:secret|token|password)["']?\s*[:=]\s*["'][^"']{8,}"#,
        r"sk-[a-zA-Z0-9]{20,}",
        r"pk_[a-zA-Z0-9]{20,}",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap_or_else(|e| panic!("{e}")))
    .collect()
});

pub fn check_mcp_trust(ctx: &AuditContext) -> Result<Vec<Finding>> {
    let mcp_dir = ctx.plugin_root.join("mcp-configs");
    let mut findings = Vec::new();

    for path in crate::fsutil::list_files(&mcp_dir, "*.{json,yaml,yml}") {
        let Some(content) = crate::fsutil::read_text_file(&path) else {
            continue;
        };
        // One finding per file, whichever pattern hits first.
        if MCP_SECRET_PATTERNS.iter().any(|p| p.is_match(&content)) {
            findings.push(Finding::new(
                Severity::Critical,
                "MCP 密钥泄露",
                ctx.rel(&path),
                "MCP 配置中检测到疑似硬编码凭证",
            ));
        }
    }
    Ok(findings)
}

static CONFIG_SECRET_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"sk-[a-zA-Z0-9]{20,}", "OpenAI API Key"),
        (r"pk_(?:live|test)_[a-zA-Z0-9]{20,}", "Stripe Key"),
        (r"ghp_[a-zA-Z0-9]{36,}", "GitHub Token"),
        (r"Bearer\s+[a-zA-Z0-9._-]{20,}", "Bearer Token"),
        (r#"(?i)password\s*[:=]\s*["'][^"']{4,}["']"#, "硬编码密码"),
    ]
    .iter()
    .map(|(p, desc)| (Regex::new(p).unwrap_or_else(|e| panic!("{e}")), *desc))
    .collect()
});

pub fn check_config_secrets(ctx: &AuditContext) -> Result<Vec<Finding>> {
    let files_to_check = [
        ctx.plugin_root.join("settings.json"),
        ctx.plugin_root.join("CLAUDE.md"),
        ctx.plugin_root.join("hooks/hooks.json"),
    ];

    let mut findings = Vec::new();
    for path in files_to_check {
        let Some(content) = crate::fsutil::read_text_file(&path) else {
            continue;
        };
        for (pattern, desc) in CONFIG_SECRET_PATTERNS.iter() {
            if pattern.is_match(&content) {
                findings.push(Finding::new(
                    Severity::Critical,
                    "配置密钥",
                    ctx.rel(&path),
                    format!("检测到 {desc}"),
                ));
            }
        }
    }
    Ok(findings)
}

static FENCED_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```.*?```").unwrap_or_else(|e| panic!("{e}"))
});
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"`[^`]+`").unwrap_or_else(|e| panic!("{e}"))
});
static HTML_COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--.*?-->").unwrap_or_else(|e| panic!("{e}"))
});
static INJECTION_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)ignore\s+(?:previous|above|all)", "ignore previous/above"),
        (
            r"(?i)disregard\s+(?:previous|above|all)",
            "disregard instructions",
        ),
        (r"(?i)forget\s+(?:previous|above|all)", "forget instructions"),
        (r"(?i)new\s+instructions?\s*:", "new instructions"),
        (r"(?i)you\s+are\s+now\s+a", "identity override"),
    ]
    .iter()
    .map(|(p, desc)| (Regex::new(p).unwrap_or_else(|e| panic!("{e}")), *desc))
    .collect()
});

/// Files that document injection patterns as audit material.
const PROMPT_INJECTION_ALLOWLIST: [&str; 2] = ["security-audit.md", "config-audit.md"];

pub fn check_prompt_injection(ctx: &AuditContext) -> Result<Vec<Finding>> {
    let mut files_to_check = vec![ctx.plugin_root.join("CLAUDE.md")];
    files_to_check.extend(crate::fsutil::list_files(
        &ctx.plugin_root.join("commands"),
        "*.md",
    ));
    files_to_check.extend(crate::fsutil::list_files(
        &ctx.plugin_root.join("skills"),
        "*.md",
    ));

    let mut findings = Vec::new();
    for path in files_to_check {
        let allowlisted = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| PROMPT_INJECTION_ALLOWLIST.contains(&n));
        if allowlisted {
            continue;
        }
        let Some(content) = crate::fsutil::read_text_file(&path) else {
            continue;
        };

        // Strip code blocks, inline code and HTML comments first so
        // documentation examples do not trip the patterns.
        let clean = FENCED_CODE.replace_all(&content, "");
        let clean = INLINE_CODE.replace_all(&clean, "");
        let clean = HTML_COMMENT.replace_all(&clean, "");

        for (pattern, desc) in INJECTION_PATTERNS.iter() {
            if pattern.is_match(&clean) {
                findings.push(Finding::new(
                    Severity::High,
                    "提示词注入",
                    ctx.rel(&path),
                    format!("检测到 \"{desc}\" 模式（需人工确认是否合法用途）"),
                ));
            }
        }
    }
    Ok(findings)
}

pub fn check_hook_timeout(ctx: &AuditContext) -> Result<Vec<Finding>> {
    let hooks_path = ctx.plugin_root.join("hooks/hooks.json");
    let Some(hooks_data) = crate::fsutil::read_json(&hooks_path) else {
        return Ok(Vec::new());
    };
    let file = ctx.rel(&hooks_path);

    let mut findings = Vec::new();
    for (lifecycle, hook) in each_hook(&hooks_data) {
        let Some(command) = hook.get("command").and_then(Value::as_str) else {
            continue;
        };
        // A timeout of 0 counts as unset, matching the plugin's own CI.
        let timeout = hook.get("timeout").and_then(Value::as_f64).unwrap_or(0.0);
        if timeout > 60.0 {
            findings.push(Finding::new(
                Severity::Low,
                "Hook 超时",
                &file,
                format!("{lifecycle}: timeout={timeout}s 超过 60 秒"),
            ));
        } else if timeout == 0.0 {
            findings.push(Finding::new(
                Severity::Info,
                "Hook 超时",
                &file,
                format!("{lifecycle}: \"{}...\" 未设置 timeout", truncate_chars(command, 40)),
            ));
        }
    }
    Ok(findings)
}
