use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,
    pub ui: UiSettings,
    pub audit: AuditSettings,
    pub hooks: HookSettings,
}

#[derive(Debug, Clone, Serialize)]
pub struct UiSettings {
    pub color: bool,
    pub max_findings: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditSettings {
    /// Default plugin root when --root is not given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HookSettings {
    pub compact_threshold: u64,
    pub compact_interval: u64,
    pub archive_max_lines: usize,
}

impl Default for HookSettings {
    fn default() -> Self {
        Self {
            compact_threshold: 40,
            compact_interval: 20,
            archive_max_lines: 300,
        }
    }
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            ui: UiSettings {
                color: true,
                max_findings: 200,
            },
            audit: AuditSettings { root: None },
            hooks: HookSettings::default(),
            config_path: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    ui: Option<RawUiSettings>,
    audit: Option<RawAuditSettings>,
    hooks: Option<RawHookSettings>,
}

#[derive(Debug, Deserialize)]
struct RawUiSettings {
    color: Option<bool>,
    max_findings: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawAuditSettings {
    root: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawHookSettings {
    compact_threshold: Option<u64>,
    compact_interval: Option<u64>,
    archive_max_lines: Option<usize>,
}

pub fn default_config_path(home_dir: &Path) -> PathBuf {
    home_dir.join(".config/ccaudit/config.toml")
}

pub fn load(config_path: Option<&Path>, home_dir: &Path) -> Result<EffectiveConfig> {
    let mut cfg = EffectiveConfig::default();

    let env_path = std::env::var_os("CCAUDIT_CONFIG").map(PathBuf::from);
    let path = config_path
        .map(ToOwned::to_owned)
        .or(env_path)
        .unwrap_or_else(|| default_config_path(home_dir));

    if path.exists() {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("配置文件读取失败: {}", path.display()))?;
        let raw: RawConfig = toml::from_str(&s).context("配置文件(TOML)解析失败")?;
        apply_raw_config(&mut cfg, raw);
        cfg.config_path = Some(path.display().to_string());
    }

    apply_env_overrides(&mut cfg)?;

    Ok(cfg)
}

fn apply_raw_config(cfg: &mut EffectiveConfig, raw: RawConfig) {
    if let Some(ui) = raw.ui {
        if let Some(color) = ui.color {
            cfg.ui.color = color;
        }
        if let Some(max_findings) = ui.max_findings {
            cfg.ui.max_findings = max_findings;
        }
    }

    if let Some(audit) = raw.audit {
        if let Some(root) = audit.root {
            cfg.audit.root = Some(root);
        }
    }

    if let Some(hooks) = raw.hooks {
        if let Some(compact_threshold) = hooks.compact_threshold {
            cfg.hooks.compact_threshold = compact_threshold;
        }
        if let Some(compact_interval) = hooks.compact_interval {
            cfg.hooks.compact_interval = compact_interval;
        }
        if let Some(archive_max_lines) = hooks.archive_max_lines {
            cfg.hooks.archive_max_lines = archive_max_lines;
        }
    }
}

fn apply_env_overrides(cfg: &mut EffectiveConfig) -> Result<()> {
    if let Ok(v) = std::env::var("CCAUDIT_UI_COLOR") {
        cfg.ui.color = parse_bool(&v).with_context(|| "CCAUDIT_UI_COLOR")?;
    }
    if let Ok(v) = std::env::var("CCAUDIT_UI_MAX_FINDINGS") {
        cfg.ui.max_findings = v
            .trim()
            .parse::<usize>()
            .with_context(|| "CCAUDIT_UI_MAX_FINDINGS")?;
    }
    if let Ok(v) = std::env::var("CCAUDIT_AUDIT_ROOT") {
        let v = v.trim();
        if !v.is_empty() {
            cfg.audit.root = Some(v.to_string());
        }
    }
    if let Ok(v) = std::env::var("CCAUDIT_COMPACT_THRESHOLD") {
        cfg.hooks.compact_threshold = v
            .trim()
            .parse::<u64>()
            .with_context(|| "CCAUDIT_COMPACT_THRESHOLD")?;
    }
    if let Ok(v) = std::env::var("CCAUDIT_COMPACT_INTERVAL") {
        cfg.hooks.compact_interval = v
            .trim()
            .parse::<u64>()
            .with_context(|| "CCAUDIT_COMPACT_INTERVAL")?;
    }
    if let Ok(v) = std::env::var("CCAUDIT_ARCHIVE_MAX_LINES") {
        cfg.hooks.archive_max_lines = v
            .trim()
            .parse::<usize>()
            .with_context(|| "CCAUDIT_ARCHIVE_MAX_LINES")?;
    }

    // Legacy knobs from the plugin bundle; invalid values fall through
    // silently so a broken env never disables the hooks.
    if let Ok(v) = std::env::var("COMPACT_THRESHOLD") {
        if let Ok(n) = v.trim().parse::<u64>() {
            cfg.hooks.compact_threshold = n;
        }
    }
    if let Ok(v) = std::env::var("COMPACT_INTERVAL") {
        if let Ok(n) = v.trim().parse::<u64>() {
            cfg.hooks.compact_interval = n;
        }
    }

    Ok(())
}

fn parse_bool(s: &str) -> Result<bool> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow::anyhow!(
            "布尔值不正确: {s}（请指定 true|false|1|0|yes|no|on|off）"
        )),
    }
}
