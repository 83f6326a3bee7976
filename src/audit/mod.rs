pub mod detectors;
pub mod mask;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Result;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::core::{AuditReport, Finding, Findings, Grade, Severity, SeverityCounts};

pub struct AuditContext {
    pub plugin_root: PathBuf,
}

impl AuditContext {
    pub fn new(plugin_root: PathBuf) -> Self {
        Self { plugin_root }
    }

    /// Finding paths are reported relative to the plugin root.
    pub fn rel(&self, path: &Path) -> String {
        path.strip_prefix(&self.plugin_root)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}

pub struct DetectorSpec {
    pub name: &'static str,
    pub run: fn(&AuditContext) -> Result<Vec<Finding>>,
}

/// Fixed execution order; findings keep this order in the report.
pub const DETECTORS: &[DetectorSpec] = &[
    DetectorSpec {
        name: "hook-injection",
        run: detectors::check_hook_injection,
    },
    DetectorSpec {
        name: "permissions",
        run: detectors::check_permissions,
    },
    DetectorSpec {
        name: "deny-list",
        run: detectors::check_deny_list,
    },
    DetectorSpec {
        name: "agent-permissions",
        run: detectors::check_agent_permissions,
    },
    DetectorSpec {
        name: "mcp-trust",
        run: detectors::check_mcp_trust,
    },
    DetectorSpec {
        name: "config-secrets",
        run: detectors::check_config_secrets,
    },
    DetectorSpec {
        name: "prompt-injection",
        run: detectors::check_prompt_injection,
    },
    DetectorSpec {
        name: "hook-timeout",
        run: detectors::check_hook_timeout,
    },
];

pub fn run_audit(ctx: &AuditContext, verbose: bool) -> AuditReport {
    let mut findings = Findings::new();
    for detector in DETECTORS {
        match (detector.run)(ctx) {
            Ok(batch) => findings.extend(batch),
            Err(err) => {
                // A broken detector never sinks the audit.
                if verbose {
                    eprintln!("检查 {} 执行失败: {err:#}", detector.name);
                }
            }
        }
    }
    report_from_findings(findings)
}

fn report_from_findings(findings: Findings) -> AuditReport {
    let counts = SeverityCounts::from_findings(&findings);
    let grade = Grade::from_counts(counts.critical, counts.high, counts.medium);

    let total_files = findings
        .all()
        .iter()
        .map(|f| f.file.as_str())
        .collect::<BTreeSet<_>>()
        .len();
    let total_issues = findings
        .all()
        .iter()
        .filter(|f| f.severity != Severity::Info)
        .count();

    let generated_at = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    AuditReport {
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        generated_at,
        grade,
        counts,
        findings,
        total_files,
        total_issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_counts_distinct_files_and_non_info_issues() {
        let mut findings = Findings::new();
        findings.add(Finding::new(Severity::Critical, "c", "hooks/hooks.json", "m"));
        findings.add(Finding::new(Severity::Info, "c", "hooks/hooks.json", "m"));
        findings.add(Finding::new(Severity::High, "c", "settings.json", "m"));
        let report = report_from_findings(findings);
        assert_eq!(report.total_files, 2);
        assert_eq!(report.total_issues, 2);
        assert_eq!(report.grade.letter, 'D');
        assert_eq!(report.counts.info, 1);
    }

    #[test]
    fn empty_tree_grades_excellent() {
        let root = std::env::temp_dir().join(format!("ccaudit-empty-{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();
        let report = run_audit(&AuditContext::new(root), false);
        assert_eq!(report.grade.letter, 'A');
        assert!(report.findings.is_empty());
    }

    #[test]
    fn rel_strips_the_plugin_root() {
        let ctx = AuditContext::new(PathBuf::from("/tmp/plugin"));
        assert_eq!(
            ctx.rel(Path::new("/tmp/plugin/hooks/hooks.json")),
            "hooks/hooks.json"
        );
        assert_eq!(ctx.rel(Path::new("/elsewhere/x")), "/elsewhere/x");
    }
}
