use anyhow::Error;
use std::io::{self, Write};

use crate::core::{AuditReport, Severity};
use crate::validate::TargetOutcome;

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub color: bool,
    pub quiet: bool,
    pub verbose: bool,
    pub max_findings: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            color: true,
            quiet: false,
            verbose: false,
            max_findings: 200,
        }
    }
}

pub fn eprintln_error(err: &Error) {
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "错误:");
    let _ = writeln!(stderr, "  {err}");

    let mut causes = err.chain().skip(1).peekable();
    if causes.peek().is_some() {
        let _ = writeln!(stderr, "原因:");
        for cause in causes {
            let _ = writeln!(stderr, "  - {cause}");
        }
    }

    let _ = writeln!(stderr, "下一步:");
    let _ = writeln!(stderr, "  - 附加 `--verbose` 重新运行以查看详细信息");
    let _ = writeln!(stderr, "  - 可用命令/选项请参考 `ccaudit --help`");
}

const BANNER_RULE: &str = "══════════════════════════════════";

pub fn print_audit(report: &AuditReport, cfg: &UiConfig) {
    if cfg.quiet {
        return;
    }

    let mut out = io::stdout().lock();
    let _ = writeln!(out, "{BANNER_RULE}");
    let _ = writeln!(out, "     CONFIG SECURITY AUDIT");
    let _ = writeln!(out, "{BANNER_RULE}\n");

    let _ = writeln!(
        out,
        "📊 Overall Grade: {} ({})\n",
        report.grade.letter, report.grade.label
    );

    let mut shown = 0usize;
    for severity in Severity::ALL_DESC {
        let count = report.counts.get(severity);
        let _ = writeln!(out, "{} {} ({count})", severity.icon(), severity);

        for finding in report.findings.all().iter().filter(|f| f.severity == severity) {
            if shown >= cfg.max_findings {
                break;
            }
            let _ = writeln!(out, "   → {}: {}", finding.file, finding.message);
            shown += 1;
        }
    }

    let _ = writeln!(out, "\n{BANNER_RULE}");
    let _ = writeln!(out, "  扫描完成: {} 个文件涉及", report.total_files);
    let _ = writeln!(out, "  发现问题: {} 个", report.total_issues);
    let _ = writeln!(out, "{BANNER_RULE}");
}

pub fn print_validation(outcomes: &[TargetOutcome], cfg: &UiConfig) {
    if cfg.quiet {
        return;
    }

    let mut out = io::stdout().lock();
    let mut has_errors = false;
    let mut total_warnings = 0usize;

    for outcome in outcomes {
        let _ = writeln!(out, "🔍 验证 {}...\n", outcome.title);

        if let Some(fatal) = &outcome.fatal {
            let _ = writeln!(out, "❌ {fatal}\n");
            has_errors = true;
            continue;
        }
        if let Some(note) = &outcome.empty_note {
            let _ = writeln!(out, "⚠️  {note}\n");
            continue;
        }

        for file in &outcome.files {
            if file.result.is_clean() {
                continue;
            }
            let _ = writeln!(out, "📄 {}:", file.label);
            for error in &file.result.errors {
                let _ = writeln!(out, "   ❌ {error}");
                has_errors = true;
            }
            for warning in &file.result.warnings {
                let _ = writeln!(out, "   ⚠️  {warning}");
                total_warnings += 1;
            }
            let _ = writeln!(out);
        }
    }

    let _ = writeln!(out, "{}", "─".repeat(50));
    if has_errors {
        let _ = writeln!(out, "❌ 验证失败: 存在错误");
    } else if total_warnings > 0 {
        let _ = writeln!(out, "⚠️  验证通过，{total_warnings} 个警告");
    } else {
        let _ = writeln!(out, "✅ 验证通过");
    }
}

/// Per-target pass/fail summary for `validate all`.
pub fn print_validation_summary(outcomes: &[TargetOutcome], cfg: &UiConfig) {
    if cfg.quiet {
        return;
    }

    let mut out = io::stdout().lock();
    let _ = writeln!(out, "\n{}", "═".repeat(60));
    let _ = writeln!(out, "  验证结果汇总");
    let _ = writeln!(out, "{}\n", "═".repeat(60));

    let mut all_passed = true;
    for outcome in outcomes {
        let status = if outcome.has_errors() {
            all_passed = false;
            "❌ 失败"
        } else {
            "✅ 通过"
        };
        let _ = writeln!(out, "  {:<12} {status}", outcome.title);
    }

    let _ = writeln!(out);
    if all_passed {
        let _ = writeln!(out, "🎉 所有验证通过！");
    } else {
        let _ = writeln!(out, "💥 存在验证失败，请检查上述错误");
    }
}
