use crate::core::{Findings, Grade, Severity};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
}

impl SeverityCounts {
    pub fn from_findings(findings: &Findings) -> Self {
        Self {
            critical: findings.count(Severity::Critical),
            high: findings.count(Severity::High),
            medium: findings.count(Severity::Medium),
            low: findings.count(Severity::Low),
            info: findings.count(Severity::Info),
        }
    }

    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
            Severity::Info => self.info,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub tool_version: String,
    pub generated_at: String,
    pub grade: Grade,
    pub counts: SeverityCounts,
    pub findings: Findings,
    /// Distinct files implicated across all findings.
    pub total_files: usize,
    /// Findings excluding INFO.
    pub total_issues: usize,
}
