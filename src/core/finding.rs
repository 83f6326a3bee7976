use crate::core::Severity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub category: String,
    pub file: String,
    pub message: String,
}

impl Finding {
    pub fn new(
        severity: Severity,
        category: impl Into<String>,
        file: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category: category.into(),
            file: file.into(),
            message: message.into(),
        }
    }
}

/// Append-only collection; findings keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Findings(Vec<Finding>);

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, finding: Finding) {
        self.0.push(finding);
    }

    pub fn extend(&mut self, findings: Vec<Finding>) {
        self.0.extend(findings);
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.0.iter().filter(|f| f.severity == severity).count()
    }

    pub fn all(&self) -> &[Finding] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_per_severity() {
        let mut findings = Findings::new();
        findings.add(Finding::new(Severity::Critical, "a", "f1", "m1"));
        findings.add(Finding::new(Severity::Critical, "a", "f2", "m2"));
        findings.add(Finding::new(Severity::Low, "b", "f3", "m3"));
        assert_eq!(findings.count(Severity::Critical), 2);
        assert_eq!(findings.count(Severity::Low), 1);
        assert_eq!(findings.count(Severity::High), 0);
        assert_eq!(findings.len(), 3);
    }

    #[test]
    fn preserves_insertion_order() {
        let mut findings = Findings::new();
        findings.add(Finding::new(Severity::Info, "c", "z", "last?"));
        findings.add(Finding::new(Severity::Critical, "c", "a", "first?"));
        assert_eq!(findings.all()[0].file, "z");
        assert_eq!(findings.all()[1].file, "a");
    }
}
