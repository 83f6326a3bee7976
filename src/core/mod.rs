mod finding;
mod grade;
mod report;
mod severity;

pub use finding::{Finding, Findings};
pub use grade::Grade;
pub use report::{AuditReport, SeverityCounts};
pub use severity::Severity;
