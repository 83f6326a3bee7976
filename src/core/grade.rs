use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Grade {
    pub letter: char,
    pub label: &'static str,
}

impl Grade {
    /// Ordered decision table; the first matching rule wins.
    pub fn from_counts(critical: usize, high: usize, medium: usize) -> Self {
        if critical > 1 {
            Grade { letter: 'F', label: "Fail" }
        } else if critical == 1 {
            Grade { letter: 'D', label: "Poor" }
        } else if high > 2 {
            Grade { letter: 'C', label: "Needs Work" }
        } else if high == 0 && medium <= 2 {
            Grade { letter: 'A', label: "Excellent" }
        } else {
            Grade { letter: 'B', label: "Acceptable" }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn critical_dominates() {
        assert_eq!(Grade::from_counts(2, 0, 0).letter, 'F');
        assert_eq!(Grade::from_counts(5, 0, 0).letter, 'F');
        // A single CRITICAL is D no matter how many HIGHs pile on.
        assert_eq!(Grade::from_counts(1, 5, 9).letter, 'D');
    }

    #[test]
    fn high_thresholds() {
        assert_eq!(Grade::from_counts(0, 3, 0).letter, 'C');
        assert_eq!(Grade::from_counts(0, 2, 5).letter, 'B');
        assert_eq!(Grade::from_counts(0, 1, 0).letter, 'B');
    }

    #[test]
    fn clean_and_near_clean() {
        assert_eq!(Grade::from_counts(0, 0, 0).letter, 'A');
        assert_eq!(Grade::from_counts(0, 0, 2).letter, 'A');
        assert_eq!(Grade::from_counts(0, 0, 3).letter, 'B');
    }

    #[test]
    fn labels() {
        assert_eq!(Grade::from_counts(0, 0, 0).label, "Excellent");
        assert_eq!(Grade::from_counts(2, 0, 0).label, "Fail");
    }
}
