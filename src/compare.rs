use std::fmt;

use crate::models::Listing;

// How one salary bound of the first listing relates to the second's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundOutcome {
    Higher,
    Lower,
    Equal,
    BothMissing,
    Incomparable,
}

impl BoundOutcome {
    // 0 is treated as "not specified".
    pub fn of(first: i64, second: i64) -> Self {
        match (first != 0, second != 0) {
            (false, false) => BoundOutcome::BothMissing,
            (true, false) | (false, true) => BoundOutcome::Incomparable,
            (true, true) if first > second => BoundOutcome::Higher,
            (true, true) if first < second => BoundOutcome::Lower,
            (true, true) => BoundOutcome::Equal,
        }
    }

    pub fn is_comparable(self) -> bool {
        matches!(
            self,
            BoundOutcome::Higher | BoundOutcome::Lower | BoundOutcome::Equal
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Min,
    Max,
}

impl Bound {
    fn label(self) -> &'static str {
        match self {
            Bound::Min => "Minimum",
            Bound::Max => "Maximum",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalaryComparison {
    pub first: String,
    pub second: String,
    pub min: BoundOutcome,
    pub max: BoundOutcome,
}

impl SalaryComparison {
    pub fn between(first: &Listing, second: &Listing) -> Self {
        Self {
            first: first.name.clone(),
            second: second.name.clone(),
            min: BoundOutcome::of(first.salary_from, second.salary_from),
            max: BoundOutcome::of(first.salary_to, second.salary_to),
        }
    }

    pub fn is_comparable(&self) -> bool {
        self.min.is_comparable() || self.max.is_comparable()
    }

    // A bound missing on both sides does not break equality, as long as
    // the other bound is actually equal.
    pub fn is_equal(&self) -> bool {
        let same = |o: BoundOutcome| matches!(o, BoundOutcome::Equal | BoundOutcome::BothMissing);
        same(self.min) && same(self.max) && self.is_comparable()
    }

    fn sentence(&self, bound: Bound, outcome: BoundOutcome) -> String {
        let label = bound.label();
        match outcome {
            BoundOutcome::Higher => format!(
                "{} salary in '{}' is higher than in '{}'.",
                label, self.first, self.second
            ),
            BoundOutcome::Lower => format!(
                "{} salary in '{}' is higher than in '{}'.",
                label, self.second, self.first
            ),
            BoundOutcome::Equal => format!(
                "{} salary is the same in '{}' and '{}'.",
                label, self.first, self.second
            ),
            BoundOutcome::BothMissing => {
                format!("{} salary is not specified in either listing.", label)
            }
            BoundOutcome::Incomparable => format!(
                "{} salaries cannot be compared: one of the listings does not specify it.",
                label
            ),
        }
    }
}

impl fmt::Display for SalaryComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_equal() {
            return write!(
                f,
                "Salaries in '{}' and '{}' are equal.",
                self.first, self.second
            );
        }
        if !self.is_comparable() {
            return write!(
                f,
                "Salaries cannot be compared: salary data is missing in one or both listings."
            );
        }
        write!(
            f,
            "{}\n{}",
            self.sentence(Bound::Min, self.min),
            self.sentence(Bound::Max, self.max)
        )
    }
}

impl Listing {
    pub fn compare_salary_to(&self, other: &Listing) -> SalaryComparison {
        SalaryComparison::between(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flipped(outcome: BoundOutcome) -> BoundOutcome {
        match outcome {
            BoundOutcome::Higher => BoundOutcome::Lower,
            BoundOutcome::Lower => BoundOutcome::Higher,
            other => other,
        }
    }

    fn listing(name: &str, from: i64, to: i64) -> Listing {
        Listing {
            name: name.to_string(),
            salary_from: from,
            salary_to: to,
            ..Default::default()
        }
    }

    #[test]
    fn test_bound_outcome() {
        assert_eq!(BoundOutcome::of(10, 5), BoundOutcome::Higher);
        assert_eq!(BoundOutcome::of(5, 10), BoundOutcome::Lower);
        assert_eq!(BoundOutcome::of(5, 5), BoundOutcome::Equal);
        assert_eq!(BoundOutcome::of(0, 0), BoundOutcome::BothMissing);
        assert_eq!(BoundOutcome::of(0, 5), BoundOutcome::Incomparable);
        assert_eq!(BoundOutcome::of(5, 0), BoundOutcome::Incomparable);
    }

    #[test]
    fn test_mixed_bounds_message() {
        let a = listing("A", 1000, 2000);
        let b = listing("B", 1500, 1500);
        let message = a.compare_salary_to(&b).to_string();
        assert!(message.contains("Minimum salary in 'B' is higher than in 'A'."));
        assert!(message.contains("Maximum salary in 'A' is higher than in 'B'."));
    }

    #[test]
    fn test_swapping_operands_swaps_wording() {
        let a = listing("A", 1000, 2000);
        let b = listing("B", 1500, 1500);
        let forward = a.compare_salary_to(&b);
        let backward = b.compare_salary_to(&a);
        assert_eq!(forward.min, flipped(backward.min));
        assert_eq!(forward.max, flipped(backward.max));
        // Same facts, reported from the other side
        assert_eq!(forward.to_string(), backward.to_string());
    }

    #[test]
    fn test_identical_copy_is_equal() {
        let a = listing("A", 1000, 2000);
        let comparison = a.compare_salary_to(&a.clone());
        assert!(comparison.is_equal());
        assert_eq!(comparison.to_string(), "Salaries in 'A' and 'A' are equal.");
    }

    #[test]
    fn test_identical_copy_with_one_bound_is_equal() {
        for (from, to) in [(1000, 0), (0, 2000)] {
            let a = listing("A", from, to);
            let comparison = a.compare_salary_to(&a.clone());
            assert!(comparison.is_equal(), "({}, {})", from, to);
            assert_eq!(comparison.to_string(), "Salaries in 'A' and 'A' are equal.");
        }
    }

    #[test]
    fn test_one_shared_bound_with_other_missing_on_one_side_is_not_equal() {
        let a = listing("A", 1000, 0);
        let b = listing("B", 1000, 2000);
        let comparison = a.compare_salary_to(&b);
        assert!(!comparison.is_equal());
        assert!(comparison.to_string().contains("Minimum salary is the same in 'A' and 'B'."));
    }

    #[test]
    fn test_nothing_comparable() {
        let a = listing("A", 0, 0);
        let b = listing("B", 1000, 0);
        let comparison = a.compare_salary_to(&b);
        assert!(!comparison.is_comparable());
        assert!(comparison.to_string().starts_with("Salaries cannot be compared"));

        // No salary at all on either side is never reported as equal
        let none = listing("N", 0, 0);
        let comparison = none.compare_salary_to(&none.clone());
        assert!(!comparison.is_comparable());
        assert!(!comparison.is_equal());
    }

    #[test]
    fn test_one_bound_comparable() {
        let a = listing("A", 1000, 0);
        let b = listing("B", 800, 3000);
        let message = a.compare_salary_to(&b).to_string();
        assert!(message.contains("Minimum salary in 'A' is higher than in 'B'."));
        assert!(message.contains("Maximum salaries cannot be compared"));
    }

    #[test]
    fn test_equal_min_different_max() {
        let a = listing("A", 1000, 2000);
        let b = listing("B", 1000, 2500);
        let message = a.compare_salary_to(&b).to_string();
        assert!(message.contains("Minimum salary is the same in 'A' and 'B'."));
        assert!(message.contains("Maximum salary in 'B' is higher than in 'A'."));
    }
}
