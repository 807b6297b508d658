use std::cmp::Reverse;

use crate::models::Listing;

// Descending on (salary_from, salary_to); ties keep input order.
pub fn top_by_salary(listings: &[Listing], limit: usize) -> Vec<Listing> {
    let mut ranked: Vec<Listing> = listings.to_vec();
    // sort_by_key is stable
    ranked.sort_by_key(|l| Reverse((l.salary_from, l.salary_to)));
    ranked.truncate(limit);
    ranked
}

pub fn limit_from(count: i64) -> usize {
    usize::try_from(count).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(name: &str, from: i64, to: i64) -> Listing {
        Listing {
            name: name.to_string(),
            salary_from: from,
            salary_to: to,
            ..Default::default()
        }
    }

    fn names(listings: &[Listing]) -> Vec<&str> {
        listings.iter().map(|l| l.name.as_str()).collect()
    }

    #[test]
    fn test_sorted_descending_by_from_then_to() {
        let listings = vec![
            listing("none", 0, 0),
            listing("mid-low", 100, 150),
            listing("top", 300, 0),
            listing("mid-high", 100, 200),
        ];
        let ranked = top_by_salary(&listings, 10);
        assert_eq!(names(&ranked), vec!["top", "mid-high", "mid-low", "none"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let listings = vec![
            listing("first", 500, 600),
            listing("other", 900, 900),
            listing("second", 500, 600),
            listing("third", 500, 600),
        ];
        let ranked = top_by_salary(&listings, 4);
        assert_eq!(names(&ranked), vec!["other", "first", "second", "third"]);
    }

    #[test]
    fn test_truncation() {
        let listings = vec![listing("a", 3, 0), listing("b", 2, 0), listing("c", 1, 0)];
        assert_eq!(names(&top_by_salary(&listings, 2)), vec!["a", "b"]);
        assert_eq!(top_by_salary(&listings, 0).len(), 0);
        assert_eq!(top_by_salary(&listings, 50).len(), 3);
    }

    #[test]
    fn test_limit_from_non_positive() {
        assert_eq!(limit_from(-3), 0);
        assert_eq!(limit_from(0), 0);
        assert_eq!(limit_from(7), 7);
    }
}
