use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{HuntError, HuntResult};
use crate::models::Listing;

pub const USER_DATE_FORMAT: &str = "%d.%m.%Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterKind {
    SalaryFrom,
    SalaryTo,
    City,
    PublishedFrom,
    Experience,
}

impl FilterKind {
    pub const ALL: [FilterKind; 5] = [
        FilterKind::SalaryFrom,
        FilterKind::SalaryTo,
        FilterKind::City,
        FilterKind::PublishedFrom,
        FilterKind::Experience,
    ];

    pub fn code(self) -> u8 {
        match self {
            FilterKind::SalaryFrom => 1,
            FilterKind::SalaryTo => 2,
            FilterKind::City => 3,
            FilterKind::PublishedFrom => 4,
            FilterKind::Experience => 5,
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let code: u8 = code.trim().parse().ok()?;
        Self::ALL.into_iter().find(|k| k.code() == code)
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterKind::SalaryFrom => "salary from",
            FilterKind::SalaryTo => "salary to",
            FilterKind::City => "city",
            FilterKind::PublishedFrom => "publication date",
            FilterKind::Experience => "experience",
        }
    }

    pub fn parse(self, raw: &str) -> HuntResult<Criterion> {
        let value = raw.trim();
        match self {
            FilterKind::SalaryFrom => parse_amount(self, value).map(Criterion::SalaryFrom),
            FilterKind::SalaryTo => parse_amount(self, value).map(Criterion::SalaryTo),
            FilterKind::City => Ok(Criterion::City(value.to_string())),
            FilterKind::PublishedFrom => parse_user_date(value).map(Criterion::PublishedFrom),
            FilterKind::Experience => Ok(Criterion::Experience(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    SalaryFrom(i64),
    SalaryTo(i64),
    City(String),
    PublishedFrom(NaiveDate),
    Experience(String),
}

impl Criterion {
    pub fn kind(&self) -> FilterKind {
        match self {
            Criterion::SalaryFrom(_) => FilterKind::SalaryFrom,
            Criterion::SalaryTo(_) => FilterKind::SalaryTo,
            Criterion::City(_) => FilterKind::City,
            Criterion::PublishedFrom(_) => FilterKind::PublishedFrom,
            Criterion::Experience(_) => FilterKind::Experience,
        }
    }

    // A salary of 0 means "not specified" and never satisfies a salary bound.
    // Publication date is an inclusive window from the given day to `today`.
    pub fn matches(&self, listing: &Listing, today: NaiveDate) -> bool {
        match self {
            Criterion::SalaryFrom(min) => listing.has_salary_from() && listing.salary_from >= *min,
            Criterion::SalaryTo(max) => listing.has_salary_to() && listing.salary_to <= *max,
            Criterion::City(city) => listing.city.to_lowercase() == city.to_lowercase(),
            Criterion::Experience(exp) => listing.experience.to_lowercase() == exp.to_lowercase(),
            Criterion::PublishedFrom(from) => match published_date(&listing.published_at) {
                Some(date) => *from <= date && date <= today,
                None => false,
            },
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.kind().label();
        match self {
            Criterion::SalaryFrom(n) | Criterion::SalaryTo(n) => write!(f, "{}: {}", label, n),
            Criterion::City(s) | Criterion::Experience(s) => write!(f, "{}: {}", label, s),
            Criterion::PublishedFrom(d) => {
                write!(f, "{}: since {}", label, d.format(USER_DATE_FORMAT))
            }
        }
    }
}

// The user's chosen criteria, at most one per kind. All must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    criteria: BTreeMap<FilterKind, Criterion>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: FilterKind, raw: &str) -> HuntResult<()> {
        let criterion = kind.parse(raw)?;
        self.criteria.insert(kind, criterion);
        Ok(())
    }

    pub fn with(mut self, criterion: Criterion) -> Self {
        self.criteria.insert(criterion.kind(), criterion);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn criteria(&self) -> impl Iterator<Item = &Criterion> {
        self.criteria.values()
    }

    pub fn matches(&self, listing: &Listing, today: NaiveDate) -> bool {
        self.criteria.values().all(|c| c.matches(listing, today))
    }

    pub fn apply(&self, listings: &[Listing], today: NaiveDate) -> Vec<Listing> {
        listings
            .iter()
            .filter(|l| self.matches(l, today))
            .cloned()
            .collect()
    }
}

pub fn parse_user_date(value: &str) -> HuntResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), USER_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d"))
        .map_err(|_| {
            HuntError::Validation(format!(
                "'{}' is not a valid date, use the DD.MM.YYYY format",
                value.trim()
            ))
        })
}

// Date in the timestamp's own offset
pub fn published_date(published_at: &str) -> Option<NaiveDate> {
    let day = published_at.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn parse_amount(kind: FilterKind, value: &str) -> HuntResult<i64> {
    value.parse::<i64>().map_err(|_| {
        HuntError::Validation(format!(
            "{} must be a whole number, got '{}'",
            kind.label(),
            value
        ))
    })
}
