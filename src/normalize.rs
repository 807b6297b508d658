use regex::Regex;
use std::sync::LazyLock;

use crate::models::{Listing, Named, RawSalary, RawVacancy};

pub const SALARY_NOT_SPECIFIED: &str = "salary not specified";

static HIGHLIGHT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<highlighttext>(.*?)</highlighttext>").expect("valid highlight pattern")
});

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag pattern"));

pub fn normalize(raw: &RawVacancy) -> Listing {
    let (salary_from, salary_to) = salary_bounds(raw.salary.as_ref());

    Listing {
        id: raw.id.clone().unwrap_or_default(),
        name: raw.name.clone().unwrap_or_default(),
        url: raw.alternate_url.clone().unwrap_or_default(),
        salary_from,
        salary_to,
        description: build_description(raw),
        employer: named(&raw.employer),
        city: named(&raw.area),
        published_at: raw.published_at.clone().unwrap_or_default(),
        experience: named(&raw.experience),
        employment_type: named(&raw.employment),
        schedule: named(&raw.schedule),
    }
}

pub fn normalize_all(raws: &[RawVacancy]) -> Vec<Listing> {
    raws.iter().map(normalize).collect()
}

pub fn salary_bounds(salary: Option<&RawSalary>) -> (i64, i64) {
    match salary {
        Some(s) => (s.from.unwrap_or(0), s.to.unwrap_or(0)),
        None => (0, 0),
    }
}

// Human-readable salary range, e.g. `from 100000 to ___ RUR`.
pub fn salary_label(salary: Option<&RawSalary>) -> String {
    let (from, to) = salary_bounds(salary);
    bounds_label(from, to, salary.and_then(|s| s.currency.as_deref()))
}

// 0 is a missing bound; both missing collapses to the "not specified" text.
pub fn bounds_label(from: i64, to: i64, currency: Option<&str>) -> String {
    if from == 0 && to == 0 {
        return SALARY_NOT_SPECIFIED.to_string();
    }
    let bound = |v: i64| if v == 0 { "___".to_string() } else { v.to_string() };
    format!("from {} to {} {}", bound(from), bound(to), currency.unwrap_or(""))
        .trim_end()
        .to_string()
}

pub fn strip_highlight(text: &str) -> String {
    HIGHLIGHT.replace_all(text, "$1").into_owned()
}

fn build_description(raw: &RawVacancy) -> String {
    let from_snippet = raw
        .snippet
        .as_ref()
        .map(|s| {
            [s.requirement.as_deref(), s.responsibility.as_deref()]
                .into_iter()
                .flatten()
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default();

    let text = if from_snippet.trim().is_empty() {
        // Detail lookups have no snippet, only a full HTML description
        raw.description
            .as_deref()
            .map(|html| HTML_TAG.replace_all(html, " ").into_owned())
            .map(|plain| plain.split_whitespace().collect::<Vec<_>>().join(" "))
            .unwrap_or_default()
    } else {
        from_snippet
    };

    strip_highlight(text.trim())
}

fn named(field: &Option<Named>) -> String {
    field
        .as_ref()
        .and_then(|n| n.name.clone())
        .unwrap_or_default()
}
