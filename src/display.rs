use chrono::{DateTime, FixedOffset, Utc};

use crate::models::Listing;
use crate::normalize::{bounds_label, strip_highlight};

const SOURCE_TIMESTAMP: &str = "%Y-%m-%dT%H:%M:%S%z";
const WRAP_WIDTH: usize = 88;

pub fn parse_published(published_at: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(published_at, SOURCE_TIMESTAMP)
        .or_else(|_| DateTime::parse_from_rfc3339(published_at))
        .ok()
}

// "today", "yesterday", "N days ago" within a week, otherwise DD.MM.YYYY.
pub fn relative_date(published_at: &str, now: DateTime<Utc>) -> String {
    let Some(published) = parse_published(published_at) else {
        return published_at.to_string();
    };
    let days = (now - published.with_timezone(&Utc)).num_days();
    match days {
        d if d < 1 => "today".to_string(),
        1 => "yesterday".to_string(),
        d if d < 8 => format!("{} days ago", d),
        _ => published.format("%d.%m.%Y").to_string(),
    }
}

pub fn short_date(published_at: &str) -> String {
    parse_published(published_at)
        .map(|d| d.format("%d.%m.%Y").to_string())
        .unwrap_or_else(|| published_at.to_string())
}

// Saved listings carry no currency, so the label stops at the bounds.
pub fn salary_text(listing: &Listing) -> String {
    bounds_label(listing.salary_from, listing.salary_to, None)
}

pub fn render_details(position: usize, listing: &Listing, now: DateTime<Utc>) -> String {
    let description = textwrap::fill(&strip_highlight(&listing.description), WRAP_WIDTH)
        .replace('\n', "\n             ");
    let mut out = String::new();
    out.push_str(&format!("Listing #{}\n", position));
    out.push_str(&format!("  ID:          {}\n", listing.id));
    out.push_str(&format!("  Title:       {}\n", listing.name));
    out.push_str(&format!("  URL:         {}\n", listing.url));
    out.push_str(&format!("  Salary:      {}\n", salary_text(listing)));
    out.push_str(&format!("  Description: {}\n", description));
    out.push_str(&format!("  Employer:    {}\n", listing.employer));
    out.push_str(&format!("  City:        {}\n", listing.city));
    out.push_str(&format!(
        "  Published:   {}\n",
        relative_date(&listing.published_at, now)
    ));
    out.push_str(&format!("  Experience:  {}\n", listing.experience));
    out.push_str(&format!("  Employment:  {}\n", listing.employment_type));
    out.push_str(&format!("  Schedule:    {}\n", listing.schedule));
    out
}

// Rows carry their file position; a filtered subset may skip numbers.
pub fn render_table(rows: &[(usize, Listing)]) -> String {
    let mut out = format!(
        "{:<4} {:<32} {:<20} {:<16} {:>20} {:<10}\n",
        "#", "TITLE", "EMPLOYER", "CITY", "SALARY", "PUBLISHED"
    );
    out.push_str(&"-".repeat(107));
    out.push('\n');
    for (position, listing) in rows {
        let pay = match (listing.salary_from, listing.salary_to) {
            (0, 0) => "-".to_string(),
            (min, 0) => format!("{}+", min),
            (0, max) => format!("<{}", max),
            (min, max) => format!("{}-{}", min, max),
        };
        out.push_str(&format!(
            "{:<4} {:<32} {:<20} {:<16} {:>20} {:<10}\n",
            position,
            truncate(&listing.name, 30),
            truncate(&listing.employer, 18),
            truncate(&listing.city, 14),
            pay,
            short_date(&listing.published_at)
        ));
    }
    out
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
