use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use std::io::{BufRead, Write};
use tracing::info;

use crate::config::Config;
use crate::display::{render_details, render_table};
use crate::error::HuntError;
use crate::filter::{FilterKind, FilterSet};
use crate::models::Listing;
use crate::normalize::normalize_all;
use crate::rank::{limit_from, top_by_salary};
use crate::source::{search_or_empty, ListingSource};
use crate::store::ListingStore;

// End of input ends the dialog quietly
pub struct Session<'a, R, W> {
    config: &'a Config,
    source: &'a dyn ListingSource,
    input: R,
    output: W,
    now: DateTime<Utc>,
    today: NaiveDate,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    pub fn new(
        config: &'a Config,
        source: &'a dyn ListingSource,
        input: R,
        output: W,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) -> Self {
        Self {
            config,
            source,
            input,
            output,
            now,
            today,
        }
    }

    fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{}", text)?;
        Ok(())
    }

    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        Ok(self
            .ask(prompt)?
            .map(|a| matches!(a.to_lowercase().as_str(), "y" | "yes"))
            .unwrap_or(false))
    }

    pub fn run_search(&mut self, keyword: Option<String>) -> Result<()> {
        let keyword = match keyword {
            Some(k) => k,
            None => match self.ask("Enter a keyword to search listings: ")? {
                Some(k) => k,
                None => return Ok(()),
            },
        };

        let raws = search_or_empty(self.source, &keyword);
        if raws.is_empty() {
            self.say("No listings found for your query.")?;
            return Ok(());
        }
        info!(keyword = %keyword, count = raws.len(), "listings fetched");

        let Some(filters) = self.collect_filters()? else {
            self.say("Stopping: filters were not entered correctly.")?;
            return Ok(());
        };

        let filtered = filters.apply(&normalize_all(&raws), self.today);
        if filtered.is_empty() {
            self.say("No listings match the selected filters.")?;
            return Ok(());
        }

        let Some(count) = self.ask_count(filtered.len())? else {
            return Ok(());
        };
        let top = top_by_salary(&filtered, limit_from(count));
        self.say("\nTop listings for your query:")?;
        for (i, listing) in top.iter().enumerate() {
            let block = render_details(i + 1, listing, self.now);
            self.say(&block)?;
        }

        if !self.confirm("Save the filtered listings to a file? (y/n): ")? {
            self.say("Saving skipped. Thank you for using the service!")?;
            return Ok(());
        }
        let Some(name) = self.ask("Enter a file name: ")? else {
            return Ok(());
        };
        if name.is_empty() {
            self.say("Empty file name, nothing saved.")?;
            return Ok(());
        }

        let path = match self.config.store_path(&name) {
            Ok(path) => path,
            Err(e) => {
                self.say(&capitalize(&e.to_string()))?;
                return Ok(());
            }
        };
        let store = ListingStore::open(path)?;
        store.append_all(&filtered)?;
        self.say(&format!(
            "Saved {} listings to '{}'.",
            filtered.len(),
            store.path().display()
        ))?;

        if self.confirm("Continue working with the saved file? (y/n): ")? {
            self.saved_menu(&store)?;
        } else {
            self.say("Done with the saved file. Good luck with your search!")?;
        }
        Ok(())
    }

    // Ask until a whole number arrives; `None` at end of input.
    fn ask_count(&mut self, available: usize) -> Result<Option<i64>> {
        loop {
            let prompt = format!("How many listings to show ({} available): ", available);
            let Some(answer) = self.ask(&prompt)? else {
                return Ok(None);
            };
            match answer.parse::<i64>() {
                Ok(n) => return Ok(Some(n)),
                Err(_) => self.say("Please enter a whole number.")?,
            }
        }
    }

    // None: a value did not parse, the whole filter step is abandoned
    pub fn collect_filters(&mut self) -> Result<Option<FilterSet>> {
        self.say("Available filters:")?;
        for kind in FilterKind::ALL {
            self.say(&format!("{}. {}", kind.code(), kind.label()))?;
        }
        let Some(choice) = self.ask("Choose filters (numbers separated by spaces, empty for none): ")?
        else {
            return Ok(None);
        };

        let mut filters = FilterSet::new();
        for code in choice.split_whitespace() {
            let Some(kind) = FilterKind::from_code(code) else {
                self.say(&format!("Unknown filter '{}', skipped.", code))?;
                continue;
            };
            let prompt = match kind {
                FilterKind::PublishedFrom => format!("Enter {} (DD.MM.YYYY): ", kind.label()),
                _ => format!("Enter {}: ", kind.label()),
            };
            let Some(value) = self.ask(&prompt)? else {
                return Ok(None);
            };
            if let Err(e) = filters.insert(kind, &value) {
                self.say(&e.to_string())?;
                return Ok(None);
            }
        }
        Ok(Some(filters))
    }

    pub fn saved_menu(&mut self, store: &ListingStore) -> Result<()> {
        loop {
            self.say("\nChoose an action:")?;
            self.say("1. List saved listings")?;
            self.say("2. Compare two listings by salary")?;
            self.say("3. Delete one or more listings")?;
            self.say("4. Filter saved listings")?;
            self.say("5. Exit")?;
            let Some(action) = self.ask("Action number: ")? else {
                return Ok(());
            };

            match action.as_str() {
                "1" => self.list_saved(store)?,
                "2" => self.compare_saved(store)?,
                "3" => self.delete_saved(store)?,
                "4" => self.filter_saved(store)?,
                "5" => {
                    self.say("Goodbye!")?;
                    return Ok(());
                }
                _ => self.say("Unknown action, pick one of the listed numbers.")?,
            }
        }
    }

    fn list_saved(&mut self, store: &ListingStore) -> Result<()> {
        let listings = store.load()?;
        if listings.is_empty() {
            self.say("The file has no listings.")?;
        }
        for (i, listing) in listings.iter().enumerate() {
            let block = render_details(i + 1, listing, self.now);
            self.say(&block)?;
        }
        Ok(())
    }

    fn compare_saved(&mut self, store: &ListingStore) -> Result<()> {
        let Some(answer) = self.ask("Enter two listing numbers separated by a space: ")? else {
            return Ok(());
        };
        let Some(positions) = parse_positions(&answer) else {
            self.say("Input error: enter numbers separated by spaces.")?;
            return Ok(());
        };
        if positions.len() != 2 {
            self.say("Please enter exactly two listing numbers.")?;
            return Ok(());
        }

        match store.compare_positions(positions[0], positions[1]) {
            Ok(comparison) => self.say(&comparison.to_string())?,
            Err(e @ HuntError::NotFound(_)) => self.say(&capitalize(&not_found_text(&e)))?,
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    fn delete_saved(&mut self, store: &ListingStore) -> Result<()> {
        self.say(&format!("Listings in the file: {}.", store.len()?))?;
        let Some(answer) = self.ask("Enter listing numbers to delete (separated by spaces): ")?
        else {
            return Ok(());
        };
        let Some(positions) = parse_positions(&answer) else {
            self.say("Input error: enter numbers separated by spaces.")?;
            return Ok(());
        };

        let resolved = store.resolve_positions(&positions)?;
        for (position, id) in positions.iter().zip(&resolved) {
            if id.is_none() {
                self.say(&format!("There is no listing #{}, skipped.", position))?;
            }
        }

        store.delete_by_positions(&positions)?;
        self.say(&format!(
            "Deletion complete. Listings left in the file: {}.",
            store.len()?
        ))?;
        Ok(())
    }

    fn filter_saved(&mut self, store: &ListingStore) -> Result<()> {
        let Some(filters) = self.collect_filters()? else {
            self.say("Filters were not entered correctly.")?;
            return Ok(());
        };
        for criterion in filters.criteria() {
            let line = format!("  {}", criterion);
            self.say(&line)?;
        }
        let matched = store.load_filtered(&filters, self.today)?;
        if matched.is_empty() {
            self.say("No saved listings match the selected filters.")?;
            return Ok(());
        }
        let table = render_table(&matched);
        self.say(&table)?;

        if self.confirm("Keep only these listings in the file? (y/n): ")? {
            let kept: Vec<Listing> = matched.into_iter().map(|(_, l)| l).collect();
            store.write(&kept)?;
            self.say(&format!("The file now holds {} listings.", kept.len()))?;
        }
        Ok(())
    }
}

// Whitespace-separated 1-based positions; `None` if any token is not a
// non-negative whole number.
pub fn parse_positions(input: &str) -> Option<Vec<usize>> {
    input
        .split_whitespace()
        .map(|t| t.parse::<usize>().ok())
        .collect()
}

fn not_found_text(e: &HuntError) -> String {
    match e {
        HuntError::NotFound(msg) => format!("{}.", msg),
        other => other.to_string(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HuntResult;
    use crate::models::{RawVacancy, SearchPage};
    use chrono::TimeZone;
    use std::io::Cursor;
    use tempfile::TempDir;

    struct StubSource {
        json: &'static str,
    }

    impl ListingSource for StubSource {
        fn search(&self, _query: &str, _page: u32) -> HuntResult<SearchPage> {
            Ok(serde_json::from_str(self.json).unwrap())
        }

        fn details(&self, id: &str) -> HuntResult<RawVacancy> {
            Err(HuntError::NotFound(id.to_string()))
        }
    }

    const THREE_LISTINGS: &str = r#"{"items": [
        {"id": "1", "name": "Junior", "salary": {"from": 50000, "to": 70000, "currency": "RUR"},
         "area": {"name": "Москва"}, "published_at": "2024-03-09T10:00:00+0300"},
        {"id": "2", "name": "Senior", "salary": {"from": 250000, "to": null, "currency": "RUR"},
         "area": {"name": "Москва"}, "published_at": "2024-03-08T10:00:00+0300"},
        {"id": "3", "name": "Remote", "salary": null,
         "area": {"name": "Казань"}, "published_at": "2024-03-07T10:00:00+0300"}
    ]}"#;

    fn config(dir: &TempDir) -> Config {
        Config {
            data_dir: dir.path().to_path_buf(),
            ..Config::default()
        }
    }

    fn run(config: &Config, json: &'static str, script: &str) -> String {
        let source = StubSource { json };
        let mut output = Vec::new();
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        {
            let mut session = Session::new(
                config,
                &source,
                Cursor::new(script.to_string()),
                &mut output,
                now,
                today,
            );
            session.run_search(None).unwrap();
        }
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_parse_positions() {
        assert_eq!(parse_positions("1 3"), Some(vec![1, 3]));
        assert_eq!(parse_positions("  2  "), Some(vec![2]));
        assert_eq!(parse_positions(""), Some(vec![]));
        assert_eq!(parse_positions("1 two"), None);
        assert_eq!(parse_positions("-1"), None);
    }

    #[test]
    fn test_empty_search_stops() {
        let dir = TempDir::new().unwrap();
        let out = run(&config(&dir), r#"{"items": []}"#, "rust\n");
        assert!(out.contains("No listings found for your query."));
    }

    #[test]
    fn test_bad_date_aborts_filter_step() {
        let dir = TempDir::new().unwrap();
        let out = run(&config(&dir), THREE_LISTINGS, "rust\n4\n2024/03/01\n");
        assert!(out.contains("DD.MM.YYYY"));
        assert!(out.contains("Stopping: filters were not entered correctly."));
    }

    #[test]
    fn test_search_ranks_and_skips_save() {
        let dir = TempDir::new().unwrap();
        let out = run(&config(&dir), THREE_LISTINGS, "rust\n3\nмосква\nabc\n5\nn\n");
        assert!(out.contains("Please enter a whole number."));
        let senior = out.find("Title:       Senior").unwrap();
        let junior = out.find("Title:       Junior").unwrap();
        assert!(senior < junior);
        assert!(!out.contains("Title:       Remote"));
        assert!(out.contains("Saving skipped."));
    }

    #[test]
    fn test_zero_count_shows_nothing() {
        let dir = TempDir::new().unwrap();
        let out = run(&config(&dir), THREE_LISTINGS, "rust\n\n0\nn\n");
        assert!(!out.contains("Title:"));
    }

    #[test]
    fn test_save_refuses_name_outside_data_dir() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let out = run(&config, THREE_LISTINGS, "rust\n\n3\ny\n../escape\n");
        assert!(out.contains("Invalid input: '../escape' is not a valid file name"));
        assert!(!out.contains("Saved 3 listings"));
        assert!(!dir.path().parent().unwrap().join("escape.json").exists());
    }

    #[test]
    fn test_save_then_compare_delete_and_exit() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let script = "rust\n\n3\ny\nmy-search\ny\n2\n1 2\n2\n1 9\n3\n3 7\n5\n";
        let out = run(&config, THREE_LISTINGS, script);

        assert!(out.contains("Saved 3 listings"));
        assert!(out.contains("Minimum salary in 'Senior' is higher than in 'Junior'."));
        assert!(out.contains("One of the referenced listings does not exist."));
        assert!(out.contains("Listings in the file: 3."));
        assert!(out.contains("There is no listing #7, skipped."));
        assert!(out.contains("Listings left in the file: 2."));
        assert!(out.contains("Goodbye!"));

        let store = ListingStore::open(config.store_path("my-search").unwrap()).unwrap();
        let names: Vec<String> = store.load().unwrap().into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["Junior", "Senior"]);
    }

    #[test]
    fn test_saved_menu_filter_and_keep() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let store = ListingStore::open(config.store_path("saved").unwrap()).unwrap();
        store
            .append_all(&[
                Listing {
                    id: "1".to_string(),
                    name: "Paid".to_string(),
                    salary_from: 1000,
                    ..Default::default()
                },
                Listing {
                    id: "2".to_string(),
                    name: "Unpaid".to_string(),
                    ..Default::default()
                },
            ])
            .unwrap();

        let source = StubSource { json: r#"{"items": []}"# };
        let mut output = Vec::new();
        {
            let mut session = Session::new(
                &config,
                &source,
                Cursor::new("4\n1\n0\ny\nbogus\n".to_string()),
                &mut output,
                Utc::now(),
                NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            );
            session.saved_menu(&store).unwrap();
        }
        let out = String::from_utf8(output).unwrap();
        assert!(out.contains("  salary from: 0"));
        assert!(out.contains("The file now holds 1 listings."));
        assert!(out.contains("Unknown action"));
        assert_eq!(store.load().unwrap().len(), 1);
        assert_eq!(store.load().unwrap()[0].name, "Paid");
    }

    #[test]
    fn test_filtered_view_numbers_match_delete() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let store = ListingStore::open(config.store_path("saved").unwrap()).unwrap();
        store
            .append_all(&[
                Listing {
                    name: "Keep-Spb".to_string(),
                    city: "Спб".to_string(),
                    ..Default::default()
                },
                Listing {
                    name: "Msk".to_string(),
                    city: "Москва".to_string(),
                    ..Default::default()
                },
            ])
            .unwrap();

        let source = StubSource { json: r#"{"items": []}"# };
        let mut output = Vec::new();
        {
            let mut session = Session::new(
                &config,
                &source,
                Cursor::new("4\n3\nМосква\nn\n3\n2\n5\n".to_string()),
                &mut output,
                Utc::now(),
                NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            );
            session.saved_menu(&store).unwrap();
        }
        let out = String::from_utf8(output).unwrap();
        assert!(out.contains("\n2    Msk"));
        assert!(!out.contains("\n1    Msk"));

        let names: Vec<String> = store.load().unwrap().into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["Keep-Spb"]);
    }

    #[test]
    fn test_bad_compare_input_returns_to_menu() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let store = ListingStore::open(config.store_path("saved").unwrap()).unwrap();
        let source = StubSource { json: r#"{"items": []}"# };
        let mut output = Vec::new();
        {
            let mut session = Session::new(
                &config,
                &source,
                Cursor::new("2\none two\n2\n1\n5\n".to_string()),
                &mut output,
                Utc::now(),
                NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            );
            session.saved_menu(&store).unwrap();
        }
        let out = String::from_utf8(output).unwrap();
        assert!(out.contains("Input error: enter numbers separated by spaces."));
        assert!(out.contains("Please enter exactly two listing numbers."));
        assert!(out.contains("Goodbye!"));
    }
}
