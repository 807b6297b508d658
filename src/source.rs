use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{HuntError, HuntResult};
use crate::models::{RawVacancy, SearchPage};

// --- Source trait ---

pub trait ListingSource {
    fn search(&self, query: &str, page: u32) -> HuntResult<SearchPage>;
    fn details(&self, id: &str) -> HuntResult<RawVacancy>;
}

// First page of results, or nothing if the service could not be reached.
// The failure is logged and otherwise looks like an empty search.
pub fn search_or_empty(source: &dyn ListingSource, query: &str) -> Vec<RawVacancy> {
    match source.search(query, 0) {
        Ok(page) => page.items,
        Err(e) => {
            warn!(query = %query, error = %e, "listing search failed");
            Vec::new()
        }
    }
}

// --- HeadHunter provider ---

#[derive(Debug)]
pub struct HeadHunterClient {
    base_url: String,
    per_page: u32,
    client: reqwest::blocking::Client,
}

impl HeadHunterClient {
    pub fn new(config: &Config) -> HuntResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            per_page: config.per_page,
            client,
        })
    }

    pub fn search_url(&self) -> &str {
        &self.base_url
    }

    pub fn details_url(&self, id: &str) -> String {
        format!("{}/{}", self.base_url, id)
    }

    fn search_params(&self, query: &str, page: u32) -> [(&'static str, String); 3] {
        [
            ("text", query.to_string()),
            ("page", page.to_string()),
            ("per_page", self.per_page.to_string()),
        ]
    }
}

impl ListingSource for HeadHunterClient {
    fn search(&self, query: &str, page: u32) -> HuntResult<SearchPage> {
        debug!(query = %query, page, "searching listings");

        let response = self
            .client
            .get(self.search_url())
            .query(&self.search_params(query, page))
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();
            return Err(HuntError::Transport(format!(
                "listing search failed with status {}: {}",
                status, error_text
            )));
        }

        let page: SearchPage = response.json()?;
        debug!(items = page.items.len(), found = page.found, "search page received");
        Ok(page)
    }

    fn details(&self, id: &str) -> HuntResult<RawVacancy> {
        debug!(id = %id, "fetching listing details");

        let response = self.client.get(self.details_url(id)).send()?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(HuntError::NotFound(format!("listing {} does not exist", id)));
        }
        if !response.status().is_success() {
            let status = response.status();
            return Err(HuntError::Transport(format!(
                "listing lookup failed with status {}",
                status
            )));
        }

        Ok(response.json()?)
    }
}
