use std::path::PathBuf;
use std::time::Duration;

use crate::error::{HuntError, HuntResult};

pub const DEFAULT_API_URL: &str = "https://api.hh.ru/vacancies";
pub const PER_PAGE: u32 = 100;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

// Env: HH_API_URL, HH_USER_AGENT, HUNT_HTTP_TIMEOUT_SECS, HUNT_DATA_DIR
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub data_dir: PathBuf,
    pub per_page: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: default_user_agent(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            data_dir: default_data_dir(),
            per_page: PER_PAGE,
        }
    }
}

impl Config {
    pub fn from_env() -> HuntResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> HuntResult<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup("HH_API_URL") {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(agent) = lookup("HH_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(raw) = lookup("HUNT_HTTP_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                HuntError::Validation(format!(
                    "HUNT_HTTP_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                    raw
                ))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(dir) = lookup("HUNT_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    // Path of a saved listing file given the bare name the user typed.
    // The name must stay inside the data directory.
    pub fn store_path(&self, name: &str) -> HuntResult<PathBuf> {
        let name = name.trim();
        let name = name.strip_suffix(".json").unwrap_or(name);
        if name.is_empty() || name == "." || name.contains("..") || name.contains(['/', '\\']) {
            return Err(HuntError::Validation(format!(
                "'{}' is not a valid file name: use a plain name without folders",
                name
            )));
        }
        Ok(self.data_dir.join(format!("{}.json", name)))
    }
}

fn default_user_agent() -> String {
    format!("vacancy-hunt/{}", env!("CARGO_PKG_VERSION"))
}

fn default_data_dir() -> PathBuf {
    // Use XDG data directory or fallback
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "vacancy-hunt") {
        proj_dirs.data_dir().to_path_buf()
    } else {
        PathBuf::from("data")
    }
}
