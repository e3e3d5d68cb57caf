use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const MAIN_DOC_URL: &str = "https://docs.python.org/3/";
pub const PEP_URL: &str = "https://peps.python.org/";
const USER_AGENT: &str = concat!("docs_scraper/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Runtime settings: built-in defaults, then `scraper.toml`, then
/// `DOCS_SCRAPER_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub main_doc_url: String,
    pub pep_url: String,
    pub base_dir: PathBuf,
    #[serde(default)]
    pub cache_expire_after_secs: Option<u64>,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("main_doc_url", MAIN_DOC_URL)?
            .set_default("pep_url", PEP_URL)?
            .set_default("base_dir", ".")?
            .set_default("request_timeout_secs", REQUEST_TIMEOUT_SECS)?
            .set_default("user_agent", USER_AGENT)?
            .add_source(File::with_name("scraper").required(false))
            .add_source(Environment::with_prefix("DOCS_SCRAPER"))
            .build()?
            .try_deserialize()
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.base_dir.join("downloads")
    }

    pub fn results_dir(&self) -> PathBuf {
        self.base_dir.join("results")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    pub fn cache_path(&self) -> PathBuf {
        self.base_dir.join("cache").join("http_cache.sqlite")
    }

    pub fn cache_expire_after(&self) -> Option<Duration> {
        self.cache_expire_after_secs.map(Duration::from_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            main_doc_url: MAIN_DOC_URL.to_string(),
            pep_url: PEP_URL.to_string(),
            base_dir: PathBuf::from("."),
            cache_expire_after_secs: None,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            user_agent: USER_AGENT.to_string(),
        }
    }
}
