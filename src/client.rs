use std::collections::BTreeMap;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use tracing::debug;

use crate::cache::{CachedResponse, ResponseCache};
use crate::error::TransportError;
use crate::settings::Settings;

/// What a session hands back for a GET: status, headers and the raw body.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub url: String,
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
    pub from_cache: bool,
}

impl RawResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Anything that can perform a GET. Non-200 statuses are not errors here.
pub trait Session {
    fn get(&self, url: &str) -> Result<RawResponse, TransportError>;
}

/// Blocking HTTP client with a persistent response cache in front of it.
pub struct CachedSession {
    client: Client,
    cache: ResponseCache,
}

impl CachedSession {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.request_timeout())
            .build()
            .context("Failed to build HTTP client")?;
        let cache = ResponseCache::open(&settings.cache_path(), settings.cache_expire_after())?;
        debug!(path = %settings.cache_path().display(), entries = cache.len()?, "Response cache opened");
        Ok(Self::with_cache(client, cache))
    }

    pub fn with_cache(client: Client, cache: ResponseCache) -> Self {
        Self { client, cache }
    }

    pub fn clear_cache(&self) -> Result<usize> {
        self.cache
            .clear()
            .context("Failed to clear response cache")
    }
}

impl Session for CachedSession {
    fn get(&self, url: &str) -> Result<RawResponse, TransportError> {
        if let Some(hit) = self.cache.get(url)? {
            debug!(url, "cache hit");
            return Ok(RawResponse {
                url: hit.url,
                status: hit.status,
                headers: hit.headers,
                body: hit.body,
                from_cache: true,
            });
        }

        let response = self.client.get(url).send()?;
        let final_url = response.url().to_string();
        let status = response.status().as_u16();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response.bytes()?.to_vec();

        let cached = CachedResponse {
            url: final_url,
            status,
            headers,
            body,
        };
        if status == 200 {
            self.cache.put(url, &cached)?;
        }

        Ok(RawResponse {
            url: cached.url,
            status,
            headers: cached.headers,
            body: cached.body,
            from_cache: false,
        })
    }
}


// ── Tests ──
