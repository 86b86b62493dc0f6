//! Read-only client for the spell catalog gateway.
//!
//! `GET {base}/spells/{slug}` returns one spell and
//! `GET {base}/spells?name={terms}` returns `{ count, results }` summaries.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use shared::domain::{search_terms, slugify, Spell, SpellSummary};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_CATALOG_URL: &str = "https://www.dnd5eapi.co/api";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog answered {status}")]
    NotFound { status: u16 },
    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("catalog sent an unreadable body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid catalog request: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SpellSummary>,
}

#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: Client,
    base: String,
}

impl CatalogClient {
    pub fn new(base: &str) -> Result<Self, CatalogError> {
        Self::with_http(Client::new(), base)
    }

    pub fn with_http(http: Client, base: &str) -> Result<Self, CatalogError> {
        let base = base.trim().trim_end_matches('/');
        let parsed = Url::parse(base)
            .map_err(|error| CatalogError::Invalid(format!("catalog url '{base}': {error}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CatalogError::Invalid(format!(
                "catalog url '{base}' must use http or https"
            )));
        }
        Ok(Self {
            http,
            base: base.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// Exact lookup by display name or slug. Failures are logged, not raised.
    pub async fn lookup_by_slug(&self, name: &str) -> Option<Spell> {
        match self.fetch_spell(&slugify(name)).await {
            Ok(spell) => Some(spell),
            Err(CatalogError::NotFound { status }) => {
                info!(%name, status, "spell not found in catalog");
                None
            }
            Err(error) => {
                warn!(%name, %error, "spell lookup failed");
                None
            }
        }
    }

    /// Keyword search. Failures are logged and yield no matches.
    pub async fn search_by_keyword(&self, keyword: &str) -> Vec<SpellSummary> {
        match self.search(keyword).await {
            Ok(matches) => matches,
            Err(CatalogError::NotFound { status }) => {
                info!(%keyword, status, "catalog search found nothing");
                Vec::new()
            }
            Err(error) => {
                warn!(%keyword, %error, "catalog search failed");
                Vec::new()
            }
        }
    }

    pub async fn fetch_spell(&self, slug: &str) -> Result<Spell, CatalogError> {
        if slug.is_empty() {
            return Err(CatalogError::Invalid("empty spell name".to_string()));
        }
        let mut url = self.endpoint()?;
        url.path_segments_mut()
            .map_err(|_| CatalogError::Invalid(format!("catalog url '{}'", self.base)))?
            .push(slug);

        debug!(%url, "fetching spell");
        let body = self.get(url).await?;
        let spell: Spell = serde_json::from_slice(&body)?;
        spell
            .validate()
            .map_err(|error| CatalogError::Invalid(error.to_string()))?;
        Ok(spell)
    }

    /// Matches for `keyword`, deduplicated by slug in first-seen order.
    pub async fn search(&self, keyword: &str) -> Result<Vec<SpellSummary>, CatalogError> {
        let terms = search_terms(keyword);
        if terms.is_empty() {
            return Err(CatalogError::Invalid("empty keyword".to_string()));
        }
        let mut url = self.endpoint()?;
        url.set_query(Some(&format!("name={terms}")));

        debug!(%url, "searching catalog");
        let body = self.get(url).await?;
        let response: SearchResponse = serde_json::from_slice(&body)?;

        let mut matches: Vec<SpellSummary> = Vec::with_capacity(response.results.len());
        for summary in response.results {
            if !matches.iter().any(|seen| seen.index == summary.index) {
                matches.push(summary);
            }
        }
        Ok(matches)
    }

    fn endpoint(&self) -> Result<Url, CatalogError> {
        Url::parse(&format!("{}/spells", self.base))
            .map_err(|error| CatalogError::Invalid(error.to_string()))
    }

    async fn get(&self, url: Url) -> Result<bytes::Bytes, CatalogError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(CatalogError::NotFound {
                status: status.as_u16(),
            });
        }
        Ok(response.bytes().await?)
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
