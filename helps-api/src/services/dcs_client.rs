//! Upstream content client
//!
//! All upstream traffic goes through `ContentClient`. Callers address
//! content by tier-prefixed pseudo-URL (`catalog:search?...`,
//! `file:{owner}/{repo}/{path}`, `zipfile:{owner}/{repo}`,
//! `internal://...`); the client resolves that to a real content-host URL,
//! consults the request-transient map and the shared tier cache, records
//! exactly one trace entry per call, and fetches on a miss.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use helps_common::GatewayConfig;

use crate::error::{GatewayError, GatewayResult};
use crate::services::cache::TierCache;
use crate::trace::{FetchContext, Tier};

const USER_AGENT: &str = concat!("helps-api/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Async seam for upstream content access; mocked in tests
#[async_trait]
pub trait ContentClient: Send + Sync {
    /// Fetch the body at a tier-prefixed pseudo-URL
    async fn get_text(&self, ctx: &FetchContext, url: &str) -> GatewayResult<String>;

    /// Fetch and parse a JSON body
    async fn get_json(&self, ctx: &FetchContext, url: &str) -> GatewayResult<Value> {
        let text = self.get_text(ctx, url).await?;
        serde_json::from_str(&text).map_err(|e| {
            GatewayError::upstream(None, format!("Upstream returned invalid JSON for {url}: {e}"))
        })
    }
}

/// reqwest-backed client layered over the shared tier cache
pub struct DcsClient {
    http: reqwest::Client,
    cache: Arc<dyn TierCache>,
    base_url: String,
    catalog_ttl: Duration,
    zip_ttl: Duration,
    file_ttl: Duration,
}

impl DcsClient {
    pub fn new(config: &GatewayConfig, cache: Arc<dyn TierCache>) -> GatewayResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| GatewayError::Internal(format!("HTTP client build failed: {e}")))?;

        Ok(Self {
            http,
            cache,
            base_url: config.dcs_base_url.clone(),
            catalog_ttl: Duration::from_secs(config.catalog_ttl_secs),
            zip_ttl: Duration::from_secs(config.zip_ttl_secs),
            file_ttl: Duration::from_secs(config.file_ttl_secs),
        })
    }

    fn ttl(&self, tier: Tier) -> Duration {
        match tier {
            Tier::Catalog => self.catalog_ttl,
            Tier::Zip => self.zip_ttl,
            Tier::File | Tier::Internal => self.file_ttl,
        }
    }

    /// Map a pseudo-URL onto the content host's real URL layout
    fn resolve_url(&self, url: &str) -> String {
        if let Some(query) = url.strip_prefix("catalog:") {
            format!("{}/api/v1/catalog/{query}", self.base_url)
        } else if let Some(path) = url.strip_prefix("file:") {
            // file:{owner}/{repo}/{path} -> raw file on the default branch
            match path.splitn(3, '/').collect::<Vec<_>>().as_slice() {
                [owner, repo, file] => format!(
                    "{}/{owner}/{repo}/raw/branch/master/{file}",
                    self.base_url
                ),
                _ => format!("{}/{path}", self.base_url),
            }
        } else if let Some(repo) = url.strip_prefix("zipfile:") {
            format!("{}/{repo}/archive/master.zip", self.base_url)
        } else if url.starts_with('/') {
            format!("{}{url}", self.base_url)
        } else {
            url.to_string()
        }
    }
}

#[async_trait]
impl ContentClient for DcsClient {
    async fn get_text(&self, ctx: &FetchContext, url: &str) -> GatewayResult<String> {
        // Process-memory lookups never leave the process. The empty JSON
        // body keeps downstream json parsing total.
        if url.starts_with("internal://") {
            ctx.record(url, true);
            return Ok("{}".to_string());
        }

        let tier = Tier::classify(url);

        if !ctx.bypass_cache {
            if let Some(body) = ctx.transient_get(url) {
                ctx.record(url, true);
                return Ok(body);
            }
            if let Some(body) = self.cache.get(tier, url).await {
                tracing::debug!(url = %url, ?tier, "tier cache hit");
                ctx.record(url, true);
                ctx.transient_put(url, body.clone());
                return Ok(body);
            }
        }
        ctx.record(url, false);

        let resolved = self.resolve_url(url);
        tracing::debug!(url = %url, resolved = %resolved, "fetching from content host");

        let response = self
            .http
            .get(&resolved)
            .send()
            .await
            .map_err(|e| GatewayError::upstream(None, format!("Request to {resolved} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::upstream(
                Some(status.as_u16()),
                format!("Content host returned {status} for {resolved}"),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::upstream(None, format!("Reading body from {resolved} failed: {e}")))?;

        self.cache.set(tier, url, body.clone(), self.ttl(tier)).await;
        ctx.transient_put(url, body.clone());
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::cache::MemoryTierCache;

    fn client() -> DcsClient {
        let config = GatewayConfig::default();
        DcsClient::new(&config, Arc::new(MemoryTierCache::new())).unwrap()
    }

    #[test]
    fn resolves_catalog_urls() {
        assert_eq!(
            client().resolve_url("catalog:search?lang=en"),
            "https://git.door43.org/api/v1/catalog/search?lang=en"
        );
    }

    #[test]
    fn resolves_file_urls() {
        assert_eq!(
            client().resolve_url("file:unfoldingWord/en_ult/43-JHN.usfm"),
            "https://git.door43.org/unfoldingWord/en_ult/raw/branch/master/43-JHN.usfm"
        );
        // Paths inside the repo keep their slashes
        assert_eq!(
            client().resolve_url("file:org/en_ta/translate/figs-metaphor/01.md"),
            "https://git.door43.org/org/en_ta/raw/branch/master/translate/figs-metaphor/01.md"
        );
    }

    #[test]
    fn resolves_zip_urls() {
        assert_eq!(
            client().resolve_url("zipfile:unfoldingWord/en_ult"),
            "https://git.door43.org/unfoldingWord/en_ult/archive/master.zip"
        );
    }

    #[tokio::test]
    async fn internal_urls_are_memory_hits() {
        let ctx = FetchContext::new(false);
        let body = client()
            .get_text(&ctx, "internal://reference-parser")
            .await
            .unwrap();
        assert_eq!(body, "{}");

        let trace = ctx.trace();
        assert_eq!(trace.len(), 1);
        assert!(trace[0].cached);
    }
}
