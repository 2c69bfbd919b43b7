//! Shared test fixtures: a canned-response content client and catalog
//! payload builders

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use helps_api::error::{GatewayError, GatewayResult};
use helps_api::services::ContentClient;
use helps_api::trace::FetchContext;
use helps_api::{build_router, endpoints, AppState};

/// Content client serving canned bodies by URL substring.
///
/// Remembers every URL it has served; a repeat fetch counts as a tier
/// cache hit, which lets tests observe miss -> hit transitions without a
/// real cache.
pub struct MockClient {
    routes: Vec<(String, String)>,
    seen: Mutex<HashSet<String>>,
}

impl MockClient {
    pub fn new(routes: &[(&str, &str)]) -> Self {
        Self {
            routes: routes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            seen: Mutex::new(HashSet::new()),
        }
    }
}

#[async_trait]
impl ContentClient for MockClient {
    async fn get_text(&self, ctx: &FetchContext, url: &str) -> GatewayResult<String> {
        if url.starts_with("internal://") {
            ctx.record(url, true);
            return Ok("{}".to_string());
        }

        let mut seen = self.seen.lock().unwrap();
        let cached = !ctx.bypass_cache && seen.contains(url);
        ctx.record(url, cached);
        seen.insert(url.to_string());

        match self
            .routes
            .iter()
            .find(|(needle, _)| url.contains(needle.as_str()))
        {
            Some((_, body)) => Ok(body.clone()),
            None => Err(GatewayError::upstream(
                Some(404),
                format!("no canned response for {url}"),
            )),
        }
    }
}

/// Router over the built-in endpoint registry and a mock client
pub fn app(routes: &[(&str, &str)]) -> axum::Router {
    let client = Arc::new(MockClient::new(routes));
    let state = AppState::new(endpoints::builtin_endpoints(), client).unwrap();
    build_router(state)
}

pub const JOHN_USFM: &str = "\\id JHN unfoldingWord Literal Text\n\
    \\c 3\n\
    \\p\n\
    \\v 16 For God so loved the world, that he gave his only Son.\n\
    \\v 17 For God did not send his Son into the world to condemn the world.\n\
    \\c 4\n\
    \\v 1 Now when Jesus knew the Pharisees had heard.\n";

pub const JOHN_NOTES_TSV: &str = "Reference\tID\tTags\tSupportReference\tQuote\tOccurrence\tNote\n\
    3:16\tabc1\t\t\tso loved\t1\tGod's love for the world\n\
    3:17\tabc2\t\t\tcondemn\t1\tNot sent to condemn\n\
    4:1\tabc3\t\t\tknew\t1\tJesus' knowledge\n";

/// Catalog payload with three scripture candidates; only the second
/// carries an ingredient for John.
pub fn three_repo_catalog() -> String {
    json!({
        "data": [
            {
                "name": "en_rlb",
                "owner": { "username": "unfoldingWord" },
                "title": "Reference Literal Bible",
                "ingredients": [ { "identifier": "gen", "path": "./01-GEN.usfm" } ]
            },
            {
                "name": "en_ult",
                "owner": { "username": "unfoldingWord" },
                "title": "unfoldingWord Literal Text",
                "ingredients": [
                    { "identifier": "gen", "path": "./01-GEN.usfm" },
                    { "identifier": "jhn", "path": "./44-JHN.usfm" }
                ]
            },
            {
                "name": "en_ust",
                "owner": { "username": "unfoldingWord" },
                "title": "unfoldingWord Simplified Text",
                "ingredients": [ { "identifier": "mat", "path": "./41-MAT.usfm" } ]
            }
        ]
    })
    .to_string()
}

/// Extract a JSON body from an axum response body
pub async fn body_json(body: axum::body::Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("should read body");
    serde_json::from_slice(&bytes).expect("should parse JSON")
}

pub async fn body_text(body: axum::body::Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("should read body");
    String::from_utf8(bytes.to_vec()).expect("should be utf-8")
}
