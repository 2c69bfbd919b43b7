//! helps-api library - translation-helps gateway service
//!
//! Serves Bible-translation-resource requests by aggregating content
//! from a git-based content host, applying format-specific
//! transformations, and rendering consistent multi-format responses.
//! Upstream data is cached per tier; the HTTP response never is.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::Query;
use axum::http::{HeaderMap, Method};
use axum::routing::any;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod dispatch;
pub mod endpoints;
pub mod error;
pub mod params;
pub mod services;
pub mod trace;

pub use error::{GatewayError, GatewayResult};

use endpoints::EndpointConfig;
use services::dcs_client::ContentClient;

/// Application state shared across handlers.
///
/// Built once from the immutable endpoint registry plus injected
/// collaborators; there is no process-wide mutable singleton state, and
/// nothing here outlives differently than the process itself.
#[derive(Clone)]
pub struct AppState {
    /// Validated endpoint registry, immutable after load
    pub endpoints: Arc<Vec<Arc<EndpointConfig>>>,
    /// Upstream content client (layered over the shared tier cache)
    pub client: Arc<dyn ContentClient>,
}

impl AppState {
    /// Validate the registry and assemble application state. A registry
    /// misconfiguration refuses to start rather than failing per request.
    pub fn new(
        endpoints: Vec<EndpointConfig>,
        client: Arc<dyn ContentClient>,
    ) -> GatewayResult<Self> {
        endpoints::validate(&endpoints)?;
        Ok(Self {
            endpoints: Arc::new(endpoints.into_iter().map(Arc::new).collect()),
            client,
        })
    }
}

/// Build the application router from the endpoint registry.
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new().merge(api::health_routes());

    for endpoint in state.endpoints.iter() {
        let endpoint = Arc::clone(endpoint);
        let path = endpoint.path.clone();
        let state = state.clone();
        let handler = move |method: Method,
                            headers: HeaderMap,
                            Query(query): Query<HashMap<String, String>>,
                            body: Bytes| {
            let state = state.clone();
            let endpoint = Arc::clone(&endpoint);
            async move { api::handler::handle(state, endpoint, method, headers, query, body).await }
        };
        router = router.route(&path, any(handler));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
