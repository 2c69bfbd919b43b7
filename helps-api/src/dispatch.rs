//! Dispatch router
//!
//! Selects the data path for an endpoint's declared data-source kind.
//! The union is closed and matched exhaustively: adding a kind fails to
//! compile until every dispatch point handles it. Each call receives its
//! own `FetchContext`; nothing here survives between requests.

use serde_json::Value;

use crate::endpoints::{DataSource, EndpointConfig, FetchStrategy, ParsedParams};
use crate::error::GatewayResult;
use crate::services::dcs_client::ContentClient;
use crate::services::{fetch_adapter, resolver};
use crate::trace::FetchContext;

/// Route one request to its data source and return the raw payload.
pub async fn dispatch(
    client: &dyn ContentClient,
    ctx: &FetchContext,
    endpoint: &EndpointConfig,
    params: &ParsedParams,
) -> GatewayResult<Value> {
    match &endpoint.data_source {
        DataSource::Direct { template } => {
            fetch_adapter::fetch(client, ctx, template, params).await
        }
        DataSource::Computed => resolver::aggregate(client, ctx, params).await,
        DataSource::Hybrid { template } => match template {
            // The seed is returned unchanged; the computed step never
            // runs when a seed exists. Known incompleteness, preserved
            // as observed.
            Some(template) => fetch_adapter::fetch(client, ctx, template, params).await,
            None => resolver::aggregate(client, ctx, params).await,
        },
        DataSource::ArchiveCached { strategy, category } => match strategy {
            FetchStrategy::VerseRange => resolver::scripture_payload(client, ctx, params).await,
            FetchStrategy::Tabular => {
                resolver::tabular_payload(client, ctx, params, *category).await
            }
            FetchStrategy::Document => resolver::fetch_document(client, ctx, params).await,
        },
    }
}
