//! Ingredient-based resource resolver
//!
//! Locates content when no static file path is known in advance. Each
//! candidate repository publishes an *ingredients* manifest mapping
//! canonical book codes to file paths, so the resolver adapts to
//! repository layout instead of hardcoding filenames.
//!
//! Scripture: catalog search -> skip translation-helps repos -> match
//! ingredient by book code -> fetch the raw file -> extract the
//! requested slice. Every successful extraction accumulates, so one
//! request can surface several translations. Translation helps fetch a
//! per-category TSV by fixed naming convention and filter its rows.
//!
//! All requested categories for one request launch together; each
//! category catches its own errors and degrades to empty/undefined, so
//! categories are mutually fault-isolated.

use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};

use helps_common::{books, reference, ParsedReference};

use crate::endpoints::{ParamValue, ParsedParams, ResourceCategory};
use crate::error::{GatewayError, GatewayResult};
use crate::services::dcs_client::ContentClient;
use crate::services::{tsv, usfm};
use crate::trace::FetchContext;

/// Repository name suffixes marking translation-helps repos, which are
/// never scripture candidates
const HELPS_SUFFIXES: &[&str] = &["_tn", "_tq", "_tw", "_twl", "_ta", "_obs"];

/// One catalog search hit with its ingredient manifest
#[derive(Debug, Clone)]
pub struct CatalogRepo {
    pub name: String,
    pub owner: String,
    pub title: Option<String>,
    pub ingredients: Vec<Ingredient>,
}

/// Manifest entry mapping a canonical book code to a file path
#[derive(Debug, Clone)]
pub struct Ingredient {
    pub identifier: String,
    pub path: String,
}

/// One successfully extracted scripture text
#[derive(Debug, Clone, Serialize)]
pub struct ScriptureText {
    pub text: String,
    /// Human-readable source ("unfoldingWord Literal Text" or repo name)
    pub translation: String,
    pub resource: String,
}

/// Query the content host's catalog.
pub async fn catalog_search(
    client: &dyn ContentClient,
    ctx: &FetchContext,
    language: &str,
    organization: &str,
    subject: &str,
) -> GatewayResult<Vec<CatalogRepo>> {
    let url =
        format!("catalog:search?lang={language}&owner={organization}&subject={subject}&stage=prod");
    let payload = client.get_json(ctx, &url).await?;

    let entries = payload
        .get("data")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    Ok(entries.iter().filter_map(parse_catalog_entry).collect())
}

fn parse_catalog_entry(entry: &Value) -> Option<CatalogRepo> {
    let name = entry.get("name").and_then(Value::as_str)?.to_string();
    let owner = entry
        .get("owner")
        .and_then(|owner| owner.as_str().map(str::to_string).or_else(|| {
            owner.get("username").and_then(Value::as_str).map(str::to_string)
        }))?;
    let title = entry
        .get("title")
        .and_then(Value::as_str)
        .map(str::to_string);
    let ingredients = entry
        .get("ingredients")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    Some(Ingredient {
                        identifier: item.get("identifier").and_then(Value::as_str)?.to_string(),
                        path: item.get("path").and_then(Value::as_str)?.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    Some(CatalogRepo {
        name,
        owner,
        title,
        ingredients,
    })
}

fn is_helps_repo(name: &str) -> bool {
    HELPS_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Locate and extract scripture for a reference across all candidate
/// repositories. `None` when no candidate yields a valid extraction.
pub async fn fetch_scripture(
    client: &dyn ContentClient,
    ctx: &FetchContext,
    params: &ParsedParams,
    parsed: &ParsedReference,
) -> Option<Vec<ScriptureText>> {
    if !parsed.is_valid {
        return None;
    }
    let language = str_param(params, "language");
    let organization = str_param(params, "organization");
    let book_code = books::code_for_name(&parsed.book);

    let repos = match catalog_search(client, ctx, &language, &organization, "Bible,Aligned Bible").await
    {
        Ok(repos) => repos,
        Err(error) => {
            tracing::debug!(error = %error, "catalog search failed for scripture");
            return None;
        }
    };

    let mut tried = Vec::new();
    let mut found = Vec::new();

    for repo in repos.iter().filter(|repo| !is_helps_repo(&repo.name)) {
        tried.push(repo.name.clone());

        let Some(ingredient) = repo
            .ingredients
            .iter()
            .find(|ingredient| ingredient.identifier.eq_ignore_ascii_case(&book_code))
        else {
            continue;
        };

        // Ingredient paths are repo-relative, often "./67-REV.usfm"
        let path = ingredient.path.trim_start_matches("./");
        let url = format!("file:{}/{}/{}", repo.owner, repo.name, path);
        let raw = match client.get_text(ctx, &url).await {
            Ok(raw) => raw,
            Err(error) => {
                tracing::debug!(repo = %repo.name, error = %error, "raw file fetch failed");
                continue;
            }
        };

        // A failed extraction is "not found" for this candidate only
        if let Some(text) = usfm::extract(&raw, parsed) {
            found.push(ScriptureText {
                text,
                translation: repo.title.clone().unwrap_or_else(|| repo.name.clone()),
                resource: repo.name.clone(),
            });
        }
    }

    if found.is_empty() {
        tracing::debug!(
            book = %book_code,
            tried = ?tried,
            "no scripture candidate yielded a valid extraction"
        );
        return None;
    }
    Some(found)
}

/// Fetch and filter one tabular translation-helps category. Failures
/// degrade to an empty list.
pub async fn fetch_tabular(
    client: &dyn ContentClient,
    ctx: &FetchContext,
    params: &ParsedParams,
    parsed: &ParsedReference,
    category: ResourceCategory,
) -> Vec<tsv::TsvRow> {
    if !parsed.is_valid {
        return Vec::new();
    }
    let language = str_param(params, "language");
    let organization = str_param(params, "organization");
    let abbrev = category.abbrev();
    let book_code = books::code_for_name(&parsed.book);

    // Fixed per-category naming convention: repo {lang}_{abbrev},
    // file {abbrev}_{BOOK}.tsv
    let url = format!("file:{organization}/{language}_{abbrev}/{abbrev}_{book_code}.tsv");
    let raw = match client.get_text(ctx, &url).await {
        Ok(raw) => raw,
        Err(error) => {
            tracing::debug!(category = %abbrev, error = %error, "tabular fetch failed");
            return Vec::new();
        }
    };

    let table = tsv::parse(&raw);
    table
        .rows
        .into_iter()
        .filter(|row| {
            tsv::row_matches(
                row,
                parsed.chapter,
                parsed.verse,
                parsed.end_chapter,
                parsed.end_verse,
            )
        })
        .collect()
}

/// Fetch a whole markdown document (translation-academy module).
pub async fn fetch_document(
    client: &dyn ContentClient,
    ctx: &FetchContext,
    params: &ParsedParams,
) -> GatewayResult<Value> {
    let language = str_param(params, "language");
    let organization = str_param(params, "organization");
    let module = params
        .get("module")
        .and_then(ParamValue::as_str)
        .ok_or_else(|| GatewayError::Validation(vec!["Required parameter 'module' is missing".into()]))?;

    let url = format!("file:{organization}/{language}_ta/translate/{module}/01.md");
    let body = client.get_text(ctx, &url).await?;
    Ok(Value::String(body))
}

/// Payload for a scripture-only endpoint.
pub async fn scripture_payload(
    client: &dyn ContentClient,
    ctx: &FetchContext,
    params: &ParsedParams,
) -> GatewayResult<Value> {
    let parsed = parse_request_reference(params);
    let scriptures = fetch_scripture(client, ctx, params, &parsed).await;

    let mut payload = json!({
        "reference": parsed.original_text,
        "language": str_param(params, "language"),
        "organization": str_param(params, "organization"),
    });
    // Absent scripture stays absent, never null or an empty object
    if let Some(scriptures) = scriptures {
        payload["scriptures"] = serde_json::to_value(scriptures)
            .map_err(|e| GatewayError::Internal(e.to_string()))?;
    }
    Ok(payload)
}

/// Payload for a single tabular category endpoint.
pub async fn tabular_payload(
    client: &dyn ContentClient,
    ctx: &FetchContext,
    params: &ParsedParams,
    category: ResourceCategory,
) -> GatewayResult<Value> {
    let parsed = parse_request_reference(params);
    let rows = fetch_tabular(client, ctx, params, &parsed, category).await;

    let mut payload = json!({
        "reference": parsed.original_text,
        "language": str_param(params, "language"),
        "organization": str_param(params, "organization"),
    });
    payload[category.response_key()] =
        serde_json::to_value(rows).map_err(|e| GatewayError::Internal(e.to_string()))?;
    Ok(payload)
}

/// Aggregate all resource categories for one reference.
///
/// The five categories launch together; completion order is unspecified
/// but the aggregate is assembled by category key, so composition is
/// deterministic. Scripture is omitted (not an empty object) when truly
/// absent; tabular categories default to empty arrays.
pub async fn aggregate(
    client: &dyn ContentClient,
    ctx: &FetchContext,
    params: &ParsedParams,
) -> GatewayResult<Value> {
    let parsed = parse_request_reference(params);

    let (scriptures, notes, questions, words, word_links) = tokio::join!(
        fetch_scripture(client, ctx, params, &parsed),
        fetch_tabular(client, ctx, params, &parsed, ResourceCategory::Notes),
        fetch_tabular(client, ctx, params, &parsed, ResourceCategory::Questions),
        fetch_tabular(client, ctx, params, &parsed, ResourceCategory::Words),
        fetch_tabular(client, ctx, params, &parsed, ResourceCategory::WordLinks),
    );

    let mut payload = json!({
        "reference": parsed.original_text,
        "language": str_param(params, "language"),
        "organization": str_param(params, "organization"),
        "translationNotes": notes,
        "translationQuestions": questions,
        "translationWords": words,
        "translationWordLinks": word_links,
        "timestamp": Utc::now().to_rfc3339(),
    });
    if let Some(scriptures) = scriptures {
        payload["scriptures"] = serde_json::to_value(scriptures)
            .map_err(|e| GatewayError::Internal(e.to_string()))?;
    }
    Ok(payload)
}

fn parse_request_reference(params: &ParsedParams) -> ParsedReference {
    let text = params
        .get("reference")
        .and_then(ParamValue::as_str)
        .unwrap_or_default();
    reference::parse(text)
}

fn str_param(params: &ParsedParams, name: &str) -> String {
    params
        .get(name)
        .and_then(ParamValue::as_str)
        .unwrap_or_default()
        .to_string()
}
