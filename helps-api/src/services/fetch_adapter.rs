//! DCS fetch adapter
//!
//! Resolves a request's parameters into upstream path parameters and
//! performs direct content-host calls. When a `reference` parameter is
//! present its canonical book name is mapped to the 3-letter code and
//! `book`, `bookNumber`, `chapter` are injected into the substitution
//! set. A `resource` of `"all"` (or a comma list) fans out sequentially,
//! one upstream call per resource; individual failures are captured
//! in-band rather than aborting the batch.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use helps_common::{books, reference};

use crate::endpoints::{ParamValue, ParsedParams};
use crate::error::{GatewayError, GatewayResult};
use crate::services::dcs_client::ContentClient;
use crate::trace::FetchContext;

/// Resources `resource=all` resolves to
pub const ALL_RESOURCES: &[&str] = &["tn", "tq", "tw", "twl"];

/// Stringify parameters and inject reference-derived values.
pub fn expand_params(params: &ParsedParams) -> BTreeMap<String, String> {
    let mut expanded: BTreeMap<String, String> = params
        .iter()
        .map(|(name, value)| (name.clone(), value.to_template_string()))
        .collect();

    if let Some(text) = params.get("reference").and_then(ParamValue::as_str) {
        let parsed = reference::parse(text);
        if parsed.is_valid {
            expanded.insert("book".to_string(), books::code_for_name(&parsed.book));
            if let Some(book) = books::find(&parsed.book) {
                expanded.insert("bookNumber".to_string(), format!("{:02}", book.number));
            }
            if let Some(chapter) = parsed.chapter {
                expanded.insert("chapter".to_string(), chapter.to_string());
            }
        }
    }

    expanded
}

/// Substitute `{param}` placeholders. An unresolved placeholder is a
/// configuration error: fatal and unretried.
pub fn substitute(template: &str, expanded: &BTreeMap<String, String>) -> GatewayResult<String> {
    let mut result = template.to_string();
    for (name, value) in expanded {
        result = result.replace(&format!("{{{name}}}"), value);
    }
    if let Some(open) = result.find('{') {
        let tail = &result[open..];
        let placeholder = tail
            .find('}')
            .map(|close| &tail[..=close])
            .unwrap_or(tail);
        return Err(GatewayError::Misconfiguration(format!(
            "Template placeholder {placeholder} has no value"
        )));
    }
    Ok(result)
}

/// Fetch a direct endpoint's payload.
pub async fn fetch(
    client: &dyn ContentClient,
    ctx: &FetchContext,
    template: &str,
    params: &ParsedParams,
) -> GatewayResult<Value> {
    let expanded = expand_params(params);

    let resource = params.get("resource").and_then(ParamValue::as_str);
    let fan_out: Option<Vec<String>> = match resource {
        Some("all") => Some(ALL_RESOURCES.iter().map(|s| s.to_string()).collect()),
        Some(list) if list.contains(',') => Some(
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        _ => None,
    };

    match fan_out {
        Some(resources) => {
            // Sequential by design: simpler partial-failure bookkeeping
            // at the cost of latency
            let mut results = Vec::with_capacity(resources.len());
            for resource in resources {
                let mut expanded = expanded.clone();
                expanded.insert("resource".to_string(), resource.clone());
                let url = substitute(template, &expanded)?;
                match client.get_json(ctx, &url).await {
                    Ok(data) => results.push(json!({
                        "resource": resource,
                        "success": true,
                        "data": data,
                    })),
                    Err(error) => {
                        tracing::debug!(resource = %resource, error = %error, "resource fan-out entry failed");
                        results.push(json!({
                            "resource": resource,
                            "success": false,
                            "error": error.to_string(),
                        }));
                    }
                }
            }
            Ok(json!({ "resources": results }))
        }
        None => {
            let url = substitute(template, &expanded)?;
            client.get_json(ctx, &url).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::ParamValue;

    fn params(pairs: &[(&str, &str)]) -> ParsedParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), ParamValue::Str(v.to_string())))
            .collect()
    }

    #[test]
    fn injects_book_number_and_chapter() {
        let expanded = expand_params(&params(&[("reference", "John 3:16")]));
        assert_eq!(expanded["book"], "JHN");
        assert_eq!(expanded["bookNumber"], "43");
        assert_eq!(expanded["chapter"], "3");
    }

    #[test]
    fn unmapped_book_passes_through_uppercased() {
        let mut p = params(&[]);
        p.insert("reference".to_string(), ParamValue::Str("John 3".to_string()));
        let expanded = expand_params(&p);
        assert_eq!(expanded["book"], "JHN");

        // An invalid reference injects nothing
        let expanded = expand_params(&params(&[("reference", "Nonsense 9:9")]));
        assert!(!expanded.contains_key("book"));
    }

    #[test]
    fn substitution_fills_all_placeholders() {
        let expanded = expand_params(&params(&[
            ("reference", "Genesis 1:1"),
            ("language", "en"),
        ]));
        let url = substitute("file:org/{language}_ult/{bookNumber}-{book}.usfm", &expanded).unwrap();
        assert_eq!(url, "file:org/en_ult/01-GEN.usfm");
    }

    #[test]
    fn unresolved_placeholder_is_fatal() {
        let err = substitute("catalog:search?owner={organization}", &BTreeMap::new());
        assert!(matches!(err, Err(GatewayError::Misconfiguration(_))));
    }
}
