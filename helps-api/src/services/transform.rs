//! Transformation engine
//!
//! Converts raw fetched payloads into response-ready structures. The
//! transformation id is a closed enum validated at registry load, so
//! dispatch here is total: every endpoint reaching this point carries a
//! known transformation.

use serde_json::{json, Value};

use helps_common::reference;

use crate::endpoints::{ParamValue, ParsedParams, TransformId};
use crate::services::{tsv, usfm};

/// Apply a transformation to a fetched payload.
pub fn apply(id: TransformId, data: Value, params: &ParsedParams) -> Value {
    match id {
        TransformId::UsfmToText => usfm_to_text(data, params),
        TransformId::TsvParse => tsv_parse(data),
        TransformId::MarkdownAssemble => markdown_assemble(data),
        TransformId::ArrayFlatten => array_flatten(data),
        TransformId::ReferenceParse => reference_parse(params),
        TransformId::JsonPassthrough => data,
    }
}

/// Raw USFM strings reduce to the requested plain-text slice; payloads the
/// resolver already extracted pass through untouched.
fn usfm_to_text(data: Value, params: &ParsedParams) -> Value {
    let Value::String(raw) = data else {
        return data;
    };

    let text = match params.get("reference").and_then(ParamValue::as_str) {
        Some(text) => {
            let parsed = reference::parse(text);
            if parsed.is_valid {
                usfm::extract(&raw, &parsed).unwrap_or_default()
            } else {
                usfm::to_text(&raw)
            }
        }
        None => usfm::to_text(&raw),
    };
    json!({ "text": text })
}

fn tsv_parse(data: Value) -> Value {
    let Value::String(raw) = data else {
        return data;
    };
    let table = tsv::parse(&raw);
    json!({ "headers": table.headers, "rows": table.rows })
}

/// Shallow markdown assembly: title pulled from the first heading
fn markdown_assemble(data: Value) -> Value {
    let Value::String(raw) = data else {
        return data;
    };
    let markdown = raw.replace("\r\n", "\n").trim().to_string();
    let title = markdown
        .lines()
        .find(|line| line.starts_with('#'))
        .map(|line| line.trim_start_matches('#').trim().to_string());
    match title {
        Some(title) => json!({ "title": title, "markdown": markdown }),
        None => json!({ "markdown": markdown }),
    }
}

/// Hoist a wrapped `data` array and flatten one level of nesting
fn array_flatten(data: Value) -> Value {
    let inner = match data {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => Value::Array(items),
            Some(other) => other,
            None => Value::Object(map),
        },
        other => other,
    };

    match inner {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .flat_map(|item| match item {
                    Value::Array(nested) => nested,
                    single => vec![single],
                })
                .collect(),
        ),
        other => other,
    }
}

/// Parse the request's `reference` parameter; upstream payload is unused
fn reference_parse(params: &ParsedParams) -> Value {
    let text = params
        .get("reference")
        .and_then(ParamValue::as_str)
        .unwrap_or_default();
    serde_json::to_value(reference::parse(text)).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::ParamValue;

    fn params_with_reference(text: &str) -> ParsedParams {
        let mut params = ParsedParams::new();
        params.insert("reference".to_string(), ParamValue::Str(text.to_string()));
        params
    }

    #[test]
    fn usfm_string_is_extracted() {
        let usfm = "\\c 3\n\\v 16 For God so loved the world,\n";
        let out = apply(
            TransformId::UsfmToText,
            Value::String(usfm.to_string()),
            &params_with_reference("John 3:16"),
        );
        assert_eq!(out["text"], "For God so loved the world,");
    }

    #[test]
    fn structured_payload_passes_usfm_transform_untouched() {
        let payload = json!({ "scriptures": [{ "text": "already extracted" }] });
        let out = apply(
            TransformId::UsfmToText,
            payload.clone(),
            &params_with_reference("John 3:16"),
        );
        assert_eq!(out, payload);
    }

    #[test]
    fn tsv_string_becomes_rows() {
        let out = apply(
            TransformId::TsvParse,
            Value::String("A\tB\n1\t2\n".to_string()),
            &ParsedParams::new(),
        );
        assert_eq!(out["headers"], json!(["A", "B"]));
        assert_eq!(out["rows"][0]["A"], "1");
    }

    #[test]
    fn markdown_gets_a_title() {
        let out = apply(
            TransformId::MarkdownAssemble,
            Value::String("# Metaphor\r\n\r\nBody text".to_string()),
            &ParsedParams::new(),
        );
        assert_eq!(out["title"], "Metaphor");
        assert!(out["markdown"].as_str().unwrap().contains("Body text"));
    }

    #[test]
    fn array_flatten_hoists_data_and_flattens() {
        let out = apply(
            TransformId::ArrayFlatten,
            json!({ "data": [[1, 2], [3], 4] }),
            &ParsedParams::new(),
        );
        assert_eq!(out, json!([1, 2, 3, 4]));
    }

    #[test]
    fn reference_parse_uses_params_not_payload() {
        let out = apply(
            TransformId::ReferenceParse,
            json!({}),
            &params_with_reference("1Co 1"),
        );
        assert_eq!(out["book"], "1 Corinthians");
        assert_eq!(out["chapter"], 1);
        assert_eq!(out["isValid"], true);
    }

    #[test]
    fn passthrough_is_identity() {
        let payload = json!({ "anything": [1, 2, 3] });
        assert_eq!(
            apply(TransformId::JsonPassthrough, payload.clone(), &ParsedParams::new()),
            payload
        );
    }
}
