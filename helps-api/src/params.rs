//! Parameter pipeline: parse, coerce, default, validate
//!
//! Pure function of (raw input, schema). Query values win over JSON body
//! values on conflict; parameters not in the schema are ignored. All
//! validation violations accumulate, so a caller gets either a fully
//! valid parameter map or the complete list of problems for one 400.

use std::collections::HashMap;

use regex::Regex;
use serde_json::Value;

use crate::endpoints::{ParamKind, ParamSpec, ParamValue, ParsedParams};

/// Parse, coerce, and validate raw request parameters against a schema.
pub fn parse_and_validate(
    specs: &[ParamSpec],
    query: &HashMap<String, String>,
    body: Option<&Value>,
) -> Result<ParsedParams, Vec<String>> {
    let mut params = ParsedParams::new();
    let mut violations = Vec::new();

    for spec in specs {
        match raw_value(spec, query, body) {
            Some(raw) => {
                if let Some(value) = coerce(spec, &raw, &mut violations) {
                    params.insert(spec.name.clone(), value);
                }
            }
            None => {
                // A present default satisfies "required"
                if let Some(default) = &spec.default {
                    params.insert(spec.name.clone(), default.clone());
                } else if spec.required {
                    violations.push(format!("Required parameter '{}' is missing", spec.name));
                }
            }
        }
    }

    for spec in specs {
        if let Some(value) = params.get(&spec.name) {
            validate_value(spec, value, &mut violations);
        }
    }

    if violations.is_empty() {
        Ok(params)
    } else {
        Err(violations)
    }
}

/// Raw string for a parameter: query first, then JSON body.
fn raw_value(spec: &ParamSpec, query: &HashMap<String, String>, body: Option<&Value>) -> Option<String> {
    if let Some(value) = query.get(&spec.name) {
        return Some(value.clone());
    }
    match body?.get(&spec.name)? {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(&spec.delimiter.to_string()),
        ),
        _ => None,
    }
}

/// Coerce a raw string by the declared type. A number that fails to parse
/// stays absent and is reported as a type violation.
fn coerce(spec: &ParamSpec, raw: &str, violations: &mut Vec<String>) -> Option<ParamValue> {
    match spec.kind {
        ParamKind::String => Some(ParamValue::Str(raw.to_string())),
        ParamKind::Boolean => Some(ParamValue::Bool(raw == "true")),
        ParamKind::Number => match raw.trim().parse::<f64>() {
            Ok(n) => Some(ParamValue::Num(n)),
            Err(_) => {
                violations.push(format!("Parameter '{}' must be a number", spec.name));
                None
            }
        },
        ParamKind::Array => Some(ParamValue::List(
            raw.split(spec.delimiter)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )),
    }
}

fn validate_value(spec: &ParamSpec, value: &ParamValue, violations: &mut Vec<String>) {
    match (spec.kind, value) {
        (ParamKind::String, ParamValue::Str(s)) => {
            if let Some(pattern) = &spec.pattern {
                match Regex::new(pattern) {
                    Ok(re) => {
                        if !re.is_match(s) {
                            violations.push(format!(
                                "Parameter '{}' does not match pattern {pattern}",
                                spec.name
                            ));
                        }
                    }
                    Err(_) => violations.push(format!(
                        "Parameter '{}' has an invalid pattern in its schema",
                        spec.name
                    )),
                }
            }
            if let Some(min) = spec.min {
                if (s.chars().count() as f64) < min {
                    violations.push(format!(
                        "Parameter '{}' is shorter than {min} characters",
                        spec.name
                    ));
                }
            }
            if let Some(max) = spec.max {
                if (s.chars().count() as f64) > max {
                    violations.push(format!(
                        "Parameter '{}' is longer than {max} characters",
                        spec.name
                    ));
                }
            }
            if let Some(options) = &spec.options {
                if !options.contains(s) {
                    violations.push(format!(
                        "Parameter '{}' must be one of: {}",
                        spec.name,
                        options.join(", ")
                    ));
                }
            }
        }
        (ParamKind::Number, ParamValue::Num(n)) => {
            if let Some(min) = spec.min {
                if *n < min {
                    violations.push(format!("Parameter '{}' is below minimum {min}", spec.name));
                }
            }
            if let Some(max) = spec.max {
                if *n > max {
                    violations.push(format!("Parameter '{}' is above maximum {max}", spec.name));
                }
            }
        }
        (ParamKind::Array, ParamValue::List(items)) => {
            if let Some(options) = &spec.options {
                for item in items {
                    if !options.contains(item) {
                        violations.push(format!(
                            "Parameter '{}' element '{item}' must be one of: {}",
                            spec.name,
                            options.join(", ")
                        ));
                    }
                }
            }
            if let Some(min) = spec.min {
                if (items.len() as f64) < min {
                    violations.push(format!(
                        "Parameter '{}' needs at least {min} elements",
                        spec.name
                    ));
                }
            }
            if let Some(max) = spec.max {
                if (items.len() as f64) > max {
                    violations.push(format!(
                        "Parameter '{}' allows at most {max} elements",
                        spec.name
                    ));
                }
            }
        }
        (ParamKind::Boolean, ParamValue::Bool(_)) => {}
        // Defaults are authored in the schema; a mismatched default is a
        // schema bug, reported as a type violation
        _ => violations.push(format!("Parameter '{}' has the wrong type", spec.name)),
    }
}
