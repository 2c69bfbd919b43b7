//! Endpoint configuration registry
//!
//! Declarative description of every HTTP endpoint the gateway serves:
//! parameter schema, data-source descriptor, and transformation id. The
//! registry is built once at startup, validated, and never mutated; the
//! router is constructed from it plus injected collaborators, with no
//! process-wide singleton state.
//!
//! Data-source kinds and transformation ids are closed enums, so an
//! unhandled variant fails to compile and arbitrary strings are rejected
//! once at load time rather than on every request.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::GatewayError;

/// Declared runtime type of a request parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Boolean,
    Number,
    Array,
}

/// A coerced parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Bool(bool),
    Num(f64),
    List(Vec<String>),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            ParamValue::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ParamValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// String form used for upstream template substitution
    pub fn to_template_string(&self) -> String {
        match self {
            ParamValue::Str(s) => s.clone(),
            ParamValue::Bool(b) => b.to_string(),
            ParamValue::Num(n) => {
                if n.fract() == 0.0 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            ParamValue::List(items) => items.join(","),
        }
    }
}

/// Parameters after coercion and validation, immutable per request
pub type ParsedParams = BTreeMap<String, ParamValue>;

/// Schema for one declared parameter
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    pub required: bool,
    pub default: Option<ParamValue>,
    /// Regex the (string) value must match
    pub pattern: Option<String>,
    /// Minimum: numeric value for numbers, length for strings
    pub min: Option<f64>,
    /// Maximum: numeric value for numbers, length for strings
    pub max: Option<f64>,
    /// Closed set of accepted values
    pub options: Option<Vec<String>>,
    /// Array element delimiter, ',' by default
    pub delimiter: char,
}

impl ParamSpec {
    pub fn new(name: &str, kind: ParamKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: false,
            default: None,
            pattern: None,
            min: None,
            max: None,
            options: None,
            delimiter: ',',
        }
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, ParamKind::String)
    }

    pub fn boolean(name: &str) -> Self {
        Self::new(name, ParamKind::Boolean)
    }

    pub fn number(name: &str) -> Self {
        Self::new(name, ParamKind::Number)
    }

    pub fn array(name: &str) -> Self {
        Self::new(name, ParamKind::Array)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: ParamValue) -> Self {
        self.default = Some(value);
        self
    }

    pub fn default_str(self, value: &str) -> Self {
        self.default_value(ParamValue::Str(value.to_string()))
    }

    pub fn pattern(mut self, pattern: &str) -> Self {
        self.pattern = Some(pattern.to_string());
        self
    }

    pub fn bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn options(mut self, options: &[&str]) -> Self {
        self.options = Some(options.iter().map(|s| s.to_string()).collect());
        self
    }
}

/// How archive-cached content is located and extracted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    /// USFM verse/chapter slice extraction
    VerseRange,
    /// TSV row extraction
    Tabular,
    /// Whole markdown document
    Document,
}

/// Resource category a request aggregates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceCategory {
    Scripture,
    Notes,
    Questions,
    Words,
    WordLinks,
    Academy,
}

impl ResourceCategory {
    /// Repository/file abbreviation used by the content host's naming
    /// convention (`en_tn`, `tn_JHN.tsv`)
    pub fn abbrev(self) -> &'static str {
        match self {
            ResourceCategory::Scripture => "bible",
            ResourceCategory::Notes => "tn",
            ResourceCategory::Questions => "tq",
            ResourceCategory::Words => "tw",
            ResourceCategory::WordLinks => "twl",
            ResourceCategory::Academy => "ta",
        }
    }

    /// Key this category's rows appear under in aggregated responses
    pub fn response_key(self) -> &'static str {
        match self {
            ResourceCategory::Scripture => "scriptures",
            ResourceCategory::Notes => "translationNotes",
            ResourceCategory::Questions => "translationQuestions",
            ResourceCategory::Words => "translationWords",
            ResourceCategory::WordLinks => "translationWordLinks",
            ResourceCategory::Academy => "translationAcademy",
        }
    }
}

/// Data-source descriptor: where an endpoint's payload comes from.
///
/// Closed union, matched exhaustively at the dispatch point.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// Direct content-host call through the fetch adapter
    Direct { template: String },
    /// Computed aggregation through the ingredient resolver, no seed
    Computed,
    /// Seed fetch via the adapter when a template is configured; the seed
    /// is returned unchanged (no further blending happens today)
    Hybrid { template: Option<String> },
    /// Ingredient resolver with a statically mapped extraction strategy
    ArchiveCached {
        strategy: FetchStrategy,
        category: ResourceCategory,
    },
}

/// Transformation applied to the fetched payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformId {
    UsfmToText,
    TsvParse,
    MarkdownAssemble,
    ArrayFlatten,
    ReferenceParse,
    JsonPassthrough,
}

impl TransformId {
    pub fn as_str(self) -> &'static str {
        match self {
            TransformId::UsfmToText => "usfm-to-text",
            TransformId::TsvParse => "tsv-parse",
            TransformId::MarkdownAssemble => "markdown-assemble",
            TransformId::ArrayFlatten => "array-flatten",
            TransformId::ReferenceParse => "reference-parse",
            TransformId::JsonPassthrough => "json-passthrough",
        }
    }
}

impl fmt::Display for TransformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformId {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "usfm-to-text" => Ok(TransformId::UsfmToText),
            "tsv-parse" => Ok(TransformId::TsvParse),
            "markdown-assemble" => Ok(TransformId::MarkdownAssemble),
            "array-flatten" => Ok(TransformId::ArrayFlatten),
            "reference-parse" => Ok(TransformId::ReferenceParse),
            "json-passthrough" => Ok(TransformId::JsonPassthrough),
            other => Err(GatewayError::Misconfiguration(format!(
                "Unknown transformation id: {other}"
            ))),
        }
    }
}

/// One endpoint's full declarative configuration, immutable after load
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub name: String,
    pub path: String,
    pub category: String,
    pub params: Vec<ParamSpec>,
    pub data_source: DataSource,
    pub transform: TransformId,
}

fn common_params() -> Vec<ParamSpec> {
    vec![
        ParamSpec::string("language").default_str("en").bounds(Some(2.0), Some(12.0)),
        ParamSpec::string("organization").default_str("unfoldingWord"),
        ParamSpec::string("format").options(&["json", "text", "md", "markdown", "usfm"]),
        ParamSpec::boolean("bypassCache").default_value(ParamValue::Bool(false)),
    ]
}

fn with_reference(mut params: Vec<ParamSpec>) -> Vec<ParamSpec> {
    params.insert(0, ParamSpec::string("reference").required());
    params
}

/// The built-in endpoint table
pub fn builtin_endpoints() -> Vec<EndpointConfig> {
    vec![
        EndpointConfig {
            name: "fetch-scripture".to_string(),
            path: "/api/fetch-scripture".to_string(),
            category: "scripture".to_string(),
            params: with_reference(common_params()),
            data_source: DataSource::ArchiveCached {
                strategy: FetchStrategy::VerseRange,
                category: ResourceCategory::Scripture,
            },
            transform: TransformId::UsfmToText,
        },
        EndpointConfig {
            name: "fetch-translation-notes".to_string(),
            path: "/api/fetch-translation-notes".to_string(),
            category: "helps".to_string(),
            params: with_reference(common_params()),
            data_source: DataSource::ArchiveCached {
                strategy: FetchStrategy::Tabular,
                category: ResourceCategory::Notes,
            },
            transform: TransformId::TsvParse,
        },
        EndpointConfig {
            name: "fetch-translation-questions".to_string(),
            path: "/api/fetch-translation-questions".to_string(),
            category: "helps".to_string(),
            params: with_reference(common_params()),
            data_source: DataSource::ArchiveCached {
                strategy: FetchStrategy::Tabular,
                category: ResourceCategory::Questions,
            },
            transform: TransformId::TsvParse,
        },
        EndpointConfig {
            name: "fetch-translation-words".to_string(),
            path: "/api/fetch-translation-words".to_string(),
            category: "helps".to_string(),
            params: with_reference(common_params()),
            data_source: DataSource::ArchiveCached {
                strategy: FetchStrategy::Tabular,
                category: ResourceCategory::Words,
            },
            transform: TransformId::TsvParse,
        },
        EndpointConfig {
            name: "fetch-translation-word-links".to_string(),
            path: "/api/fetch-translation-word-links".to_string(),
            category: "helps".to_string(),
            params: with_reference(common_params()),
            data_source: DataSource::ArchiveCached {
                strategy: FetchStrategy::Tabular,
                category: ResourceCategory::WordLinks,
            },
            transform: TransformId::TsvParse,
        },
        EndpointConfig {
            name: "fetch-translation-academy".to_string(),
            path: "/api/fetch-translation-academy".to_string(),
            category: "helps".to_string(),
            params: {
                let mut params = common_params();
                params.insert(
                    0,
                    ParamSpec::string("module")
                        .required()
                        .pattern("^[a-z0-9-]+$"),
                );
                params
            },
            data_source: DataSource::ArchiveCached {
                strategy: FetchStrategy::Document,
                category: ResourceCategory::Academy,
            },
            transform: TransformId::MarkdownAssemble,
        },
        EndpointConfig {
            name: "fetch-resources".to_string(),
            path: "/api/fetch-resources".to_string(),
            category: "aggregation".to_string(),
            params: with_reference(common_params()),
            data_source: DataSource::Computed,
            transform: TransformId::JsonPassthrough,
        },
        EndpointConfig {
            name: "get-available-books".to_string(),
            path: "/api/get-available-books".to_string(),
            category: "discovery".to_string(),
            params: common_params(),
            data_source: DataSource::Direct {
                template: "catalog:search?lang={language}&owner={organization}&subject=Bible&stage=prod"
                    .to_string(),
            },
            transform: TransformId::ArrayFlatten,
        },
        EndpointConfig {
            name: "fetch-resource".to_string(),
            path: "/api/fetch-resource".to_string(),
            category: "discovery".to_string(),
            params: {
                let mut params = common_params();
                params.insert(0, ParamSpec::string("resource").default_str("all"));
                params
            },
            data_source: DataSource::Direct {
                template: "catalog:search?lang={language}&owner={organization}&metadataType=rc&abbreviation={resource}"
                    .to_string(),
            },
            transform: TransformId::JsonPassthrough,
        },
        EndpointConfig {
            name: "list-source-texts".to_string(),
            path: "/api/list-source-texts".to_string(),
            category: "discovery".to_string(),
            params: common_params(),
            data_source: DataSource::Hybrid {
                template: Some(
                    "catalog:search?lang={language}&owner={organization}&subject=Aligned Bible"
                        .to_string(),
                ),
            },
            transform: TransformId::JsonPassthrough,
        },
        EndpointConfig {
            name: "parse-reference".to_string(),
            path: "/api/parse-reference".to_string(),
            category: "utility".to_string(),
            params: with_reference(common_params()),
            data_source: DataSource::Direct {
                template: "internal://reference-parser".to_string(),
            },
            transform: TransformId::ReferenceParse,
        },
    ]
}

/// Parameter names the fetch adapter injects when a reference is present
pub const INJECTED_PARAMS: &[&str] = &["book", "bookNumber", "chapter"];

/// Validate the registry once at load.
///
/// Catches template placeholders that name no declared or injected
/// parameter, duplicate names/paths, and malformed paths, so a bad
/// configuration refuses to start instead of failing per request.
pub fn validate(endpoints: &[EndpointConfig]) -> Result<(), GatewayError> {
    let mut seen_names = Vec::new();
    let mut seen_paths = Vec::new();

    for endpoint in endpoints {
        if !endpoint.path.starts_with('/') {
            return Err(GatewayError::Misconfiguration(format!(
                "Endpoint {} has a relative path: {}",
                endpoint.name, endpoint.path
            )));
        }
        if seen_names.contains(&&endpoint.name) {
            return Err(GatewayError::Misconfiguration(format!(
                "Duplicate endpoint name: {}",
                endpoint.name
            )));
        }
        if seen_paths.contains(&&endpoint.path) {
            return Err(GatewayError::Misconfiguration(format!(
                "Duplicate endpoint path: {}",
                endpoint.path
            )));
        }
        seen_names.push(&endpoint.name);
        seen_paths.push(&endpoint.path);

        let template = match &endpoint.data_source {
            DataSource::Direct { template } => Some(template),
            DataSource::Hybrid { template } => template.as_ref(),
            DataSource::Computed | DataSource::ArchiveCached { .. } => None,
        };
        if let Some(template) = template {
            for placeholder in template_placeholders(template) {
                let declared = endpoint.params.iter().any(|p| p.name == placeholder);
                let injected = INJECTED_PARAMS.contains(&placeholder.as_str());
                if !declared && !injected {
                    return Err(GatewayError::Misconfiguration(format!(
                        "Endpoint {} template references undeclared parameter {{{placeholder}}}",
                        endpoint.name
                    )));
                }
            }
        }

        for param in &endpoint.params {
            if let Some(pattern) = &param.pattern {
                regex::Regex::new(pattern).map_err(|e| {
                    GatewayError::Misconfiguration(format!(
                        "Endpoint {} parameter {} has an invalid pattern: {e}",
                        endpoint.name, param.name
                    ))
                })?;
            }
        }
    }

    Ok(())
}

/// Placeholder names appearing as `{name}` in a template
pub fn template_placeholders(template: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}') else {
            break;
        };
        names.push(rest[open + 1..open + close].to_string());
        rest = &rest[open + close + 1..];
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_is_valid() {
        let endpoints = builtin_endpoints();
        assert!(validate(&endpoints).is_ok());
        assert!(endpoints.len() >= 10);
    }

    #[test]
    fn transform_ids_round_trip() {
        for id in [
            TransformId::UsfmToText,
            TransformId::TsvParse,
            TransformId::MarkdownAssemble,
            TransformId::ArrayFlatten,
            TransformId::ReferenceParse,
            TransformId::JsonPassthrough,
        ] {
            assert_eq!(id.as_str().parse::<TransformId>().unwrap(), id);
        }
        assert!("usfm-to-html".parse::<TransformId>().is_err());
    }

    #[test]
    fn undeclared_template_placeholder_is_rejected() {
        let mut endpoints = builtin_endpoints();
        endpoints.push(EndpointConfig {
            name: "broken".to_string(),
            path: "/api/broken".to_string(),
            category: "test".to_string(),
            params: vec![],
            data_source: DataSource::Direct {
                template: "catalog:search?owner={nobody}".to_string(),
            },
            transform: TransformId::JsonPassthrough,
        });
        assert!(validate(&endpoints).is_err());
    }

    #[test]
    fn injected_placeholders_are_allowed() {
        let endpoints = vec![EndpointConfig {
            name: "books".to_string(),
            path: "/api/books".to_string(),
            category: "test".to_string(),
            params: vec![ParamSpec::string("reference").required()],
            data_source: DataSource::Direct {
                template: "file:org/repo/{bookNumber}-{book}.usfm".to_string(),
            },
            transform: TransformId::JsonPassthrough,
        }];
        assert!(validate(&endpoints).is_ok());
    }

    #[test]
    fn duplicate_paths_are_rejected() {
        let mut endpoints = builtin_endpoints();
        let clone = endpoints[0].clone();
        endpoints.push(clone);
        assert!(validate(&endpoints).is_err());
    }

    #[test]
    fn placeholder_extraction() {
        assert_eq!(
            template_placeholders("a/{x}/b/{y}"),
            vec!["x".to_string(), "y".to_string()]
        );
        assert!(template_placeholders("no placeholders").is_empty());
    }
}
