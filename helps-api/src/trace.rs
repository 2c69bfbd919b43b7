//! Per-request call trace and cache-tier status engine
//!
//! Every upstream call a request makes is appended to its `FetchContext`
//! trace. The tier a call hit is encoded in the URL prefix (`catalog:`,
//! `zipfile:`/`.zip`, `file:`, `internal://`). After the request's data
//! work completes, the trace reduces to a cache-tier status summary that
//! is reported in the response metadata. The HTTP response itself is
//! never cached; only the underlying data is.

use chrono::{DateTime, Utc};
use serde::ser::Serializer;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// One upstream (or in-memory) call made while serving a request
#[derive(Debug, Clone, Serialize)]
pub struct TraceEntry {
    pub url: String,
    pub cached: bool,
    pub timestamp: DateTime<Utc>,
}

/// Cache tier a call belongs to, classified from its URL prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Repository metadata (catalog search)
    Catalog,
    /// Archive bodies
    Zip,
    /// Single extracted assets
    File,
    /// Process-memory lookups that never leave the process
    Internal,
}

impl Tier {
    pub fn classify(url: &str) -> Tier {
        if url.starts_with("internal://") {
            Tier::Internal
        } else if url.starts_with("catalog:") {
            Tier::Catalog
        } else if url.starts_with("zipfile:") || url.ends_with(".zip") {
            Tier::Zip
        } else {
            Tier::File
        }
    }
}

/// Per-request fetch context.
///
/// Owned exclusively by one in-flight request and discarded when the
/// response is sent. The transient map caches raw payloads within the
/// request so concurrent category fetches do not repeat identical calls.
#[derive(Debug)]
pub struct FetchContext {
    pub trace_id: Uuid,
    pub platform: &'static str,
    /// Client-supplied bypass: every tier lookup misses for this request
    pub bypass_cache: bool,
    trace: Mutex<Vec<TraceEntry>>,
    transient: Mutex<HashMap<String, String>>,
}

impl FetchContext {
    pub fn new(bypass_cache: bool) -> Self {
        Self {
            trace_id: Uuid::new_v4(),
            platform: "dcs",
            bypass_cache,
            trace: Mutex::new(Vec::new()),
            transient: Mutex::new(HashMap::new()),
        }
    }

    /// Append one call to the trace
    pub fn record(&self, url: &str, cached: bool) {
        let entry = TraceEntry {
            url: url.to_string(),
            cached,
            timestamp: Utc::now(),
        };
        self.trace.lock().expect("trace lock poisoned").push(entry);
    }

    /// Snapshot of the trace so far
    pub fn trace(&self) -> Vec<TraceEntry> {
        self.trace.lock().expect("trace lock poisoned").clone()
    }

    pub fn transient_get(&self, key: &str) -> Option<String> {
        self.transient
            .lock()
            .expect("transient lock poisoned")
            .get(key)
            .cloned()
    }

    pub fn transient_put(&self, key: &str, value: String) {
        self.transient
            .lock()
            .expect("transient lock poisoned")
            .insert(key.to_string(), value);
    }
}

/// Hit/total counts for one tier; `None` when the tier saw no calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TierCount(pub Option<(usize, usize)>);

impl Serialize for TierCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Some((hits, total)) => serializer.serialize_str(&format!("{hits}/{total}")),
            None => serializer.serialize_bool(false),
        }
    }
}

/// Cache-tier status for one request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheTierStatus {
    /// `miss`, `hit`, or `partial (c/n)`
    pub summary: String,
    pub catalog: TierCount,
    pub zip: TierCount,
    pub files: TierCount,
}

/// Reduce a request trace to its cache-tier status.
///
/// Pure function of the trace: identical traces always yield identical
/// status. An empty trace is a miss.
pub fn cache_status(trace: &[TraceEntry]) -> CacheTierStatus {
    let total = trace.len();
    let hits = trace.iter().filter(|entry| entry.cached).count();

    let summary = if hits == 0 {
        "miss".to_string()
    } else if hits == total {
        "hit".to_string()
    } else {
        format!("partial ({hits}/{total})")
    };

    let mut per_tier: HashMap<Tier, (usize, usize)> = HashMap::new();
    for entry in trace {
        let counts = per_tier.entry(Tier::classify(&entry.url)).or_default();
        counts.1 += 1;
        if entry.cached {
            counts.0 += 1;
        }
    }

    CacheTierStatus {
        summary,
        catalog: TierCount(per_tier.get(&Tier::Catalog).copied()),
        zip: TierCount(per_tier.get(&Tier::Zip).copied()),
        files: TierCount(per_tier.get(&Tier::File).copied()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(url: &str, cached: bool) -> TraceEntry {
        TraceEntry {
            url: url.to_string(),
            cached,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn empty_trace_is_miss() {
        assert_eq!(cache_status(&[]).summary, "miss");
    }

    #[test]
    fn all_hits_is_hit() {
        let trace = vec![entry("catalog:search?lang=en", true)];
        assert_eq!(cache_status(&trace).summary, "hit");
    }

    #[test]
    fn mixed_is_partial() {
        let trace = vec![
            entry("catalog:search?lang=en", true),
            entry("file:org/en_ult/01-GEN.usfm", false),
        ];
        let status = cache_status(&trace);
        assert_eq!(status.summary, "partial (1/2)");
        assert_eq!(status.catalog, TierCount(Some((1, 1))));
        assert_eq!(status.files, TierCount(Some((0, 1))));
        assert_eq!(status.zip, TierCount(None));
    }

    #[test]
    fn status_is_pure() {
        let trace = vec![
            entry("catalog:search?lang=en", false),
            entry("zipfile:org/en_ult", true),
        ];
        assert_eq!(cache_status(&trace), cache_status(&trace));
    }

    #[test]
    fn tier_classification_from_url_prefix() {
        assert_eq!(Tier::classify("catalog:search?owner=x"), Tier::Catalog);
        assert_eq!(Tier::classify("zipfile:org/repo"), Tier::Zip);
        assert_eq!(Tier::classify("https://host/org/repo/archive/master.zip"), Tier::Zip);
        assert_eq!(Tier::classify("file:org/repo/path.usfm"), Tier::File);
        assert_eq!(Tier::classify("internal://reference-parser"), Tier::Internal);
    }

    #[test]
    fn breakdown_serializes_counts_or_false() {
        let trace = vec![entry("catalog:search", true)];
        let json = serde_json::to_value(cache_status(&trace)).unwrap();
        assert_eq!(json["catalog"], "1/1");
        assert_eq!(json["zip"], serde_json::Value::Bool(false));
    }
}
