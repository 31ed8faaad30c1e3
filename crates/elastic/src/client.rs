//! HTTP adapter implementing the SearchEngine port.
//!
//! Talks to an Elasticsearch-compatible `_search` API. The adapter is the
//! only component aware of the wire protocol; everything above it works
//! with the port types from `crescendo-core`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crescendo_core::error::{EngineError, EngineResult};
use crescendo_core::ports::{Hit, SearchEngine, SearchRequest, SearchResponse};

use crate::query::build_search_body;

/// Longest engine error body kept in an error message.
const MAX_ERROR_BODY: usize = 512;

/// Configuration for the engine adapter.
///
/// The index name pattern is sent to the engine verbatim. If a wildcard
/// pattern matches several live indices (e.g. during a reindex cutover),
/// sort-value comparability across them is not verified here; index
/// management must guarantee a single live index per pattern.
#[derive(Debug, Clone)]
pub struct ElasticConfig {
    /// Engine base URL (e.g. "http://127.0.0.1:9200").
    pub endpoint: String,
    /// Index name or wildcard pattern to search.
    pub index_pattern: String,
    /// Per-request timeout. On expiry the whole page fetch fails; there is
    /// no partial-page result.
    pub request_timeout: Duration,
}

impl Default for ElasticConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:9200".to_string(),
            index_pattern: "catalog-works".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Engine adapter implementing the SearchEngine port over HTTP.
pub struct ElasticEngine {
    http: reqwest::Client,
    config: ElasticConfig,
    search_url: String,
}

impl ElasticEngine {
    /// Build an adapter from configuration.
    pub fn new(config: ElasticConfig) -> EngineResult<Self> {
        // Reject unusable endpoints at construction instead of per request.
        url::Url::parse(&config.endpoint)
            .map_err(|e| EngineError::Transport(format!("invalid endpoint: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| EngineError::Transport(e.to_string()))?;

        let search_url = format!(
            "{}/{}/_search",
            config.endpoint.trim_end_matches('/'),
            config.index_pattern
        );

        Ok(Self {
            http,
            config,
            search_url,
        })
    }

    /// The configured index pattern.
    pub fn index_pattern(&self) -> &str {
        &self.config.index_pattern
    }

    fn map_send_error(&self, err: reqwest::Error) -> EngineError {
        if err.is_timeout() {
            EngineError::Timeout(self.config.request_timeout)
        } else {
            EngineError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl SearchEngine for ElasticEngine {
    #[instrument(skip_all, fields(limit = request.limit))]
    async fn search(&self, request: &SearchRequest) -> EngineResult<SearchResponse> {
        // The service validates predicates before calling the port; a
        // translation failure here means the adapter was driven directly
        // with an unvalidated filter.
        let body = build_search_body(request).map_err(|e| EngineError::Rejected {
            status: 400,
            message: e.to_string(),
        })?;

        debug!(url = %self.search_url, "Issuing search");

        let response = self
            .http
            .post(&self.search_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let mut message = response.text().await.unwrap_or_default();
            message.truncate(MAX_ERROR_BODY);
            return Err(EngineError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let raw: RawSearchResponse = response
            .json()
            .await
            .map_err(|e| EngineError::MalformedResponse(e.to_string()))?;

        parse_search_response(raw, request.sort.len())
    }

    async fn ping(&self) -> EngineResult<()> {
        let response = self
            .http
            .get(self.config.endpoint.trim_end_matches('/'))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Rejected {
                status: status.as_u16(),
                message: "ping failed".into(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct RawSearchResponse {
    hits: RawHits,
}

#[derive(Debug, Deserialize)]
struct RawHits {
    total: RawTotal,
    hits: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
struct RawTotal {
    value: u64,
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "_source")]
    source: Value,
    #[serde(default)]
    sort: Vec<Value>,
}

/// Convert the wire response into port types.
///
/// Every hit must carry one sort value per sort key; a hit without them
/// cannot produce a resumable cursor, so the response is rejected as
/// malformed rather than papered over.
fn parse_search_response(
    raw: RawSearchResponse,
    sort_len: usize,
) -> EngineResult<SearchResponse> {
    let hits = raw
        .hits
        .hits
        .into_iter()
        .map(|h| {
            if h.sort.len() != sort_len {
                return Err(EngineError::MalformedResponse(format!(
                    "hit carries {} sort values, expected {}",
                    h.sort.len(),
                    sort_len
                )));
            }
            Ok(Hit {
                source: h.source,
                sort_values: h.sort,
            })
        })
        .collect::<EngineResult<Vec<_>>>()?;

    Ok(SearchResponse {
        hits,
        total: raw.hits.total.value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(body: Value) -> RawSearchResponse {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn parses_hits_and_exact_total() {
        let response = raw(json!({
            "took": 3,
            "hits": {
                "total": { "value": 1204, "relation": "eq" },
                "hits": [
                    {
                        "_index": "catalog-works",
                        "_id": "wrk_1",
                        "_source": { "id": "wrk_1", "title": "Aria", "artist": "Bach" },
                        "sort": ["Aria", "wrk_1"],
                    },
                ],
            },
        }));

        let parsed = parse_search_response(response, 2).unwrap();
        assert_eq!(parsed.total, 1204);
        assert_eq!(parsed.hits.len(), 1);
        assert_eq!(parsed.hits[0].sort_values, vec![json!("Aria"), json!("wrk_1")]);
        assert_eq!(parsed.hits[0].source["title"], json!("Aria"));
    }

    #[test]
    fn rejects_hit_without_sort_values() {
        // Un hit sans valeurs de tri ne peut pas produire de curseur
        let response = raw(json!({
            "hits": {
                "total": { "value": 1 },
                "hits": [
                    { "_source": { "id": "wrk_1" } },
                ],
            },
        }));

        assert!(matches!(
            parse_search_response(response, 2),
            Err(EngineError::MalformedResponse(_))
        ));
    }

    #[test]
    fn empty_hit_list_is_a_valid_page() {
        let response = raw(json!({
            "hits": { "total": { "value": 0 }, "hits": [] },
        }));

        let parsed = parse_search_response(response, 2).unwrap();
        assert!(parsed.hits.is_empty());
        assert_eq!(parsed.total, 0);
    }

    #[test]
    fn config_builds_search_url_from_pattern() {
        let engine = ElasticEngine::new(ElasticConfig {
            endpoint: "http://search.internal:9200/".into(),
            index_pattern: "catalog-works-v2".into(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            engine.search_url,
            "http://search.internal:9200/catalog-works-v2/_search"
        );
    }

    #[test]
    fn config_rejects_invalid_endpoint() {
        let result = ElasticEngine::new(ElasticConfig {
            endpoint: "not a url".into(),
            ..Default::default()
        });
        assert!(matches!(result, Err(EngineError::Transport(_))));
    }
}
