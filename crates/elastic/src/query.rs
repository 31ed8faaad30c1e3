//! Translation of filter predicates into the engine's native query DSL.
//!
//! This is a purely structural translation with no pagination awareness:
//! pagination inputs (`sort`, `search_after`, `size`) are passed through
//! verbatim, and the filter predicate becomes a `bool` query. Absent
//! predicate groups are omitted entirely - an empty filter translates to
//! `match_all`, never to "no results".

use serde_json::{Map, Value, json};

use crescendo_core::error::{QueryError, QueryResult};
use crescendo_core::models::{CATALOG_FIELD, FacetField, TEXT_SEARCH_FIELDS};
use crescendo_core::ports::{CountMode, FacetCombine, FilterPredicate, SearchRequest};

/// Build the full `_search` request body.
pub fn build_search_body(request: &SearchRequest) -> QueryResult<Value> {
    let mut body = Map::new();
    body.insert("query".into(), translate_filter(&request.filter)?);
    body.insert(
        "sort".into(),
        Value::Array(
            request
                .sort
                .keys()
                .iter()
                .map(|k| json!({ k.field.index_field(): { "order": k.direction.as_str() } }))
                .collect(),
        ),
    );
    body.insert("size".into(), json!(request.limit));

    // Exact counting is the correctness default; approximate mode leaves
    // the engine's bounded lower-bound counting in place.
    if request.count_mode == CountMode::Exact {
        body.insert("track_total_hits".into(), json!(true));
    }

    if let Some(after) = &request.search_after {
        body.insert("search_after".into(), json!(after));
    }

    Ok(Value::Object(body))
}

/// Translate the filter predicate into a `bool` query.
///
/// All supplied groups combine as logical AND at the top level. Within one
/// facet group the caller chooses OR (`terms`, any value matches) or AND
/// (one `term` clause per value).
pub fn translate_filter(filter: &FilterPredicate) -> QueryResult<Value> {
    filter.validate()?;

    if filter.is_empty() {
        return Ok(json!({ "match_all": {} }));
    }

    let mut must: Vec<Value> = Vec::new();
    let mut filters: Vec<Value> = Vec::new();

    if let Some(term) = filter.term.as_deref().filter(|t| !t.is_empty()) {
        must.push(json!({
            "multi_match": {
                "query": term,
                "fields": TEXT_SEARCH_FIELDS,
            }
        }));
    }

    for facet in &filter.facets {
        // validate() has resolved every field already; translation shares
        // the same source of truth.
        let field = FacetField::from_name(&facet.field)
            .ok_or_else(|| QueryError::UnknownFacetField(facet.field.clone()))?;

        match facet.combine {
            FacetCombine::Any => {
                filters.push(json!({ "terms": { field.index_field(): facet.values } }));
            }
            FacetCombine::All => {
                for value in &facet.values {
                    filters.push(json!({ "term": { field.index_field(): value } }));
                }
            }
        }
    }

    if let Some(collection) = &filter.collection {
        filters.push(json!({ "term": { CATALOG_FIELD: collection } }));
    }

    let mut bool_query = Map::new();
    if !must.is_empty() {
        bool_query.insert("must".into(), Value::Array(must));
    }
    if !filters.is_empty() {
        bool_query.insert("filter".into(), Value::Array(filters));
    }

    Ok(json!({ "bool": bool_query }))
}
