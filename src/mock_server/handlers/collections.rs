//! Collection and member endpoint handlers.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::queries::query_with_results;
use super::{authorize, collection_page, error_response, not_found, CollectionParams, SharedState};
use crate::mock_server::state::MockState;

/// Collections the mock server knows about.
pub const COLLECTIONS: &[&str] = &[
    "projects",
    "work_packages",
    "relations",
    "versions",
    "users",
    "placeholder_users",
    "memberships",
    "statuses",
    "grids",
    "queries",
];

#[derive(Debug, Deserialize)]
struct Condition {
    operator: String,
    #[serde(default)]
    values: Option<Vec<Value>>,
}

type FilterSpec = Vec<HashMap<String, Condition>>;

fn parse_filters(params: &CollectionParams) -> Result<FilterSpec, Response> {
    match &params.filters {
        None => Ok(Vec::new()),
        Some(raw) => serde_json::from_str(raw).map_err(|e| {
            error_response(
                StatusCode::BAD_REQUEST,
                "InvalidQuery",
                &format!("Filters are not valid JSON: {e}"),
            )
        }),
    }
}

fn value_matches(values: &Option<Vec<Value>>, candidate: &str) -> bool {
    values.iter().flatten().any(|value| match value {
        Value::String(s) => s == candidate,
        other => other.to_string() == candidate,
    })
}

/// Apply the subset of server-side filters the mock understands.
fn matches_filters(state: &MockState, resource: &Value, filters: &FilterSpec) -> bool {
    filters.iter().flatten().all(|(name, condition)| match name.as_str() {
        "status_id" => match condition.operator.as_str() {
            "o" => !state.is_closed(resource),
            "c" => state.is_closed(resource),
            "=" => state
                .status_id(resource)
                .is_some_and(|id| value_matches(&condition.values, &id.to_string())),
            _ => true,
        },
        "scope" => resource
            .pointer("/_links/scope/href")
            .and_then(Value::as_str)
            .is_some_and(|scope| value_matches(&condition.values, scope)),
        _ => true,
    })
}

fn collection_kind(collection: &str) -> &'static str {
    if collection == "work_packages" {
        "WorkPackageCollection"
    } else {
        "Collection"
    }
}

fn filtered(state: &MockState, resources: Vec<&Value>, filters: &FilterSpec) -> Vec<Value> {
    resources
        .into_iter()
        .filter(|resource| matches_filters(state, resource, filters))
        .cloned()
        .collect()
}

/// GET /api/v3/{collection}
pub async fn list_collection(
    State(state): State<SharedState>,
    Path(collection): Path<String>,
    Query(params): Query<CollectionParams>,
    headers: HeaderMap,
) -> Response {
    let state = state.read().await;
    if let Err(denied) = authorize(&state, &headers) {
        return denied;
    }
    if !COLLECTIONS.contains(&collection.as_str()) {
        return not_found(&format!("Unknown collection: {collection}"));
    }

    let filters = match parse_filters(&params) {
        Ok(filters) => filters,
        Err(bad) => return bad,
    };

    let elements = filtered(&state, state.list(&collection), &filters);
    let href = format!("/api/v3/{collection}");
    Json(collection_page(collection_kind(&collection), &href, elements, &params)).into_response()
}

/// GET /api/v3/{collection}/{id}
pub async fn get_member(
    State(state): State<SharedState>,
    Path((collection, id)): Path<(String, String)>,
    Query(params): Query<CollectionParams>,
    headers: HeaderMap,
) -> Response {
    let state = state.read().await;
    if let Err(denied) = authorize(&state, &headers) {
        return denied;
    }

    let Ok(id) = id.parse::<u64>() else {
        return not_found(&format!("Invalid id: {id}"));
    };

    if collection == "queries" {
        return query_with_results(&state, id, &params);
    }

    let Some(resource) = state.get(&collection, id) else {
        return not_found(&format!("No {collection} resource with id {id}"));
    };

    let mut resource = resource.clone();
    if collection == "work_packages" {
        let relations: Vec<Value> = state.relations_for(id).into_iter().cloned().collect();
        let params = CollectionParams {
            page_size: Some(relations.len() as u32),
            ..CollectionParams::default()
        };
        let href = format!("/api/v3/work_packages/{id}/relations");
        resource["_embedded"] = json!({
            "relations": collection_page("Collection", &href, relations, &params)
        });
    }

    Json(resource).into_response()
}

/// GET /api/v3/{collection}/{id}/{sub}
///
/// Only `projects/{id}/work_packages` is supported.
pub async fn list_nested(
    State(state): State<SharedState>,
    Path((collection, id, sub)): Path<(String, String, String)>,
    Query(params): Query<CollectionParams>,
    headers: HeaderMap,
) -> Response {
    let state = state.read().await;
    if let Err(denied) = authorize(&state, &headers) {
        return denied;
    }

    let project_id = match (collection.as_str(), id.parse::<u64>(), sub.as_str()) {
        ("projects", Ok(project_id), "work_packages") => project_id,
        _ => return not_found(&format!("Unknown path: {collection}/{id}/{sub}")),
    };
    if state.get("projects", project_id).is_none() {
        return not_found(&format!("No projects resource with id {project_id}"));
    }

    let filters = match parse_filters(&params) {
        Ok(filters) => filters,
        Err(bad) => return bad,
    };

    let elements = filtered(&state, state.work_packages_for_project(project_id), &filters);
    let href = format!("/api/v3/projects/{project_id}/work_packages");
    Json(collection_page("WorkPackageCollection", &href, elements, &params)).into_response()
}
