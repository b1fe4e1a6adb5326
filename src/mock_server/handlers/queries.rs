//! Stored query handler.

use axum::{
    response::{IntoResponse, Response},
    Json,
};

use super::{collection_page, not_found, CollectionParams};
use crate::mock_server::state::MockState;

/// Serve a stored query with one page of its work packages embedded as
/// `_embedded.results`.
pub fn query_with_results(state: &MockState, id: u64, params: &CollectionParams) -> Response {
    let Some(query) = state.get("queries", id) else {
        return not_found(&format!("No queries resource with id {id}"));
    };

    let elements = state.query_work_packages(id).into_iter().cloned().collect();
    let href = format!("/api/v3/queries/{id}");

    let mut query = query.clone();
    query["_embedded"]["results"] = collection_page("WorkPackageCollection", &href, elements, params);
    Json(query).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_server::Fixtures;
    use crate::{decode, Query};

    #[tokio::test]
    async fn test_query_results_embedded() {
        let state = MockState::new()
            .with_resource("queries", Fixtures::query(40, "Q", (2, "Web")))
            .with_resource("work_packages", Fixtures::work_package(10, "A", (2, "Web"), (1, "New")))
            .with_query_results(40, vec![10]);

        let response = query_with_results(&state, 40, &CollectionParams::default());
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let raw: serde_json::Value = serde_json::from_slice(&body).unwrap();

        let query: Query = decode(&raw).unwrap().try_into().unwrap();
        let results = query.results_collection().unwrap();
        assert_eq!(results.total, 1);
        assert_eq!(results.elements[0].id(), Some(10));
    }
}
