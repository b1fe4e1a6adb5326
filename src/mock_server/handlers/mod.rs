//! HTTP request handlers for the mock server.

pub mod collections;
pub mod queries;

pub use collections::{get_member, list_collection, list_nested};

use std::sync::Arc;

use axum::{
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::mock_server::state::MockState;

/// State handle shared by all handlers.
pub type SharedState = Arc<RwLock<MockState>>;

/// Default page size of the real server.
const DEFAULT_PAGE_SIZE: u32 = 20;

/// Query parameters accepted by collection endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct CollectionParams {
    pub offset: Option<u32>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<u32>,
    pub filters: Option<String>,
}

impl CollectionParams {
    fn offset(&self) -> u32 {
        self.offset.unwrap_or(1).max(1)
    }

    fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

/// An OpenProject `Error` resource.
pub(crate) fn error_response(status: StatusCode, identifier: &str, message: &str) -> Response {
    (
        status,
        Json(json!({
            "_type": "Error",
            "errorIdentifier": format!("urn:openproject-org:api:v3:errors:{identifier}"),
            "message": message
        })),
    )
        .into_response()
}

pub(crate) fn not_found(message: &str) -> Response {
    error_response(StatusCode::NOT_FOUND, "NotFound", message)
}

/// Check HTTP Basic credentials (`apikey:<key>`) when the state requires them.
pub(crate) fn authorize(state: &MockState, headers: &HeaderMap) -> Result<(), Response> {
    let Some(api_key) = &state.required_api_key else {
        return Ok(());
    };

    let expected = format!(
        "Basic {}",
        general_purpose::STANDARD.encode(format!("apikey:{api_key}"))
    );
    let given = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());

    if given == Some(expected.as_str()) {
        Ok(())
    } else {
        Err(error_response(
            StatusCode::UNAUTHORIZED,
            "Unauthenticated",
            "You need to be authenticated to access this resource.",
        ))
    }
}

/// Build one page of a collection resource from the full element list.
pub(crate) fn collection_page(
    kind: &str,
    self_href: &str,
    elements: Vec<Value>,
    params: &CollectionParams,
) -> Value {
    let offset = params.offset();
    let page_size = params.page_size();
    let total = elements.len();

    let start = (offset as usize - 1).saturating_mul(page_size as usize);
    let page: Vec<Value> = elements
        .into_iter()
        .skip(start)
        .take(page_size as usize)
        .collect();

    json!({
        "_type": kind,
        "total": total,
        "count": page.len(),
        "pageSize": page_size,
        "offset": offset,
        "_embedded": { "elements": page },
        "_links": { "self": { "href": self_href } }
    })
}
