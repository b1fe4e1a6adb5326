//! Work package status model.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::fetch_collection_page;
use crate::client::OpenProjectClient;
use crate::error::Result;
use crate::filters::FilterQuery;
use crate::pagination::Page;
use crate::traits::{Get, List};

/// A work package status such as "New" or "Closed".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub id: u64,

    #[serde(default)]
    pub name: String,

    /// Hex color, e.g. `#1A67A3`.
    #[serde(default)]
    pub color: Option<String>,

    #[serde(default)]
    pub is_closed: bool,

    #[serde(default)]
    pub is_default: bool,

    #[serde(default)]
    pub is_readonly: bool,

    #[serde(default)]
    pub position: Option<u32>,

    #[serde(default)]
    pub default_done_ratio: Option<u32>,
}

impl Status {
    pub fn from_json(raw: &Value) -> Result<Self> {
        Ok(Self::deserialize(raw)?)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Status({}): {}", self.id, self.name)
    }
}

#[async_trait]
impl Get for Status {
    type Id = u64;

    #[tracing::instrument(skip(client))]
    async fn get(client: &OpenProjectClient, id: u64) -> Result<Self> {
        client.fetch(&format!("statuses/{id}")).await
    }
}

#[async_trait]
impl List for Status {
    type Query = FilterQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &OpenProjectClient,
        query: &Self::Query,
        offset: u32,
        page_size: u32,
    ) -> Result<Page<Self>> {
        fetch_collection_page(client, "statuses", &query.filters, offset, page_size).await
    }
}

pub async fn get_status(client: &OpenProjectClient, id: u64) -> Result<Status> {
    Status::get(client, id).await
}

pub async fn get_statuses(client: &OpenProjectClient) -> Result<Vec<Status>> {
    Status::list_all(client, &FilterQuery::default()).await
}
