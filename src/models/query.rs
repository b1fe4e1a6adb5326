//! Stored work package query model.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Collection, WorkPackage};
use crate::client::OpenProjectClient;
use crate::decode::{decode_embedded, Resource};
use crate::error::Result;
use crate::hal::Hal;
use crate::pagination::{Page, PaginationParams};
use crate::timestamp::Timestamp;
use crate::traits::Get;

/// A saved work package query.
///
/// Queries are the only resource that also keeps the raw server object,
/// because their filter and column configuration has no fixed schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    pub id: u64,

    #[serde(default)]
    pub name: String,

    /// Filter configuration as sent by the server.
    #[serde(default)]
    pub filters: Value,

    #[serde(default)]
    pub hidden: Option<bool>,

    #[serde(default)]
    pub highlighting_mode: Option<String>,

    #[serde(default)]
    pub public: Option<bool>,

    #[serde(default)]
    pub show_hierarchies: Option<bool>,

    #[serde(default)]
    pub starred: Option<bool>,

    #[serde(default)]
    pub sums: Option<bool>,

    #[serde(default)]
    pub timeline_labels: Value,

    #[serde(default)]
    pub timeline_visible: Option<bool>,

    #[serde(default)]
    pub timeline_zoom_level: Option<String>,

    #[serde(default)]
    pub created_at: Option<Timestamp>,

    #[serde(default)]
    pub updated_at: Option<Timestamp>,

    #[serde(skip_deserializing)]
    pub project: Option<String>,
    #[serde(skip_deserializing)]
    pub project_id: Option<u64>,

    #[serde(skip_deserializing)]
    pub user: Option<String>,
    #[serde(skip_deserializing)]
    pub user_id: Option<u64>,

    /// Embedded results, normally a `WorkPackageCollection`.
    #[serde(skip_deserializing)]
    pub results: Option<Box<Resource>>,

    #[serde(skip)]
    pub raw: Value,
}

impl Query {
    pub fn from_json(raw: &Value) -> Result<Self> {
        let mut query = Self::deserialize(raw)?;
        let hal = Hal::new(raw);

        let project = hal.reference("project");
        query.project = project.name;
        query.project_id = project.id;

        let user = hal.reference("user");
        query.user = user.name;
        query.user_id = user.id;

        if let Some(results) = hal.embedded("results") {
            query.results = Some(Box::new(decode_embedded(results)?));
        }

        query.raw = raw.clone();
        Ok(query)
    }

    /// The embedded results, if they decoded to a collection.
    pub fn results_collection(&self) -> Option<&Collection> {
        match self.results.as_deref()? {
            Resource::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    /// Take the embedded results out of the query, if they are a collection.
    pub fn into_results_collection(self) -> Option<Collection> {
        match *self.results? {
            Resource::Collection(collection) => Some(collection),
            _ => None,
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Query({}): {}", self.id, self.name)
    }
}

#[async_trait]
impl Get for Query {
    type Id = u64;

    /// Fetch the query definition only; results are requested with `pageSize=0`.
    #[tracing::instrument(skip(client))]
    async fn get(client: &OpenProjectClient, id: u64) -> Result<Self> {
        #[derive(Serialize)]
        struct DefinitionOnly {
            #[serde(rename = "pageSize")]
            page_size: u32,
        }

        client
            .get_resource_with_query(&format!("queries/{id}"), &DefinitionOnly { page_size: 0 })
            .await?
            .try_into()
    }
}

pub async fn get_query(client: &OpenProjectClient, id: u64) -> Result<Query> {
    Query::get(client, id).await
}

/// Fetch one page of a stored query's work packages.
///
/// A query whose embedded results are not a collection yields an empty final
/// page.
#[tracing::instrument(skip(client))]
pub async fn get_query_results_page(
    client: &OpenProjectClient,
    query_id: u64,
    offset: u32,
    page_size: u32,
) -> Result<Page<WorkPackage>> {
    let params = PaginationParams::for_page(offset, page_size);
    let query: Query = client
        .get_resource_with_query(&format!("queries/{query_id}"), &params)
        .await?
        .try_into()?;

    match query.into_results_collection() {
        Some(collection) => Page::from_collection(collection, offset, page_size).try_into_typed(),
        None => {
            tracing::debug!(query_id, "query has no result collection");
            Ok(Page::empty(offset, page_size))
        }
    }
}
