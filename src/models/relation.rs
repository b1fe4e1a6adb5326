//! Relation model and trait implementations.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::fetch_collection_page;
use crate::client::OpenProjectClient;
use crate::error::Result;
use crate::filters::FilterQuery;
use crate::hal::Hal;
use crate::pagination::Page;
use crate::traits::{Get, List};

/// A directed, typed edge between two work packages.
///
/// `relation_type` describes the edge seen from `from_id` (e.g. "follows"),
/// `reverse_type` the same edge seen from `to_id` (e.g. "precedes").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    pub id: u64,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(rename = "type", default)]
    pub relation_type: Option<String>,

    #[serde(default)]
    pub reverse_type: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(skip_deserializing)]
    pub from_id: Option<u64>,

    #[serde(skip_deserializing)]
    pub from_title: String,

    #[serde(skip_deserializing)]
    pub to_id: Option<u64>,

    #[serde(skip_deserializing)]
    pub to_title: String,
}

impl Relation {
    /// Build a relation from a raw `Relation` resource object.
    pub fn from_json(raw: &Value) -> Result<Self> {
        let mut relation = Self::deserialize(raw)?;
        let hal = Hal::new(raw);

        if let Some(from) = hal.link("from") {
            relation.from_id = from.id();
            relation.from_title = from.title.unwrap_or_default();
        }
        if let Some(to) = hal.link("to") {
            relation.to_id = to.id();
            relation.to_title = to.title.unwrap_or_default();
        }

        Ok(relation)
    }

    /// Whether the relation has `work_package_id` at either end.
    pub fn involves(&self, work_package_id: u64) -> bool {
        self.from_id == Some(work_package_id) || self.to_id == Some(work_package_id)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let endpoint = |id: Option<u64>| id.map(|id| id.to_string()).unwrap_or_else(|| "?".to_string());
        write!(
            f,
            "Relation({}): {} -[{}]-> {}",
            self.id,
            endpoint(self.from_id),
            self.relation_type.as_deref().unwrap_or("?"),
            endpoint(self.to_id)
        )
    }
}

#[async_trait]
impl Get for Relation {
    type Id = u64;

    #[tracing::instrument(skip(client))]
    async fn get(client: &OpenProjectClient, id: u64) -> Result<Self> {
        client.fetch(&format!("relations/{id}")).await
    }
}

#[async_trait]
impl List for Relation {
    type Query = FilterQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &OpenProjectClient,
        query: &Self::Query,
        offset: u32,
        page_size: u32,
    ) -> Result<Page<Self>> {
        fetch_collection_page(client, "relations", &query.filters, offset, page_size).await
    }
}

/// Fetch a single relation by id.
pub async fn get_relation(client: &OpenProjectClient, id: u64) -> Result<Relation> {
    Relation::get(client, id).await
}

/// Fetch all relations visible to the caller.
///
/// Use together with [`attach_relations`](crate::attach_relations) to backfill
/// relation data on bulk-fetched work packages.
pub async fn get_relations(client: &OpenProjectClient) -> Result<Vec<Relation>> {
    Relation::list_all(client, &FilterQuery::default()).await
}
