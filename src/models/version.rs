//! Version model and trait implementations.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{fetch_collection_page, Formattable};
use crate::client::OpenProjectClient;
use crate::error::Result;
use crate::filters::FilterQuery;
use crate::hal::Hal;
use crate::pagination::Page;
use crate::timestamp::{Date, Timestamp};
use crate::traits::{Get, List};

/// A version (milestone / release) defined by a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub id: u64,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: Option<Formattable>,

    #[serde(default)]
    pub start_date: Option<Date>,

    #[serde(default)]
    pub end_date: Option<Date>,

    /// `open`, `locked` or `closed`.
    #[serde(default)]
    pub status: Option<String>,

    /// Sharing scope, e.g. `none` or `system`.
    #[serde(default)]
    pub sharing: Option<String>,

    #[serde(default)]
    pub created_at: Option<Timestamp>,

    #[serde(default)]
    pub updated_at: Option<Timestamp>,

    #[serde(skip_deserializing)]
    pub defining_project: Option<String>,

    #[serde(skip_deserializing)]
    pub defining_project_id: Option<u64>,
}

impl Version {
    pub fn from_json(raw: &Value) -> Result<Self> {
        let mut version = Self::deserialize(raw)?;
        let project = Hal::new(raw).reference("definingProject");
        version.defining_project = project.name;
        version.defining_project_id = project.id;
        Ok(version)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Version({}): {}", self.id, self.name)
    }
}

#[async_trait]
impl Get for Version {
    type Id = u64;

    #[tracing::instrument(skip(client))]
    async fn get(client: &OpenProjectClient, id: u64) -> Result<Self> {
        client.fetch(&format!("versions/{id}")).await
    }
}

#[async_trait]
impl List for Version {
    type Query = FilterQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &OpenProjectClient,
        query: &Self::Query,
        offset: u32,
        page_size: u32,
    ) -> Result<Page<Self>> {
        fetch_collection_page(client, "versions", &query.filters, offset, page_size).await
    }
}

/// Fetch a single version by id.
pub async fn get_version(client: &OpenProjectClient, id: u64) -> Result<Version> {
    Version::get(client, id).await
}

/// Fetch all versions visible to the caller.
pub async fn get_versions(client: &OpenProjectClient) -> Result<Vec<Version>> {
    Version::list_all(client, &FilterQuery::default()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_version_from_json() {
        let version = Version::from_json(&json!({
            "_type": "Version",
            "id": 27,
            "name": "1.0",
            "description": { "format": "plain", "raw": "First release", "html": "" },
            "startDate": "2024-01-01",
            "endDate": null,
            "status": "open",
            "sharing": "none",
            "createdAt": "2023-12-01T08:00:00Z",
            "_links": {
                "definingProject": { "href": "/api/v3/projects/46", "title": "Website" }
            }
        }))
        .unwrap();

        assert_eq!(version.name, "1.0");
        assert_eq!(version.status.as_deref(), Some("open"));
        assert!(version.start_date.unwrap().is_parsed());
        assert!(version.end_date.is_none());
        assert_eq!(version.defining_project.as_deref(), Some("Website"));
        assert_eq!(version.defining_project_id, Some(46));
        assert_eq!(version.description.unwrap().text(), Some("First release"));
    }
}
