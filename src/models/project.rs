//! Project model and trait implementations.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{fetch_collection_page, Formattable};
use crate::client::OpenProjectClient;
use crate::error::Result;
use crate::filters::FilterQuery;
use crate::hal::Hal;
use crate::hierarchy::build_hierarchy;
use crate::pagination::Page;
use crate::timestamp::Timestamp;
use crate::traits::{Get, List};

/// An OpenProject project.
///
/// Projects form a tree through their `parent` link. The decoded record only
/// knows its immediate parent; `path`, `path_ids`, `level` and `fullname`
/// are filled in by [`build_hierarchy`] once the whole project set is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: u64,

    /// URL slug of the project.
    #[serde(default)]
    pub identifier: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub active: bool,

    #[serde(default)]
    pub public: bool,

    #[serde(default)]
    pub description: Option<Formattable>,

    #[serde(default)]
    pub status_explanation: Option<Formattable>,

    #[serde(default)]
    pub created_at: Option<Timestamp>,

    #[serde(default)]
    pub updated_at: Option<Timestamp>,

    /// Project status title (e.g. "On track").
    #[serde(skip_deserializing)]
    pub status: Option<String>,

    /// Id of the immediate parent project.
    #[serde(skip_deserializing)]
    pub parent_id: Option<u64>,

    /// Ancestor names, root first.
    #[serde(skip_deserializing)]
    pub path: Vec<String>,

    /// Ancestor ids, root first.
    #[serde(skip_deserializing)]
    pub path_ids: Vec<u64>,

    /// Depth in the tree; top-level projects are at level 1.
    #[serde(skip_deserializing)]
    pub level: usize,

    /// Slash-joined ancestor names followed by the project's own name.
    #[serde(skip_deserializing)]
    pub fullname: String,
}

impl Project {
    /// Build a project from a raw `Project` resource object.
    pub fn from_json(raw: &Value) -> Result<Self> {
        let mut project = Self::deserialize(raw)?;
        let hal = Hal::new(raw);

        project.parent_id = hal.reference("parent").id;
        project.status = hal
            .link("status")
            .and_then(|link| link.title)
            .or_else(|| raw.get("status").and_then(Value::as_str).map(str::to_string));

        Ok(project.with_ancestors(Vec::new(), Vec::new()))
    }

    /// Return a copy annotated with the given ancestor chain (root first).
    #[must_use]
    pub fn with_ancestors(mut self, path_ids: Vec<u64>, path: Vec<String>) -> Self {
        self.level = path_ids.len() + 1;
        self.fullname = path
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.name.as_str()))
            .collect::<Vec<_>>()
            .join("/");
        self.path_ids = path_ids;
        self.path = path;
        self
    }

    /// Whether the project has no parent.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Whether `ancestor_id` appears in this project's ancestor chain.
    pub fn is_descendant_of(&self, ancestor_id: u64) -> bool {
        self.path_ids.contains(&ancestor_id)
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Project({}): {}", self.id, self.name)
    }
}

#[async_trait]
impl Get for Project {
    type Id = u64;

    #[tracing::instrument(skip(client))]
    async fn get(client: &OpenProjectClient, id: u64) -> Result<Self> {
        client.fetch(&format!("projects/{id}")).await
    }
}

#[async_trait]
impl List for Project {
    type Query = FilterQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &OpenProjectClient,
        query: &Self::Query,
        offset: u32,
        page_size: u32,
    ) -> Result<Page<Self>> {
        fetch_collection_page(client, "projects", &query.filters, offset, page_size).await
    }
}

// Convenience functions for working with projects

/// Fetch all projects with their hierarchy computed, ordered by id.
pub async fn get_projects(client: &OpenProjectClient) -> Result<Vec<Project>> {
    Ok(get_projects_map(client).await?.into_values().collect())
}

/// Fetch all projects keyed by id, with their hierarchy computed.
///
/// # Example
///
/// ```ignore
/// let projects = get_projects_map(&client).await?;
/// let mut sorted: Vec<_> = projects.values().collect();
/// sorted.sort_by(|a, b| a.fullname.cmp(&b.fullname));
/// for project in sorted {
///     println!("{} (id:{})", project.fullname, project.id);
/// }
/// ```
pub async fn get_projects_map(client: &OpenProjectClient) -> Result<BTreeMap<u64, Project>> {
    let projects = Project::list_all(client, &FilterQuery::default()).await?;
    build_hierarchy(projects)
}
