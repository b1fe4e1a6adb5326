//! Work package model and trait implementations.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{fetch_collection_page, get_query_results_page, Formattable, Relation};
use crate::client::OpenProjectClient;
use crate::error::Result;
use crate::filters::{Filter, StatusFilter};
use crate::graph::{RelationGraph, RelationMap};
use crate::hal::Hal;
use crate::pagination::{drain, Page, DEFAULT_PAGE_SIZE};
use crate::timestamp::{Date, Timestamp};
use crate::traits::{Get, List};

/// An OpenProject work package (task, bug, milestone, ...).
///
/// Related entities (type, status, project, people, version) are flattened
/// into a display name plus numeric id. For principals the kind of principal
/// (`users`, `groups`, `placeholder_users`) is kept as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkPackage {
    pub id: u64,

    #[serde(default)]
    pub subject: String,

    #[serde(default)]
    pub description: Option<Formattable>,

    #[serde(default)]
    pub start_date: Option<Date>,

    #[serde(default)]
    pub due_date: Option<Date>,

    #[serde(default)]
    pub derived_start_date: Option<Date>,

    #[serde(default)]
    pub derived_due_date: Option<Date>,

    /// ISO 8601 duration, e.g. `PT2H`.
    #[serde(default)]
    pub estimated_time: Option<String>,

    #[serde(default)]
    pub derived_estimated_time: Option<String>,

    #[serde(default)]
    pub percentage_done: Option<u32>,

    #[serde(default)]
    pub lock_version: Option<u64>,

    #[serde(default)]
    pub schedule_manually: Option<bool>,

    #[serde(default)]
    pub created_at: Option<Timestamp>,

    #[serde(default)]
    pub updated_at: Option<Timestamp>,

    #[serde(rename = "type", skip_deserializing)]
    pub work_package_type: Option<String>,
    #[serde(skip_deserializing)]
    pub type_id: Option<u64>,

    #[serde(skip_deserializing)]
    pub priority: Option<String>,
    #[serde(skip_deserializing)]
    pub priority_id: Option<u64>,

    #[serde(skip_deserializing)]
    pub status: Option<String>,
    #[serde(skip_deserializing)]
    pub status_id: Option<u64>,

    #[serde(skip_deserializing)]
    pub project: Option<String>,
    #[serde(skip_deserializing)]
    pub project_id: Option<u64>,

    #[serde(skip_deserializing)]
    pub author: Option<String>,
    #[serde(skip_deserializing)]
    pub author_id: Option<u64>,
    #[serde(skip_deserializing)]
    pub author_type: Option<String>,

    #[serde(skip_deserializing)]
    pub assignee: Option<String>,
    #[serde(skip_deserializing)]
    pub assignee_id: Option<u64>,
    #[serde(skip_deserializing)]
    pub assignee_type: Option<String>,

    #[serde(skip_deserializing)]
    pub responsible: Option<String>,
    #[serde(skip_deserializing)]
    pub responsible_id: Option<u64>,
    #[serde(skip_deserializing)]
    pub responsible_type: Option<String>,

    #[serde(skip_deserializing)]
    pub version: Option<String>,
    #[serde(skip_deserializing)]
    pub version_id: Option<u64>,

    #[serde(skip_deserializing)]
    pub parent_id: Option<u64>,

    /// Relations touching this work package.
    #[serde(skip_deserializing)]
    pub relations: Vec<Relation>,

    /// Outbound relations: forward type name to peer ids.
    #[serde(skip_deserializing)]
    pub relations_out: RelationMap,

    /// Inbound relations: reverse type name to peer ids.
    #[serde(skip_deserializing)]
    pub relations_in: RelationMap,
}

impl WorkPackage {
    /// Build a work package from a raw `WorkPackage` resource object.
    pub fn from_json(raw: &Value) -> Result<Self> {
        let mut wp = Self::deserialize(raw)?;
        let hal = Hal::new(raw);

        let kind = hal.reference("type");
        wp.work_package_type = kind.name;
        wp.type_id = kind.id;

        let priority = hal.reference("priority");
        wp.priority = priority.name;
        wp.priority_id = priority.id;

        let status = hal.reference("status");
        wp.status = status.name;
        wp.status_id = status.id;

        let project = hal.reference("project");
        wp.project = project.name;
        wp.project_id = project.id;

        let author = hal.reference("author");
        wp.author = author.name;
        wp.author_id = author.id;
        wp.author_type = author.kind;

        let assignee = hal.reference("assignee");
        wp.assignee = assignee.name;
        wp.assignee_id = assignee.id;
        wp.assignee_type = assignee.kind;

        let responsible = hal.reference("responsible");
        wp.responsible = responsible.name;
        wp.responsible_id = responsible.id;
        wp.responsible_type = responsible.kind;

        let version = hal.reference("version");
        wp.version = version.name;
        wp.version_id = version.id;

        wp.parent_id = hal.reference("parent").id;

        // Single fetches embed the relations collection; bulk fetches omit it.
        if let Some(elements) = hal
            .embedded("relations")
            .and_then(|relations| relations.pointer("/_embedded/elements"))
            .and_then(Value::as_array)
        {
            let relations = elements
                .iter()
                .map(Relation::from_json)
                .collect::<Result<Vec<_>>>()?;
            wp.set_relations(relations);
        }

        Ok(wp)
    }

    /// Replace the relation set and recompute `relations_out`/`relations_in`.
    pub fn set_relations(&mut self, relations: Vec<Relation>) {
        let graph = RelationGraph::build(self.id, &relations);
        self.relations = relations;
        self.relations_out = graph.outbound;
        self.relations_in = graph.inbound;
    }

    /// Pick the relations touching this work package out of a larger set.
    ///
    /// Use after bulk fetches, which do not include relation data. An empty
    /// slice keeps the current relations and only rebuilds the graph.
    pub fn attach_relations(&mut self, all: &[Relation]) {
        if all.is_empty() {
            let current = std::mem::take(&mut self.relations);
            self.set_relations(current);
            return;
        }
        let own = all
            .iter()
            .filter(|relation| relation.involves(self.id))
            .cloned()
            .collect();
        self.set_relations(own);
    }

    /// The relation graph as a standalone value.
    pub fn relation_graph(&self) -> RelationGraph {
        RelationGraph {
            outbound: self.relations_out.clone(),
            inbound: self.relations_in.clone(),
        }
    }
}

impl fmt::Display for WorkPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WorkPackage({}): {} {}",
            self.id,
            self.work_package_type.as_deref().unwrap_or("-"),
            self.subject
        )
    }
}

/// Query parameters for listing work packages.
#[derive(Debug, Clone, Default)]
pub struct WorkPackageListQuery {
    /// Restrict to a project; all visible work packages otherwise.
    pub project_id: Option<u64>,

    /// Status filter. The server defaults to open work packages when unset.
    pub status: Option<StatusFilter>,
}

impl WorkPackageListQuery {
    pub fn for_project(project_id: u64) -> Self {
        Self {
            project_id: Some(project_id),
            status: None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = Some(status);
        self
    }

    fn path(&self) -> String {
        match self.project_id {
            Some(project_id) => format!("projects/{project_id}/work_packages"),
            None => "work_packages".to_string(),
        }
    }

    fn filters(&self) -> Vec<Filter> {
        self.status.iter().map(Filter::status).collect()
    }
}

#[async_trait]
impl Get for WorkPackage {
    type Id = u64;

    #[tracing::instrument(skip(client))]
    async fn get(client: &OpenProjectClient, id: u64) -> Result<Self> {
        client.fetch(&format!("work_packages/{id}")).await
    }
}

#[async_trait]
impl List for WorkPackage {
    type Query = WorkPackageListQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &OpenProjectClient,
        query: &Self::Query,
        offset: u32,
        page_size: u32,
    ) -> Result<Page<Self>> {
        fetch_collection_page(client, &query.path(), &query.filters(), offset, page_size).await
    }
}

// Convenience functions for working with work packages

/// Fetch a single work package, including its embedded relations.
pub async fn get_work_package(client: &OpenProjectClient, id: u64) -> Result<WorkPackage> {
    WorkPackage::get(client, id).await
}

/// Fetch all work packages of a project.
///
/// `status` is one of `all`, `open` or `closed` and overrides `status_ids`.
/// Bulk results carry no relation data; see [`attach_relations`].
///
/// # Example
///
/// ```ignore
/// let closed = get_work_packages_by_project(&client, 46, Some("closed"), None).await?;
/// let picked = get_work_packages_by_project(&client, 46, None, Some(vec![3, 7])).await?;
/// ```
pub async fn get_work_packages_by_project(
    client: &OpenProjectClient,
    project_id: u64,
    status: Option<&str>,
    status_ids: Option<Vec<u64>>,
) -> Result<Vec<WorkPackage>> {
    let query = WorkPackageListQuery {
        project_id: Some(project_id),
        status: StatusFilter::resolve(status, status_ids),
    };
    WorkPackage::list_all(client, &query).await
}

/// Fetch all work packages returned by a stored query.
pub async fn get_work_packages_by_query(
    client: &OpenProjectClient,
    query_id: u64,
) -> Result<Vec<WorkPackage>> {
    drain(DEFAULT_PAGE_SIZE, |offset| {
        get_query_results_page(client, query_id, offset, DEFAULT_PAGE_SIZE)
    })
    .await
    .into_result()
}

/// Backfill relations on bulk-fetched work packages.
pub fn attach_relations(work_packages: &mut [WorkPackage], relations: &[Relation]) {
    for wp in work_packages {
        wp.attach_relations(relations);
    }
}
