//! Project membership model.

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
use crate::timestamp::Timestamp;
use crate::traits::{Get, List};

/// Assignment of a principal (user, group or placeholder) to a project with
/// a set of roles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: u64,

    #[serde(default)]
    pub created_at: Option<Timestamp>,

    #[serde(default)]
    pub updated_at: Option<Timestamp>,

    #[serde(skip_deserializing)]
    pub project: Option<String>,
    #[serde(skip_deserializing)]
    pub project_id: Option<u64>,

    #[serde(skip_deserializing)]
    pub principal: Option<String>,
    #[serde(skip_deserializing)]
    pub principal_id: Option<u64>,
    /// `users`, `groups` or `placeholder_users`.
    #[serde(skip_deserializing)]
    pub principal_type: Option<String>,

    /// Role names in server order.
    #[serde(skip_deserializing)]
    pub roles: Vec<String>,
}

impl Membership {
    pub fn from_json(raw: &Value) -> Result<Self> {
        let mut membership = Self::deserialize(raw)?;
        let hal = Hal::new(raw);

        let project = hal.reference("project");
        membership.project = project.name;
        membership.project_id = project.id;

        let principal = hal.reference("principal");
        membership.principal = principal.name;
        membership.principal_id = principal.id;
        membership.principal_type = principal.kind;

        membership.roles = hal
            .link_list("roles")
            .into_iter()
            .filter_map(|role| role.title)
            .collect();

        Ok(membership)
    }
}

impl fmt::Display for Membership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Membership({}): {} in {} as {}",
            self.id,
            self.principal.as_deref().unwrap_or("?"),
            self.project.as_deref().unwrap_or("?"),
            self.roles.join(", ")
        )
    }
}

#[async_trait]
impl Get for Membership {
    type Id = u64;

    #[tracing::instrument(skip(client))]
    async fn get(client: &OpenProjectClient, id: u64) -> Result<Self> {
        client.fetch(&format!("memberships/{id}")).await
    }
}

#[async_trait]
impl List for Membership {
    type Query = FilterQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &OpenProjectClient,
        query: &Self::Query,
        offset: u32,
        page_size: u32,
    ) -> Result<Page<Self>> {
        fetch_collection_page(client, "memberships", &query.filters, offset, page_size).await
    }
}

pub async fn get_membership(client: &OpenProjectClient, id: u64) -> Result<Membership> {
    Membership::get(client, id).await
}

pub async fn get_memberships(client: &OpenProjectClient) -> Result<Vec<Membership>> {
    Membership::list_all(client, &FilterQuery::default()).await
}
