//! User and placeholder user models.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::fetch_collection_page;
use crate::client::OpenProjectClient;
use crate::error::Result;
use crate::filters::FilterQuery;
use crate::pagination::Page;
use crate::timestamp::Timestamp;
use crate::traits::{Get, List};

/// A user account.
///
/// Login, email and admin flag are only disclosed to administrators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,

    #[serde(default)]
    pub login: Option<String>,

    #[serde(default)]
    pub first_name: Option<String>,

    #[serde(default)]
    pub last_name: Option<String>,

    /// Display name.
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub admin: Option<bool>,

    /// Account status, e.g. `active` or `locked`.
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub created_at: Option<Timestamp>,

    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

impl User {
    pub fn from_json(raw: &Value) -> Result<Self> {
        Ok(Self::deserialize(raw)?)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "User({}): {}", self.id, self.name)
    }
}

/// A named stand-in for a person who has no account yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholderUser {
    pub id: u64,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub created_at: Option<Timestamp>,

    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

impl PlaceholderUser {
    pub fn from_json(raw: &Value) -> Result<Self> {
        Ok(Self::deserialize(raw)?)
    }
}

impl fmt::Display for PlaceholderUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlaceholderUser({}): {}", self.id, self.name)
    }
}

#[async_trait]
impl Get for User {
    type Id = u64;

    #[tracing::instrument(skip(client))]
    async fn get(client: &OpenProjectClient, id: u64) -> Result<Self> {
        client.fetch(&format!("users/{id}")).await
    }
}

#[async_trait]
impl List for User {
    type Query = FilterQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &OpenProjectClient,
        query: &Self::Query,
        offset: u32,
        page_size: u32,
    ) -> Result<Page<Self>> {
        fetch_collection_page(client, "users", &query.filters, offset, page_size).await
    }
}

#[async_trait]
impl Get for PlaceholderUser {
    type Id = u64;

    #[tracing::instrument(skip(client))]
    async fn get(client: &OpenProjectClient, id: u64) -> Result<Self> {
        client.fetch(&format!("placeholder_users/{id}")).await
    }
}

#[async_trait]
impl List for PlaceholderUser {
    type Query = FilterQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &OpenProjectClient,
        query: &Self::Query,
        offset: u32,
        page_size: u32,
    ) -> Result<Page<Self>> {
        fetch_collection_page(client, "placeholder_users", &query.filters, offset, page_size).await
    }
}

pub async fn get_user(client: &OpenProjectClient, id: u64) -> Result<User> {
    User::get(client, id).await
}

/// Fetch all users. Requires admin rights on most installations.
pub async fn get_users(client: &OpenProjectClient) -> Result<Vec<User>> {
    User::list_all(client, &FilterQuery::default()).await
}

pub async fn get_placeholder_user(client: &OpenProjectClient, id: u64) -> Result<PlaceholderUser> {
    PlaceholderUser::get(client, id).await
}

pub async fn get_placeholder_users(client: &OpenProjectClient) -> Result<Vec<PlaceholderUser>> {
    PlaceholderUser::list_all(client, &FilterQuery::default()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_from_json() {
        let user = User::from_json(&json!({
            "_type": "User",
            "id": 5,
            "login": "ada",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "admin": true,
            "status": "active",
            "createdAt": "2020-01-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(user.login.as_deref(), Some("ada"));
        assert_eq!(user.first_name.as_deref(), Some("Ada"));
        assert_eq!(user.admin, Some(true));
        assert_eq!(user.to_string(), "User(5): Ada Lovelace");
    }

    #[test]
    fn test_user_without_admin_fields() {
        let user = User::from_json(&json!({ "_type": "User", "id": 6, "name": "Bob" })).unwrap();
        assert!(user.login.is_none());
        assert!(user.email.is_none());
    }

    #[test]
    fn test_placeholder_user() {
        let user = PlaceholderUser::from_json(&json!({
            "_type": "PlaceholderUser",
            "id": 12,
            "name": "Future hire"
        }))
        .unwrap();
        assert_eq!(user.to_string(), "PlaceholderUser(12): Future hire");
    }
}
