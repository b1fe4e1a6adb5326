//! List trait for fetching collections of entities.

use async_trait::async_trait;

use crate::client::OpenProjectClient;
use crate::error::Result;
use crate::pagination::{drain, Page, Partial, DEFAULT_PAGE_SIZE};

/// List/filter entities with pagination support.
///
/// # Example
///
/// ```ignore
/// use opapi::{OpenProjectClient, Project, List};
///
/// let client = OpenProjectClient::from_env()?;
///
/// // Fetch a single page
/// let page = Project::list_page(&client, &Default::default(), 1, 50).await?;
///
/// // Fetch all pages
/// let all_projects = Project::list_all(&client, &Default::default()).await?;
/// ```
#[async_trait]
pub trait List: Sized + Send {
    /// Query parameters for filtering.
    type Query: Default + Send + Sync;

    /// List entities matching the query (single page).
    ///
    /// # Arguments
    ///
    /// * `client` - The OpenProject API client
    /// * `query` - Query parameters for filtering
    /// * `offset` - Page number (1-indexed)
    /// * `page_size` - Number of items per page
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn list_page(
        client: &OpenProjectClient,
        query: &Self::Query,
        offset: u32,
        page_size: u32,
    ) -> Result<Page<Self>>;

    /// List all entities matching the query (fetches all pages).
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails; items from earlier pages
    /// are discarded. See [`List::list_all_partial`] to keep them.
    async fn list_all(client: &OpenProjectClient, query: &Self::Query) -> Result<Vec<Self>> {
        Self::list_all_partial(client, query).await.into_result()
    }

    /// List all entities, stopping at the first failing page.
    ///
    /// Never fails; a failed page is reported in [`Partial::error`] next to
    /// the items gathered before it.
    async fn list_all_partial(client: &OpenProjectClient, query: &Self::Query) -> Partial<Self> {
        drain(DEFAULT_PAGE_SIZE, |offset| {
            Self::list_page(client, query, offset, DEFAULT_PAGE_SIZE)
        })
        .await
    }
}
