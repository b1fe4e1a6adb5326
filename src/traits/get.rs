//! Get trait for fetching single entities.

use async_trait::async_trait;

use crate::client::OpenProjectClient;
use crate::error::Result;

/// Fetch a single entity by ID.
///
/// # Example
///
/// ```ignore
/// use opapi::{OpenProjectClient, WorkPackage, Get};
///
/// let client = OpenProjectClient::from_env()?;
/// let wp = WorkPackage::get(&client, 1234).await?;
/// ```
#[async_trait]
pub trait Get: Sized {
    /// The ID type for this entity.
    type Id;

    /// Fetch the entity by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found, the request fails, or the
    /// response decodes to a different resource type.
    async fn get(client: &OpenProjectClient, id: Self::Id) -> Result<Self>;
}
