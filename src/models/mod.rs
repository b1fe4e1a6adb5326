//! OpenProject API model types.

mod collection;
mod grid;
mod membership;
mod project;
mod query;
mod relation;
mod status;
mod user;
mod version;
mod work_package;

pub use collection::*;
pub use grid::*;
pub use membership::*;
pub use project::*;
pub use query::*;
pub use relation::*;
pub use status::*;
pub use user::*;
pub use version::*;
pub use work_package::*;

use serde::{Deserialize, Serialize};

use crate::client::OpenProjectClient;
use crate::decode::Resource;
use crate::error::{OpenProjectError, Result};
use crate::filters::{self, Filter};
use crate::pagination::{Page, PaginationParams};

/// Rich text as the API delivers it (`description`, `statusExplanation`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formattable {
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub raw: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
}

impl Formattable {
    /// The raw text, if any.
    pub fn text(&self) -> Option<&str> {
        self.raw.as_deref()
    }
}

/// Fetch one page of a collection resource and extract typed elements.
pub(crate) async fn fetch_collection_page<T>(
    client: &OpenProjectClient,
    path: &str,
    filters: &[Filter],
    offset: u32,
    page_size: u32,
) -> Result<Page<T>>
where
    T: TryFrom<Resource, Error = OpenProjectError>,
{
    #[derive(Serialize)]
    struct CollectionParams {
        #[serde(flatten)]
        pagination: PaginationParams,
        #[serde(skip_serializing_if = "Option::is_none")]
        filters: Option<String>,
    }

    let params = CollectionParams {
        pagination: PaginationParams::for_page(offset, page_size),
        filters: filters::encode_param(filters)?,
    };

    let collection: Collection = client.get_resource_with_query(path, &params).await?.try_into()?;
    Page::from_collection(collection, offset, page_size).try_into_typed()
}
