//! Pagination utilities for OpenProject collection responses.
//!
//! Collections are paged with a 1-indexed `offset` (page number) and a
//! `pageSize`. Pages are always requested one at a time, in order.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::decode::Resource;
use crate::error::{OpenProjectError, Result};
use crate::models::Collection;

/// Default page size for list operations.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Maximum pages to fetch (safety limit).
pub const MAX_PAGES: u32 = 1000;

/// A page of results from the OpenProject API.
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "T: Serialize")]
pub struct Page<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Total number of items across all pages.
    pub total: u64,
    /// Current page number (1-indexed).
    pub offset: u32,
    /// Number of items per page.
    pub page_size: u32,
    /// Whether there are more pages.
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Create a new page from items and pagination info.
    ///
    /// A page size of zero never has a successor.
    #[must_use]
    pub fn new(items: Vec<T>, offset: u32, page_size: u32, total: u64) -> Self {
        let has_more = page_size > 0 && u64::from(offset) * u64::from(page_size) < total;
        Self {
            items,
            total,
            offset,
            page_size,
            has_more,
        }
    }

    /// A final page with no items.
    #[must_use]
    pub fn empty(offset: u32, page_size: u32) -> Self {
        Self::new(Vec::new(), offset, page_size, 0)
    }

    /// Map the items to a different type.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            offset: self.offset,
            page_size: self.page_size,
            has_more: self.has_more,
        }
    }

    /// Returns true if this page has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns an iterator over the items in this page.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl Page<Resource> {
    /// Build a page from a decoded collection.
    ///
    /// The server-reported `offset`/`pageSize` win over the requested ones.
    /// A body without `pageSize` is unpaginated and holds the whole set, so it
    /// is the last page.
    #[must_use]
    pub fn from_collection(collection: Collection, offset: u32, page_size: u32) -> Self {
        let offset = collection.offset.unwrap_or(offset);
        match collection.page_size {
            Some(page_size) => Self::new(collection.elements, offset, page_size, collection.total),
            None => Self {
                has_more: false,
                ..Self::new(collection.elements, offset, page_size, collection.total)
            },
        }
    }

    /// Extract typed items, failing on the first element of another kind.
    pub fn try_into_typed<T>(self) -> Result<Page<T>>
    where
        T: TryFrom<Resource, Error = OpenProjectError>,
    {
        let items = self
            .items
            .into_iter()
            .map(T::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(Page {
            items,
            total: self.total,
            offset: self.offset,
            page_size: self.page_size,
            has_more: self.has_more,
        })
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Query parameters for paginated requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    /// Page number (1-indexed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    /// Number of items per page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl PaginationParams {
    /// Create pagination params for a specific page.
    #[must_use]
    pub fn for_page(offset: u32, page_size: u32) -> Self {
        Self {
            offset: Some(offset),
            page_size: Some(page_size),
        }
    }
}

/// Items collected before a pagination run stopped.
///
/// `error` is set when a page request failed; `items` then holds everything
/// gathered from the pages before it.
#[derive(Debug)]
pub struct Partial<T> {
    pub items: Vec<T>,
    pub error: Option<OpenProjectError>,
}

impl<T> Partial<T> {
    /// Whether every page was fetched.
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Discard partial results if any page failed.
    pub fn into_result(self) -> Result<Vec<T>> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.items),
        }
    }
}

/// Fetch pages in order starting at offset 1 until the last page.
///
/// Stops at the first failing page, keeping what was gathered so far.
pub async fn drain<T, F, Fut>(page_size: u32, mut fetch: F) -> Partial<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items = Vec::new();
    let mut offset = 1;

    loop {
        let page = match fetch(offset).await {
            Ok(page) => page,
            Err(err) => {
                tracing::debug!(offset, error = %err, "page request failed, stopping");
                return Partial {
                    items,
                    error: Some(err),
                };
            }
        };

        tracing::debug!(offset, page_size, count = page.len(), total = page.total, "fetched page");
        if page.is_empty() {
            if page.has_more {
                tracing::debug!(offset, total = page.total, "empty page before reported total, stopping");
            }
            break;
        }
        let has_more = page.has_more;
        items.extend(page.items);

        if !has_more {
            break;
        }
        offset += 1;

        // Safety limit to prevent infinite loops
        if offset > MAX_PAGES {
            tracing::warn!("Reached pagination limit of {} pages, stopping", MAX_PAGES);
            break;
        }
    }

    Partial { items, error: None }
}
