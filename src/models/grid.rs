//! Grid (board / dashboard) and grid widget models.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::fetch_collection_page;
use crate::client::OpenProjectClient;
use crate::decode::{decode_embedded, Resource};
use crate::error::Result;
use crate::filters::Filter;
use crate::hal::Hal;
use crate::pagination::Page;
use crate::timestamp::Timestamp;
use crate::traits::{Get, List};

/// A grid of widgets bound to a page of the web UI (its `scope`), e.g. a
/// board at `/projects/demo/boards`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grid {
    pub id: u64,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub row_count: Option<u32>,

    #[serde(default)]
    pub column_count: Option<u32>,

    #[serde(default)]
    pub options: Value,

    #[serde(default)]
    pub created_at: Option<Timestamp>,

    #[serde(default)]
    pub updated_at: Option<Timestamp>,

    /// Href of the page the grid belongs to; empty when unset.
    #[serde(skip_deserializing)]
    pub scope: String,

    /// Decoded widgets, usually [`GridWidget`]s.
    #[serde(skip_deserializing)]
    pub widgets: Vec<Resource>,
}

impl Grid {
    pub fn from_json(raw: &Value) -> Result<Self> {
        let mut grid = Self::deserialize(raw)?;

        grid.scope = Hal::new(raw)
            .link("scope")
            .and_then(|link| link.href)
            .unwrap_or_default();

        if let Some(widgets) = raw.get("widgets").and_then(Value::as_array) {
            grid.widgets = widgets.iter().map(decode_embedded).collect::<Result<_>>()?;
        }

        Ok(grid)
    }

    /// Typed widgets, skipping anything that did not decode as a [`GridWidget`].
    pub fn grid_widgets(&self) -> impl Iterator<Item = &GridWidget> {
        self.widgets.iter().filter_map(|widget| match widget {
            Resource::GridWidget(widget) => Some(widget),
            _ => None,
        })
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Grid({}): {} {}",
            self.id,
            self.scope,
            self.name.as_deref().unwrap_or_default()
        )
    }
}

/// A widget placed on a grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridWidget {
    /// Unsaved widgets have no id.
    #[serde(default)]
    pub id: Option<u64>,

    /// Widget kind, e.g. `work_package_query`.
    #[serde(default)]
    pub identifier: Option<String>,

    #[serde(default)]
    pub options: Value,

    #[serde(default)]
    pub start_row: Option<u32>,

    #[serde(default)]
    pub end_row: Option<u32>,

    #[serde(default)]
    pub start_column: Option<u32>,

    #[serde(default)]
    pub end_column: Option<u32>,
}

impl GridWidget {
    pub fn from_json(raw: &Value) -> Result<Self> {
        Ok(Self::deserialize(raw)?)
    }

    /// Id of the stored query backing this widget, if any.
    ///
    /// The server sends `options.queryId` as a string or a number.
    pub fn query_id(&self) -> Option<u64> {
        match self.options.get("queryId")? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for GridWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = |n: Option<u32>| n.map(|n| n.to_string()).unwrap_or_default();
        write!(
            f,
            "GridWidget({}): {} [({},{}) -> ({},{})]",
            self.id.map(|id| id.to_string()).unwrap_or_default(),
            self.identifier.as_deref().unwrap_or_default(),
            cell(self.start_column),
            cell(self.start_row),
            cell(self.end_column),
            cell(self.end_row)
        )
    }
}

/// Query parameters for listing grids.
#[derive(Debug, Clone, Default)]
pub struct GridListQuery {
    /// Only grids bound to this page, e.g. `/projects/demo/boards`.
    pub scope: Option<String>,
}

#[async_trait]
impl Get for Grid {
    type Id = u64;

    #[tracing::instrument(skip(client))]
    async fn get(client: &OpenProjectClient, id: u64) -> Result<Self> {
        client.fetch(&format!("grids/{id}")).await
    }
}

#[async_trait]
impl List for Grid {
    type Query = GridListQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &OpenProjectClient,
        query: &Self::Query,
        offset: u32,
        page_size: u32,
    ) -> Result<Page<Self>> {
        let filters: Vec<Filter> = query.scope.as_deref().map(Filter::scope).into_iter().collect();
        fetch_collection_page(client, "grids", &filters, offset, page_size).await
    }
}

pub async fn get_grid(client: &OpenProjectClient, id: u64) -> Result<Grid> {
    Grid::get(client, id).await
}

/// Fetch all grids, optionally only those bound to `scope`.
pub async fn get_grids(client: &OpenProjectClient, scope: Option<&str>) -> Result<Vec<Grid>> {
    let query = GridListQuery {
        scope: scope.map(str::to_string),
    };
    Grid::list_all(client, &query).await
}
