//! Server-side filter payloads.
//!
//! Collection endpoints accept a JSON-encoded `filters` query parameter of the
//! form `[{"<name>": {"operator": "<op>", "values": [...]}}]`.

use std::str::FromStr;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;

use crate::error::{OpenProjectError, Result};

/// A single filter clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub name: String,
    pub operator: String,
    pub values: Option<Vec<Value>>,
}

#[derive(Serialize)]
struct Condition<'a> {
    operator: &'a str,
    values: &'a Option<Vec<Value>>,
}

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(
            &self.name,
            &Condition {
                operator: &self.operator,
                values: &self.values,
            },
        )?;
        map.end()
    }
}

impl Filter {
    pub fn new(name: impl Into<String>, operator: impl Into<String>, values: Option<Vec<Value>>) -> Self {
        Self {
            name: name.into(),
            operator: operator.into(),
            values,
        }
    }

    /// Filter work packages by status.
    pub fn status(status: &StatusFilter) -> Self {
        let (operator, values) = match status {
            StatusFilter::All => ("*", None),
            StatusFilter::Open => ("o", None),
            StatusFilter::Closed => ("c", None),
            StatusFilter::Ids(ids) => ("=", Some(ids.iter().map(|id| Value::from(*id)).collect())),
        };
        Self::new("status_id", operator, values)
    }

    /// Filter grids by the page they are bound to.
    pub fn scope(scope: &str) -> Self {
        Self::new("scope", "=", Some(vec![Value::from(scope)]))
    }
}

/// Status selection for work package listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Open,
    Closed,
    /// Only the given status ids.
    Ids(Vec<u64>),
}

impl StatusFilter {
    /// Combine a status keyword and explicit status ids.
    ///
    /// The keyword wins when given; an unrecognised keyword selects no filter.
    pub fn resolve(status: Option<&str>, status_ids: Option<Vec<u64>>) -> Option<Self> {
        match status {
            Some(keyword) => keyword.parse().ok(),
            None => status_ids.map(Self::Ids),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = OpenProjectError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            _ => Err(OpenProjectError::InvalidArgument(format!(
                "Invalid status: {s}. Use: all, open, closed"
            ))),
        }
    }
}

/// Query type for listings that only take raw filters.
#[derive(Debug, Clone, Default)]
pub struct FilterQuery {
    pub filters: Vec<Filter>,
}

/// Encode filters as the `filters` query parameter; `None` when empty.
pub fn encode_param(filters: &[Filter]) -> Result<Option<String>> {
    if filters.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::to_string(filters)?))
}
