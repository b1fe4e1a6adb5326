//! Paged collection envelope.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::decode::{decode_embedded, Resource};
use crate::error::Result;

/// One page of a collection resource.
///
/// `elements` are decoded individually, so a collection may mix resource
/// kinds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// The `_type` tag (`Collection` or `WorkPackageCollection`).
    pub kind: String,
    /// Number of elements on this page.
    pub count: u64,
    /// Total number of elements across all pages.
    pub total: u64,
    /// 1-indexed page number, when the server reports it.
    pub offset: Option<u32>,
    pub page_size: Option<u32>,
    pub elements: Vec<Resource>,
}

impl Collection {
    pub fn from_json(raw: &Value) -> Result<Self> {
        let elements = raw
            .pointer("/_embedded/elements")
            .and_then(Value::as_array)
            .map(|elements| elements.iter().map(decode_embedded).collect::<Result<Vec<_>>>())
            .transpose()?
            .unwrap_or_default();

        let number = |key: &str| raw.get(key).and_then(Value::as_u64);
        let small = |key: &str| number(key).and_then(|n| u32::try_from(n).ok());

        Ok(Self {
            kind: raw
                .get("_type")
                .and_then(Value::as_str)
                .unwrap_or("Collection")
                .to_string(),
            count: number("count").unwrap_or(elements.len() as u64),
            total: number("total").unwrap_or(elements.len() as u64),
            offset: small("offset"),
            page_size: small("pageSize"),
            elements,
        })
    }

    pub fn into_elements(self) -> Vec<Resource> {
        self.elements
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} of {}", self.kind, self.count, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collection_mixed_elements() {
        let collection = Collection::from_json(&json!({
            "_type": "Collection",
            "total": 30,
            "count": 2,
            "pageSize": 2,
            "offset": 1,
            "_embedded": {
                "elements": [
                    { "_type": "Status", "id": 1, "name": "New" },
                    { "_type": "Budget", "id": 2 }
                ]
            }
        }))
        .unwrap();

        assert_eq!(collection.total, 30);
        assert_eq!(collection.offset, Some(1));
        assert_eq!(collection.page_size, Some(2));
        assert_eq!(collection.elements[0].kind(), "Status");
        assert_eq!(collection.elements[1].kind(), "Generic");
        assert_eq!(collection.to_string(), "Collection: 2 of 30");
    }

    #[test]
    fn test_collection_without_elements() {
        let collection =
            Collection::from_json(&json!({ "_type": "WorkPackageCollection", "total": 0, "count": 0 }))
                .unwrap();
        assert_eq!(collection.kind, "WorkPackageCollection");
        assert!(collection.into_elements().is_empty());
    }
}
