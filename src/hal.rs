//! Hypermedia normalization.
//!
//! Resources reference related entities in two ways: through `_links`
//! (`{name: {href, title}}` descriptors) and through fully materialized
//! sub-objects in `_embedded`. The helpers here flatten both into plain ids,
//! display names and principal kinds.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Href the server uses for references the caller may not see.
pub const UNDISCLOSED_HREF: &str = "urn:openproject-org:api:v3:undisclosed";

/// A single `_links` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Target of the link; `null` when the relation is unset.
    #[serde(default)]
    pub href: Option<String>,
    /// Display title of the target.
    #[serde(default)]
    pub title: Option<String>,
}

impl Link {
    /// Numeric id from the trailing path segment of the href.
    pub fn id(&self) -> Option<u64> {
        self.href.as_deref().and_then(id_from_href)
    }

    /// Resource kind from the second-to-last path segment (e.g. `users`, `groups`).
    pub fn kind(&self) -> Option<String> {
        self.href.as_deref().and_then(kind_from_href).map(str::to_string)
    }

    /// Whether the server hid the target from the caller.
    pub fn is_undisclosed(&self) -> bool {
        self.href.as_deref() == Some(UNDISCLOSED_HREF)
    }
}

/// Parse the trailing numeric id of an href like `/api/v3/users/5`.
///
/// Returns `None` for the undisclosed sentinel and for anything unparseable.
pub fn id_from_href(href: &str) -> Option<u64> {
    if href == UNDISCLOSED_HREF {
        return None;
    }
    href.rsplit('/').next()?.parse().ok()
}

/// Second-to-last path segment of an href, naming the kind of resource.
pub fn kind_from_href(href: &str) -> Option<&str> {
    if href == UNDISCLOSED_HREF {
        return None;
    }
    let mut segments = href.rsplit('/');
    segments.next()?;
    segments.next().filter(|segment| !segment.is_empty())
}

/// A related entity resolved from `_embedded` or `_links`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reference {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub kind: Option<String>,
}

/// Read-only view over the hypermedia sections of a raw resource object.
#[derive(Debug, Clone, Copy)]
pub struct Hal<'a> {
    links: Option<&'a Map<String, Value>>,
    embedded: Option<&'a Map<String, Value>>,
}

impl<'a> Hal<'a> {
    pub fn new(raw: &'a Value) -> Self {
        Self {
            links: raw.get("_links").and_then(Value::as_object),
            embedded: raw.get("_embedded").and_then(Value::as_object),
        }
    }

    /// A single link by name. Malformed entries are treated as absent.
    pub fn link(&self, name: &str) -> Option<Link> {
        let value = self.links?.get(name)?;
        if !value.is_object() {
            return None;
        }
        Link::deserialize(value).ok()
    }

    /// A link array by name (e.g. `roles` on a membership).
    pub fn link_list(&self, name: &str) -> Vec<Link> {
        self.links
            .and_then(|links| links.get(name))
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| Link::deserialize(entry).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// An embedded sub-object by name.
    pub fn embedded(&self, name: &str) -> Option<&'a Value> {
        self.embedded?.get(name).filter(|value| value.is_object())
    }

    /// Resolve a related entity.
    ///
    /// An embedded object wins for id and name; the link supplies whatever the
    /// embedded object lacks. The kind always comes from the link href.
    pub fn reference(&self, name: &str) -> Reference {
        let link = self.link(name);
        let embedded = self.embedded(name);

        let id = embedded
            .and_then(|object| object.get("id"))
            .and_then(Value::as_u64)
            .or_else(|| link.as_ref().and_then(Link::id));

        let display_name = embedded
            .and_then(|object| object.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| link.as_ref().and_then(|l| l.title.clone()));

        Reference {
            id,
            name: display_name,
            kind: link.as_ref().and_then(Link::kind),
        }
    }
}
