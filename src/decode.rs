//! Type registry and decoder.
//!
//! Every API resource carries a `_type` discriminator. [`decode`] maps it onto
//! the closed [`Resource`] enum; tags without a typed model decode into
//! [`GenericResource`] so that resource types added by newer servers never
//! break the client.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{OpenProjectError, Result};
use crate::models::{
    Collection, Grid, GridWidget, Membership, PlaceholderUser, Project, Query, Relation, Status,
    User, Version, WorkPackage,
};

/// A decoded API resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Resource {
    Project(Project),
    WorkPackage(WorkPackage),
    Relation(Relation),
    Version(Version),
    User(User),
    PlaceholderUser(PlaceholderUser),
    Membership(Membership),
    Status(Status),
    Grid(Grid),
    GridWidget(GridWidget),
    Query(Query),
    Collection(Collection),
    /// Any resource without a typed model.
    Generic(GenericResource),
}

impl Resource {
    /// Name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Project(_) => "Project",
            Self::WorkPackage(_) => "WorkPackage",
            Self::Relation(_) => "Relation",
            Self::Version(_) => "Version",
            Self::User(_) => "User",
            Self::PlaceholderUser(_) => "PlaceholderUser",
            Self::Membership(_) => "Membership",
            Self::Status(_) => "Status",
            Self::Grid(_) => "Grid",
            Self::GridWidget(_) => "GridWidget",
            Self::Query(_) => "Query",
            Self::Collection(_) => "Collection",
            Self::Generic(_) => "Generic",
        }
    }

    /// The server-assigned id, when the resource has one.
    pub fn id(&self) -> Option<u64> {
        match self {
            Self::Project(p) => Some(p.id),
            Self::WorkPackage(w) => Some(w.id),
            Self::Relation(r) => Some(r.id),
            Self::Version(v) => Some(v.id),
            Self::User(u) => Some(u.id),
            Self::PlaceholderUser(u) => Some(u.id),
            Self::Membership(m) => Some(m.id),
            Self::Status(s) => Some(s.id),
            Self::Grid(g) => Some(g.id),
            Self::GridWidget(w) => w.id,
            Self::Query(q) => Some(q.id),
            Self::Collection(_) => None,
            Self::Generic(g) => g.id,
        }
    }

    /// The `_type` tag the resource was decoded from, if it had one.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::Generic(generic) => generic.type_name.as_deref(),
            Self::Collection(collection) => Some(&collection.kind),
            other => Some(other.kind()),
        }
    }

    /// Description used when a typed extraction fails.
    fn describe(&self) -> String {
        self.type_name().unwrap_or("untyped resource").to_string()
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Project(p) => write!(f, "{p}"),
            Self::WorkPackage(w) => write!(f, "{w}"),
            Self::Relation(r) => write!(f, "{r}"),
            Self::Version(v) => write!(f, "{v}"),
            Self::User(u) => write!(f, "{u}"),
            Self::PlaceholderUser(u) => write!(f, "{u}"),
            Self::Membership(m) => write!(f, "{m}"),
            Self::Status(s) => write!(f, "{s}"),
            Self::Grid(g) => write!(f, "{g}"),
            Self::GridWidget(w) => write!(f, "{w}"),
            Self::Query(q) => write!(f, "{q}"),
            Self::Collection(c) => write!(f, "{c}"),
            Self::Generic(g) => write!(f, "{g}"),
        }
    }
}

macro_rules! resource_variants {
    ($($variant:ident),* $(,)?) => {
        $(
            impl TryFrom<Resource> for $variant {
                type Error = OpenProjectError;

                fn try_from(resource: Resource) -> Result<Self> {
                    match resource {
                        Resource::$variant(inner) => Ok(inner),
                        other => Err(OpenProjectError::UnexpectedType {
                            expected: stringify!($variant),
                            found: other.describe(),
                        }),
                    }
                }
            }

            impl From<$variant> for Resource {
                fn from(inner: $variant) -> Self {
                    Resource::$variant(inner)
                }
            }
        )*
    };
}

resource_variants!(
    Project,
    WorkPackage,
    Relation,
    Version,
    User,
    PlaceholderUser,
    Membership,
    Status,
    Grid,
    GridWidget,
    Query,
    Collection,
);

/// A resource decoded without a schema.
///
/// Keeps the non-reserved fields (names lower-cased) plus the complete raw
/// object for inspection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericResource {
    pub id: Option<u64>,
    pub type_name: Option<String>,
    pub fields: Map<String, Value>,
    #[serde(skip)]
    pub raw: Value,
}

impl GenericResource {
    pub fn from_json(raw: &Value) -> Self {
        let fields = raw
            .as_object()
            .map(|object| {
                object
                    .iter()
                    .filter(|(key, _)| !key.starts_with('_'))
                    .map(|(key, value)| (key.to_lowercase(), value.clone()))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            id: raw.get("id").and_then(Value::as_u64),
            type_name: raw.get("_type").and_then(Value::as_str).map(str::to_string),
            fields,
            raw: raw.clone(),
        }
    }

    /// A field by its lower-cased name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(&name.to_lowercase())
    }
}

impl fmt::Display for GenericResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.id.map(|id| id.to_string()).unwrap_or_default();
        write!(
            f,
            "GenericType({}): type: {}",
            id,
            self.type_name.as_deref().unwrap_or("none")
        )
    }
}

/// Decode a JSON value into a typed resource.
///
/// # Errors
///
/// Returns [`OpenProjectError::MissingType`] if the value is not an object
/// carrying a string `_type`, and [`OpenProjectError::ParseError`] if the
/// object does not fit the schema its tag names.
pub fn decode(value: &Value) -> Result<Resource> {
    let type_name = value
        .get("_type")
        .and_then(Value::as_str)
        .ok_or(OpenProjectError::MissingType)?;

    decode_tagged(type_name, value)
}

/// Decode an embedded sub-object (collection element, grid widget, query results).
///
/// Unlike [`decode`], an object without a discriminator is kept as an
/// untyped [`GenericResource`].
pub fn decode_embedded(value: &Value) -> Result<Resource> {
    match value.get("_type").and_then(Value::as_str) {
        Some(type_name) => decode_tagged(type_name, value),
        None => {
            tracing::debug!("embedded object has no _type, keeping it untyped");
            Ok(Resource::Generic(GenericResource::from_json(value)))
        }
    }
}

fn decode_tagged(type_name: &str, value: &Value) -> Result<Resource> {
    let resource = match type_name {
        "Project" => Resource::Project(Project::from_json(value)?),
        "WorkPackage" => Resource::WorkPackage(WorkPackage::from_json(value)?),
        "Relation" => Resource::Relation(Relation::from_json(value)?),
        "Version" => Resource::Version(Version::from_json(value)?),
        "User" => Resource::User(User::from_json(value)?),
        "PlaceholderUser" => Resource::PlaceholderUser(PlaceholderUser::from_json(value)?),
        "Membership" => Resource::Membership(Membership::from_json(value)?),
        "Status" => Resource::Status(Status::from_json(value)?),
        "Grid" => Resource::Grid(Grid::from_json(value)?),
        "GridWidget" => Resource::GridWidget(GridWidget::from_json(value)?),
        "Query" => Resource::Query(Query::from_json(value)?),
        "Collection" | "WorkPackageCollection" => {
            Resource::Collection(Collection::from_json(value)?)
        }
        other => {
            tracing::warn!(type_name = other, "no typed model for resource type, decoding generically");
            Resource::Generic(GenericResource::from_json(value))
        }
    };
    Ok(resource)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_unknown_type_is_generic() {
        let resource = decode(&json!({ "_type": "Widget9000", "id": 4 })).unwrap();
        assert_eq!(resource.id(), Some(4));
        assert_eq!(resource.type_name(), Some("Widget9000"));
        match resource {
            Resource::Generic(generic) => {
                assert_eq!(generic.type_name.as_deref(), Some("Widget9000"));
                assert_eq!(generic.field("id"), Some(&json!(4)));
            }
            other => panic!("expected generic resource, got {}", other.kind()),
        }
    }

    #[test]
    fn test_decode_missing_type_fails() {
        let result = decode(&json!({ "id": 4, "name": "no tag" }));
        assert!(matches!(result, Err(OpenProjectError::MissingType)));

        let result = decode(&json!([1, 2, 3]));
        assert!(matches!(result, Err(OpenProjectError::MissingType)));
    }

    #[test]
    fn test_decode_embedded_missing_type_is_untyped() {
        let resource = decode_embedded(&json!({ "id": 4, "startRow": 1 })).unwrap();
        match resource {
            Resource::Generic(generic) => {
                assert!(generic.type_name.is_none());
                assert_eq!(generic.field("startRow"), Some(&json!(1)));
            }
            other => panic!("expected generic resource, got {}", other.kind()),
        }
    }

    #[test]
    fn test_generic_drops_reserved_fields_but_keeps_raw() {
        let raw = json!({
            "_type": "Attachment",
            "id": 8,
            "fileName": "spec.pdf",
            "_links": { "self": { "href": "/api/v3/attachments/8" } }
        });
        let generic = GenericResource::from_json(&raw);
        assert!(generic.fields.contains_key("filename"));
        assert!(!generic.fields.contains_key("_links"));
        assert_eq!(generic.raw, raw);
        assert_eq!(generic.to_string(), "GenericType(8): type: Attachment");
    }

    #[test]
    fn test_decode_is_idempotent() {
        let raw = json!({
            "_type": "Status",
            "id": 3,
            "name": "Closed",
            "isClosed": true,
            "color": "#00ff00",
            "position": 7
        });
        assert_eq!(decode(&raw).unwrap(), decode(&raw).unwrap());
    }

    #[test]
    fn test_try_from_wrong_variant() {
        let resource = decode(&json!({ "_type": "Status", "id": 1, "name": "New" })).unwrap();
        let err = Project::try_from(resource).unwrap_err();
        match err {
            OpenProjectError::UnexpectedType { expected, found } => {
                assert_eq!(expected, "Project");
                assert_eq!(found, "Status");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_try_from_generic_reports_tag() {
        let resource = decode(&json!({ "_type": "Error", "message": "nope" })).unwrap();
        let err = Status::try_from(resource).unwrap_err();
        assert!(err.to_string().contains("Error"));
    }
}
