//! OpenProject API client library.
//!
//! A typed, read-only Rust client for the OpenProject API v3. Responses are
//! HAL+JSON documents; every object is decoded by its `_type` discriminator
//! into a [`Resource`], and entity types flatten their hypermedia links into
//! plain ids and names.
//!
//! # Quick Start
//!
//! ```no_run
//! use opapi::{OpenProjectClient, WorkPackage, Get};
//!
//! #[tokio::main]
//! async fn main() -> opapi::Result<()> {
//!     // Create client from environment variables
//!     let client = OpenProjectClient::from_env()?;
//!
//!     // All projects, with their position in the project tree
//!     let projects = opapi::get_projects_map(&client).await?;
//!     for project in projects.values() {
//!         println!("{} (level {})", project.fullname, project.level);
//!     }
//!
//!     // Closed work packages of one project
//!     let closed = opapi::get_work_packages_by_project(&client, 3, Some("closed"), None).await?;
//!     println!("Found {} closed work packages", closed.len());
//!
//!     // A single work package comes with its relations
//!     let wp = WorkPackage::get(&client, 1234).await?;
//!     println!("{wp} follows {:?}", wp.relations_out.get("follows"));
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`decode`] maps a JSON object onto the closed [`Resource`] enum; types
//!   without a typed model decode into [`GenericResource`].
//! - [`Get`] and [`List`] are implemented by each entity type for the
//!   endpoints it supports. [`List::list_all`] walks every page in order.
//! - [`build_hierarchy`] and [`RelationGraph`] derive project paths and
//!   work package relation maps from decoded entities.
//!
//! # Configuration
//!
//! The client reads configuration from environment variables:
//!
//! - `OPENPROJECT_BASEURL` (required) - Server root, e.g. `https://community.openproject.org`
//! - `OPENPROJECT_APIKEY` (required) - API key from "My account > Access tokens"

mod client;
mod decode;
mod error;
mod filters;
mod graph;
mod hal;
mod hierarchy;
mod models;
mod pagination;
mod timestamp;
mod traits;

pub mod cli;
pub mod output;

#[cfg(feature = "test-server")]
pub mod mock_server;

// Re-export core types
pub use client::{OpenProjectClient, API_KEY_ENV, BASE_URL_ENV};
pub use decode::{decode, decode_embedded, GenericResource, Resource};
pub use error::{OpenProjectError, Result};
pub use filters::{Filter, FilterQuery, StatusFilter};
pub use graph::{RelationGraph, RelationMap};
pub use hal::{Link, Reference, UNDISCLOSED_HREF};
pub use hierarchy::build_hierarchy;
pub use pagination::{drain, Page, PaginationParams, Partial, DEFAULT_PAGE_SIZE, MAX_PAGES};
pub use timestamp::{Date, Lenient, Timestamp};

// Re-export traits
pub use traits::{Get, List};

// Re-export models
pub use models::{
    Collection,
    Formattable,
    Grid,
    GridListQuery,
    GridWidget,
    Membership,
    PlaceholderUser,
    Project,
    Query,
    Relation,
    Status,
    User,
    Version,
    WorkPackage,
    WorkPackageListQuery,
};

// Re-export convenience functions
pub use models::{attach_relations, get_relation, get_relations};
pub use models::{get_grid, get_grids, get_query, get_query_results_page};
pub use models::{get_membership, get_memberships, get_status, get_statuses};
pub use models::{get_placeholder_user, get_placeholder_users, get_user, get_users};
pub use models::{get_projects, get_projects_map};
pub use models::{get_version, get_versions};
pub use models::{get_work_package, get_work_packages_by_project, get_work_packages_by_query};
