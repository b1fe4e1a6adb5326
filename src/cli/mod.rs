//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the opapi binary.

use clap::{Parser, Subcommand, ValueEnum};

use crate::client::{API_KEY_ENV, BASE_URL_ENV};

/// OpenProject API command-line interface.
#[derive(Parser, Debug)]
#[command(name = "opapi", about = "OpenProject API CLI", version)]
pub struct Cli {
    /// Server root URL.
    #[arg(long, global = true, env = BASE_URL_ENV)]
    pub base_url: Option<String>,

    /// API key.
    #[arg(long, global = true, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Get a single entity by ID.
    Get {
        /// The type of entity to get.
        entity: Entity,

        /// The numeric entity ID.
        id: String,
    },

    /// List all entities of a type.
    List {
        /// The type of entity to list.
        entity: Entity,

        /// Project ID (work packages).
        #[arg(long)]
        project: Option<u64>,

        /// Status keyword: all, open or closed (work packages).
        #[arg(long)]
        status: Option<String>,

        /// Status ID, repeatable; ignored when --status is given.
        #[arg(long = "status-id")]
        status_ids: Vec<u64>,

        /// Stored query ID whose work packages to list.
        #[arg(long)]
        query: Option<u64>,

        /// Grid scope, e.g. /projects/demo/boards.
        #[arg(long)]
        scope: Option<String>,
    },

    /// Print the raw JSON of any API path, e.g. `projects/3`.
    Raw {
        /// Path relative to /api/v3/.
        path: String,
    },
}

/// Entity types that can be operated on.
#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum Entity {
    /// A project.
    #[value(alias = "projects")]
    Project,
    /// A work package.
    #[value(alias = "work-packages", alias = "wp")]
    WorkPackage,
    /// A relation between two work packages.
    #[value(alias = "relations")]
    Relation,
    /// A version.
    #[value(alias = "versions")]
    Version,
    /// A user.
    #[value(alias = "users")]
    User,
    /// A placeholder user.
    #[value(alias = "placeholder-users")]
    PlaceholderUser,
    /// A project membership.
    #[value(alias = "memberships")]
    Membership,
    /// A work package status.
    #[value(alias = "statuses")]
    Status,
    /// A board or dashboard grid.
    #[value(alias = "grids")]
    Grid,
    /// A stored query.
    #[value(alias = "queries")]
    Query,
}
