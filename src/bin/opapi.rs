//! OpenProject API CLI binary.
//!
//! A command-line interface for reading data from an OpenProject server.

use clap::Parser;
use opapi::cli::{Cli, Command, Entity};
use opapi::output::PrettyPrint;
use opapi::{
    get_grids, get_projects, get_work_packages_by_project, get_work_packages_by_query, Get, Grid,
    List, Membership, OpenProjectClient, OpenProjectError, PlaceholderUser, Project, Query,
    Relation, Status, User, Version, WorkPackage,
};
use serde::Serialize;
use std::process::ExitCode;
use tabled::{Table, Tabled};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let client = match build_client(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: Set OPENPROJECT_BASEURL and OPENPROJECT_APIKEY environment variables");
            return ExitCode::FAILURE;
        }
    };

    match run(&client, cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn build_client(cli: &Cli) -> opapi::Result<OpenProjectClient> {
    let base_url = cli
        .base_url
        .as_deref()
        .ok_or_else(|| OpenProjectError::ConfigMissing("base URL not set".to_string()))?;
    let api_key = cli
        .api_key
        .as_deref()
        .ok_or_else(|| OpenProjectError::ConfigMissing("API key not set".to_string()))?;
    OpenProjectClient::new(base_url, api_key)
}

async fn run(client: &OpenProjectClient, cli: Cli) -> opapi::Result<()> {
    match cli.command {
        Command::Get { entity, id } => handle_get(client, entity, &id, cli.json).await,
        Command::List {
            entity,
            project,
            status,
            status_ids,
            query,
            scope,
        } => {
            let filter = ListFilter {
                project,
                status,
                status_ids,
                query,
                scope,
            };
            handle_list(client, entity, filter, cli.json).await
        }
        Command::Raw { path } => {
            let value = client.get_json(&path).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
    }
}

async fn handle_get(
    client: &OpenProjectClient,
    entity: Entity,
    id: &str,
    json: bool,
) -> opapi::Result<()> {
    let id: u64 = id
        .parse()
        .map_err(|_| OpenProjectError::InvalidArgument(format!("not a numeric id: {id}")))?;

    match entity {
        Entity::Project => output_single(&Project::get(client, id).await?, json),
        Entity::WorkPackage => output_single(&WorkPackage::get(client, id).await?, json),
        Entity::Relation => output_single(&Relation::get(client, id).await?, json),
        Entity::Version => output_single(&Version::get(client, id).await?, json),
        Entity::User => output_single(&User::get(client, id).await?, json),
        Entity::PlaceholderUser => output_single(&PlaceholderUser::get(client, id).await?, json),
        Entity::Membership => output_single(&Membership::get(client, id).await?, json),
        Entity::Status => output_single(&Status::get(client, id).await?, json),
        Entity::Grid => output_single(&Grid::get(client, id).await?, json),
        Entity::Query => output_single(&Query::get(client, id).await?, json),
    }
}

struct ListFilter {
    project: Option<u64>,
    status: Option<String>,
    status_ids: Vec<u64>,
    query: Option<u64>,
    scope: Option<String>,
}

async fn handle_list(
    client: &OpenProjectClient,
    entity: Entity,
    filter: ListFilter,
    json: bool,
) -> opapi::Result<()> {
    match entity {
        Entity::Project => {
            let mut projects = get_projects(client).await?;
            projects.sort_by(|a, b| a.fullname.cmp(&b.fullname));
            output_list(&projects, json, |p| ProjectRow::from(p))
        }
        Entity::WorkPackage => {
            let work_packages = match (filter.query, filter.project) {
                (Some(query_id), _) => get_work_packages_by_query(client, query_id).await?,
                (None, Some(project_id)) => {
                    let status_ids = (!filter.status_ids.is_empty()).then_some(filter.status_ids);
                    get_work_packages_by_project(
                        client,
                        project_id,
                        filter.status.as_deref(),
                        status_ids,
                    )
                    .await?
                }
                (None, None) => {
                    eprintln!("Error: Work packages must be listed for a project or a query");
                    eprintln!("Hint: Use 'opapi list work-packages --project <id>' or '--query <id>'");
                    return Err(OpenProjectError::InvalidArgument(
                        "--project or --query required for work packages".to_string(),
                    ));
                }
            };
            output_list(&work_packages, json, |wp| WorkPackageRow::from(wp))
        }
        Entity::Relation => {
            let relations = Relation::list_all(client, &Default::default()).await?;
            output_list(&relations, json, |r| RelationRow::from(r))
        }
        Entity::Version => {
            let versions = Version::list_all(client, &Default::default()).await?;
            output_list(&versions, json, NamedRow::from_version)
        }
        Entity::User => {
            let users = User::list_all(client, &Default::default()).await?;
            output_list(&users, json, NamedRow::from_user)
        }
        Entity::PlaceholderUser => {
            let users = PlaceholderUser::list_all(client, &Default::default()).await?;
            output_list(&users, json, NamedRow::from_placeholder)
        }
        Entity::Membership => {
            let memberships = Membership::list_all(client, &Default::default()).await?;
            output_list(&memberships, json, |m| MembershipRow::from(m))
        }
        Entity::Status => {
            let statuses = Status::list_all(client, &Default::default()).await?;
            output_list(&statuses, json, NamedRow::from_status)
        }
        Entity::Grid => {
            let grids = get_grids(client, filter.scope.as_deref()).await?;
            output_list(&grids, json, NamedRow::from_grid)
        }
        Entity::Query => {
            eprintln!("Error: Queries can only be retrieved individually");
            eprintln!("Hint: Use 'opapi get query <id>' or 'opapi list work-packages --query <id>'");
            Err(OpenProjectError::InvalidArgument(
                "list queries not supported".to_string(),
            ))
        }
    }
}

fn output_single<T: Serialize + PrettyPrint>(item: &T, json: bool) -> opapi::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(item)?);
    } else {
        println!("{}", item.pretty_print());
    }
    Ok(())
}

fn output_list<T, R, F>(items: &[T], json: bool, to_row: F) -> opapi::Result<()>
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
{
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
    } else {
        let rows: Vec<R> = items.iter().map(to_row).collect();
        println!("{}", Table::new(rows));
        println!("\n{} total items", items.len());
    }
    Ok(())
}

// Table row types for non-JSON output

fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

#[derive(Tabled)]
struct ProjectRow {
    id: u64,
    project: String,
    status: String,
}

impl From<&Project> for ProjectRow {
    fn from(p: &Project) -> Self {
        Self {
            id: p.id,
            project: p.fullname.clone(),
            status: or_dash(p.status.as_deref()),
        }
    }
}

#[derive(Tabled)]
struct WorkPackageRow {
    id: u64,
    #[tabled(rename = "type")]
    kind: String,
    status: String,
    subject: String,
    assignee: String,
}

impl From<&WorkPackage> for WorkPackageRow {
    fn from(wp: &WorkPackage) -> Self {
        Self {
            id: wp.id,
            kind: or_dash(wp.work_package_type.as_deref()),
            status: or_dash(wp.status.as_deref()),
            subject: wp.subject.clone(),
            assignee: or_dash(wp.assignee.as_deref()),
        }
    }
}

#[derive(Tabled)]
struct RelationRow {
    id: u64,
    from: String,
    #[tabled(rename = "type")]
    kind: String,
    to: String,
}

impl From<&Relation> for RelationRow {
    fn from(r: &Relation) -> Self {
        let end = |id: Option<u64>| id.map(|id| format!("#{id}")).unwrap_or_else(|| "-".to_string());
        Self {
            id: r.id,
            from: end(r.from_id),
            kind: or_dash(r.relation_type.as_deref()),
            to: end(r.to_id),
        }
    }
}

#[derive(Tabled)]
struct MembershipRow {
    id: u64,
    project: String,
    principal: String,
    roles: String,
}

impl From<&Membership> for MembershipRow {
    fn from(m: &Membership) -> Self {
        Self {
            id: m.id,
            project: or_dash(m.project.as_deref()),
            principal: or_dash(m.principal.as_deref()),
            roles: m.roles.join(", "),
        }
    }
}

/// Row for entities identified by id and name plus one detail column.
#[derive(Tabled)]
struct NamedRow {
    id: String,
    name: String,
    detail: String,
}

impl NamedRow {
    fn from_version(v: &Version) -> Self {
        Self {
            id: v.id.to_string(),
            name: v.name.clone(),
            detail: or_dash(v.status.as_deref()),
        }
    }

    fn from_user(u: &User) -> Self {
        Self {
            id: u.id.to_string(),
            name: u.name.clone(),
            detail: or_dash(u.login.as_deref()),
        }
    }

    fn from_placeholder(u: &PlaceholderUser) -> Self {
        Self {
            id: u.id.to_string(),
            name: u.name.clone(),
            detail: String::new(),
        }
    }

    fn from_status(s: &Status) -> Self {
        Self {
            id: s.id.to_string(),
            name: s.name.clone(),
            detail: if s.is_closed { "closed" } else { "open" }.to_string(),
        }
    }

    fn from_grid(g: &Grid) -> Self {
        Self {
            id: g.id.to_string(),
            name: or_dash(g.name.as_deref()),
            detail: g.scope.clone(),
        }
    }
}
