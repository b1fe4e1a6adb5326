//! Test data fixtures for the mock server.
//!
//! Provides factory functions for HAL+JSON resources shaped like the ones an
//! OpenProject server returns.

use serde_json::{json, Value};

/// Collection of fixture factories for test data.
pub struct Fixtures;

fn link(kind: &str, id: u64, title: &str) -> Value {
    json!({ "href": format!("/api/v3/{kind}/{id}"), "title": title })
}

fn null_link() -> Value {
    json!({ "href": null })
}

const CREATED_AT: &str = "2024-01-15T09:30:00Z";

impl Fixtures {
    // =========================================================================
    // Project Fixtures
    // =========================================================================

    /// Create a project, optionally below `parent` (`(id, name)`).
    pub fn project(id: u64, name: &str, parent: Option<(u64, &str)>) -> Value {
        let parent = parent.map_or_else(null_link, |(pid, pname)| link("projects", pid, pname));
        json!({
            "_type": "Project",
            "id": id,
            "identifier": name.to_lowercase().replace(' ', "-"),
            "name": name,
            "active": true,
            "public": false,
            "description": { "format": "markdown", "raw": format!("{name} project"), "html": "" },
            "createdAt": CREATED_AT,
            "updatedAt": CREATED_AT,
            "_links": {
                "self": link("projects", id, name),
                "parent": parent,
                "status": { "href": "/api/v3/project_statuses/on_track", "title": "On track" }
            }
        })
    }

    // =========================================================================
    // Work Package Fixtures
    // =========================================================================

    /// Create a work package of type "Task" in `project` with `status`.
    pub fn work_package(id: u64, subject: &str, project: (u64, &str), status: (u64, &str)) -> Value {
        json!({
            "_type": "WorkPackage",
            "id": id,
            "lockVersion": 0,
            "subject": subject,
            "description": { "format": "markdown", "raw": "", "html": "" },
            "scheduleManually": false,
            "startDate": "2024-02-01",
            "dueDate": "2024-02-14",
            "estimatedTime": "PT8H",
            "percentageDone": 0,
            "createdAt": CREATED_AT,
            "updatedAt": CREATED_AT,
            "_links": {
                "self": link("work_packages", id, subject),
                "type": link("types", 1, "Task"),
                "priority": link("priorities", 8, "Normal"),
                "status": link("statuses", status.0, status.1),
                "project": link("projects", project.0, project.1),
                "author": link("users", 5, "Ada Lovelace"),
                "assignee": null_link(),
                "responsible": null_link(),
                "version": null_link(),
                "parent": null_link()
            }
        })
    }

    /// Set the assignee link of a work package fixture.
    pub fn assigned(mut work_package: Value, kind: &str, id: u64, name: &str) -> Value {
        work_package["_links"]["assignee"] = link(kind, id, name);
        work_package
    }

    /// Create a relation from `from` to `to`.
    pub fn relation(id: u64, from: u64, to: u64, kind: &str, reverse: &str) -> Value {
        json!({
            "_type": "Relation",
            "id": id,
            "name": kind,
            "type": kind,
            "reverseType": reverse,
            "description": null,
            "_links": {
                "self": { "href": format!("/api/v3/relations/{id}") },
                "from": link("work_packages", from, &format!("WP {from}")),
                "to": link("work_packages", to, &format!("WP {to}"))
            }
        })
    }

    pub fn status(id: u64, name: &str, is_closed: bool) -> Value {
        let done_ratio = if is_closed { 100 } else { 0 };
        json!({
            "_type": "Status",
            "id": id,
            "name": name,
            "isClosed": is_closed,
            "color": "#1A67A3",
            "isDefault": id == 1,
            "isReadonly": false,
            "defaultDoneRatio": done_ratio,
            "position": id
        })
    }

    // =========================================================================
    // Other Fixtures
    // =========================================================================

    pub fn version(id: u64, name: &str, project: (u64, &str)) -> Value {
        json!({
            "_type": "Version",
            "id": id,
            "name": name,
            "description": { "format": "plain", "raw": "", "html": "" },
            "startDate": "2024-01-01",
            "endDate": "2024-03-31",
            "status": "open",
            "sharing": "none",
            "createdAt": CREATED_AT,
            "updatedAt": CREATED_AT,
            "_links": { "definingProject": link("projects", project.0, project.1) }
        })
    }

    pub fn user(id: u64, first_name: &str, last_name: &str) -> Value {
        json!({
            "_type": "User",
            "id": id,
            "login": first_name.to_lowercase(),
            "firstName": first_name,
            "lastName": last_name,
            "name": format!("{first_name} {last_name}"),
            "email": format!("{}@example.com", first_name.to_lowercase()),
            "admin": false,
            "status": "active",
            "createdAt": CREATED_AT,
            "updatedAt": CREATED_AT
        })
    }

    pub fn placeholder_user(id: u64, name: &str) -> Value {
        json!({
            "_type": "PlaceholderUser",
            "id": id,
            "name": name,
            "createdAt": CREATED_AT,
            "updatedAt": CREATED_AT
        })
    }

    pub fn membership(id: u64, project: (u64, &str), principal: (&str, u64, &str), roles: &[&str]) -> Value {
        let roles: Vec<Value> = roles
            .iter()
            .zip(3..)
            .map(|(role, role_id)| link("roles", role_id, role))
            .collect();
        json!({
            "_type": "Membership",
            "id": id,
            "createdAt": CREATED_AT,
            "updatedAt": CREATED_AT,
            "_links": {
                "project": link("projects", project.0, project.1),
                "principal": link(principal.0, principal.1, principal.2),
                "roles": roles
            }
        })
    }

    /// Create a stored query. Results are attached by the server.
    pub fn query(id: u64, name: &str, project: (u64, &str)) -> Value {
        json!({
            "_type": "Query",
            "id": id,
            "name": name,
            "filters": [],
            "sums": false,
            "public": true,
            "hidden": false,
            "starred": false,
            "showHierarchies": true,
            "timelineVisible": false,
            "timelineZoomLevel": "auto",
            "timelineLabels": {},
            "highlightingMode": "inline",
            "createdAt": CREATED_AT,
            "updatedAt": CREATED_AT,
            "_links": {
                "self": link("queries", id, name),
                "project": link("projects", project.0, project.1),
                "user": link("users", 5, "Ada Lovelace")
            }
        })
    }

    /// Create a board grid with one query widget per id in `query_ids`.
    pub fn grid(id: u64, name: &str, scope: &str, query_ids: &[u64]) -> Value {
        let widgets: Vec<Value> = query_ids
            .iter()
            .zip(1u64..)
            .map(|(query_id, column)| {
                json!({
                    "_type": "GridWidget",
                    "id": id * 100 + column,
                    "identifier": "work_package_query",
                    "startRow": 1,
                    "endRow": 2,
                    "startColumn": column,
                    "endColumn": column + 1,
                    "options": { "queryId": query_id.to_string(), "filters": [] }
                })
            })
            .collect();
        json!({
            "_type": "Grid",
            "id": id,
            "name": name,
            "rowCount": 1,
            "columnCount": query_ids.len().max(1),
            "options": { "type": "free" },
            "widgets": widgets,
            "createdAt": CREATED_AT,
            "updatedAt": CREATED_AT,
            "_links": {
                "self": { "href": format!("/api/v3/grids/{id}") },
                "scope": { "href": scope, "type": "text/html" }
            }
        })
    }

    // =========================================================================
    // Scenario Builders
    // =========================================================================

    /// Create a default set of test data for common scenarios.
    pub fn default_scenario() -> DefaultScenario {
        DefaultScenario::new()
    }
}

/// A complete test scenario with related entities.
///
/// Project tree: Company > Website > Backend, plus the top-level Internal.
/// Website holds work packages 10-12 (12 is closed), Backend holds 13.
/// Query 40 returns work packages 10 and 11; board 50 shows query 40.
pub struct DefaultScenario {
    /// `(collection, resource)` pairs, e.g. `("projects", {...})`.
    pub resources: Vec<(&'static str, Value)>,
    /// Query id to the work package ids it returns.
    pub query_results: Vec<(u64, Vec<u64>)>,
}

impl DefaultScenario {
    fn new() -> Self {
        let company = (1, "Company");
        let website = (2, "Website");
        let backend = (3, "Backend");
        let new = (1, "New");
        let in_progress = (7, "In progress");
        let closed = (12, "Closed");

        let resources = vec![
            ("statuses", Fixtures::status(new.0, new.1, false)),
            ("statuses", Fixtures::status(in_progress.0, in_progress.1, false)),
            ("statuses", Fixtures::status(closed.0, closed.1, true)),
            ("projects", Fixtures::project(company.0, company.1, None)),
            ("projects", Fixtures::project(website.0, website.1, Some(company))),
            ("projects", Fixtures::project(backend.0, backend.1, Some(website))),
            ("projects", Fixtures::project(4, "Internal", None)),
            ("users", Fixtures::user(5, "Ada", "Lovelace")),
            ("placeholder_users", Fixtures::placeholder_user(20, "Future hire")),
            ("work_packages", Fixtures::work_package(10, "Design homepage", website, new)),
            (
                "work_packages",
                Fixtures::assigned(
                    Fixtures::work_package(11, "Implement login", website, in_progress),
                    "users",
                    5,
                    "Ada Lovelace",
                ),
            ),
            ("work_packages", Fixtures::work_package(12, "Launch", website, closed)),
            ("work_packages", Fixtures::work_package(13, "API spec", backend, new)),
            ("relations", Fixtures::relation(100, 11, 10, "follows", "precedes")),
            ("relations", Fixtures::relation(101, 12, 11, "follows", "precedes")),
            ("relations", Fixtures::relation(102, 13, 11, "blocks", "blocked")),
            ("versions", Fixtures::version(27, "1.0", website)),
            (
                "memberships",
                Fixtures::membership(30, website, ("users", 5, "Ada Lovelace"), &["Member"]),
            ),
            ("queries", Fixtures::query(40, "Open website tasks", website)),
            ("grids", Fixtures::grid(50, "Kanban", "/projects/website/boards", &[40])),
            ("grids", Fixtures::grid(51, "My page", "/my/page", &[])),
        ];

        Self {
            resources,
            query_results: vec![(40, vec![10, 11])],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decode, Grid, Project, Resource, WorkPackage};

    #[test]
    fn test_project_fixture_decodes() {
        let project: Project = decode(&Fixtures::project(2, "Website", Some((1, "Company"))))
            .unwrap()
            .try_into()
            .unwrap();
        assert_eq!(project.identifier, "website");
        assert_eq!(project.parent_id, Some(1));
    }

    #[test]
    fn test_assigned_work_package() {
        let raw = Fixtures::assigned(
            Fixtures::work_package(11, "Login", (2, "Website"), (7, "In progress")),
            "groups",
            9,
            "Developers",
        );
        let wp = WorkPackage::from_json(&raw).unwrap();
        assert_eq!(wp.assignee_id, Some(9));
        assert_eq!(wp.assignee_type.as_deref(), Some("groups"));
        assert_eq!(wp.status_id, Some(7));
    }

    #[test]
    fn test_grid_fixture_widgets() {
        let grid = Grid::from_json(&Fixtures::grid(50, "Kanban", "/projects/x/boards", &[40, 41]))
            .unwrap();
        let query_ids: Vec<_> = grid.grid_widgets().filter_map(|w| w.query_id()).collect();
        assert_eq!(query_ids, vec![40, 41]);
    }

    #[test]
    fn test_default_scenario() {
        let scenario = Fixtures::default_scenario();
        assert!(!scenario.resources.is_empty());
        for (_, raw) in &scenario.resources {
            assert!(!matches!(decode(raw).unwrap(), Resource::Generic(_)));
        }
    }
}
