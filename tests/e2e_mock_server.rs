//! E2E tests using the mock OpenProject server.
//!
//! These tests exercise full workflows against the mock server,
//! testing realistic scenarios rather than individual endpoints.

#![cfg(feature = "test-server")]

use opapi::mock_server::{Fixtures, MockServer, MockState};
use opapi::{
    attach_relations, get_grids, get_memberships, get_placeholder_users, get_projects,
    get_query, get_relations, get_statuses, get_users, get_versions, get_work_package,
    get_work_packages_by_project, get_work_packages_by_query, Get, Grid, OpenProjectClient,
    OpenProjectError, Query, Resource,
};

fn client(server: &MockServer) -> OpenProjectClient {
    OpenProjectClient::new(server.url(), "test-key").unwrap()
}

// =============================================================================
// Server Lifecycle Tests
// =============================================================================

#[tokio::test]
async fn test_server_starts_on_random_port() {
    let server1 = MockServer::start().await;
    let server2 = MockServer::start().await;

    assert_ne!(server1.url(), server2.url());

    server1.shutdown().await;
    server2.shutdown().await;
}

#[tokio::test]
async fn test_server_shutdown_is_clean() {
    let server = MockServer::start().await;
    let url = server.url().to_string();

    server.shutdown().await;

    let client = reqwest::Client::new();
    let result = client.get(format!("{}/health", url)).send().await;

    assert!(result.is_err());
}

// =============================================================================
// Project Workflow Tests
// =============================================================================

#[tokio::test]
async fn test_project_tree_and_subtree() {
    let server = MockServer::start().await;
    let client = client(&server);

    let mut projects = get_projects(&client).await.unwrap();
    projects.sort_by(|a, b| a.fullname.cmp(&b.fullname));

    let names: Vec<&str> = projects.iter().map(|p| p.fullname.as_str()).collect();
    assert_eq!(
        names,
        vec!["Company", "Company/Website", "Company/Website/Backend", "Internal"]
    );

    let below_company: Vec<u64> = projects
        .iter()
        .filter(|p| p.is_descendant_of(1))
        .map(|p| p.id)
        .collect();
    assert_eq!(below_company, vec![2, 3]);

    server.shutdown().await;
}

// =============================================================================
// Work Package Workflow Tests
// =============================================================================

#[tokio::test]
async fn test_work_package_detail_workflow() {
    let server = MockServer::start().await;
    let client = client(&server);

    // Step 1: list the project's work packages (all statuses)
    let wps = get_work_packages_by_project(&client, 2, Some("all"), None)
        .await
        .unwrap();
    assert_eq!(wps.len(), 3);
    assert!(wps.iter().all(|wp| wp.relations.is_empty()));

    // Step 2: fetch one in detail to get its relations
    let wp = get_work_package(&client, wps[1].id).await.unwrap();
    assert_eq!(wp.id, 11);
    assert_eq!(wp.relations_out.get("follows"), Some(&vec![10]));
    assert_eq!(wp.relations_in.get("precedes"), Some(&vec![12]));
    assert_eq!(wp.relations_in.get("blocked"), Some(&vec![13]));

    server.shutdown().await;
}

#[tokio::test]
async fn test_status_selection() {
    let server = MockServer::start().await;
    let client = client(&server);

    let ids = |wps: Vec<opapi::WorkPackage>| wps.iter().map(|wp| wp.id).collect::<Vec<_>>();

    let open = get_work_packages_by_project(&client, 2, Some("open"), None).await.unwrap();
    assert_eq!(ids(open), vec![10, 11]);

    let closed = get_work_packages_by_project(&client, 2, Some("closed"), None).await.unwrap();
    assert_eq!(ids(closed), vec![12]);

    let picked = get_work_packages_by_project(&client, 2, None, Some(vec![7, 12]))
        .await
        .unwrap();
    assert_eq!(ids(picked), vec![11, 12]);

    // The keyword wins over explicit ids
    let keyword = get_work_packages_by_project(&client, 2, Some("closed"), Some(vec![1]))
        .await
        .unwrap();
    assert_eq!(ids(keyword), vec![12]);

    server.shutdown().await;
}

#[tokio::test]
async fn test_bulk_relations_backfill() {
    let server = MockServer::start().await;
    let client = client(&server);

    let mut wps = get_work_packages_by_project(&client, 2, Some("all"), None)
        .await
        .unwrap();
    let relations = get_relations(&client).await.unwrap();
    assert_eq!(relations.len(), 3);

    attach_relations(&mut wps, &relations);

    let launch = wps.iter().find(|wp| wp.id == 12).unwrap();
    assert_eq!(launch.relations_out.get("follows"), Some(&vec![11]));
    assert!(launch.relations_in.is_empty());

    server.shutdown().await;
}

// =============================================================================
// Query and Board Workflow Tests
// =============================================================================

#[tokio::test]
async fn test_board_to_query_workflow() {
    let server = MockServer::start().await;
    let client = client(&server);

    // Step 1: find the project's boards by scope
    let grids = get_grids(&client, Some("/projects/website/boards")).await.unwrap();
    assert_eq!(grids.len(), 1);
    assert_eq!(grids[0].name.as_deref(), Some("Kanban"));

    // Step 2: resolve the query behind the first widget
    let query_id = grids[0]
        .grid_widgets()
        .find_map(|widget| widget.query_id())
        .unwrap();
    let query = get_query(&client, query_id).await.unwrap();
    assert_eq!(query.name, "Open website tasks");
    assert_eq!(query.results_collection().map(|c| c.total), Some(2));

    // Step 3: its work packages
    let wps = get_work_packages_by_query(&client, query_id).await.unwrap();
    assert_eq!(wps.iter().map(|wp| wp.id).collect::<Vec<_>>(), vec![10, 11]);

    server.shutdown().await;
}

#[tokio::test]
async fn test_all_grids_without_scope() {
    let server = MockServer::start().await;
    let client = client(&server);

    let grids: Vec<Grid> = get_grids(&client, None).await.unwrap();
    assert_eq!(grids.len(), 2);

    server.shutdown().await;
}

// =============================================================================
// Other Collections
// =============================================================================

#[tokio::test]
async fn test_reference_collections() {
    let server = MockServer::start().await;
    let client = client(&server);

    let statuses = get_statuses(&client).await.unwrap();
    assert_eq!(statuses.iter().filter(|s| s.is_closed).count(), 1);

    let users = get_users(&client).await.unwrap();
    assert_eq!(users[0].name, "Ada Lovelace");

    let placeholders = get_placeholder_users(&client).await.unwrap();
    assert_eq!(placeholders.len(), 1);

    let versions = get_versions(&client).await.unwrap();
    assert_eq!(versions[0].defining_project_id, Some(2));

    let memberships = get_memberships(&client).await.unwrap();
    assert_eq!(memberships[0].roles, vec!["Member"]);

    server.shutdown().await;
}

#[tokio::test]
async fn test_raw_resource_access() {
    let server = MockServer::start().await;
    let client = client(&server);

    match client.get_resource("statuses").await.unwrap() {
        Resource::Collection(collection) => assert_eq!(collection.total, 3),
        other => panic!("expected collection, got {other}"),
    }

    let query = Query::get(&client, 40).await.unwrap();
    assert_eq!(query.raw["_type"], "Query");

    server.shutdown().await;
}

// =============================================================================
// State and Error Tests
// =============================================================================

#[tokio::test]
async fn test_state_changes_are_visible() {
    let server = MockServer::start_empty().await;
    let client = client(&server);

    assert!(get_projects(&client).await.unwrap().is_empty());

    server
        .state()
        .write()
        .await
        .insert("projects", Fixtures::project(9, "Late", None));

    let projects = get_projects(&client).await.unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].name, "Late");

    server.shutdown().await;
}

#[tokio::test]
async fn test_custom_state_and_auth() {
    let state = MockState::new()
        .with_resource("statuses", Fixtures::status(1, "New", false))
        .with_required_api_key("secret");
    let server = MockServer::with_state(state).await;

    let authorized = OpenProjectClient::new(server.url(), "secret").unwrap();
    assert_eq!(get_statuses(&authorized).await.unwrap().len(), 1);

    let err = get_statuses(&client(&server)).await.unwrap_err();
    assert!(matches!(err, OpenProjectError::ApiError { status_code: Some(401), .. }));

    server.shutdown().await;
}

#[tokio::test]
async fn test_unknown_work_package() {
    let server = MockServer::start().await;
    let client = client(&server);

    let err = get_work_package(&client, 9999).await.unwrap_err();
    match err {
        OpenProjectError::ApiError { status_code, message } => {
            assert_eq!(status_code, Some(404));
            assert!(message.contains("9999"));
        }
        other => panic!("expected ApiError, got {other:?}"),
    }

    server.shutdown().await;
}
