//! Collection and pagination tests.
//!
//! Uses wiremock to mock the OpenProject API.

use opapi::{
    drain, get_grids, get_projects_map, get_versions, get_work_packages_by_project,
    get_work_packages_by_query, FilterQuery, List, OpenProjectClient, OpenProjectError, Project, Relation, Status,
};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn project(id: u64, name: &str, parent: Option<u64>) -> Value {
    let parent = match parent {
        Some(parent_id) => json!({ "href": format!("/api/v3/projects/{parent_id}") }),
        None => json!({ "href": null }),
    };
    json!({
        "_type": "Project",
        "id": id,
        "identifier": name.to_lowercase(),
        "name": name,
        "_links": { "parent": parent }
    })
}

fn work_package(id: u64, subject: &str) -> Value {
    json!({
        "_type": "WorkPackage",
        "id": id,
        "subject": subject,
        "_links": {
            "project": { "href": "/api/v3/projects/3", "title": "Website" },
            "status": { "href": "/api/v3/statuses/1", "title": "New" }
        }
    })
}

fn collection(kind: &str, elements: Vec<Value>, total: usize, offset: u32, page_size: u32) -> Value {
    json!({
        "_type": kind,
        "total": total,
        "count": elements.len(),
        "offset": offset,
        "pageSize": page_size,
        "_embedded": { "elements": elements }
    })
}

fn statuses(ids: std::ops::RangeInclusive<u64>) -> Vec<Value> {
    ids.map(|id| json!({ "_type": "Status", "id": id, "name": format!("S{id}") }))
        .collect()
}

#[tokio::test]
async fn test_list_page_sends_pagination_params() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/statuses"))
        .and(query_param("offset", "2"))
        .and(query_param("pageSize", "5"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(collection("Collection", statuses(6..=10), 12, 2, 5)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = OpenProjectClient::new(&mock_server.uri(), "key").unwrap();
    let page = Status::list_page(&client, &Default::default(), 2, 5).await.unwrap();

    assert_eq!(page.len(), 5);
    assert_eq!(page.total, 12);
    assert!(page.has_more);
    assert_eq!(page.items[0].id, 6);
}

#[tokio::test]
async fn test_drain_stops_after_last_page() {
    let mock_server = MockServer::start().await;

    let pages = [(1, statuses(1..=5)), (2, statuses(6..=10)), (3, statuses(11..=12))];
    for (offset, elements) in pages {
        Mock::given(method("GET"))
            .and(path("/api/v3/statuses"))
            .and(query_param("offset", offset.to_string()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(collection("Collection", elements, 12, offset, 5)),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let client = OpenProjectClient::new(&mock_server.uri(), "key").unwrap();
    let query = FilterQuery::default();
    let all = drain(5, |offset| Status::list_page(&client, &query, offset, 5))
        .await
        .into_result()
        .unwrap();

    let ids: Vec<u64> = all.iter().map(|s| s.id).collect();
    assert_eq!(ids, (1..=12).collect::<Vec<_>>());
    // wiremock verifies exactly three requests on drop
}

#[tokio::test]
async fn test_list_all_partial_keeps_earlier_pages() {
    let mock_server = MockServer::start().await;

    let first: Vec<Value> = (1..=100)
        .map(|id| json!({ "_type": "Relation", "id": id, "type": "relates", "reverseType": "relates" }))
        .collect();

    Mock::given(method("GET"))
        .and(path("/api/v3/relations"))
        .and(query_param("offset", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(collection("Collection", first, 150, 1, 100)),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/relations"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "_type": "Error",
            "message": "An internal error has occurred."
        })))
        .mount(&mock_server)
        .await;

    let client = OpenProjectClient::new(&mock_server.uri(), "key").unwrap();

    let partial = Relation::list_all_partial(&client, &Default::default()).await;
    assert!(!partial.is_complete());
    assert_eq!(partial.items.len(), 100);
    assert!(matches!(
        partial.error,
        Some(OpenProjectError::ApiError { status_code: Some(500), .. })
    ));

    let strict = Relation::list_all(&client, &Default::default()).await;
    assert!(strict.is_err());
}

#[tokio::test]
async fn test_unpaginated_collection_is_fetched_once() {
    let mock_server = MockServer::start().await;

    let versions: Vec<Value> = (1..=150)
        .map(|id| json!({ "_type": "Version", "id": id, "name": format!("v{id}") }))
        .collect();

    // No offset/pageSize: the server returns the whole set whatever page is asked for
    Mock::given(method("GET"))
        .and(path("/api/v3/versions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_type": "Collection",
            "total": 150,
            "count": 150,
            "_embedded": { "elements": versions }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = OpenProjectClient::new(&mock_server.uri(), "key").unwrap();
    let versions = get_versions(&client).await.unwrap();

    assert_eq!(versions.len(), 150);
    assert_eq!(versions.last().map(|v| v.id), Some(150));
}

#[tokio::test]
async fn test_projects_map_builds_hierarchy() {
    let mock_server = MockServer::start().await;

    let elements = vec![
        project(1, "Company", None),
        project(2, "Website", Some(1)),
        project(3, "Backend", Some(2)),
        project(4, "Internal", None),
    ];

    Mock::given(method("GET"))
        .and(path("/api/v3/projects"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(collection("Collection", elements, 4, 1, 100)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = OpenProjectClient::new(&mock_server.uri(), "key").unwrap();
    let projects = get_projects_map(&client).await.unwrap();

    let backend = &projects[&3];
    assert_eq!(backend.path, vec!["Company", "Website"]);
    assert_eq!(backend.path_ids, vec![1, 2]);
    assert_eq!(backend.level, 3);
    assert_eq!(backend.fullname, "Company/Website/Backend");
    assert!(backend.is_descendant_of(1));
    assert!(projects[&4].is_root());

    let subtree: Vec<&Project> = projects.values().filter(|p| p.is_descendant_of(2)).collect();
    assert_eq!(subtree.len(), 1);
}

#[tokio::test]
async fn test_projects_cycle_is_reported() {
    let mock_server = MockServer::start().await;

    let elements = vec![project(1, "A", Some(2)), project(2, "B", Some(1))];
    Mock::given(method("GET"))
        .and(path("/api/v3/projects"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(collection("Collection", elements, 2, 1, 100)),
        )
        .mount(&mock_server)
        .await;

    let client = OpenProjectClient::new(&mock_server.uri(), "key").unwrap();
    let err = get_projects_map(&client).await.unwrap_err();
    assert!(matches!(err, OpenProjectError::HierarchyCycle { .. }));
}

#[tokio::test]
async fn test_work_packages_closed_filter() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/projects/3/work_packages"))
        .and(query_param(
            "filters",
            r#"[{"status_id":{"operator":"c","values":null}}]"#,
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(collection(
            "WorkPackageCollection",
            vec![work_package(12, "Launch")],
            1,
            1,
            100,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = OpenProjectClient::new(&mock_server.uri(), "key").unwrap();
    let closed = get_work_packages_by_project(&client, 3, Some("closed"), None)
        .await
        .unwrap();

    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].subject, "Launch");
    // Bulk results carry no relations
    assert!(closed[0].relations.is_empty());
}

#[tokio::test]
async fn test_work_packages_status_id_filter() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/projects/3/work_packages"))
        .and(query_param(
            "filters",
            r#"[{"status_id":{"operator":"=","values":[3,7]}}]"#,
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(collection(
            "WorkPackageCollection",
            vec![work_package(10, "A"), work_package(11, "B")],
            2,
            1,
            100,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = OpenProjectClient::new(&mock_server.uri(), "key").unwrap();
    let wps = get_work_packages_by_project(&client, 3, None, Some(vec![3, 7]))
        .await
        .unwrap();
    assert_eq!(wps.len(), 2);
}

#[tokio::test]
async fn test_query_results_are_paginated() {
    let mock_server = MockServer::start().await;

    let first: Vec<Value> = (1..=100).map(|id| work_package(id, "wp")).collect();
    let second: Vec<Value> = (101..=120).map(|id| work_package(id, "wp")).collect();

    for (offset, elements) in [(1, first), (2, second)] {
        Mock::given(method("GET"))
            .and(path("/api/v3/queries/12"))
            .and(query_param("offset", offset.to_string()))
            .and(query_param("pageSize", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_type": "Query",
                "id": 12,
                "name": "Everything",
                "_embedded": {
                    "results": collection("WorkPackageCollection", elements, 120, offset, 100)
                }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let client = OpenProjectClient::new(&mock_server.uri(), "key").unwrap();
    let wps = get_work_packages_by_query(&client, 12).await.unwrap();

    assert_eq!(wps.len(), 120);
    assert_eq!(wps.last().map(|wp| wp.id), Some(120));
}

#[tokio::test]
async fn test_grids_by_scope() {
    let mock_server = MockServer::start().await;

    let grid = json!({
        "_type": "Grid",
        "id": 50,
        "name": "Kanban",
        "widgets": [
            {
                "_type": "GridWidget",
                "id": 501,
                "identifier": "work_package_query",
                "options": { "queryId": "40" }
            },
            {
                "id": 502,
                "identifier": "custom_text"
            }
        ],
        "_links": { "scope": { "href": "/projects/website/boards" } }
    });

    Mock::given(method("GET"))
        .and(path("/api/v3/grids"))
        .and(query_param(
            "filters",
            r#"[{"scope":{"operator":"=","values":["/projects/website/boards"]}}]"#,
        ))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(collection("Collection", vec![grid], 1, 1, 100)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = OpenProjectClient::new(&mock_server.uri(), "key").unwrap();
    let grids = get_grids(&client, Some("/projects/website/boards")).await.unwrap();

    assert_eq!(grids.len(), 1);
    assert_eq!(grids[0].scope, "/projects/website/boards");
    // The untyped widget is kept but is not a GridWidget
    assert_eq!(grids[0].widgets.len(), 2);
    let query_ids: Vec<u64> = grids[0].grid_widgets().filter_map(|w| w.query_id()).collect();
    assert_eq!(query_ids, vec![40]);
}

#[tokio::test]
async fn test_mixed_collection_element_is_rejected() {
    let mock_server = MockServer::start().await;

    let elements = vec![
        json!({ "_type": "Status", "id": 1, "name": "New" }),
        json!({ "_type": "Priority", "id": 8, "name": "Normal" }),
    ];
    Mock::given(method("GET"))
        .and(path("/api/v3/statuses"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(collection("Collection", elements, 2, 1, 100)),
        )
        .mount(&mock_server)
        .await;

    let client = OpenProjectClient::new(&mock_server.uri(), "key").unwrap();
    let err = Status::list_all(&client, &Default::default()).await.unwrap_err();
    assert!(matches!(err, OpenProjectError::UnexpectedType { expected: "Status", .. }));
}
