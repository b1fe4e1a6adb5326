//! Mock OpenProject API server for E2E testing.
//!
//! This module provides an in-memory server that answers the read-only
//! OpenProject API v3 endpoints with HAL+JSON. Unlike wiremock, which mocks
//! individual requests per test, the server keeps its resources in shared
//! state, so pagination, filters and embedded relations behave consistently
//! across requests.
//!
//! # Example
//!
//! ```ignore
//! use opapi::mock_server::MockServer;
//! use opapi::{OpenProjectClient, WorkPackage, Get};
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await;
//!     let client = OpenProjectClient::new(server.url(), "test-key").unwrap();
//!
//!     // Server comes with the default scenario
//!     let wp = WorkPackage::get(&client, 11).await.unwrap();
//!     assert_eq!(wp.subject, "Implement login");
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::{DefaultScenario, Fixtures};
pub use server::MockServer;
pub use state::MockState;
