//! Basic example demonstrating the OpenProject API client.
//!
//! Run with:
//! ```
//! OPENPROJECT_BASEURL=https://op.example.com OPENPROJECT_APIKEY=your-key \
//!     cargo run --example basic -- <subtree-project-id> <project-id> <query-id> <board-scope>
//! ```

use opapi::{
    get_grid, get_grids, get_projects_map, get_query, get_relations, get_versions,
    get_work_package, get_work_packages_by_project, get_work_packages_by_query, OpenProjectClient,
};

fn arg<T: std::str::FromStr>(position: usize, default: T) -> T {
    std::env::args()
        .nth(position)
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> opapi::Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    let subtree_id: u64 = arg(1, 1);
    let project_id: u64 = arg(2, 1);
    let query_id: u64 = arg(3, 1);
    let scope: String = arg(4, "/my/page".to_string());

    // Create client from environment variables
    let client = OpenProjectClient::from_env()?;
    println!("Connected to: {}", client.base_url());

    // --- Projects ---
    println!("\n--- All projects by hierarchy ---");
    let projects = get_projects_map(&client).await?;
    let mut sorted: Vec<_> = projects.values().collect();
    sorted.sort_by(|a, b| a.fullname.cmp(&b.fullname));
    for project in &sorted {
        println!("{} (id:{})", project.fullname, project.id);
    }

    println!("\n--- Projects below {subtree_id} ---");
    for project in sorted.iter().filter(|p| p.is_descendant_of(subtree_id)) {
        println!("{}", project.fullname);
    }

    // --- Work packages ---
    println!("\n--- Work packages of project {project_id} ---");
    let mut work_packages = get_work_packages_by_project(&client, project_id, None, None).await?;
    match work_packages.pop() {
        Some(last) => {
            println!("Took one work package: {last}");
            // Bulk listings carry no relations; fetch it again in detail
            let detailed = get_work_package(&client, last.id).await?;
            println!("  inbound relations:  {:?}", detailed.relations_in);
            println!("  outbound relations: {:?}", detailed.relations_out);
        }
        None => println!("No work package in this project"),
    }
    for wp in &work_packages {
        println!("{wp}");
    }

    println!("\n--- Work packages of query {query_id} ---");
    for wp in get_work_packages_by_query(&client, query_id).await? {
        println!("{wp}");
    }

    // --- Relations and versions ---
    let relations = get_relations(&client).await?;
    println!("\nGot {} relations", relations.len());
    if let Some(relation) = relations.last() {
        println!("  e.g. {relation}");
    }

    let versions = get_versions(&client).await?;
    println!("Got {} versions", versions.len());
    if let Some(version) = versions.last() {
        println!("  e.g. {version}");
    }

    // --- Boards ---
    println!("\n--- Grids with scope {scope} ---");
    let grids = get_grids(&client, Some(&scope)).await?;
    let Some(first) = grids.first() else {
        println!("No grid found");
        return Ok(());
    };

    let grid = get_grid(&client, first.id).await?;
    println!("Looking inside {grid}");
    match grid.grid_widgets().find_map(|widget| widget.query_id()) {
        Some(widget_query) => {
            let query = get_query(&client, widget_query).await?;
            println!("Widget shows {query}; list its work packages with get_work_packages_by_query");
        }
        None => println!("No query widget on this grid"),
    }

    Ok(())
}
