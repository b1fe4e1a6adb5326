//! Project hierarchy reconstruction.
//!
//! Decoded projects only carry their immediate `parent_id`. Once the full set
//! is known, the ancestor chain of each project is derived in two phases: an
//! immutable index of parent pointers is built first, then every project is
//! annotated by a read-only walk over that index.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::{OpenProjectError, Result};
use crate::models::Project;

struct IndexEntry {
    parent_id: Option<u64>,
    name: String,
}

/// Compute `path`, `path_ids`, `level` and `fullname` for every project.
///
/// A parent id missing from the set ends the chain as if the project were
/// top-level.
///
/// # Errors
///
/// Returns [`OpenProjectError::HierarchyCycle`] if parent pointers form a cycle.
pub fn build_hierarchy(projects: Vec<Project>) -> Result<BTreeMap<u64, Project>> {
    let index: HashMap<u64, IndexEntry> = projects
        .iter()
        .map(|project| {
            (
                project.id,
                IndexEntry {
                    parent_id: project.parent_id,
                    name: project.name.clone(),
                },
            )
        })
        .collect();

    projects
        .into_iter()
        .map(|project| {
            let path_ids = ancestor_ids(project.id, project.parent_id, &index)?;
            let path = path_ids
                .iter()
                .map(|id| index[id].name.clone())
                .collect();
            Ok((project.id, project.with_ancestors(path_ids, path)))
        })
        .collect()
}

/// Ancestor ids of `project_id`, root first.
fn ancestor_ids(
    project_id: u64,
    parent_id: Option<u64>,
    index: &HashMap<u64, IndexEntry>,
) -> Result<Vec<u64>> {
    let mut chain = Vec::new();
    let mut visited = HashSet::from([project_id]);
    let mut next = parent_id;

    while let Some(current) = next {
        let Some(entry) = index.get(&current) else {
            tracing::debug!(project_id, parent_id = current, "parent project not in set, treating as top of chain");
            break;
        };
        if !visited.insert(current) {
            return Err(OpenProjectError::HierarchyCycle { project_id });
        }
        chain.push(current);
        next = entry.parent_id;
    }

    chain.reverse();
    Ok(chain)
}
