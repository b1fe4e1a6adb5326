//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization.

use std::fmt::Display;

use crate::{
    Grid, Membership, PlaceholderUser, Project, Query, Relation, RelationMap, Status, User,
    Version, WorkPackage,
};

/// Trait for human-readable key-value output.
///
/// Implemented by entity types to provide formatted output
/// suitable for terminal display when `--json` is not specified.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

/// Builds a titled block of aligned `label: value` lines.
struct Block {
    lines: Vec<String>,
}

impl Block {
    fn new(header: String) -> Self {
        let divider = "─".repeat(header.chars().count().max(30));
        Self {
            lines: vec![header, divider],
        }
    }

    fn line(&mut self, label: &str, value: impl Display) -> &mut Self {
        self.lines.push(format!("{:<16}{}", format!("{label}:"), value));
        self
    }

    fn opt<T: Display>(&mut self, label: &str, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            self.line(label, value);
        }
        self
    }

    fn finish(&self) -> String {
        self.lines.join("\n")
    }
}

/// `Name (#id)`, or whichever half is known.
fn named(name: Option<&str>, id: Option<u64>) -> Option<String> {
    match (name, id) {
        (Some(name), Some(id)) => Some(format!("{name} (#{id})")),
        (Some(name), None) => Some(name.to_string()),
        (None, Some(id)) => Some(format!("#{id}")),
        (None, None) => None,
    }
}

fn relation_lines(block: &mut Block, label: &str, map: &RelationMap) {
    for (kind, ids) in map {
        let ids: Vec<String> = ids.iter().map(|id| format!("#{id}")).collect();
        block.line(label, format!("{kind} {}", ids.join(", ")));
    }
}

impl PrettyPrint for Project {
    fn pretty_print(&self) -> String {
        let mut block = Block::new(format!("Project #{}: {}", self.id, self.name));
        block
            .line("Identifier", &self.identifier)
            .line("Path", &self.fullname)
            .line("Level", self.level)
            .opt("Status", self.status.as_deref())
            .line("Active", if self.active { "yes" } else { "no" });

        if self.public {
            block.line("Visibility", "public");
        }
        block
            .opt("Description", self.description.as_ref().and_then(|d| d.text()))
            .opt("Created", self.created_at.as_ref())
            .opt("Updated", self.updated_at.as_ref());
        block.finish()
    }
}

impl PrettyPrint for WorkPackage {
    fn pretty_print(&self) -> String {
        let mut block = Block::new(format!("WorkPackage #{}: {}", self.id, self.subject));
        block
            .opt("Type", self.work_package_type.as_deref())
            .opt("Status", self.status.as_deref())
            .opt("Priority", self.priority.as_deref())
            .opt("Project", named(self.project.as_deref(), self.project_id))
            .opt("Author", self.author.as_deref())
            .opt("Assignee", self.assignee.as_deref())
            .opt("Responsible", self.responsible.as_deref())
            .opt("Version", self.version.as_deref())
            .opt("Parent", self.parent_id.map(|id| format!("#{id}")))
            .opt("Start", self.start_date.as_ref())
            .opt("Due", self.due_date.as_ref())
            .opt("Estimated", self.estimated_time.as_deref())
            .opt("Done", self.percentage_done.map(|p| format!("{p}%")));

        relation_lines(&mut block, "Relation out", &self.relations_out);
        relation_lines(&mut block, "Relation in", &self.relations_in);
        block.finish()
    }
}

impl PrettyPrint for Relation {
    fn pretty_print(&self) -> String {
        let mut block = Block::new(format!("Relation #{}", self.id));
        block
            .opt("Type", self.relation_type.as_deref())
            .opt("Reverse", self.reverse_type.as_deref())
            .opt("From", named(Some(self.from_title.as_str()).filter(|t| !t.is_empty()), self.from_id))
            .opt("To", named(Some(self.to_title.as_str()).filter(|t| !t.is_empty()), self.to_id))
            .opt("Description", self.description.as_deref());
        block.finish()
    }
}

impl PrettyPrint for Version {
    fn pretty_print(&self) -> String {
        let mut block = Block::new(format!("Version #{}: {}", self.id, self.name));
        block
            .opt("Status", self.status.as_deref())
            .opt("Sharing", self.sharing.as_deref())
            .opt(
                "Project",
                named(self.defining_project.as_deref(), self.defining_project_id),
            )
            .opt("Start", self.start_date.as_ref())
            .opt("End", self.end_date.as_ref());
        block.finish()
    }
}

impl PrettyPrint for User {
    fn pretty_print(&self) -> String {
        let mut block = Block::new(format!("User #{}: {}", self.id, self.name));
        block
            .opt("Login", self.login.as_deref())
            .opt("Email", self.email.as_deref())
            .opt("Status", self.status.as_deref())
            .opt("Admin", self.admin.map(|admin| if admin { "yes" } else { "no" }));
        block.finish()
    }
}

impl PrettyPrint for PlaceholderUser {
    fn pretty_print(&self) -> String {
        let mut block = Block::new(format!("PlaceholderUser #{}: {}", self.id, self.name));
        block.opt("Created", self.created_at.as_ref());
        block.finish()
    }
}

impl PrettyPrint for Membership {
    fn pretty_print(&self) -> String {
        let mut block = Block::new(format!("Membership #{}", self.id));
        block
            .opt("Project", named(self.project.as_deref(), self.project_id))
            .opt("Principal", named(self.principal.as_deref(), self.principal_id))
            .opt("Principal type", self.principal_type.as_deref())
            .line("Roles", self.roles.join(", "));
        block.finish()
    }
}

impl PrettyPrint for Status {
    fn pretty_print(&self) -> String {
        let mut block = Block::new(format!("Status #{}: {}", self.id, self.name));
        block
            .line("Closed", if self.is_closed { "yes" } else { "no" })
            .line("Default", if self.is_default { "yes" } else { "no" })
            .opt("Color", self.color.as_deref())
            .opt("Position", self.position);
        block.finish()
    }
}

impl PrettyPrint for Grid {
    fn pretty_print(&self) -> String {
        let title = self.name.as_deref().unwrap_or("(unnamed)");
        let mut block = Block::new(format!("Grid #{}: {}", self.id, title));
        block.line("Scope", &self.scope).line("Widgets", self.widgets.len());
        for widget in self.grid_widgets() {
            block.line("Widget", widget);
        }
        block.finish()
    }
}

impl PrettyPrint for Query {
    fn pretty_print(&self) -> String {
        let mut block = Block::new(format!("Query #{}: {}", self.id, self.name));
        block
            .opt("Project", named(self.project.as_deref(), self.project_id))
            .opt("Owner", named(self.user.as_deref(), self.user_id))
            .opt("Public", self.public.map(|p| if p { "yes" } else { "no" }))
            .opt("Results", self.results_collection().map(|c| c.total));
        block.finish()
    }
}
