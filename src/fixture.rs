//! Fixture constants and the seed builder.

use crate::db::Database;
use crate::error::{FixtureError, Result};
use crate::seed::{SeedValue, insert_row, seed_row};
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::OptionalExtension;
use serde::Serialize;
use tracing::debug;

/// Seed values for one task
#[derive(Debug, Clone)]
pub struct TaskSeed {
    pub title: &'static str,
    pub description: &'static str,
    pub color: &'static str,
    pub priority: i64,
    /// Index into [`FixtureConfig::column_titles`]
    pub column: usize,
    /// Due date offset from the fixture instant, in seconds
    pub due_offset: i64,
}

/// Seed values for one subtask (both attach to task A)
#[derive(Debug, Clone)]
pub struct SubtaskSeed {
    pub title: &'static str,
    pub status: i64,
    pub position: i64,
}

/// Literal values shared by the builder and the verifier.
///
/// Both sides read from one immutable config, so the seeded rows and the
/// expected values cannot drift apart.
#[derive(Debug, Clone)]
pub struct FixtureConfig {
    /// Fixed fixture instant as a unix timestamp
    pub timestamp: i64,
    pub project_name: &'static str,
    pub project_description: &'static str,
    pub project_identifier: &'static str,
    pub member_role: &'static str,
    pub swimlane_name: &'static str,
    pub category_name: &'static str,
    pub category_color: &'static str,
    pub category_description: &'static str,
    pub column_titles: [&'static str; 3],
    pub task_a: TaskSeed,
    pub task_b: TaskSeed,
    /// One comment per task, in task order
    pub comments: [&'static str; 2],
    pub subtasks: [SubtaskSeed; 2],
    pub tag_name: &'static str,
    pub tag_color: &'static str,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        FixtureConfig {
            timestamp: 1_704_067_200, // 2024-01-01T00:00:00Z
            project_name: "Fixture Project",
            project_description: "Minimal board fixture project for tests.",
            project_identifier: "FIXTURE",
            member_role: "project-manager",
            swimlane_name: "Default swimlane",
            category_name: "Fixture Category",
            category_color: "green",
            category_description: "Fixture category for tests.",
            column_titles: ["Backlog", "In Progress", "Done"],
            task_a: TaskSeed {
                title: "Fixture Task A",
                description: "First fixture task.",
                color: "yellow",
                priority: 2,
                column: 0,
                due_offset: 86_400,
            },
            task_b: TaskSeed {
                title: "Fixture Task B",
                description: "Second fixture task.",
                color: "blue",
                priority: 1,
                column: 1,
                due_offset: 172_800,
            },
            comments: ["First fixture comment.", "Second fixture comment."],
            subtasks: [
                SubtaskSeed {
                    title: "Draft fixture checklist",
                    status: 0,
                    position: 1,
                },
                SubtaskSeed {
                    title: "Verify fixture contents",
                    status: 1,
                    position: 2,
                },
            ],
            tag_name: "Fixture Tag",
            tag_color: "purple",
        }
    }
}

impl FixtureConfig {
    /// The fixture instant as a UTC datetime
    pub fn instant(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.timestamp, 0)
            .single()
            .unwrap_or_default()
    }
}

/// Identifiers assigned while seeding the fixture graph
#[derive(Debug, Default, Serialize)]
pub struct FixtureSummary {
    pub user_id: i64,
    pub project_id: i64,
    pub swimlane_id: i64,
    pub category_id: Option<i64>,
    pub column_ids: Vec<i64>,
    pub task_ids: Vec<i64>,
    pub comment_ids: Vec<i64>,
    pub subtask_ids: Vec<i64>,
    pub tag_id: Option<i64>,
}

/// Seed the minimal fixture into a freshly migrated database.
///
/// Every row hangs off one project and one user; rows for optional tables
/// (member links, categories, tags) are only written when the current
/// schema has them.
pub fn build_fixture(db: &Database, cfg: &FixtureConfig) -> Result<FixtureSummary> {
    let mut summary = FixtureSummary {
        user_id: seed_user_id(db)?,
        ..FixtureSummary::default()
    };

    summary.project_id = insert_row(
        db,
        "projects",
        &seed_row(&[
            ("name", SeedValue::text(cfg.project_name)),
            ("description", SeedValue::text(cfg.project_description)),
            ("identifier", SeedValue::text(cfg.project_identifier)),
            ("is_active", SeedValue::Int(1)),
            ("is_private", SeedValue::Int(0)),
            ("is_public", SeedValue::Int(0)),
            ("owner_id", SeedValue::Int(summary.user_id)),
            ("last_modified", SeedValue::Int(cfg.timestamp)),
        ]),
    )?;
    debug!(project_id = summary.project_id, "seeded project");

    let members_info = db.table_info("project_has_users")?;
    if !members_info.is_empty() && summary.user_id > 0 {
        let mut member = seed_row(&[
            ("project_id", SeedValue::Int(summary.project_id)),
            ("user_id", SeedValue::Int(summary.user_id)),
        ]);
        if members_info.contains("role") {
            member.insert("role".to_string(), SeedValue::text(cfg.member_role));
        }
        if members_info.contains("is_owner") {
            member.insert("is_owner".to_string(), SeedValue::Int(1));
        }
        insert_row(db, "project_has_users", &member)?;
    }

    summary.swimlane_id = insert_row(
        db,
        "swimlanes",
        &seed_row(&[
            ("name", SeedValue::text(cfg.swimlane_name)),
            ("position", SeedValue::Int(1)),
            ("is_active", SeedValue::Int(1)),
            ("project_id", SeedValue::Int(summary.project_id)),
        ]),
    )?;

    let categories_info = db.table_info("project_has_categories")?;
    if !categories_info.is_empty() {
        let mut category = seed_row(&[
            ("name", SeedValue::text(cfg.category_name)),
            ("project_id", SeedValue::Int(summary.project_id)),
        ]);
        if categories_info.contains("color_id") {
            category.insert("color_id".to_string(), SeedValue::text(cfg.category_color));
        }
        if categories_info.contains("description") {
            category.insert(
                "description".to_string(),
                SeedValue::text(cfg.category_description),
            );
        }
        summary.category_id = Some(insert_row(db, "project_has_categories", &category)?);
    }

    for (index, title) in cfg.column_titles.iter().enumerate() {
        let column_id = insert_row(
            db,
            "columns",
            &seed_row(&[
                ("title", SeedValue::text(*title)),
                ("position", SeedValue::Int(index as i64 + 1)),
                ("project_id", SeedValue::Int(summary.project_id)),
                ("task_limit", SeedValue::Int(0)),
                ("hide_in_dashboard", SeedValue::Int(0)),
            ]),
        )?;
        summary.column_ids.push(column_id);
    }

    for (task, category_id) in [
        (&cfg.task_a, summary.category_id.unwrap_or(0)),
        (&cfg.task_b, 0),
    ] {
        let task_id = insert_row(
            db,
            "tasks",
            &seed_row(&[
                ("title", SeedValue::text(task.title)),
                ("description", SeedValue::text(task.description)),
                ("reference", SeedValue::text("")),
                ("date_creation", SeedValue::Int(cfg.timestamp)),
                ("date_modification", SeedValue::Int(cfg.timestamp)),
                ("date_moved", SeedValue::Int(cfg.timestamp)),
                ("date_due", SeedValue::Int(cfg.timestamp + task.due_offset)),
                ("color_id", SeedValue::text(task.color)),
                ("priority", SeedValue::Int(task.priority)),
                ("project_id", SeedValue::Int(summary.project_id)),
                ("column_id", SeedValue::Int(summary.column_ids[task.column])),
                ("swimlane_id", SeedValue::Int(summary.swimlane_id)),
                ("position", SeedValue::Int(1)),
                ("creator_id", SeedValue::Int(summary.user_id)),
                ("owner_id", SeedValue::Int(summary.user_id)),
                ("is_active", SeedValue::Int(1)),
                // Dropped by normalization on schema versions without categories
                ("category_id", SeedValue::Int(category_id)),
            ]),
        )?;
        summary.task_ids.push(task_id);
        debug!(task_id, title = task.title, "seeded task");
    }

    for (task_id, comment) in summary.task_ids.iter().zip(cfg.comments.iter()) {
        let comment_id = insert_row(
            db,
            "comments",
            &seed_row(&[
                ("task_id", SeedValue::Int(*task_id)),
                ("user_id", SeedValue::Int(summary.user_id)),
                ("date_creation", SeedValue::Int(cfg.timestamp)),
                ("date_modification", SeedValue::Int(cfg.timestamp)),
                ("comment", SeedValue::text(*comment)),
                ("reference", SeedValue::text("")),
            ]),
        )?;
        summary.comment_ids.push(comment_id);
    }

    for subtask in &cfg.subtasks {
        let subtask_id = insert_row(
            db,
            "subtasks",
            &seed_row(&[
                ("title", SeedValue::text(subtask.title)),
                ("status", SeedValue::Int(subtask.status)),
                ("task_id", SeedValue::Int(summary.task_ids[0])),
                ("position", SeedValue::Int(subtask.position)),
            ]),
        )?;
        summary.subtask_ids.push(subtask_id);
    }

    let tags_info = db.table_info("tags")?;
    let links_info = db.table_info("task_has_tags")?;
    if !tags_info.is_empty() && !links_info.is_empty() {
        let tag_id = insert_row(
            db,
            "tags",
            &seed_row(&[
                ("name", SeedValue::text(cfg.tag_name)),
                ("project_id", SeedValue::Int(summary.project_id)),
                ("color_id", SeedValue::text(cfg.tag_color)),
            ]),
        )?;
        insert_row(
            db,
            "task_has_tags",
            &seed_row(&[
                ("task_id", SeedValue::Int(summary.task_ids[0])),
                ("tag_id", SeedValue::Int(tag_id)),
            ]),
        )?;
        summary.tag_id = Some(tag_id);
    }

    Ok(summary)
}

/// Lowest user id present after migration. A schema without a users table
/// yields 0 and the fixture is left unowned; an empty users table is an
/// error, since the graph must be rooted at a real user.
fn seed_user_id(db: &Database) -> Result<i64> {
    if db.table_info("users")?.is_empty() {
        return Ok(0);
    }
    let id: Option<i64> = db
        .conn()
        .query_row("SELECT id FROM users ORDER BY id ASC LIMIT 1", [], |row| {
            row.get(0)
        })
        .optional()?;
    id.ok_or(FixtureError::NoSeedUser)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        schema::migrate(&db).unwrap();
        db
    }

    fn count(db: &Database, table: &str) -> i64 {
        db.conn()
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })
            .unwrap()
    }

    #[test]
    fn test_build_seeds_expected_row_counts() {
        let db = setup();
        let cfg = FixtureConfig::default();
        let summary = build_fixture(&db, &cfg).unwrap();

        assert_eq!(count(&db, "projects"), 1);
        assert_eq!(count(&db, "swimlanes"), 1);
        assert_eq!(count(&db, "columns"), 3);
        assert_eq!(count(&db, "tasks"), 2);
        assert_eq!(count(&db, "comments"), 2);
        assert_eq!(count(&db, "subtasks"), 2);
        assert_eq!(summary.column_ids.len(), 3);
        assert_eq!(summary.task_ids.len(), 2);
    }

    #[test]
    fn test_graph_is_rooted_at_one_project_and_user() {
        let db = setup();
        let cfg = FixtureConfig::default();
        let summary = build_fixture(&db, &cfg).unwrap();

        assert!(summary.user_id > 0);

        let orphan_tasks: i64 = db
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM tasks WHERE project_id != ?1",
                [summary.project_id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(orphan_tasks, 0);

        let orphan_subtasks: i64 = db
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM subtasks WHERE task_id NOT IN (SELECT id FROM tasks)",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(orphan_subtasks, 0);
    }

    #[test]
    fn test_optional_tables_seeded_when_present() {
        let db = setup();
        let cfg = FixtureConfig::default();
        let summary = build_fixture(&db, &cfg).unwrap();

        assert!(summary.category_id.is_some());
        assert!(summary.tag_id.is_some());
        assert_eq!(count(&db, "project_has_users"), 1);
        assert_eq!(count(&db, "task_has_tags"), 1);
    }

    #[test]
    fn test_build_tolerates_reduced_schema() {
        let db = setup();
        for table in [
            "task_has_tags",
            "tags",
            "project_has_categories",
            "project_has_users",
        ] {
            db.conn()
                .execute(&format!("DROP TABLE {table}"), [])
                .unwrap();
        }

        let cfg = FixtureConfig::default();
        let summary = build_fixture(&db, &cfg).unwrap();

        assert_eq!(summary.category_id, None);
        assert_eq!(summary.tag_id, None);
        assert_eq!(count(&db, "tasks"), 2);

        // Tasks fall back to category id 0 when no category was seeded
        let category: i64 = db
            .conn()
            .query_row(
                "SELECT category_id FROM tasks WHERE id = ?1",
                [summary.task_ids[0]],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(category, 0);
    }

    #[test]
    fn test_empty_users_table_is_fatal() {
        let db = setup();
        db.conn().execute("DELETE FROM users", []).unwrap();

        let cfg = FixtureConfig::default();
        let result = build_fixture(&db, &cfg);
        assert!(matches!(result, Err(FixtureError::NoSeedUser)));
    }

    #[test]
    fn test_fixture_instant_matches_timestamp() {
        let cfg = FixtureConfig::default();
        assert_eq!(cfg.instant().to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }
}
