//! Declarative fixture verification.
//!
//! One ordered checklist of (probe, expected value, description) entries,
//! evaluated by a single generic comparator. The first mismatch aborts the
//! whole run; entries whose schema feature is absent are skipped.

use crate::db::Database;
use crate::error::{FixtureError, Result};
use crate::fixture::FixtureConfig;
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::debug;

/// One entry in the verification checklist.
///
/// `needs` lists schema features the probe touches, as `"table"` or
/// `"table.column"`; if any is absent the check is skipped rather than
/// failed.
pub struct Check {
    pub description: &'static str,
    pub needs: &'static [&'static str],
    pub sql: String,
    pub expected: Value,
}

/// Outcome of a full verification pass
#[derive(Debug, Serialize)]
pub struct VerifyReport {
    pub passed: usize,
    pub skipped: usize,
}

/// Run the full checklist against a populated database.
///
/// Single forward pass, no retry and no partial success: the first failing
/// check aborts with the structured actual/expected payload.
pub fn run_checks(db: &Database, cfg: &FixtureConfig) -> Result<VerifyReport> {
    let mut passed = 0;
    let mut skipped = 0;

    for check in checklist(cfg) {
        if !requirements_met(db, check.needs)? {
            debug!(check = check.description, "skipped: schema feature absent");
            skipped += 1;
            continue;
        }

        let actual = run_probe(db, &check.sql)?;
        if actual != check.expected {
            return Err(FixtureError::CheckFailed {
                description: check.description.to_string(),
                expected: check.expected,
                actual,
            });
        }
        passed += 1;
    }

    Ok(VerifyReport { passed, skipped })
}

fn requirements_met(db: &Database, needs: &[&str]) -> Result<bool> {
    for need in needs {
        let met = match need.split_once('.') {
            Some((table, column)) => db.table_info(table)?.contains(column),
            None => !db.table_info(need)?.is_empty(),
        };
        if !met {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Run a probe query, producing one JSON value per row: a bare scalar for
/// single-column results, an object keyed by column name otherwise.
fn run_probe(db: &Database, sql: &str) -> Result<Value> {
    let mut stmt = db.conn().prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        if columns.len() == 1 {
            out.push(json_value(row.get_ref(0)?));
        } else {
            let mut object = Map::new();
            for (index, column) in columns.iter().enumerate() {
                object.insert(column.clone(), json_value(row.get_ref(index)?));
            }
            out.push(Value::Object(object));
        }
    }
    Ok(Value::Array(out))
}

fn json_value(value: rusqlite::types::ValueRef<'_>) -> Value {
    use rusqlite::types::ValueRef;
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => json!(i),
        ValueRef::Real(f) => json!(f),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Array(b.iter().map(|byte| json!(byte)).collect()),
    }
}

fn count_check(table: &'static str, description: &'static str, expected: i64) -> Check {
    Check {
        description,
        needs: &[],
        sql: format!("SELECT COUNT(*) FROM {table}"),
        expected: json!([expected]),
    }
}

/// The ordered checklist. Row counts come first, so a structurally broken
/// fixture fails before any relational mapping is probed.
fn checklist(cfg: &FixtureConfig) -> Vec<Check> {
    let task_a = &cfg.task_a;
    let task_b = &cfg.task_b;

    vec![
        count_check("projects", "projects row count", 1),
        count_check("columns", "columns row count", 3),
        count_check("tasks", "tasks row count", 2),
        count_check("comments", "comments row count", 2),
        count_check("subtasks", "subtasks row count", 2),
        count_check("swimlanes", "swimlanes row count", 1),
        Check {
            description: "project identity",
            needs: &[],
            sql: "SELECT name, identifier FROM projects".to_string(),
            expected: json!([{
                "name": cfg.project_name,
                "identifier": cfg.project_identifier,
            }]),
        },
        Check {
            description: "swimlane shape",
            needs: &[],
            sql: "SELECT name, position FROM swimlanes".to_string(),
            expected: json!([{ "name": cfg.swimlane_name, "position": 1 }]),
        },
        Check {
            description: "column ordering",
            needs: &[],
            sql: "SELECT title, position FROM columns ORDER BY position ASC".to_string(),
            expected: Value::Array(
                cfg.column_titles
                    .iter()
                    .enumerate()
                    .map(|(index, title)| json!({ "title": title, "position": index as i64 + 1 }))
                    .collect(),
            ),
        },
        Check {
            description: "task colors",
            needs: &[],
            sql: "SELECT color_id FROM tasks ORDER BY id ASC".to_string(),
            expected: json!([task_a.color, task_b.color]),
        },
        Check {
            description: "task to column mapping",
            needs: &[],
            sql: "SELECT tasks.title AS task_title, columns.title AS column_title
                  FROM tasks
                  JOIN columns ON columns.id = tasks.column_id
                  ORDER BY tasks.id ASC"
                .to_string(),
            expected: json!([
                { "task_title": task_a.title, "column_title": cfg.column_titles[task_a.column] },
                { "task_title": task_b.title, "column_title": cfg.column_titles[task_b.column] },
            ]),
        },
        Check {
            description: "task positions",
            needs: &[],
            sql: "SELECT tasks.title AS task_title, columns.title AS column_title, tasks.position AS position
                  FROM tasks
                  JOIN columns ON columns.id = tasks.column_id
                  ORDER BY tasks.id ASC"
                .to_string(),
            expected: json!([
                {
                    "task_title": task_a.title,
                    "column_title": cfg.column_titles[task_a.column],
                    "position": 1,
                },
                {
                    "task_title": task_b.title,
                    "column_title": cfg.column_titles[task_b.column],
                    "position": 1,
                },
            ]),
        },
        Check {
            description: "comment task spread",
            needs: &[],
            sql: "SELECT COUNT(DISTINCT task_id) FROM comments".to_string(),
            expected: json!([2]),
        },
        Check {
            description: "comment contents",
            needs: &[],
            sql: "SELECT tasks.title AS task_title, comments.comment AS comment
                  FROM comments
                  JOIN tasks ON tasks.id = comments.task_id
                  ORDER BY comments.id ASC"
                .to_string(),
            expected: json!([
                { "task_title": task_a.title, "comment": cfg.comments[0] },
                { "task_title": task_b.title, "comment": cfg.comments[1] },
            ]),
        },
        Check {
            description: "subtask task spread",
            needs: &[],
            sql: "SELECT COUNT(DISTINCT task_id) FROM subtasks".to_string(),
            expected: json!([1]),
        },
        Check {
            description: "subtask positions",
            needs: &[],
            sql: "SELECT position FROM subtasks ORDER BY position ASC".to_string(),
            expected: Value::Array(cfg.subtasks.iter().map(|s| json!(s.position)).collect()),
        },
        Check {
            description: "subtask contents",
            needs: &[],
            sql: "SELECT tasks.title AS task_title, subtasks.title AS title, subtasks.status AS status
                  FROM subtasks
                  JOIN tasks ON tasks.id = subtasks.task_id
                  ORDER BY subtasks.position ASC"
                .to_string(),
            expected: Value::Array(
                cfg.subtasks
                    .iter()
                    .map(|s| {
                        json!({
                            "task_title": task_a.title,
                            "title": s.title,
                            "status": s.status,
                        })
                    })
                    .collect(),
            ),
        },
        Check {
            description: "project membership count",
            needs: &["project_has_users"],
            sql: "SELECT COUNT(*) FROM project_has_users".to_string(),
            expected: json!([1]),
        },
        Check {
            description: "project member role",
            needs: &["project_has_users.role"],
            sql: "SELECT role FROM project_has_users".to_string(),
            expected: json!([cfg.member_role]),
        },
        Check {
            description: "project member ownership",
            needs: &["project_has_users.is_owner"],
            sql: "SELECT is_owner FROM project_has_users".to_string(),
            expected: json!([1]),
        },
        Check {
            description: "category count",
            needs: &["project_has_categories"],
            sql: "SELECT COUNT(*) FROM project_has_categories".to_string(),
            expected: json!([1]),
        },
        Check {
            description: "category name",
            needs: &["project_has_categories"],
            sql: "SELECT name FROM project_has_categories".to_string(),
            expected: json!([cfg.category_name]),
        },
        Check {
            description: "category color",
            needs: &["project_has_categories.color_id"],
            sql: "SELECT color_id FROM project_has_categories".to_string(),
            expected: json!([cfg.category_color]),
        },
        Check {
            description: "task category mapping",
            needs: &["tasks.category_id", "project_has_categories"],
            sql: "SELECT tasks.title AS task_title, project_has_categories.name AS category
                  FROM tasks
                  JOIN project_has_categories ON project_has_categories.id = tasks.category_id
                  ORDER BY tasks.id ASC"
                .to_string(),
            expected: json!([
                { "task_title": task_a.title, "category": cfg.category_name },
            ]),
        },
        Check {
            description: "tag name",
            needs: &["tags"],
            sql: "SELECT name FROM tags".to_string(),
            expected: json!([cfg.tag_name]),
        },
        Check {
            description: "tag link",
            needs: &["tags", "task_has_tags"],
            sql: "SELECT tasks.title AS task_title, tags.name AS tag
                  FROM task_has_tags
                  JOIN tasks ON tasks.id = task_has_tags.task_id
                  JOIN tags ON tags.id = task_has_tags.tag_id
                  ORDER BY tasks.id ASC"
                .to_string(),
            expected: json!([
                { "task_title": task_a.title, "tag": cfg.tag_name },
            ]),
        },
    ]
}
