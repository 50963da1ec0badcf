//! Subcommand implementations.

use crate::db::Database;
use crate::error::{FixtureError, Result};
use crate::fixture::{FixtureConfig, build_fixture};
use crate::roundtrip::round_trip;
use crate::schema;
use crate::verify::run_checks;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Handle the create command
pub fn handle_create(db_path: &Path) -> Result<()> {
    if let Some(dir) = db_path.parent() {
        if !dir.as_os_str().is_empty() && !dir.is_dir() {
            fs::create_dir_all(dir).map_err(|source| FixtureError::DirCreate {
                path: dir.display().to_string(),
                source,
            })?;
        }
    }

    if db_path.exists() {
        fs::remove_file(db_path).map_err(|source| FixtureError::StaleFixture {
            path: db_path.display().to_string(),
            source,
        })?;
    }

    let db = Database::open(db_path)?;
    schema::migrate(&db)?;
    if let Some(version) = db.schema_version()? {
        debug!(version, "schema migrated");
    }

    let cfg = FixtureConfig::default();
    let summary = build_fixture(&db, &cfg)?;
    debug!(summary = %serde_json::to_string(&summary)?, "seeded fixture graph");

    println!("Fixture database created at {}", db_path.display());
    println!("  Project: #{} ({})", summary.project_id, cfg.project_name);
    println!("  Tasks:   {}", summary.task_ids.len());
    println!("  Instant: {}", cfg.instant().to_rfc3339());

    Ok(())
}

/// Handle the verify command
pub fn handle_verify(db_path: &Path) -> Result<()> {
    if !db_path.exists() {
        return Err(FixtureError::FixtureMissing {
            path: db_path.display().to_string(),
        });
    }

    let db = Database::open(db_path)?;
    let cfg = FixtureConfig::default();
    let report = run_checks(&db, &cfg)?;

    println!(
        "Fixture verification passed ({} checks, {} skipped).",
        report.passed, report.skipped
    );

    Ok(())
}

/// Handle the round-trip command
pub fn handle_round_trip(db_path: &Path) -> Result<()> {
    let cfg = FixtureConfig::default();
    let report = round_trip(db_path, &cfg)?;

    println!(
        "Round-trip verification passed ({} checks, {} skipped).",
        report.passed, report.skipped
    );

    Ok(())
}
