//! Export/import round-trip coordination.

use crate::archive;
use crate::db::Database;
use crate::error::{FixtureError, Result};
use crate::fixture::FixtureConfig;
use crate::verify::{VerifyReport, run_checks};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tracing::debug;

/// Copy the fixture to a scratch directory, push it through the gzip
/// export/import pair, and re-verify the rewritten file.
///
/// The scratch directory lives only as long as the run; it is removed when
/// the `TempDir` drops, success or not.
pub fn round_trip(fixture_path: &Path, cfg: &FixtureConfig) -> Result<VerifyReport> {
    if !fixture_path.exists() {
        return Err(FixtureError::FixtureMissing {
            path: fixture_path.display().to_string(),
        });
    }

    let scratch = TempDir::new()?;
    let work_db = scratch.path().join("board.sqlite");
    fs::copy(fixture_path, &work_db).map_err(|source| FixtureError::CopyFailed {
        path: work_db.display().to_string(),
        source,
    })?;

    let archive_bytes = archive::export_database(&work_db)?;
    debug!(bytes = archive_bytes.len(), "exported database archive");

    let archive_path = scratch.path().join("board.sqlite.gz");
    fs::write(&archive_path, &archive_bytes)?;

    archive::import_database(&archive_path, &work_db)?;
    debug!("imported database archive");

    let db = Database::open(&work_db)?;
    run_checks(&db, cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::build_fixture;
    use crate::schema;

    #[test]
    fn test_round_trip_verifies_seeded_fixture() {
        let temp = TempDir::new().unwrap();
        let fixture_path = temp.path().join("board-minimal.db");

        let cfg = FixtureConfig::default();
        let db = Database::open(&fixture_path).unwrap();
        schema::migrate(&db).unwrap();
        build_fixture(&db, &cfg).unwrap();
        drop(db);

        let report = round_trip(&fixture_path, &cfg).unwrap();
        assert!(report.passed > 0);
        assert_eq!(report.skipped, 0);
    }

    #[test]
    fn test_round_trip_leaves_source_untouched() {
        let temp = TempDir::new().unwrap();
        let fixture_path = temp.path().join("board-minimal.db");

        let cfg = FixtureConfig::default();
        let db = Database::open(&fixture_path).unwrap();
        schema::migrate(&db).unwrap();
        build_fixture(&db, &cfg).unwrap();
        drop(db);

        let before = fs::read(&fixture_path).unwrap();
        round_trip(&fixture_path, &cfg).unwrap();
        let after = fs::read(&fixture_path).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_round_trip_missing_fixture_fails() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.db");

        let cfg = FixtureConfig::default();
        let result = round_trip(&missing, &cfg);
        assert!(matches!(result, Err(FixtureError::FixtureMissing { .. })));
    }

    #[test]
    fn test_round_trip_rejects_corrupted_copy() {
        let temp = TempDir::new().unwrap();
        let fixture_path = temp.path().join("board-minimal.db");

        let cfg = FixtureConfig::default();
        let db = Database::open(&fixture_path).unwrap();
        schema::migrate(&db).unwrap();
        build_fixture(&db, &cfg).unwrap();
        db.conn()
            .execute("DELETE FROM subtasks WHERE position = 2", [])
            .unwrap();
        drop(db);

        let err = round_trip(&fixture_path, &cfg).unwrap_err();
        assert!(matches!(err, FixtureError::CheckFailed { .. }));
    }
}
