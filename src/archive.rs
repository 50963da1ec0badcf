//! Gzip archive export/import for the fixture database file.
//!
//! Mirrors the board application's database download/upload pair: the
//! archive is the raw SQLite file, gzip-compressed.

use crate::error::{FixtureError, Result};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

/// Export the database file as a gzip-compressed byte stream.
/// An empty archive is treated as a failed export.
pub fn export_database(path: &Path) -> Result<Vec<u8>> {
    let data = fs::read(path)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&data)?;
    let compressed = encoder.finish()?;
    if compressed.is_empty() {
        return Err(FixtureError::EmptyExport);
    }
    Ok(compressed)
}

/// Import a gzip archive, rewriting the database file at `path`
pub fn import_database(archive: &Path, path: &Path) -> Result<()> {
    let compressed = fs::read(archive)?;
    let mut decoder = GzDecoder::new(&compressed[..]);
    let mut data = Vec::new();
    decoder.read_to_end(&mut data)?;
    fs::write(path, &data)?;
    Ok(())
}
