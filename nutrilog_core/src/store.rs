//! JSON persistence for the catalog and day log.
//!
//! Both stores are plain JSON arrays of wire records. Reads take a shared
//! lock and skip records that fail validation; writes go through a locked
//! temp file, an fsync and an atomic rename, so a crash mid-save never
//! leaves a half-written file behind.

use crate::{Catalog, DayLog, DayRecord, Error, ItemRecord, Result};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const ITEMS_FILE: &str = "items.json";
pub const LOG_FILE: &str = "log.json";

/// Path of the item store inside a data directory
pub fn items_path(data_dir: &Path) -> PathBuf {
    data_dir.join(ITEMS_FILE)
}

/// Path of the day-log store inside a data directory
pub fn log_path(data_dir: &Path) -> PathBuf {
    data_dir.join(LOG_FILE)
}

fn read_locked(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let mut contents = String::new();
    let mut reader = std::io::BufReader::new(&file);
    let read = reader.read_to_string(&mut contents);
    file.unlock()?;
    read?;

    Ok(Some(contents))
}

fn write_locked(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Unique temp file in the same directory for atomic rename
    let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::Other, "store path missing parent")
    })?)?;

    // Exclusive lock on the temp file to serialize concurrent writers
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        writer.write_all(contents.as_bytes())?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;

    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

/// Load the catalog from an item store file.
///
/// A missing file yields an empty catalog. A file that is not valid JSON
/// is an error; individual records that fail validation are skipped with
/// a warning during reconstruction.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    match read_locked(path)? {
        None => {
            tracing::info!("no item file at {:?}, starting with an empty catalog", path);
            Ok(Catalog::new())
        }
        Some(contents) => {
            let records: Vec<ItemRecord> = serde_json::from_str(&contents)?;
            let catalog = Catalog::from_records(records);
            tracing::debug!("loaded {} items from {:?}", catalog.len(), path);
            Ok(catalog)
        }
    }
}

/// Like [`load_catalog`], but a missing file is seeded with the starter
/// catalog instead of left empty
pub fn load_catalog_seeded(path: &Path, seed_if_missing: bool) -> Result<Catalog> {
    if !path.exists() && seed_if_missing {
        let catalog = crate::catalog::starter_catalog().clone();
        save_catalog(&catalog, path)?;
        tracing::info!("seeded {:?} with {} starter items", path, catalog.len());
        return Ok(catalog);
    }
    load_catalog(path)
}

pub fn save_catalog(catalog: &Catalog, path: &Path) -> Result<()> {
    let contents = serde_json::to_string_pretty(&catalog.to_records())?;
    write_locked(path, &contents)?;
    tracing::debug!("saved {} items to {:?}", catalog.len(), path);
    Ok(())
}

/// Load the day log from a log store file, validated against the catalog.
///
/// A missing file yields an empty log. Records referencing unknown items
/// are skipped with a warning.
pub fn load_log(catalog: &Catalog, path: &Path) -> Result<DayLog> {
    match read_locked(path)? {
        None => {
            tracing::info!("no log file at {:?}, starting with an empty log", path);
            Ok(DayLog::new())
        }
        Some(contents) => {
            let records: Vec<DayRecord> = serde_json::from_str(&contents)?;
            Ok(DayLog::from_records(catalog, records))
        }
    }
}

pub fn save_log(log: &DayLog, path: &Path) -> Result<()> {
    let contents = serde_json::to_string_pretty(&log.to_records())?;
    write_locked(path, &contents)?;
    tracing::debug!("saved day log to {:?}", path);
    Ok(())
}
