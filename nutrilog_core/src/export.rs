//! CSV export of the day log.
//!
//! Flattens every consumption record into one row per (day, item) with
//! its per-serving and total value, for spreadsheets and offline review.

use crate::{Catalog, DayLog, Result};
use std::fs::File;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    day: String,
    item_id: String,
    servings: f64,
    tag: Option<String>,
    unit_value: f64,
    total_value: f64,
}

/// Write the whole log as CSV, one row per consumption record, in date
/// order. Values come from the current catalog; items that are no longer
/// resolvable export as zero. The file is fsynced before returning the
/// number of rows written.
pub fn log_to_csv(log: &DayLog, catalog: &Catalog, csv_path: &Path) -> Result<usize> {
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(csv_path)?;
    let mut writer = csv::Writer::from_writer(file);

    let mut count = 0;
    for entry in log.entries() {
        for record in entry.consumed() {
            let unit_value = match catalog.value_per_serving(&record.item_id) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!("exporting '{}' with zero value: {}", record.item_id, e);
                    0.0
                }
            };
            writer.serialize(CsvRow {
                day: entry.day().to_string(),
                item_id: record.item_id.clone(),
                servings: record.servings,
                tag: record.tag.clone(),
                unit_value,
                total_value: record.servings * unit_value,
            })?;
            count += 1;
        }
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("wrote {} rows to {:?}", count, csv_path);
    Ok(count)
}
