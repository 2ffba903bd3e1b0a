//! Per-day consumption log.
//!
//! The log maps calendar days to consumption records and computes day
//! totals by querying the catalog. Items are referred to by id only, so
//! the log's lifetime is independent of the catalog's: totals are always
//! computed against the catalog as it is *now*, and an item that has been
//! removed since it was logged contributes zero with a warning.

use crate::{Catalog, ConsumptionRecord, DayRecord, Error, Result};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Servings below this are treated as fully consumed when subtracting
const SERVINGS_EPSILON: f64 = 1e-9;

/// One calendar day's consumption
#[derive(Clone, Debug)]
pub struct DayEntry {
    id: Uuid,
    day: NaiveDate,
    consumed: Vec<ConsumptionRecord>,
}

impl DayEntry {
    fn new(day: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            day,
            consumed: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn day(&self) -> NaiveDate {
        self.day
    }

    /// Records in insertion order; at most one per item id
    pub fn consumed(&self) -> &[ConsumptionRecord] {
        &self.consumed
    }

    fn add(&mut self, item_id: &str, servings: f64, tag: Option<String>) {
        if let Some(existing) = self.consumed.iter_mut().find(|r| r.item_id == item_id) {
            existing.servings += servings;
            if tag.is_some() {
                existing.tag = tag;
            }
        } else {
            self.consumed.push(ConsumptionRecord {
                item_id: item_id.to_string(),
                servings,
                tag,
            });
        }
    }

    fn remove(&mut self, item_id: &str) -> Option<ConsumptionRecord> {
        let index = self.consumed.iter().position(|r| r.item_id == item_id)?;
        Some(self.consumed.remove(index))
    }

    /// Subtract servings from a record, dropping it when nothing remains.
    /// Returns None when no record exists for the item.
    fn subtract(&mut self, item_id: &str, servings: f64) -> Option<()> {
        let index = self.consumed.iter().position(|r| r.item_id == item_id)?;
        let remaining = self.consumed[index].servings - servings;
        if remaining <= SERVINGS_EPSILON {
            self.consumed.remove(index);
        } else {
            self.consumed[index].servings = remaining;
        }
        Some(())
    }

    /// Σ servings × value_per_serving over the day, against the current catalog
    pub fn total_value(&self, catalog: &Catalog) -> f64 {
        self.consumed
            .iter()
            .map(|record| match catalog.value_per_serving(&record.item_id) {
                Ok(value) => record.servings * value,
                Err(_) => {
                    tracing::warn!(
                        "logged item '{}' on {} is no longer in the catalog, counting it as zero",
                        record.item_id,
                        self.day
                    );
                    0.0
                }
            })
            .sum()
    }
}

/// The full day-keyed consumption log
#[derive(Clone, Debug, Default)]
pub struct DayLog {
    entries: BTreeMap<NaiveDate, DayEntry>,
}

impl DayLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record consumption of an item for a day.
    ///
    /// Merges into any existing record for the same (day, item) by
    /// summation. Fails with `UnknownItem` when the id is not in the
    /// catalog and `InvalidServings` when servings are not finite and
    /// positive; the log is unchanged on failure.
    pub fn record(
        &mut self,
        catalog: &Catalog,
        day: NaiveDate,
        item_id: &str,
        servings: f64,
        tag: Option<String>,
    ) -> Result<()> {
        if !servings.is_finite() || servings <= 0.0 {
            return Err(Error::InvalidServings(servings));
        }
        if !catalog.contains(item_id) {
            return Err(Error::UnknownItem(item_id.to_string()));
        }

        self.entries
            .entry(day)
            .or_insert_with(|| DayEntry::new(day))
            .add(item_id, servings, tag);
        Ok(())
    }

    /// Delete the entire record for (day, item). Partial removal of
    /// servings is not supported here.
    pub fn remove(&mut self, day: NaiveDate, item_id: &str) -> Result<ConsumptionRecord> {
        let no_such_record = || Error::NoSuchRecord {
            day,
            item: item_id.to_string(),
        };

        let entry = self.entries.get_mut(&day).ok_or_else(no_such_record)?;
        let removed = entry.remove(item_id).ok_or_else(no_such_record)?;
        if entry.consumed.is_empty() {
            self.entries.remove(&day);
        }
        Ok(removed)
    }

    /// Subtract exactly `servings` from a record, used by command reversal
    /// so undoing an addition never erases servings it did not add.
    pub(crate) fn unrecord(
        &mut self,
        day: NaiveDate,
        item_id: &str,
        servings: f64,
    ) -> Result<()> {
        let no_such_record = || Error::NoSuchRecord {
            day,
            item: item_id.to_string(),
        };

        let entry = self.entries.get_mut(&day).ok_or_else(no_such_record)?;
        entry.subtract(item_id, servings).ok_or_else(no_such_record)?;
        if entry.consumed.is_empty() {
            self.entries.remove(&day);
        }
        Ok(())
    }

    /// The record for (day, item), if any
    pub fn record_for(&self, day: NaiveDate, item_id: &str) -> Option<&ConsumptionRecord> {
        self.entries
            .get(&day)?
            .consumed
            .iter()
            .find(|r| r.item_id == item_id)
    }

    /// Total servings recorded for (day, item), if any
    pub fn servings_of(&self, day: NaiveDate, item_id: &str) -> Option<f64> {
        self.record_for(day, item_id).map(|r| r.servings)
    }

    /// The day's entry, if anything has been recorded for it
    pub fn entries_for(&self, day: NaiveDate) -> Option<&DayEntry> {
        self.entries.get(&day)
    }

    /// All non-empty day entries in date order
    pub fn entries(&self) -> impl Iterator<Item = &DayEntry> {
        self.entries.values()
    }

    /// Days with at least one record, in date order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.entries.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Day total against the current catalog; zero for an empty day
    pub fn total_value(&self, catalog: &Catalog, day: NaiveDate) -> f64 {
        self.entries
            .get(&day)
            .map(|entry| entry.total_value(catalog))
            .unwrap_or(0.0)
    }

    /// Wire records for every day, in date order
    pub fn to_records(&self) -> Vec<DayRecord> {
        self.entries
            .values()
            .map(|entry| DayRecord {
                id: entry.id,
                day: entry.day,
                consumed: entry.consumed.clone(),
            })
            .collect()
    }

    /// Rebuild a log from loaded records.
    ///
    /// Records referencing items absent from the catalog, or carrying
    /// invalid servings, are skipped with a warning. Multiple records for
    /// the same day merge; the last id seen wins.
    pub fn from_records(catalog: &Catalog, records: Vec<DayRecord>) -> Self {
        let mut log = DayLog::new();

        for record in records {
            for consumption in record.consumed {
                if !consumption.servings.is_finite() || consumption.servings <= 0.0 {
                    tracing::warn!(
                        "skipping record of '{}' on {}: invalid servings {}",
                        consumption.item_id,
                        record.day,
                        consumption.servings
                    );
                    continue;
                }
                if !catalog.contains(&consumption.item_id) {
                    tracing::warn!(
                        "skipping record of '{}' on {}: item is not in the catalog",
                        consumption.item_id,
                        record.day
                    );
                    continue;
                }
                log.entries
                    .entry(record.day)
                    .or_insert_with(|| DayEntry::new(record.day))
                    .add(
                        &consumption.item_id,
                        consumption.servings,
                        consumption.tag,
                    );
            }
            if let Some(entry) = log.entries.get_mut(&record.day) {
                entry.id = record.id;
            }
        }

        log
    }
}
