//! Error types for the nutrilog_core library.

use chrono::NaiveDate;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for nutrilog_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Structural validation error on an item or record
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// An item with this id already exists in the catalog
    #[error("duplicate item id '{0}'")]
    DuplicateId(String),

    /// A composite references a component id that is not in the catalog
    #[error("item '{item}' references unknown component '{component}'")]
    UnknownComponent { item: String, component: String },

    /// Admitting the item would close a reference cycle; the path runs
    /// from the offending item back to itself
    #[error("cycle detected: {}", .0.join(" -> "))]
    CycleDetected(Vec<String>),

    /// A component id became unresolvable (strict value computation only)
    #[error("component '{0}' is missing from the catalog")]
    ComponentMissing(String),

    /// The item id is not in the catalog
    #[error("unknown item '{0}'")]
    UnknownItem(String),

    /// Servings must be a finite, positive number
    #[error("invalid servings: {0}")]
    InvalidServings(f64),

    /// No consumption record exists for this (day, item) pair
    #[error("no record of '{item}' on {day}")]
    NoSuchRecord { day: NaiveDate, item: String },

    /// The item is still referenced by other catalog entries
    #[error("item '{id}' is still used by: {}", referenced_by.join(", "))]
    InUse {
        id: String,
        referenced_by: Vec<String>,
    },

    /// Undo stack is empty
    #[error("nothing to undo")]
    NothingToUndo,

    /// Redo stack is empty
    #[error("nothing to redo")]
    NothingToRedo,

    /// Command applied-state violation
    #[error("history error: {0}")]
    History(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
