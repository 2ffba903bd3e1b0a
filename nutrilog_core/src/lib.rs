#![forbid(unsafe_code)]

//! Core domain model and business logic for Nutrilog.
//!
//! This crate provides:
//! - Domain types (items, consumption records, wire records)
//! - The item catalog: id uniqueness, acyclic composition, value
//!   aggregation, keyword search
//! - The day log and the reversible edit history over it
//! - Persistence (JSON stores, CSV export) and configuration

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod daylog;
pub mod history;
pub mod store;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{starter_catalog, Catalog};
pub use config::Config;
pub use daylog::{DayEntry, DayLog};
pub use export::log_to_csv;
pub use history::{Command, CommandKind, History};
pub use store::{load_catalog, load_catalog_seeded, load_log, save_catalog, save_log};
