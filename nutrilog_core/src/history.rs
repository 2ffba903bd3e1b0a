//! Reversible edits to the day log.
//!
//! Every mutation goes through a [`Command`] holding just the ids,
//! servings and day needed to reverse itself. [`History`] keeps the twin
//! undo/redo stacks and owns the commands pushed onto them; running a new
//! command discards the redo stack, so the timeline never branches.

use crate::{Catalog, DayLog, Error, Result};
use chrono::NaiveDate;

/// What a command does to the log when executed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandKind {
    Add,
    Remove,
}

/// A single reversible log edit.
///
/// Fixed at construction apart from the `applied` flag, which cycles
/// Created -> Applied -> Unapplied -> Applied as the command is executed,
/// undone and redone. A `Remove` snapshots the servings and tag of the
/// record it will delete, so undo restores the exact prior record.
#[derive(Clone, Debug)]
pub struct Command {
    kind: CommandKind,
    day: NaiveDate,
    item_id: String,
    servings: f64,
    tag: Option<String>,
    applied: bool,
}

impl Command {
    /// An addition of `servings` of an item to a day
    pub fn add(
        day: NaiveDate,
        item_id: impl Into<String>,
        servings: f64,
        tag: Option<String>,
    ) -> Result<Self> {
        if !servings.is_finite() || servings <= 0.0 {
            return Err(Error::InvalidServings(servings));
        }
        Ok(Self {
            kind: CommandKind::Add,
            day,
            item_id: item_id.into(),
            servings,
            tag,
            applied: false,
        })
    }

    /// A removal of the (day, item) record, snapshotting its current
    /// servings and tag. Fails when no such record exists.
    pub fn remove(log: &DayLog, day: NaiveDate, item_id: &str) -> Result<Self> {
        let record = log.record_for(day, item_id).ok_or_else(|| Error::NoSuchRecord {
            day,
            item: item_id.to_string(),
        })?;
        Ok(Self {
            kind: CommandKind::Remove,
            day,
            item_id: item_id.to_string(),
            servings: record.servings,
            tag: record.tag.clone(),
            applied: false,
        })
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn day(&self) -> NaiveDate {
        self.day
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn servings(&self) -> f64 {
        self.servings
    }

    pub fn is_applied(&self) -> bool {
        self.applied
    }

    /// Apply the command against the live log and catalog. The target is
    /// re-validated on every apply, so a command whose item has since left
    /// the catalog fails here instead of corrupting the log.
    fn execute(&mut self, log: &mut DayLog, catalog: &Catalog) -> Result<()> {
        if self.applied {
            return Err(Error::History("command is already applied".into()));
        }
        match self.kind {
            CommandKind::Add => {
                log.record(catalog, self.day, &self.item_id, self.servings, self.tag.clone())?;
            }
            CommandKind::Remove => {
                log.remove(self.day, &self.item_id)?;
            }
        }
        self.applied = true;
        Ok(())
    }

    /// Reverse the command. An addition subtracts exactly the servings it
    /// added; a removal restores the snapshotted record.
    fn undo(&mut self, log: &mut DayLog, catalog: &Catalog) -> Result<()> {
        if !self.applied {
            return Err(Error::History("command has not been applied".into()));
        }
        match self.kind {
            CommandKind::Add => {
                log.unrecord(self.day, &self.item_id, self.servings)?;
            }
            CommandKind::Remove => {
                log.record(catalog, self.day, &self.item_id, self.servings, self.tag.clone())?;
            }
        }
        self.applied = false;
        Ok(())
    }
}

/// Twin-stack undo/redo history over the day log
#[derive(Debug, Default)]
pub struct History {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute a command and push it onto the undo stack. The redo stack
    /// is cleared: history is linear.
    pub fn run(&mut self, mut command: Command, log: &mut DayLog, catalog: &Catalog) -> Result<()> {
        command.execute(log, catalog)?;
        self.undo_stack.push(command);
        self.redo_stack.clear();
        Ok(())
    }

    /// Reverse the most recent command and move it to the redo stack.
    ///
    /// If reversal fails (the target item was removed from the catalog in
    /// the meantime), the command stays on the undo stack and the error is
    /// surfaced; no state changes.
    pub fn undo(&mut self, log: &mut DayLog, catalog: &Catalog) -> Result<()> {
        let mut command = self.undo_stack.pop().ok_or(Error::NothingToUndo)?;
        match command.undo(log, catalog) {
            Ok(()) => {
                self.redo_stack.push(command);
                Ok(())
            }
            Err(e) => {
                self.undo_stack.push(command);
                Err(e)
            }
        }
    }

    /// Re-apply the most recently undone command and move it back to the
    /// undo stack. Same failure handling as [`History::undo`].
    pub fn redo(&mut self, log: &mut DayLog, catalog: &Catalog) -> Result<()> {
        let mut command = self.redo_stack.pop().ok_or(Error::NothingToRedo)?;
        match command.execute(log, catalog) {
            Ok(()) => {
                self.undo_stack.push(command);
                Ok(())
            }
            Err(e) => {
                self.redo_stack.push(command);
                Err(e)
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Drop both stacks without touching the log
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
