use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, trace};
use uuid::Uuid;

/// An object whose state can be captured before a mutation and persisted after.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordTarget {
    RenderSettings,
    LightmapSettings,
    Asset { id: Uuid, path: Option<PathBuf> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CapturedState {
    pub target: RecordTarget,
    pub state: serde_json::Value,
}

/// Host undo integration. Purely observational: a recorder that ignores every
/// call leaves the synced results unchanged.
pub trait TransactionRecorder {
    /// Called with the full pre-mutation state of every object about to change.
    fn capture(&mut self, label: &str, states: Vec<CapturedState>);
    /// Called after the mutation; dirty objects are the host's to persist.
    fn mark_dirty(&mut self, targets: &[RecordTarget]);
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub label: String,
    pub states: Vec<CapturedState>,
}

impl Transaction {
    pub fn targets(&self) -> impl Iterator<Item = &RecordTarget> {
        self.states.iter().map(|state| &state.target)
    }
}

/// Bounded undo/redo stacks plus the set of objects awaiting persistence.
#[derive(Debug, Default)]
pub struct UndoHistory {
    undo: Vec<Transaction>,
    redo: Vec<Transaction>,
    dirty: BTreeSet<RecordTarget>,
    limit: usize,
}

impl UndoHistory {
    /// `limit == 0` keeps every transaction.
    pub fn new(limit: usize) -> Self {
        Self { undo: Vec::new(), redo: Vec::new(), dirty: BTreeSet::new(), limit }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn last_label(&self) -> Option<&str> {
        self.undo.last().map(|tx| tx.label.as_str())
    }

    pub fn is_dirty(&self, target: &RecordTarget) -> bool {
        self.dirty.contains(target)
    }

    pub fn has_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Objects awaiting persistence. They stay dirty until `clear_dirty`.
    pub fn dirty_targets(&self) -> Vec<RecordTarget> {
        self.dirty.iter().cloned().collect()
    }

    pub fn clear_dirty(&mut self, target: &RecordTarget) {
        self.dirty.remove(target);
    }

    /// Restores the newest transaction. `restore` applies the captured states
    /// and returns the states they replaced, which become the redo entry.
    pub fn undo<F>(&mut self, restore: F) -> Result<Option<String>>
    where
        F: FnOnce(&[CapturedState]) -> Result<Vec<CapturedState>>,
    {
        let Some(tx) = self.undo.pop() else {
            return Ok(None);
        };
        match restore(&tx.states) {
            Ok(replaced) => {
                self.dirty.extend(tx.targets().cloned());
                debug!(label = %tx.label, "undid transaction");
                let label = tx.label.clone();
                self.redo.push(Transaction { label: tx.label, states: replaced });
                Ok(Some(label))
            }
            Err(err) => {
                self.undo.push(tx);
                Err(err)
            }
        }
    }

    pub fn redo<F>(&mut self, restore: F) -> Result<Option<String>>
    where
        F: FnOnce(&[CapturedState]) -> Result<Vec<CapturedState>>,
    {
        let Some(tx) = self.redo.pop() else {
            return Ok(None);
        };
        match restore(&tx.states) {
            Ok(replaced) => {
                self.dirty.extend(tx.targets().cloned());
                debug!(label = %tx.label, "redid transaction");
                let label = tx.label.clone();
                self.undo.push(Transaction { label: tx.label, states: replaced });
                Ok(Some(label))
            }
            Err(err) => {
                self.redo.push(tx);
                Err(err)
            }
        }
    }
}

impl TransactionRecorder for UndoHistory {
    fn capture(&mut self, label: &str, states: Vec<CapturedState>) {
        if states.is_empty() {
            return;
        }
        trace!(label, objects = states.len(), "captured transaction");
        self.undo.push(Transaction { label: label.to_string(), states });
        self.redo.clear();
        if self.limit > 0 && self.undo.len() > self.limit {
            let excess = self.undo.len() - self.limit;
            self.undo.drain(..excess);
        }
    }

    fn mark_dirty(&mut self, targets: &[RecordTarget]) {
        self.dirty.extend(targets.iter().cloned());
    }
}
