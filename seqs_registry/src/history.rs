use seqs_types::SampleRecord;
use std::collections::VecDeque;

/// How many table snapshots the undo stack keeps before evicting the oldest.
pub const SNAPSHOT_CAPACITY: usize = 100;

/// Bounded undo/redo stacks of full-table snapshots. Snapshots are owned and
/// never aliased with the live table, so a pushed state stays stable no
/// matter what is mutated afterward.
#[derive(Debug, Default)]
pub struct History {
    undo: VecDeque<Vec<SampleRecord>>,
    redo: Vec<Vec<SampleRecord>>,
}

impl History {
    pub fn new() -> History {
        History::default()
    }

    /// Push the pre-mutation state onto the undo stack. Any redo states are
    /// invalidated by a fresh mutation.
    pub fn record(&mut self, snapshot: Vec<SampleRecord>) {
        if self.undo.len() == SNAPSHOT_CAPACITY {
            self.undo.pop_front();
        }
        self.undo.push_back(snapshot);
        self.redo.clear();
    }

    /// Swap the live table back to the most recent snapshot, parking the
    /// current state on the redo stack. Returns false if there is nothing
    /// to undo.
    pub fn undo(&mut self, live: &mut Vec<SampleRecord>) -> bool {
        match self.undo.pop_back() {
            Some(previous) => {
                self.redo.push(std::mem::replace(live, previous));
                true
            }
            None => false,
        }
    }

    /// Mirror of `undo`.
    pub fn redo(&mut self, live: &mut Vec<SampleRecord>) -> bool {
        match self.redo.pop() {
            Some(next) => {
                if self.undo.len() == SNAPSHOT_CAPACITY {
                    self.undo.pop_front();
                }
                self.undo.push_back(std::mem::replace(live, next));
                true
            }
            None => false,
        }
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }
}
