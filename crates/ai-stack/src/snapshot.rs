//! Saving and restoring the shape of a running stack.
//!
//! A snapshot records each action's type name, its label and whatever opaque bytes its
//! `save_state` hook produced. Restoring rebuilds the chain from the registry and hands
//! each action its bytes back; `start` is not called again.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::behavior::Behavior;
use crate::error::{Result, StackError};
use crate::stack::Entry;
use crate::types::ActionState;
use crate::WorldMut;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SnapshotEntry {
    pub action: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub label: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub state: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StackSnapshot {
    pub behavior: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub events_paused: bool,
    /// Root first.
    pub entries: Vec<SnapshotEntry>,
}

impl StackSnapshot {
    pub fn top(&self) -> Option<&SnapshotEntry> {
        self.entries.last()
    }
}

impl<W> Behavior<W>
where
    W: WorldMut + 'static,
{
    pub fn snapshot(&self) -> StackSnapshot {
        let mut entries: Vec<SnapshotEntry> = self
            .stack
            .top_down()
            .map(|id| {
                let entry = self.stack.entry(id);
                SnapshotEntry {
                    action: entry.kind.name().to_string(),
                    label: entry.action.label().map(|label| label.into_owned()),
                    state: entry.action.save_state(),
                }
            })
            .collect();
        entries.reverse();
        StackSnapshot {
            behavior: self.name.to_string(),
            events_paused: self.events_paused,
            entries,
        }
    }

    /// Rebuild the stack recorded in `snapshot` on a behavior that has not begun.
    ///
    /// Nothing is changed when any entry names an unregistered type.
    pub fn restore(&mut self, snapshot: &StackSnapshot) -> Result<()> {
        if self.started {
            return Err(StackError::AlreadyBegun(self.name.to_string()));
        }
        if snapshot.behavior != self.name {
            return Err(StackError::SnapshotMismatch {
                expected: self.name.to_string(),
                found: snapshot.behavior.clone(),
            });
        }
        if snapshot.entries.is_empty() {
            return Err(StackError::EmptySnapshot);
        }

        let mut built = Vec::with_capacity(snapshot.entries.len());
        for saved in &snapshot.entries {
            let kind = self
                .registry
                .lookup(&saved.action)
                .ok_or_else(|| StackError::UnknownAction(saved.action.clone()))?;
            let (action, categories) = self.registry.instantiate(kind)?;
            built.push((Entry::new(kind, action, categories), saved.state.as_deref()));
        }

        let last = built.len() - 1;
        for (index, (mut entry, state)) in built.into_iter().enumerate() {
            entry.state = if index == last {
                ActionState::Running
            } else {
                ActionState::Suspended
            };
            if let Some(bytes) = state {
                entry.action.load_state(bytes);
            }
            let id = self.stack.allocate(entry);
            self.stack.push(id);
        }

        self.started = true;
        self.completion_fired = false;
        self.events_paused = snapshot.events_paused;
        tracing::debug!(behavior = %self.name, depth = self.stack.depth(), "stack restored");
        Ok(())
    }
}
