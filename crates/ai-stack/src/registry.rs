use std::collections::BTreeMap;

use crate::error::{Result, StackError};
use crate::events::EventCategories;
use crate::types::ActionType;
use crate::{Action, WorldMut};

struct Registration<W>
where
    W: WorldMut + 'static,
{
    action: ActionType,
    categories: EventCategories,
    make: Box<dyn Fn() -> Box<dyn Action<W>>>,
}

/// Builds actions by type.
///
/// Results and responses only name the type of the action they want; the registry turns
/// that name into a fresh instance and remembers which event categories the type handles.
pub struct ActionRegistry<W>
where
    W: WorldMut + 'static,
{
    entries: BTreeMap<&'static str, Registration<W>>,
}

impl<W> ActionRegistry<W>
where
    W: WorldMut + 'static,
{
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Register (or replace) the factory for `action`.
    pub fn register<A, F>(
        &mut self,
        action: ActionType,
        categories: EventCategories,
        make: F,
    ) -> &mut Self
    where
        A: Action<W>,
        F: Fn() -> A + 'static,
    {
        let registration = Registration {
            action,
            categories,
            make: Box::new(move || Box::new(make()) as Box<dyn Action<W>>),
        };
        if self.entries.insert(action.name(), registration).is_some() {
            tracing::warn!(action = %action, "action type registered twice; keeping the last factory");
        }
        self
    }

    /// Builder form of [`ActionRegistry::register`].
    pub fn with<A, F>(mut self, action: ActionType, categories: EventCategories, make: F) -> Self
    where
        A: Action<W>,
        F: Fn() -> A + 'static,
    {
        self.register(action, categories, make);
        self
    }

    pub fn contains(&self, action: ActionType) -> bool {
        self.entries.contains_key(action.name())
    }

    pub fn categories(&self, action: ActionType) -> Option<EventCategories> {
        self.entries.get(action.name()).map(|r| r.categories)
    }

    /// Find a registered type by name (used when restoring snapshots).
    pub fn lookup(&self, name: &str) -> Option<ActionType> {
        self.entries.get(name).map(|r| r.action)
    }

    pub fn types(&self) -> impl Iterator<Item = ActionType> + '_ {
        self.entries.values().map(|r| r.action)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn instantiate(
        &self,
        action: ActionType,
    ) -> Result<(Box<dyn Action<W>>, EventCategories)> {
        let registration = self
            .entries
            .get(action.name())
            .ok_or_else(|| StackError::UnknownAction(action.name().to_string()))?;
        Ok(((registration.make)(), registration.categories))
    }
}

impl<W> Default for ActionRegistry<W>
where
    W: WorldMut + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
