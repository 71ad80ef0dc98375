//! Index-addressed action stack.
//!
//! Entries live in a slot vector and link to each other by [`ActionId`]. `previous` points
//! at the action an entry will resume into (`None` for the root), `next` at the action
//! currently suspended on top of it (`None` for the top). Links are only rewritten by the
//! mutation primitives here, which the resolver and the arbitration engine drive.

use std::borrow::Cow;

use crate::events::EventCategories;
use crate::payload::Payload;
use crate::response::EventResponse;
use crate::result::ActionResult;
use crate::types::{ActionState, ActionType};
use crate::{Action, TickContext, WorldMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActionId(usize);

impl ActionId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Diagnostic copy of one stack entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionView {
    pub id: ActionId,
    pub action: ActionType,
    pub label: Option<Cow<'static, str>>,
    pub state: ActionState,
    pub previous: Option<ActionId>,
    pub next: Option<ActionId>,
}

pub(crate) struct Entry<W>
where
    W: WorldMut + 'static,
{
    pub(crate) action: Box<dyn Action<W>>,
    pub(crate) kind: ActionType,
    pub(crate) categories: EventCategories,
    pub(crate) state: ActionState,
    pub(crate) previous: Option<ActionId>,
    pub(crate) next: Option<ActionId>,
    pub(crate) pending: Option<EventResponse>,
}

impl<W> Entry<W>
where
    W: WorldMut + 'static,
{
    pub(crate) fn new(
        kind: ActionType,
        action: Box<dyn Action<W>>,
        categories: EventCategories,
    ) -> Self {
        Self {
            action,
            kind,
            categories,
            state: ActionState::NotStarted,
            previous: None,
            next: None,
            pending: None,
        }
    }

    pub(crate) fn start(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        payload: Option<Payload>,
    ) -> ActionResult {
        assert!(
            self.state == ActionState::NotStarted,
            "action `{}` started twice (state {:?})",
            self.kind,
            self.state
        );
        self.state = ActionState::Running;
        self.action.start(ctx, agent, world, payload)
    }

    pub(crate) fn update(&mut self, ctx: &TickContext, agent: W::Agent, world: &mut W) -> ActionResult {
        assert!(
            self.state == ActionState::Running,
            "action `{}` updated while {:?}",
            self.kind,
            self.state
        );
        self.action.update(ctx, agent, world)
    }

    /// Returns whether the action accepted; the caller terminates it on refusal.
    pub(crate) fn suspend(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        interrupting: ActionType,
    ) -> bool {
        assert!(
            self.state == ActionState::Running && self.next.is_none(),
            "action `{}` suspended twice (state {:?})",
            self.kind,
            self.state
        );
        let accepted = self.action.suspend(ctx, agent, world, interrupting);
        if accepted {
            self.state = ActionState::Suspended;
        }
        accepted
    }

    pub(crate) fn resume(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        resumed_from: ActionType,
    ) -> ActionResult {
        assert!(
            self.state == ActionState::Suspended,
            "action `{}` resumed while {:?}",
            self.kind,
            self.state
        );
        self.state = ActionState::Running;
        self.action.resume(ctx, agent, world, resumed_from)
    }

    /// Suspended → Running without a resume callback; used when a buried requester is
    /// promoted to the top so its own request can be resolved.
    pub(crate) fn reactivate(&mut self) {
        if self.state == ActionState::Suspended {
            self.state = ActionState::Running;
        }
    }

    /// Retire the action. `notify` is false when the subject is gone and callbacks must
    /// be skipped.
    pub(crate) fn terminate(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        next: Option<ActionType>,
        notify: bool,
    ) {
        assert!(
            self.state != ActionState::Done,
            "action `{}` terminated twice",
            self.kind
        );
        if notify {
            self.action.terminate(ctx, agent, world, next);
        }
        self.state = ActionState::Done;
        self.pending = None;
    }
}

pub struct ActionStack<W>
where
    W: WorldMut + 'static,
{
    slots: Vec<Option<Entry<W>>>,
    free: Vec<usize>,
    top: Option<ActionId>,
    depth: usize,
}

impl<W> ActionStack<W>
where
    W: WorldMut + 'static,
{
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            top: None,
            depth: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_none()
    }

    /// Number of linked actions.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn top(&self) -> Option<ActionId> {
        self.top
    }

    pub fn root(&self) -> Option<ActionId> {
        self.top_down().last()
    }

    /// Ids from the top down to the root.
    pub fn top_down(&self) -> TopDown<'_, W> {
        TopDown {
            stack: self,
            cursor: self.top,
        }
    }

    pub fn view(&self, id: ActionId) -> Option<ActionView> {
        let entry = self.slots.get(id.0)?.as_ref()?;
        Some(ActionView {
            id,
            action: entry.kind,
            label: entry.action.label(),
            state: entry.state,
            previous: entry.previous,
            next: entry.next,
        })
    }

    /// Views of every linked action, root first.
    pub fn views(&self) -> Vec<ActionView> {
        let mut views: Vec<ActionView> = self.top_down().filter_map(|id| self.view(id)).collect();
        views.reverse();
        views
    }

    pub fn action_type(&self, id: ActionId) -> Option<ActionType> {
        self.slots.get(id.0)?.as_ref().map(|e| e.kind)
    }

    /// Whether the links form a single chain: the top has no `next`, every `previous`
    /// points back through a matching `next`, and exactly one root is reached.
    pub fn links_are_consistent(&self) -> bool {
        let Some(top) = self.top else {
            return self.depth == 0;
        };
        if self.entry(top).next.is_some() {
            return false;
        }

        let mut seen = 0;
        let mut cursor = Some(top);
        while let Some(id) = cursor {
            seen += 1;
            if seen > self.depth {
                return false;
            }
            let entry = self.entry(id);
            if let Some(prev) = entry.previous {
                if self.entry(prev).next != Some(id) {
                    return false;
                }
            }
            cursor = entry.previous;
        }
        seen == self.depth
    }

    pub(crate) fn entry(&self, id: ActionId) -> &Entry<W> {
        self.slots
            .get(id.0)
            .and_then(Option::as_ref)
            .unwrap_or_else(|| panic!("stale action id {:?}", id))
    }

    pub(crate) fn entry_mut(&mut self, id: ActionId) -> &mut Entry<W> {
        self.slots
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .unwrap_or_else(|| panic!("stale action id {:?}", id))
    }

    pub(crate) fn assert_top_unlinked(&self) {
        if let Some(top) = self.top {
            let entry = self.entry(top);
            assert!(
                entry.next.is_none(),
                "top action `{}` still links to a next action",
                entry.kind
            );
        }
    }

    /// Store a new, unlinked entry.
    pub(crate) fn allocate(&mut self, entry: Entry<W>) -> ActionId {
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(entry);
                ActionId(index)
            }
            None => {
                self.slots.push(Some(entry));
                ActionId(self.slots.len() - 1)
            }
        }
    }

    fn release(&mut self, id: ActionId) -> Entry<W> {
        let entry = self.slots[id.0]
            .take()
            .unwrap_or_else(|| panic!("stale action id {:?}", id));
        self.free.push(id.0);
        entry
    }

    /// Link `id` above the current top (or make it the root of an empty stack).
    pub(crate) fn push(&mut self, id: ActionId) {
        let below = self.top;
        if let Some(below) = below {
            self.entry_mut(below).next = Some(id);
        }
        let entry = self.entry_mut(id);
        entry.previous = below;
        entry.next = None;
        self.top = Some(id);
        self.depth += 1;
    }

    /// Splice `id` into the top slot, returning the entry it replaced.
    pub(crate) fn replace_top(&mut self, id: ActionId) -> Entry<W> {
        let old = self.top.expect("replace_top on an empty stack");
        let below = self.entry(old).previous;
        if let Some(below) = below {
            self.entry_mut(below).next = Some(id);
        }
        let entry = self.entry_mut(id);
        entry.previous = below;
        entry.next = None;
        self.top = Some(id);
        self.release(old)
    }

    /// Unlink and return the top entry; its `previous` (if any) becomes the new top.
    pub(crate) fn pop_top(&mut self) -> Entry<W> {
        let old = self.top.expect("pop_top on an empty stack");
        let below = self.entry(old).previous;
        if let Some(below) = below {
            self.entry_mut(below).next = None;
        }
        self.top = below;
        self.depth -= 1;
        self.release(old)
    }

    /// Unlink every entry strictly above `id`, returned top first. `id` becomes the top.
    pub(crate) fn truncate_above(&mut self, id: ActionId) -> Vec<Entry<W>> {
        let mut removed = Vec::new();
        while let Some(top) = self.top {
            if top == id {
                break;
            }
            removed.push(self.pop_top());
        }
        assert!(self.top == Some(id), "truncate_above: {:?} is not on the stack", id);
        removed
    }

    /// Unlink everything, returned top first.
    pub(crate) fn drain(&mut self) -> Vec<Entry<W>> {
        let mut removed = Vec::with_capacity(self.depth);
        while self.top.is_some() {
            removed.push(self.pop_top());
        }
        self.slots.clear();
        self.free.clear();
        removed
    }

    /// Distance from the top (0 = top), or `None` when `id` is not linked.
    pub(crate) fn depth_from_top(&self, id: ActionId) -> Option<usize> {
        self.top_down().position(|candidate| candidate == id)
    }
}

impl<W> Default for ActionStack<W>
where
    W: WorldMut + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

pub struct TopDown<'a, W>
where
    W: WorldMut + 'static,
{
    stack: &'a ActionStack<W>,
    cursor: Option<ActionId>,
}

impl<W> Iterator for TopDown<'_, W>
where
    W: WorldMut + 'static,
{
    type Item = ActionId;

    fn next(&mut self) -> Option<ActionId> {
        let id = self.cursor?;
        self.cursor = self.stack.entry(id).previous;
        Some(id)
    }
}
