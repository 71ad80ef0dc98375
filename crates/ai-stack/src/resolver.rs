//! Applies an [`ActionResult`] to the top of the stack.
//!
//! Resolution is a loop rather than recursion: every mutation that starts or resumes an
//! action produces a follow-on result, which becomes the next item to apply. The loop
//! ends on `Continue`, on a dropped request, or when the stack empties.

use ai_tools::TraceKind;

use crate::behavior::Behavior;
use crate::payload::Payload;
use crate::result::ActionResult;
use crate::stack::{ActionId, Entry};
use crate::types::{ActionType, Reason};
use crate::{TickContext, WorldMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolution {
    Stable,
    Emptied,
}

enum Step {
    Next(ActionResult),
    Settled(Resolution),
}

impl<W> Behavior<W>
where
    W: WorldMut + 'static,
{
    pub(crate) fn resolve(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        result: ActionResult,
    ) -> Resolution {
        let mut result = result;
        let mut steps = 0usize;
        loop {
            self.stack.assert_top_unlinked();
            let Some(top) = self.stack.top() else {
                return Resolution::Emptied;
            };
            if result.is_continue() {
                return Resolution::Stable;
            }

            steps += 1;
            assert!(
                steps <= self.config.max_resolve_depth,
                "behavior `{}` exceeded the resolve depth of {} (change loop between actions?)",
                self.name,
                self.config.max_resolve_depth
            );

            let step = match result {
                ActionResult::Continue => Step::Settled(Resolution::Stable),
                ActionResult::ChangeTo {
                    action,
                    payload,
                    reason,
                } => self.change_top(ctx, world, top, action, payload, reason),
                ActionResult::SuspendFor {
                    action,
                    payload,
                    reason,
                    ..
                } => self.suspend_top(ctx, world, top, action, payload, reason),
                ActionResult::Done { reason } => self.finish_top(ctx, world, top, reason),
            };
            match step {
                Step::Next(next) => result = next,
                Step::Settled(resolution) => return resolution,
            }
        }
    }

    /// Build a detached entry for `action`; unknown types are a configuration error that
    /// leaves the stack alone.
    fn spawn(&mut self, action: ActionType, reason: &Reason) -> Option<ActionId> {
        match self.registry.instantiate(action) {
            Ok((instance, categories)) => {
                Some(self.stack.allocate(Entry::new(action, instance, categories)))
            }
            Err(err) => {
                tracing::warn!(
                    behavior = %self.name,
                    error = %err,
                    reason = %reason,
                    "dropping stack request"
                );
                None
            }
        }
    }

    fn change_top(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        top: ActionId,
        action: ActionType,
        payload: Option<Payload>,
        reason: Reason,
    ) -> Step {
        let Some(id) = self.spawn(action, &reason) else {
            return Step::Settled(Resolution::Stable);
        };
        let agent = self.agent;
        let old = self.stack.entry(top).kind;
        self.stack
            .entry_mut(top)
            .terminate(ctx, agent, world, Some(action), true);
        self.emit(TraceKind::Change, old, Some(action), &reason);
        drop(self.stack.replace_top(id));
        Step::Next(self.start_action(ctx, world, id, payload))
    }

    fn suspend_top(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        top: ActionId,
        action: ActionType,
        payload: Option<Payload>,
        reason: Reason,
    ) -> Step {
        let Some(id) = self.spawn(action, &reason) else {
            return Step::Settled(Resolution::Stable);
        };
        let agent = self.agent;
        let old = self.stack.entry(top).kind;
        if self.stack.entry_mut(top).suspend(ctx, agent, world, action) {
            self.emit(TraceKind::Suspend, old, Some(action), &reason);
            self.stack.push(id);
        } else {
            self.stack
                .entry_mut(top)
                .terminate(ctx, agent, world, Some(action), true);
            self.emit(TraceKind::Change, old, Some(action), &Reason::Borrowed("suspend refused"));
            drop(self.stack.replace_top(id));
        }
        Step::Next(self.start_action(ctx, world, id, payload))
    }

    fn finish_top(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        top: ActionId,
        reason: Reason,
    ) -> Step {
        let agent = self.agent;
        let ended = self.stack.entry(top).kind;
        let below = self.stack.entry(top).previous;
        let below_kind = below.map(|id| self.stack.entry(id).kind);

        self.stack
            .entry_mut(top)
            .terminate(ctx, agent, world, below_kind, true);
        self.emit(TraceKind::Done, ended, below_kind, &reason);
        drop(self.stack.pop_top());

        let Some(below) = below else {
            return Step::Settled(Resolution::Emptied);
        };
        let resumed = self.stack.entry(below).kind;
        self.emit(TraceKind::Resume, resumed, Some(ended), &reason);
        Step::Next(self.stack.entry_mut(below).resume(ctx, agent, world, ended))
    }
}
