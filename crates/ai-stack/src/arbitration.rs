//! Turns the responses stored during event delivery into at most one stack mutation.
//!
//! Order of business each tick:
//! 1. a change-class response stored on the top action wins outright;
//! 2. otherwise the highest-priority buried response wins (ties go to the action nearer
//!    the top) and every other pending response is discarded;
//! 3. takeover requests look for an existing action to promote before anything new is
//!    pushed, degrading to `Normal`/`Append` when no candidate accepts;
//! 4. `Append` asks only the top to agree and suspends it;
//! 5. `Normal` asks every action above the requester, then truncates down to it.

use ai_tools::TraceKind;

use crate::behavior::Behavior;
use crate::payload::Payload;
use crate::resolver::Resolution;
use crate::response::{AgreementRequest, EventRequest, EventResponse, RequestKind, TakeoverRequest};
use crate::result::ActionResult;
use crate::stack::ActionId;
use crate::types::{ActionType, Priority, Reason, SuspendBehavior};
use crate::{TickContext, WorldMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Arbitration {
    /// Nothing changed; the top action gets its regular update.
    Untouched,
    /// The stack was mutated this tick, so the top is not updated again.
    Mutated(Resolution),
}

impl<W> Behavior<W>
where
    W: WorldMut + 'static,
{
    pub(crate) fn arbitrate(&mut self, ctx: &TickContext, world: &mut W) -> Arbitration {
        let Some(top) = self.stack.top() else {
            return Arbitration::Untouched;
        };

        let ids: Vec<ActionId> = self.stack.top_down().collect();
        let mut pending = Vec::new();
        for id in ids {
            if let Some(response) = self.stack.entry_mut(id).pending.take() {
                if !self.below_suspend_floor(top, id, &response) {
                    pending.push((id, response));
                }
            }
        }
        if pending.is_empty() {
            return Arbitration::Untouched;
        }

        if pending[0].0 == top && pending[0].1.is_change_class() {
            let (_, response) = pending.swap_remove(0);
            return Arbitration::Mutated(self.apply_top_response(ctx, world, response));
        }

        // `pending` is ordered top-down, so keeping the first of equal priorities keeps
        // the one nearer the top.
        let mut winner: Option<(ActionId, EventResponse)> = None;
        for (id, response) in pending {
            if id == top || response.is_none() {
                continue;
            }
            let better = winner
                .as_ref()
                .map_or(true, |(_, best)| response.priority > best.priority);
            if better {
                winner = Some((id, response));
            }
        }
        match winner {
            Some((requester, response)) if response.is_change_class() => {
                self.apply_buried_response(ctx, world, requester, response)
            }
            _ => Arbitration::Untouched,
        }
    }

    /// Suspend requests below the floor of the action they would suspend are ignored
    /// before arbitration considers them.
    fn below_suspend_floor(&mut self, top: ActionId, requester: ActionId, response: &EventResponse) -> bool {
        let Some(behavior) = response.suspend_behavior() else {
            return false;
        };
        let suspended = match behavior {
            SuspendBehavior::Append | SuspendBehavior::TakeoverAppend => top,
            _ if requester == top => top,
            _ => requester,
        };
        let entry = self.stack.entry(suspended);
        let floor = entry.action.suspend_priority();
        if response.priority >= floor {
            return false;
        }
        let kind = entry.kind;
        tracing::debug!(
            behavior = %self.name,
            action = %kind,
            priority = ?response.priority,
            floor = ?floor,
            "ignored suspend below floor"
        );
        self.emit(TraceKind::SuspendIgnored, kind, response.target(), &response.reason);
        true
    }

    fn apply_top_response(&mut self, ctx: &TickContext, world: &mut W, response: EventResponse) -> Resolution {
        let EventResponse { request, reason, .. } = response;
        let result = match request {
            EventRequest::ChangeTo { action, payload } => ActionResult::ChangeTo {
                action,
                payload,
                reason,
            },
            EventRequest::SuspendFor {
                action, payload, ..
            } => ActionResult::SuspendFor {
                action,
                payload,
                reason,
                behavior: SuspendBehavior::Normal,
            },
            EventRequest::Done => ActionResult::Done { reason },
            // Already on top; taking over is a no-op.
            EventRequest::TakeOver | EventRequest::Sustain | EventRequest::None => {
                return Resolution::Stable;
            }
        };
        self.resolve(ctx, world, result)
    }

    fn apply_buried_response(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        requester: ActionId,
        response: EventResponse,
    ) -> Arbitration {
        let requester_kind = self.stack.entry(requester).kind;
        let EventResponse {
            request,
            priority,
            reason,
        } = response;

        match request {
            EventRequest::TakeOver => {
                let mut offer = TakeoverRequest {
                    requester: requester_kind,
                    target: requester_kind,
                    priority,
                    reason: reason.clone(),
                    payload: None,
                };
                match self.offer_takeover(ctx, world, requester, true, &mut offer) {
                    Some(candidate) => Arbitration::Mutated(self.take_over(ctx, world, candidate, &reason)),
                    None => {
                        self.refused(requester_kind, requester_kind, RequestKind::TakeOver);
                        Arbitration::Untouched
                    }
                }
            }
            EventRequest::SuspendFor {
                action,
                payload,
                behavior,
            } => self.arbitrate_suspend(ctx, world, requester, action, payload, behavior, priority, reason),
            EventRequest::ChangeTo { action, payload } => {
                let agreement = self.agreement(requester, RequestKind::Change, Some(action), priority, SuspendBehavior::Normal, &reason);
                let result = ActionResult::ChangeTo {
                    action,
                    payload,
                    reason,
                };
                self.promote_and_resolve(ctx, world, requester, agreement, result)
            }
            EventRequest::Done => {
                let agreement = self.agreement(requester, RequestKind::Done, None, priority, SuspendBehavior::Normal, &reason);
                self.promote_and_resolve(ctx, world, requester, agreement, ActionResult::Done { reason })
            }
            EventRequest::Sustain | EventRequest::None => Arbitration::Untouched,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn arbitrate_suspend(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        requester: ActionId,
        action: ActionType,
        payload: Option<Payload>,
        behavior: SuspendBehavior,
        priority: Priority,
        reason: Reason,
    ) -> Arbitration {
        let mut payload = payload;
        let mut behavior = behavior;

        if behavior.is_takeover() {
            let mut offer = TakeoverRequest {
                requester: self.stack.entry(requester).kind,
                target: action,
                priority,
                reason: reason.clone(),
                payload,
            };
            if let Some(candidate) = self.offer_takeover(ctx, world, requester, false, &mut offer) {
                return Arbitration::Mutated(self.take_over(ctx, world, candidate, &reason));
            }
            payload = offer.payload.take();
            behavior = behavior.degraded();
        }

        let agreement = self.agreement(requester, RequestKind::Suspend, Some(action), priority, behavior, &reason);
        if behavior == SuspendBehavior::Append {
            let Some(top) = self.stack.top() else {
                return Arbitration::Untouched;
            };
            let agent = self.agent;
            if !self.stack.entry_mut(top).action.on_request(agent, world, &agreement) {
                let top_kind = self.stack.entry(top).kind;
                self.refused(top_kind, agreement.requester, RequestKind::Suspend);
                return Arbitration::Untouched;
            }
            let result = ActionResult::SuspendFor {
                action,
                payload,
                reason,
                behavior: SuspendBehavior::Append,
            };
            return Arbitration::Mutated(self.resolve(ctx, world, result));
        }

        let result = ActionResult::SuspendFor {
            action,
            payload,
            reason,
            behavior: SuspendBehavior::Normal,
        };
        self.promote_and_resolve(ctx, world, requester, agreement, result)
    }

    fn agreement(
        &self,
        requester: ActionId,
        kind: RequestKind,
        target: Option<ActionType>,
        priority: Priority,
        behavior: SuspendBehavior,
        reason: &Reason,
    ) -> AgreementRequest {
        AgreementRequest {
            requester: self.stack.entry(requester).kind,
            kind,
            target,
            priority,
            behavior,
            above_requester: self.stack.depth_from_top(requester).unwrap_or(0),
            reason: reason.clone(),
        }
    }

    /// The `Normal` path: everyone above the requester must agree, then the requester is
    /// made the top and its request resolved.
    fn promote_and_resolve(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        requester: ActionId,
        agreement: AgreementRequest,
        result: ActionResult,
    ) -> Arbitration {
        let agent = self.agent;
        let above: Vec<ActionId> = self
            .stack
            .top_down()
            .take_while(|id| *id != requester)
            .collect();
        for id in above {
            if !self.stack.entry_mut(id).action.on_request(agent, world, &agreement) {
                let refuser = self.stack.entry(id).kind;
                self.refused(refuser, agreement.requester, agreement.kind);
                return Arbitration::Untouched;
            }
        }

        let requester_kind = agreement.requester;
        for mut entry in self.stack.truncate_above(requester) {
            entry.terminate(ctx, agent, world, Some(requester_kind), true);
            self.emit(TraceKind::Terminate, entry.kind, Some(requester_kind), &agreement.reason);
        }
        self.stack.entry_mut(requester).reactivate();
        Arbitration::Mutated(self.resolve(ctx, world, result))
    }

    /// Offer `offer` to every action of the target type, top first. The requester itself
    /// is only a candidate when `include_requester` is set.
    fn offer_takeover(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        requester: ActionId,
        include_requester: bool,
        offer: &mut TakeoverRequest,
    ) -> Option<ActionId> {
        let agent = self.agent;
        let mut candidates: Vec<ActionId> = self
            .stack
            .top_down()
            .take_while(|id| *id != requester)
            .collect();
        if include_requester {
            candidates.push(requester);
        }
        for id in candidates {
            let entry = self.stack.entry_mut(id);
            if entry.kind == offer.target && entry.action.on_takeover(ctx, agent, world, offer) {
                return Some(id);
            }
        }
        None
    }

    /// Make `candidate` the top: everything above it is terminated and, if it was
    /// suspended, it resumes from the action that sat directly on it.
    fn take_over(&mut self, ctx: &TickContext, world: &mut W, candidate: ActionId, reason: &Reason) -> Resolution {
        let agent = self.agent;
        let kind = self.stack.entry(candidate).kind;
        let above = self.stack.entry(candidate).next.map(|id| self.stack.entry(id).kind);

        for mut entry in self.stack.truncate_above(candidate) {
            entry.terminate(ctx, agent, world, Some(kind), true);
            self.emit(TraceKind::Terminate, entry.kind, Some(kind), reason);
        }
        self.emit(TraceKind::TakeOver, kind, above, reason);

        let Some(resumed_from) = above else {
            return Resolution::Stable;
        };
        self.emit(TraceKind::Resume, kind, Some(resumed_from), reason);
        let result = self.stack.entry_mut(candidate).resume(ctx, agent, world, resumed_from);
        self.resolve(ctx, world, result)
    }
}
