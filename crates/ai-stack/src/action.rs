use std::borrow::Cow;

use crate::events::Event;
use crate::payload::Payload;
use crate::response::{AgreementRequest, EventResponse, TakeoverRequest};
use crate::result::ActionResult;
use crate::types::{ActionType, Priority};
use crate::{TickContext, WorldMut};

/// One unit of reactive behavior living on an action stack.
///
/// The stack drives the lifecycle: `start` once, then `update` every tick while on top,
/// `suspend`/`resume` around interruptions, and `terminate` exactly once when retired.
/// Only `update` is required; every other hook has a neutral default.
pub trait Action<W>: 'static
where
    W: WorldMut + 'static,
{
    fn start(
        &mut self,
        _ctx: &TickContext,
        _agent: W::Agent,
        _world: &mut W,
        _payload: Option<Payload>,
    ) -> ActionResult {
        ActionResult::Continue
    }

    fn update(&mut self, ctx: &TickContext, agent: W::Agent, world: &mut W) -> ActionResult;

    /// Another action is about to be pushed on top of this one.
    ///
    /// Returning `false` refuses: this action is terminated and replaced instead.
    fn suspend(
        &mut self,
        _ctx: &TickContext,
        _agent: W::Agent,
        _world: &mut W,
        _interrupting: ActionType,
    ) -> bool {
        true
    }

    /// The action on top of this one went away. The result is resolved like a start
    /// result.
    fn resume(
        &mut self,
        _ctx: &TickContext,
        _agent: W::Agent,
        _world: &mut W,
        _resumed_from: ActionType,
    ) -> ActionResult {
        ActionResult::Continue
    }

    /// Called once when the action is retired. `next` is the action taking over, if any.
    fn terminate(
        &mut self,
        _ctx: &TickContext,
        _agent: W::Agent,
        _world: &mut W,
        _next: Option<ActionType>,
    ) {
    }

    /// Only called for events whose category the action type was registered with.
    fn on_event(
        &mut self,
        _agent: W::Agent,
        _world: &mut W,
        _event: &Event<W::Agent>,
    ) -> EventResponse {
        EventResponse::none()
    }

    /// Asked during arbitration whether a buried action's request may go ahead.
    fn on_request(&mut self, _agent: W::Agent, _world: &W, request: &AgreementRequest) -> bool {
        request.default_policy()
    }

    /// Asked whether this action wants to become the top of the stack on behalf of a
    /// takeover request.
    fn on_takeover(
        &mut self,
        _ctx: &TickContext,
        _agent: W::Agent,
        _world: &mut W,
        _request: &mut TakeoverRequest,
    ) -> bool {
        false
    }

    /// Suspend requests aimed at this action below this priority are ignored.
    fn suspend_priority(&self) -> Priority {
        Priority::None
    }

    /// Short label for diagnostics.
    fn label(&self) -> Option<Cow<'static, str>> {
        None
    }

    /// Pre-save hook: opaque state to persist with the stack shape.
    fn save_state(&self) -> Option<Vec<u8>> {
        None
    }

    /// Post-load hook: receives what `save_state` produced.
    fn load_state(&mut self, _state: &[u8]) {}
}
