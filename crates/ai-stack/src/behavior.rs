use std::borrow::Cow;
use std::rc::Rc;

use ai_tools::{NullTraceSink, TraceEvent, TraceKind, TraceSink, TracingSink};

use crate::arbitration::Arbitration;
use crate::config::BehaviorConfig;
use crate::error::{Result, StackError};
use crate::events::Event;
use crate::payload::Payload;
use crate::registry::ActionRegistry;
use crate::resolver::Resolution;
use crate::response::{EventReceipt, RequestKind};
use crate::stack::{ActionId, ActionStack, ActionView, Entry};
use crate::types::{ActionType, Priority, Reason};
use crate::{TickContext, WorldMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BehaviorStatus {
    /// Never begun, or stopped without signalling completion.
    Inactive,
    Running,
    /// The stack emptied itself (or was stopped with completion requested).
    Complete,
}

/// A scheduler instance: owns one action stack and drives it once per tick.
///
/// External code talks to a behavior through `begin`/`run`/`stop` and event delivery
/// only; the stack itself is never handed out mutably.
///
/// Owners must call [`Behavior::stop`] before dropping a running behavior. `Drop` has no
/// world to pass to the actions, so it discards the stack without `terminate` callbacks
/// and logs a warning.
pub struct Behavior<W>
where
    W: WorldMut + 'static,
{
    pub(crate) name: Cow<'static, str>,
    pub(crate) agent: W::Agent,
    pub(crate) initial: Option<ActionType>,
    pub(crate) registry: Rc<ActionRegistry<W>>,
    pub(crate) stack: ActionStack<W>,
    pub(crate) config: BehaviorConfig,
    pub(crate) events_paused: bool,
    pub(crate) started: bool,
    pub(crate) completion_fired: bool,
    pub(crate) on_complete: Option<Box<dyn FnMut(&str)>>,
    pub(crate) trace: Box<dyn TraceSink>,
    pub(crate) tick: u64,
}

impl<W> Behavior<W>
where
    W: WorldMut + 'static,
{
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        agent: W::Agent,
        registry: Rc<ActionRegistry<W>>,
    ) -> Self {
        Self {
            name: name.into(),
            agent,
            initial: None,
            registry,
            stack: ActionStack::new(),
            config: BehaviorConfig::default(),
            events_paused: false,
            started: false,
            completion_fired: false,
            on_complete: None,
            trace: Box::new(NullTraceSink),
            tick: 0,
        }
    }

    pub fn with_initial_action(mut self, action: ActionType) -> Self {
        self.initial = Some(action);
        self
    }

    /// Apply `config`; `log_state` installs a [`TracingSink`].
    pub fn with_config(mut self, config: BehaviorConfig) -> Self {
        if config.log_state {
            self.trace = Box::new(TracingSink);
        }
        self.config = config;
        self
    }

    pub fn with_trace_sink(mut self, sink: impl TraceSink + 'static) -> Self {
        self.trace = Box::new(sink);
        self
    }

    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.trace = sink;
    }

    /// Called with the behavior's name whenever completion is signalled.
    pub fn on_complete(&mut self, callback: impl FnMut(&str) + 'static) {
        self.on_complete = Some(Box::new(callback));
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn agent(&self) -> W::Agent {
        self.agent
    }

    pub fn initial_action(&self) -> Option<ActionType> {
        self.initial
    }

    pub fn config(&self) -> &BehaviorConfig {
        &self.config
    }

    pub fn registry(&self) -> &Rc<ActionRegistry<W>> {
        &self.registry
    }

    pub fn stack(&self) -> &ActionStack<W> {
        &self.stack
    }

    pub fn has_begun(&self) -> bool {
        self.started
    }

    pub fn is_complete(&self) -> bool {
        !self.started && self.completion_fired
    }

    pub fn status(&self) -> BehaviorStatus {
        if self.started {
            BehaviorStatus::Running
        } else if self.completion_fired {
            BehaviorStatus::Complete
        } else {
            BehaviorStatus::Inactive
        }
    }

    /// Every action on the stack, root first.
    pub fn action_stack(&self) -> Vec<ActionView> {
        self.stack.views()
    }

    pub fn top_action(&self) -> Option<ActionView> {
        self.stack.top().and_then(|id| self.stack.view(id))
    }

    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn events_paused(&self) -> bool {
        self.events_paused
    }

    /// While paused, delivered events are dropped before they reach any action.
    pub fn set_events_paused(&mut self, paused: bool) {
        self.events_paused = paused;
    }

    /// Whether `id` holds a response waiting for the next arbitration.
    pub fn has_pending_response(&self, id: ActionId) -> bool {
        self.stack.view(id).is_some() && self.stack.entry(id).pending.is_some()
    }

    pub fn begin(&mut self, ctx: &TickContext, world: &mut W) -> Result<BehaviorStatus> {
        self.begin_with(ctx, world, None)
    }

    /// Instantiate and start the initial action, handing it `payload`.
    pub fn begin_with(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        payload: Option<Payload>,
    ) -> Result<BehaviorStatus> {
        if self.started {
            return Err(StackError::AlreadyBegun(self.name.to_string()));
        }
        let Some(initial) = self.initial else {
            tracing::error!(behavior = %self.name, "cannot begin: no initial action configured");
            return Err(StackError::MissingInitialAction {
                behavior: self.name.to_string(),
            });
        };
        let (action, categories) = self.registry.instantiate(initial).map_err(|err| {
            tracing::error!(behavior = %self.name, error = %err, "cannot begin");
            err
        })?;

        self.tick = ctx.tick;
        self.started = true;
        self.completion_fired = false;
        self.emit(TraceKind::Begin, initial, None, &Reason::Borrowed(""));

        let id = self.stack.allocate(Entry::new(initial, action, categories));
        self.stack.push(id);
        let result = self.start_action(ctx, world, id, payload);
        if let Resolution::Emptied = self.resolve(ctx, world, result) {
            self.complete();
        }
        Ok(self.status())
    }

    /// One scheduling tick: arbitrate pending events, then update the top action unless
    /// arbitration already changed the stack this tick.
    pub fn run(&mut self, ctx: &TickContext, world: &mut W) -> BehaviorStatus {
        if !self.started {
            return self.status();
        }
        self.tick = ctx.tick;

        if let Arbitration::Mutated(resolution) = self.arbitrate(ctx, world) {
            if let Resolution::Emptied = resolution {
                self.complete();
            }
            return self.status();
        }

        let Some(top) = self.stack.top() else {
            self.complete();
            return self.status();
        };
        let agent = self.agent;
        let result = self.stack.entry_mut(top).update(ctx, agent, world);
        if let Resolution::Emptied = self.resolve(ctx, world, result) {
            self.complete();
        }
        self.status()
    }

    /// Tear the whole stack down, top first. Terminate callbacks are skipped when the
    /// agent no longer exists. Stopping an inactive behavior does nothing.
    pub fn stop(&mut self, ctx: &TickContext, world: &mut W, fire_completion: bool) {
        if !self.started {
            return;
        }
        self.tick = ctx.tick;

        let agent = self.agent;
        let notify = world.is_agent_valid(agent);
        if !notify {
            tracing::debug!(behavior = %self.name, "agent gone; discarding stack without callbacks");
        }
        for mut entry in self.stack.drain() {
            entry.terminate(ctx, agent, world, None, notify);
            self.emit(TraceKind::Terminate, entry.kind, None, &Reason::Borrowed("stop"));
        }
        self.started = false;
        self.emit_behavior(TraceKind::Stop);
        if fire_completion {
            self.signal_completion();
        }
    }

    /// Broadcast `event` from the top of the stack down.
    ///
    /// Broadcast stops at the first action that answers with anything but "none"; that
    /// answer is stored on the action for the next arbitration, unless a response that
    /// outranks it is already pending there.
    pub fn handle_event(&mut self, world: &mut W, event: &Event<W::Agent>) -> Option<EventReceipt> {
        if !self.started {
            return None;
        }
        if self.events_paused {
            tracing::trace!(behavior = %self.name, event = event.name(), "events paused; dropped");
            return None;
        }

        let agent = self.agent;
        let category = event.category();
        let ids: Vec<ActionId> = self.stack.top_down().collect();
        for id in ids {
            let entry = self.stack.entry_mut(id);
            if !entry.categories.contains(category) {
                continue;
            }
            let response = entry.action.on_event(agent, world, event);
            if response.is_none() {
                continue;
            }

            let responder = entry.kind;
            let kind = response.kind();
            let priority = response.priority;
            let reason = response.reason.clone();
            let stored = entry
                .pending
                .as_ref()
                .map_or(true, |existing| response.supersedes(existing));
            if stored {
                entry.pending = Some(response);
                self.emit(TraceKind::EventStored, responder, None, &Reason::Borrowed(event.name()));
            } else if priority == Priority::Critical {
                tracing::warn!(
                    behavior = %self.name,
                    action = %responder,
                    event = event.name(),
                    reason = %reason,
                    "critical response collided with a pending response and was dropped"
                );
                self.emit(TraceKind::Collision, responder, None, &reason);
            } else {
                self.emit(TraceKind::EventDropped, responder, None, &reason);
            }

            return Some(EventReceipt {
                responder,
                kind,
                priority,
                stored,
            });
        }
        None
    }

    pub(crate) fn start_action(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        id: ActionId,
        payload: Option<Payload>,
    ) -> crate::ActionResult {
        let agent = self.agent;
        let kind = self.stack.entry(id).kind;
        self.emit(TraceKind::Start, kind, None, &Reason::Borrowed(""));
        self.stack.entry_mut(id).start(ctx, agent, world, payload)
    }

    /// The stack emptied on its own.
    pub(crate) fn complete(&mut self) {
        self.started = false;
        self.signal_completion();
    }

    fn signal_completion(&mut self) {
        if self.completion_fired {
            return;
        }
        self.completion_fired = true;
        self.emit_behavior(TraceKind::Complete);
        if let Some(callback) = self.on_complete.as_mut() {
            callback(&self.name);
        }
    }

    pub(crate) fn emit(
        &mut self,
        kind: TraceKind,
        action: ActionType,
        other: Option<ActionType>,
        reason: &Reason,
    ) {
        let mut event = TraceEvent::new(self.tick, kind, action.name())
            .with_behavior(self.name.clone())
            .with_reason(reason.clone());
        if let Some(other) = other {
            event = event.with_other(other.name());
        }
        self.trace.emit(event);
    }

    fn emit_behavior(&mut self, kind: TraceKind) {
        let event = TraceEvent::new(self.tick, kind, self.name.clone()).with_behavior(self.name.clone());
        self.trace.emit(event);
    }

    pub(crate) fn refused(&mut self, refuser: ActionType, requester: ActionType, kind: RequestKind) {
        tracing::debug!(
            behavior = %self.name,
            refuser = %refuser,
            requester = %requester,
            request = ?kind,
            "request refused"
        );
        self.emit(TraceKind::Refused, refuser, Some(requester), &Reason::Borrowed(""));
    }
}

impl<W> Drop for Behavior<W>
where
    W: WorldMut + 'static,
{
    fn drop(&mut self) {
        if self.started && !self.stack.is_empty() {
            tracing::warn!(
                behavior = %self.name,
                depth = self.stack.depth(),
                "behavior dropped while running; stack discarded without terminate callbacks"
            );
        }
    }
}
