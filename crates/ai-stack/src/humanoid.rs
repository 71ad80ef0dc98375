//! Reference actions for a humanoid that sees, hears and gets hurt.
//!
//! `HumanoidIdle` sits at the root and reacts to sensing: loud sounds push an
//! `Investigate` on top (or retarget the one already running), damage suspends
//! everything for `Flee`.

use std::borrow::Cow;
use std::rc::Rc;

use crate::behavior::Behavior;
use crate::events::{Event, EventCategories, MoveRequestId, Vec3};
use crate::movement::{MoveRequest, MoveRequestResult, MovementWorld, PathRequestCode};
use crate::payload::Payload;
use crate::registry::ActionRegistry;
use crate::response::{AgreementRequest, EventResponse, TakeoverRequest};
use crate::result::ActionResult;
use crate::types::{ActionType, Priority, SuspendBehavior};
use crate::{Action, AgentId, TickContext};

pub const HUMANOID_IDLE: ActionType = ActionType("humanoid.idle");
pub const INVESTIGATE: ActionType = ActionType("humanoid.investigate");
pub const FLEE: ActionType = ActionType("humanoid.flee");

/// Name of the general message that sends the humanoid to a location (`Vec3` data).
pub const INVESTIGATE_MESSAGE: &str = "humanoid.investigate";

/// Sounds quieter than this are ignored.
pub const HEARING_THRESHOLD: f32 = 0.5;

#[derive(Debug, Default)]
pub struct HumanoidIdle {
    noticed: u32,
    last_seen: Option<u64>,
}

impl HumanoidIdle {
    pub fn noticed(&self) -> u32 {
        self.noticed
    }

    fn investigate(location: Vec3, priority: Priority, reason: &'static str) -> EventResponse {
        EventResponse::suspend_for(INVESTIGATE, priority, reason)
            .with_behavior(SuspendBehavior::TakeoverAppend)
            .with_payload(Payload::new(location))
    }
}

impl<W: MovementWorld + 'static> Action<W> for HumanoidIdle {
    fn update(&mut self, _ctx: &TickContext, _agent: W::Agent, _world: &mut W) -> ActionResult {
        ActionResult::Continue
    }

    fn on_event(&mut self, agent: W::Agent, _world: &mut W, event: &Event<W::Agent>) -> EventResponse {
        match event {
            Event::Sight { subject, indirect } => {
                self.noticed += 1;
                self.last_seen = Some(subject.stable_id());
                tracing::debug!(
                    agent = agent.stable_id(),
                    subject = subject.stable_id(),
                    indirect = *indirect,
                    "noticed someone"
                );
                EventResponse::try_sustain()
            }
            Event::SightLost { subject } => {
                if self.last_seen == Some(subject.stable_id()) {
                    self.last_seen = None;
                }
                tracing::debug!(agent = agent.stable_id(), subject = subject.stable_id(), "lost sight");
                EventResponse::try_sustain()
            }
            Event::Sound {
                location, volume, ..
            } if *volume >= HEARING_THRESHOLD => {
                Self::investigate(*location, Priority::Important, "heard something")
            }
            Event::Message(message) if message.is(INVESTIGATE_MESSAGE) => match message.data::<Vec3>() {
                Some(location) => Self::investigate(*location, Priority::Try, "told to investigate"),
                None => EventResponse::none(),
            },
            Event::TakeDamage { amount, .. } if *amount > 0.0 => {
                EventResponse::suspend_for(FLEE, Priority::Critical, "hurt")
            }
            _ => EventResponse::none(),
        }
    }

    fn label(&self) -> Option<Cow<'static, str>> {
        Some(Cow::Owned(format!("idle (noticed {})", self.noticed)))
    }

    fn save_state(&self) -> Option<Vec<u8>> {
        Some(self.noticed.to_le_bytes().to_vec())
    }

    fn load_state(&mut self, state: &[u8]) {
        if let Ok(bytes) = <[u8; 4]>::try_from(state) {
            self.noticed = u32::from_le_bytes(bytes);
        }
    }
}

/// Walk to a location (the start payload) and finish on arrival.
#[derive(Debug)]
pub struct Investigate {
    target: Vec3,
    request: Option<MoveRequestId>,
    elapsed: f32,
    give_up_after: f32,
}

impl Default for Investigate {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            request: None,
            elapsed: 0.0,
            give_up_after: 15.0,
        }
    }
}

impl Investigate {
    pub fn target(&self) -> Vec3 {
        self.target
    }

    fn request_move<W: MovementWorld>(agent: W::Agent, world: &mut W, target: Vec3) -> MoveRequestResult {
        world.move_to_goal(agent, &MoveRequest::to(target).with_acceptance_radius(1.0))
    }

    fn head_to<W: MovementWorld>(&mut self, agent: W::Agent, world: &mut W, target: Vec3) -> ActionResult {
        self.target = target;
        self.elapsed = 0.0;
        let result = Self::request_move(agent, world, target);
        match result.code {
            PathRequestCode::RequestSuccessful => {
                self.request = result.request;
                ActionResult::Continue
            }
            PathRequestCode::AlreadyAtGoal => ActionResult::done("already there"),
            PathRequestCode::Failed => ActionResult::done("no path"),
        }
    }
}

impl<W: MovementWorld + 'static> Action<W> for Investigate {
    fn start(
        &mut self,
        _ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        payload: Option<Payload>,
    ) -> ActionResult {
        match payload.and_then(|p| p.downcast::<Vec3>().ok()) {
            Some(target) => self.head_to(agent, world, target),
            None => ActionResult::done("nowhere to investigate"),
        }
    }

    fn update(&mut self, ctx: &TickContext, _agent: W::Agent, _world: &mut W) -> ActionResult {
        self.elapsed += ctx.dt_seconds;
        if self.elapsed >= self.give_up_after {
            return ActionResult::done("gave up");
        }
        ActionResult::Continue
    }

    // Interruptions replace an investigation rather than pausing it.
    fn suspend(&mut self, _ctx: &TickContext, _agent: W::Agent, _world: &mut W, _interrupting: ActionType) -> bool {
        false
    }

    fn on_event(&mut self, _agent: W::Agent, _world: &mut W, event: &Event<W::Agent>) -> EventResponse {
        match event {
            Event::MoveToComplete { request, result } if Some(*request) == self.request => {
                tracing::debug!(?result, "investigation move finished");
                EventResponse::done(Priority::Important, "arrived")
            }
            _ => EventResponse::none(),
        }
    }

    fn on_request(&mut self, _agent: W::Agent, _world: &W, request: &AgreementRequest) -> bool {
        request.priority >= Priority::Critical || request.default_policy()
    }

    /// A newer sound retargets the running investigation.
    fn on_takeover(
        &mut self,
        _ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        request: &mut TakeoverRequest,
    ) -> bool {
        let Some(target) = request.payload.as_ref().and_then(|p| p.downcast_ref::<Vec3>()).copied() else {
            return false;
        };
        // Retarget only once the new move is under way; otherwise the request degrades to a
        // fresh Investigate.
        let result = Self::request_move(agent, world, target);
        if result.code != PathRequestCode::RequestSuccessful {
            tracing::debug!(code = ?result.code, "declined retarget");
            return false;
        }
        request.payload = None;
        self.target = target;
        self.elapsed = 0.0;
        self.request = result.request;
        true
    }

    fn label(&self) -> Option<Cow<'static, str>> {
        Some(Cow::Owned(format!(
            "investigating ({:.1}, {:.1}, {:.1})",
            self.target.x, self.target.y, self.target.z
        )))
    }

    fn save_state(&self) -> Option<Vec<u8>> {
        let mut bytes = Vec::with_capacity(12);
        for value in [self.target.x, self.target.y, self.target.z] {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        Some(bytes)
    }

    fn load_state(&mut self, state: &[u8]) {
        let mut values = state
            .chunks_exact(4)
            .filter_map(|chunk| <[u8; 4]>::try_from(chunk).ok())
            .map(f32::from_le_bytes);
        if let (Some(x), Some(y), Some(z)) = (values.next(), values.next(), values.next()) {
            self.target = Vec3::new(x, y, z);
        }
    }
}

/// Run from danger for a fixed time. Further damage restarts the clock.
#[derive(Debug)]
pub struct Flee {
    remaining: f32,
    duration: f32,
}

impl Flee {
    pub fn new(duration: f32) -> Self {
        Self {
            remaining: duration,
            duration,
        }
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}

impl Default for Flee {
    fn default() -> Self {
        Self::new(3.0)
    }
}

impl<W: MovementWorld + 'static> Action<W> for Flee {
    fn start(&mut self, _ctx: &TickContext, _agent: W::Agent, _world: &mut W, _payload: Option<Payload>) -> ActionResult {
        self.remaining = self.duration;
        ActionResult::Continue
    }

    fn update(&mut self, ctx: &TickContext, _agent: W::Agent, _world: &mut W) -> ActionResult {
        self.remaining -= ctx.dt_seconds;
        if self.remaining <= 0.0 {
            ActionResult::done("safe")
        } else {
            ActionResult::Continue
        }
    }

    fn on_event(&mut self, _agent: W::Agent, _world: &mut W, event: &Event<W::Agent>) -> EventResponse {
        match event {
            Event::TakeDamage { .. } => {
                self.remaining = self.duration;
                EventResponse::sustain(Priority::Important)
            }
            _ => EventResponse::none(),
        }
    }

    fn suspend_priority(&self) -> Priority {
        Priority::Critical
    }

    fn label(&self) -> Option<Cow<'static, str>> {
        Some(Cow::Borrowed("fleeing"))
    }
}

pub fn humanoid_registry<W: MovementWorld + 'static>() -> ActionRegistry<W> {
    ActionRegistry::new()
        .with(
            HUMANOID_IDLE,
            EventCategories::SENSING | EventCategories::GENERAL | EventCategories::INFLICTION,
            HumanoidIdle::default,
        )
        .with(INVESTIGATE, EventCategories::MOVEMENT, Investigate::default)
        .with(FLEE, EventCategories::INFLICTION, Flee::default)
}

/// A ready-to-begin humanoid behavior rooted at [`HumanoidIdle`].
pub fn humanoid_behavior<W: MovementWorld + 'static>(
    agent: W::Agent,
    registry: Rc<ActionRegistry<W>>,
) -> Behavior<W> {
    Behavior::new("humanoid", agent, registry).with_initial_action(HUMANOID_IDLE)
}
