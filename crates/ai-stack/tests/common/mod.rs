#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use ai_stack::{
    Action, ActionRegistry, ActionResult, ActionType, AgreementRequest, Behavior, Event,
    EventCategories, EventResponse, Payload, Priority, TakeoverRequest, TickContext, WorldMut,
    WorldView,
};

/// A world whose actions do whatever the test queued up for them and log every
/// lifecycle call.
#[derive(Default)]
pub struct ScriptWorld {
    pub log: Vec<String>,
    pub agent_gone: bool,
    pub on_start: HashMap<&'static str, VecDeque<ActionResult>>,
    pub on_update: HashMap<&'static str, VecDeque<ActionResult>>,
    pub on_resume: HashMap<&'static str, VecDeque<ActionResult>>,
    /// Responses handed out, one per delivered message, by the action of that type.
    pub replies: HashMap<&'static str, VecDeque<EventResponse>>,
    pub refuse_requests: HashSet<&'static str>,
    pub refuse_suspend: HashSet<&'static str>,
    pub accept_takeover: HashSet<&'static str>,
}

impl WorldView for ScriptWorld {
    type Agent = u64;

    fn is_agent_valid(&self, _agent: u64) -> bool {
        !self.agent_gone
    }
}

impl WorldMut for ScriptWorld {}

impl ScriptWorld {
    pub fn start_with(&mut self, action: ActionType, result: ActionResult) -> &mut Self {
        self.on_start.entry(action.name()).or_default().push_back(result);
        self
    }

    pub fn update_with(&mut self, action: ActionType, result: ActionResult) -> &mut Self {
        self.on_update.entry(action.name()).or_default().push_back(result);
        self
    }

    pub fn resume_with(&mut self, action: ActionType, result: ActionResult) -> &mut Self {
        self.on_resume.entry(action.name()).or_default().push_back(result);
        self
    }

    pub fn reply(&mut self, action: ActionType, response: EventResponse) -> &mut Self {
        self.replies.entry(action.name()).or_default().push_back(response);
        self
    }

    pub fn take_log(&mut self) -> Vec<String> {
        std::mem::take(&mut self.log)
    }

    fn next(
        queue: &mut HashMap<&'static str, VecDeque<ActionResult>>,
        action: ActionType,
    ) -> ActionResult {
        queue
            .get_mut(action.name())
            .and_then(VecDeque::pop_front)
            .unwrap_or(ActionResult::Continue)
    }
}

pub struct Scripted {
    kind: ActionType,
    floor: Priority,
}

impl Scripted {
    pub fn new(kind: ActionType) -> Self {
        Self {
            kind,
            floor: Priority::None,
        }
    }

    pub fn with_floor(mut self, floor: Priority) -> Self {
        self.floor = floor;
        self
    }
}

impl Action<ScriptWorld> for Scripted {
    fn start(
        &mut self,
        _ctx: &TickContext,
        _agent: u64,
        world: &mut ScriptWorld,
        payload: Option<Payload>,
    ) -> ActionResult {
        match payload.as_ref().and_then(|p| p.downcast_ref::<&'static str>()) {
            Some(data) => world.log.push(format!("start:{}({})", self.kind, data)),
            None => world.log.push(format!("start:{}", self.kind)),
        }
        ScriptWorld::next(&mut world.on_start, self.kind)
    }

    fn update(&mut self, _ctx: &TickContext, _agent: u64, world: &mut ScriptWorld) -> ActionResult {
        world.log.push(format!("update:{}", self.kind));
        ScriptWorld::next(&mut world.on_update, self.kind)
    }

    fn suspend(
        &mut self,
        _ctx: &TickContext,
        _agent: u64,
        world: &mut ScriptWorld,
        interrupting: ActionType,
    ) -> bool {
        world.log.push(format!("suspend:{}<-{}", self.kind, interrupting));
        !world.refuse_suspend.contains(self.kind.name())
    }

    fn resume(
        &mut self,
        _ctx: &TickContext,
        _agent: u64,
        world: &mut ScriptWorld,
        resumed_from: ActionType,
    ) -> ActionResult {
        world.log.push(format!("resume:{}<-{}", self.kind, resumed_from));
        ScriptWorld::next(&mut world.on_resume, self.kind)
    }

    fn terminate(
        &mut self,
        _ctx: &TickContext,
        _agent: u64,
        world: &mut ScriptWorld,
        next: Option<ActionType>,
    ) {
        let next = next.map_or("none", |n| n.name());
        world.log.push(format!("terminate:{}->{}", self.kind, next));
    }

    fn on_event(&mut self, _agent: u64, world: &mut ScriptWorld, event: &Event<u64>) -> EventResponse {
        if !matches!(event, Event::Message(_)) {
            return EventResponse::none();
        }
        world
            .replies
            .get_mut(self.kind.name())
            .and_then(VecDeque::pop_front)
            .unwrap_or_default()
    }

    fn on_request(&mut self, _agent: u64, world: &ScriptWorld, _request: &AgreementRequest) -> bool {
        !world.refuse_requests.contains(self.kind.name())
    }

    fn on_takeover(
        &mut self,
        _ctx: &TickContext,
        _agent: u64,
        world: &mut ScriptWorld,
        request: &mut TakeoverRequest,
    ) -> bool {
        let accepted = world.accept_takeover.contains(self.kind.name());
        if accepted {
            world.log.push(format!("takeover:{}<-{}", self.kind, request.requester));
        }
        accepted
    }

    fn suspend_priority(&self) -> Priority {
        self.floor
    }
}

pub const IDLE: ActionType = ActionType("idle");
pub const PATROL: ActionType = ActionType("patrol");
pub const COMBAT: ActionType = ActionType("combat");
pub const FLEE: ActionType = ActionType("flee");
pub const ALERT: ActionType = ActionType("alert");
pub const HIDE: ActionType = ActionType("hide");

pub fn registry() -> ActionRegistry<ScriptWorld> {
    let mut registry = ActionRegistry::new();
    for kind in [IDLE, PATROL, COMBAT, FLEE, ALERT, HIDE] {
        registry.register(kind, EventCategories::GENERAL, move || Scripted::new(kind));
    }
    registry
}

pub fn behavior(initial: ActionType) -> Behavior<ScriptWorld> {
    Behavior::new("test", 7, Rc::new(registry())).with_initial_action(initial)
}

pub fn ctx(tick: u64) -> TickContext {
    TickContext::new(tick, 0.1)
}

pub fn ping() -> Event<u64> {
    Event::message("ping")
}

/// Action type names, root first.
pub fn shape(behavior: &Behavior<ScriptWorld>) -> Vec<&'static str> {
    behavior.action_stack().iter().map(|v| v.action.name()).collect()
}

/// Build a stack by beginning with `kinds[0]` and suspending for each following type
/// from the start of the one before it.
pub fn stacked(world: &mut ScriptWorld, kinds: &[ActionType]) -> Behavior<ScriptWorld> {
    for pair in kinds.windows(2) {
        world.start_with(pair[0], ActionResult::suspend_for(pair[1], "setup"));
    }
    let mut behavior = behavior(kinds[0]);
    behavior.begin(&ctx(0), world).expect("begin");
    world.take_log();
    behavior
}
