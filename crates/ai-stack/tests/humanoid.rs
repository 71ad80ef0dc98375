use std::rc::Rc;

use ai_stack::humanoid::{humanoid_behavior, humanoid_registry, FLEE, HUMANOID_IDLE, INVESTIGATE, INVESTIGATE_MESSAGE};
use ai_stack::{
    Behavior, Event, GeneralMessage, MoveRequest, MoveRequestId, MoveRequestResult, MovementWorld,
    PathFollowingResult, RequestKind, TickContext, Vec3, WorldMut, WorldView,
};

#[derive(Default)]
struct MoveWorld {
    next_request: u32,
    requests: Vec<(MoveRequestId, Vec3)>,
    no_paths: bool,
}

impl WorldView for MoveWorld {
    type Agent = u32;
}

impl WorldMut for MoveWorld {}

impl MovementWorld for MoveWorld {
    fn move_to_goal(&mut self, _agent: u32, request: &MoveRequest<u32>) -> MoveRequestResult {
        if self.no_paths {
            return MoveRequestResult::failed();
        }
        self.next_request += 1;
        let id = MoveRequestId(self.next_request);
        self.requests.push((id, request.dest));
        MoveRequestResult::accepted(id)
    }
}

impl MoveWorld {
    fn last_request(&self) -> (MoveRequestId, Vec3) {
        *self.requests.last().expect("a move request")
    }
}

fn ctx(tick: u64) -> TickContext {
    TickContext::new(tick, 0.5)
}

fn sound(x: f32, volume: f32) -> Event<u32> {
    Event::Sound {
        source: None,
        location: Vec3::new(x, 0.0, 0.0),
        volume,
        flags: 0,
    }
}

fn damage() -> Event<u32> {
    Event::TakeDamage {
        amount: 10.0,
        instigator: Some(99),
        causer: None,
    }
}

fn shape(behavior: &Behavior<MoveWorld>) -> Vec<&'static str> {
    behavior.action_stack().iter().map(|v| v.action.name()).collect()
}

fn started(world: &mut MoveWorld) -> Behavior<MoveWorld> {
    let mut behavior = humanoid_behavior(1, Rc::new(humanoid_registry()));
    behavior.begin(&ctx(0), world).expect("begin");
    behavior
}

#[test]
fn sightings_are_swallowed_by_idle() {
    let mut world = MoveWorld::default();
    let mut behavior = started(&mut world);

    let receipt = behavior
        .handle_event(
            &mut world,
            &Event::Sight {
                subject: 5,
                indirect: false,
            },
        )
        .expect("receipt");
    behavior.run(&ctx(1), &mut world);

    assert_eq!(receipt.responder, HUMANOID_IDLE);
    assert_eq!(receipt.kind, RequestKind::Sustain);
    assert_eq!(shape(&behavior), vec![HUMANOID_IDLE.name()]);
    assert_eq!(
        behavior.top_action().and_then(|v| v.label).as_deref(),
        Some("idle (noticed 1)")
    );
}

#[test]
fn loud_sound_sends_the_humanoid_to_investigate() {
    let mut world = MoveWorld::default();
    let mut behavior = started(&mut world);

    assert!(behavior.handle_event(&mut world, &sound(1.0, 0.1)).is_none());
    behavior.handle_event(&mut world, &sound(5.0, 1.0)).expect("heard");
    behavior.run(&ctx(1), &mut world);

    assert_eq!(shape(&behavior), vec![HUMANOID_IDLE.name(), INVESTIGATE.name()]);
    assert_eq!(world.last_request().1, Vec3::new(5.0, 0.0, 0.0));

    let (request, _) = world.last_request();
    behavior
        .handle_event(
            &mut world,
            &Event::MoveToComplete {
                request,
                result: PathFollowingResult::Success,
            },
        )
        .expect("arrived");
    behavior.run(&ctx(2), &mut world);

    assert_eq!(shape(&behavior), vec![HUMANOID_IDLE.name()]);
}

#[test]
fn new_sound_retargets_the_running_investigation() {
    let mut world = MoveWorld::default();
    let mut behavior = started(&mut world);
    behavior.handle_event(&mut world, &sound(5.0, 1.0));
    behavior.run(&ctx(1), &mut world);
    let investigate = behavior.top_action().expect("top").id;

    behavior.handle_event(&mut world, &sound(9.0, 1.0)).expect("heard again");
    behavior.run(&ctx(2), &mut world);

    let top = behavior.top_action().expect("top");
    assert_eq!(top.id, investigate);
    assert_eq!(top.label.as_deref(), Some("investigating (9.0, 0.0, 0.0)"));
    assert_eq!(world.requests.len(), 2);

    // Completion of the superseded move is ignored.
    let stale = world.requests[0].0;
    assert!(behavior
        .handle_event(
            &mut world,
            &Event::MoveToComplete {
                request: stale,
                result: PathFollowingResult::Aborted,
            },
        )
        .is_none());
}

#[test]
fn unreachable_retarget_replaces_the_investigation() {
    let mut world = MoveWorld::default();
    let mut behavior = started(&mut world);
    behavior.handle_event(&mut world, &sound(5.0, 1.0));
    behavior.run(&ctx(1), &mut world);
    let (first, _) = world.last_request();

    world.no_paths = true;
    behavior.handle_event(&mut world, &sound(9.0, 1.0)).expect("heard again");
    behavior.run(&ctx(2), &mut world);

    // The declined takeover falls back to a fresh Investigate, which finds no path either.
    assert_eq!(shape(&behavior), vec![HUMANOID_IDLE.name()]);
    assert_eq!(world.requests.len(), 1);
    assert!(behavior.stack().links_are_consistent());

    // The old move finishing has nobody left to report to.
    assert!(behavior
        .handle_event(
            &mut world,
            &Event::MoveToComplete {
                request: first,
                result: PathFollowingResult::Success,
            },
        )
        .is_none());
}

#[test]
fn unreachable_sound_is_abandoned_immediately() {
    let mut world = MoveWorld {
        no_paths: true,
        ..MoveWorld::default()
    };
    let mut behavior = started(&mut world);

    behavior.handle_event(&mut world, &sound(5.0, 1.0));
    behavior.run(&ctx(1), &mut world);

    assert_eq!(shape(&behavior), vec![HUMANOID_IDLE.name()]);
}

#[test]
fn damage_interrupts_an_investigation_to_flee() {
    let mut world = MoveWorld::default();
    let mut behavior = started(&mut world);
    behavior.handle_event(&mut world, &sound(5.0, 1.0));
    behavior.run(&ctx(1), &mut world);

    let receipt = behavior.handle_event(&mut world, &damage()).expect("hurt");
    assert_eq!(receipt.responder, HUMANOID_IDLE);
    behavior.run(&ctx(2), &mut world);

    assert_eq!(shape(&behavior), vec![HUMANOID_IDLE.name(), FLEE.name()]);
}

#[test]
fn flee_ignores_sounds_and_runs_out_its_clock() {
    let mut world = MoveWorld::default();
    let mut behavior = started(&mut world);
    behavior.handle_event(&mut world, &damage());
    behavior.run(&ctx(1), &mut world);
    assert_eq!(shape(&behavior), vec![HUMANOID_IDLE.name(), FLEE.name()]);

    // Idle answers, but its suspend is below the flee floor.
    behavior.handle_event(&mut world, &sound(5.0, 1.0)).expect("heard");
    behavior.run(&ctx(2), &mut world);
    assert_eq!(shape(&behavior), vec![HUMANOID_IDLE.name(), FLEE.name()]);

    // More damage resets the clock instead of stacking another flee.
    let receipt = behavior.handle_event(&mut world, &damage()).expect("hurt again");
    assert_eq!(receipt.responder, FLEE);
    assert_eq!(receipt.kind, RequestKind::Sustain);

    let mut tick = 3;
    while behavior.depth() > 1 {
        behavior.run(&ctx(tick), &mut world);
        tick += 1;
        assert!(tick < 20, "flee never finished");
    }
    assert_eq!(shape(&behavior), vec![HUMANOID_IDLE.name()]);
}

#[test]
fn investigate_message_carries_its_location() {
    let mut world = MoveWorld::default();
    let mut behavior = started(&mut world);

    let message = GeneralMessage::new(INVESTIGATE_MESSAGE).with_data(Vec3::new(2.0, 3.0, 0.0));
    behavior
        .handle_event(&mut world, &Event::Message(message))
        .expect("told");
    behavior.run(&ctx(1), &mut world);

    assert_eq!(shape(&behavior), vec![HUMANOID_IDLE.name(), INVESTIGATE.name()]);
    assert_eq!(world.last_request().1, Vec3::new(2.0, 3.0, 0.0));
}
