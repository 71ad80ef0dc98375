mod common;

use std::cell::Cell;
use std::rc::Rc;

use ai_stack::{
    ActionType, Behavior, BehaviorStatus, EventResponse, Priority, SharedTraceLog, StackError,
    TraceKind,
};
use common::*;

#[test]
fn begin_without_initial_action_fails() {
    let mut world = ScriptWorld::default();
    let mut behavior = Behavior::new("empty", 7, Rc::new(registry()));

    let err = behavior.begin(&ctx(0), &mut world).unwrap_err();

    assert_eq!(
        err,
        StackError::MissingInitialAction {
            behavior: "empty".into()
        }
    );
    assert!(!behavior.has_begun());
    assert!(world.log.is_empty());
}

#[test]
fn begin_with_unregistered_initial_action_fails() {
    let mut world = ScriptWorld::default();
    let mut behavior = behavior(ActionType("ghost"));

    let err = behavior.begin(&ctx(0), &mut world).unwrap_err();

    assert_eq!(err, StackError::UnknownAction("ghost".into()));
    assert_eq!(behavior.status(), BehaviorStatus::Inactive);
}

#[test]
fn begin_twice_is_rejected() {
    let mut world = ScriptWorld::default();
    let mut behavior = behavior(IDLE);
    behavior.begin(&ctx(0), &mut world).expect("begin");

    let err = behavior.begin(&ctx(1), &mut world).unwrap_err();

    assert_eq!(err, StackError::AlreadyBegun("test".into()));
    assert_eq!(shape(&behavior), vec!["idle"]);
}

#[test]
fn run_and_events_before_begin_do_nothing() {
    let mut world = ScriptWorld::default();
    let mut behavior = behavior(IDLE);
    world.reply(IDLE, EventResponse::try_sustain());

    assert_eq!(behavior.run(&ctx(0), &mut world), BehaviorStatus::Inactive);
    assert!(behavior.handle_event(&mut world, &ping()).is_none());
    assert!(world.log.is_empty());
}

#[test]
fn stop_tears_down_top_first_and_is_idempotent() {
    let mut world = ScriptWorld::default();
    let mut behavior = stacked(&mut world, &[IDLE, PATROL, ALERT]);
    let completions = Rc::new(Cell::new(0));
    let seen = Rc::clone(&completions);
    behavior.on_complete(move |_| seen.set(seen.get() + 1));

    behavior.stop(&ctx(1), &mut world, true);
    behavior.stop(&ctx(2), &mut world, true);

    assert_eq!(
        world.take_log(),
        vec![
            "terminate:alert->none",
            "terminate:patrol->none",
            "terminate:idle->none"
        ]
    );
    assert_eq!(behavior.depth(), 0);
    assert!(behavior.action_stack().is_empty());
    assert_eq!(completions.get(), 1);
    assert_eq!(behavior.status(), BehaviorStatus::Complete);
}

#[test]
fn stop_without_completion_leaves_the_behavior_inactive() {
    let mut world = ScriptWorld::default();
    let mut behavior = stacked(&mut world, &[IDLE]);
    let completions = Rc::new(Cell::new(0));
    let seen = Rc::clone(&completions);
    behavior.on_complete(move |_| seen.set(seen.get() + 1));

    behavior.stop(&ctx(1), &mut world, false);

    assert_eq!(completions.get(), 0);
    assert_eq!(behavior.status(), BehaviorStatus::Inactive);
    assert!(!behavior.is_complete());
}

#[test]
fn stop_skips_callbacks_when_the_agent_is_gone() {
    let mut world = ScriptWorld::default();
    let mut behavior = stacked(&mut world, &[IDLE, PATROL]);
    world.agent_gone = true;

    behavior.stop(&ctx(1), &mut world, true);

    assert!(world.log.is_empty());
    assert_eq!(behavior.depth(), 0);
    assert!(behavior.is_complete());
}

#[test]
fn stopped_behavior_ignores_events_and_runs() {
    let mut world = ScriptWorld::default();
    let mut behavior = stacked(&mut world, &[IDLE]);
    behavior.stop(&ctx(1), &mut world, false);
    world.take_log();
    world.reply(IDLE, EventResponse::try_sustain());

    assert!(behavior.handle_event(&mut world, &ping()).is_none());
    behavior.run(&ctx(2), &mut world);
    assert!(world.log.is_empty());
}

#[test]
fn dropping_a_running_behavior_makes_no_callbacks() {
    let mut world = ScriptWorld::default();
    let behavior = stacked(&mut world, &[IDLE, PATROL]);

    drop(behavior);

    assert!(world.log.is_empty());
}

#[test]
fn views_describe_the_stack_root_first() {
    let mut world = ScriptWorld::default();
    let behavior = stacked(&mut world, &[IDLE, PATROL, ALERT]);

    let views = behavior.action_stack();

    assert_eq!(views.len(), 3);
    assert_eq!(views[0].previous, None);
    assert_eq!(views[1].previous, Some(views[0].id));
    assert_eq!(views[2].previous, Some(views[1].id));
    assert_eq!(views[0].next, Some(views[1].id));
    assert_eq!(views[2].next, None);
    assert_eq!(behavior.top_action().map(|v| v.action), Some(ALERT));
    assert_eq!(behavior.stack().root(), Some(views[0].id));
}

#[test]
fn trace_records_each_transition() {
    let mut world = ScriptWorld::default();
    let trace = SharedTraceLog::new();
    let mut behavior = behavior(IDLE).with_trace_sink(trace.clone());
    behavior.begin(&ctx(0), &mut world).expect("begin");
    world.reply(IDLE, EventResponse::suspend_for(FLEE, Priority::Critical, "hurt"));
    behavior.handle_event(&mut world, &ping());
    behavior.run(&ctx(1), &mut world);
    behavior.stop(&ctx(2), &mut world, true);

    assert_eq!(
        trace.log().kinds(),
        vec![
            TraceKind::Begin,
            TraceKind::Start,
            TraceKind::EventStored,
            TraceKind::Suspend,
            TraceKind::Start,
            TraceKind::Terminate,
            TraceKind::Terminate,
            TraceKind::Stop,
            TraceKind::Complete,
        ]
    );
    let suspend = trace
        .log()
        .of_kind(TraceKind::Suspend)
        .next()
        .cloned()
        .expect("suspend event");
    assert_eq!(suspend.tick, 1);
    assert_eq!(suspend.behavior, "test");
    assert_eq!(suspend.action, "idle");
    assert_eq!(suspend.other.as_deref(), Some("flee"));
    assert_eq!(suspend.reason, "hurt");
}
