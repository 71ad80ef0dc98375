use std::cell::RefCell;
use std::rc::Rc;

use ai_tools::{SharedTraceLog, TraceEvent, TraceKind, TraceLog, TraceSink, VecTraceSink};

#[derive(Clone, Default)]
struct RcSink(Rc<RefCell<Vec<TraceEvent>>>);

impl TraceSink for RcSink {
    fn emit(&mut self, event: TraceEvent) {
        self.0.borrow_mut().push(event);
    }
}

#[test]
fn builders_fill_every_field() {
    let event = TraceEvent::new(4, TraceKind::Change, "idle")
        .with_behavior("humanoid")
        .with_other("patrol")
        .with_reason("bored");

    assert_eq!(event.tick, 4);
    assert_eq!(event.tag(), "stack.change");
    assert_eq!(event.behavior, "humanoid");
    assert_eq!(event.action, "idle");
    assert_eq!(event.other.as_deref(), Some("patrol"));
    assert_eq!(event.reason, "bored");
}

#[test]
fn boxed_sinks_receive_events() {
    let handle = RcSink::default();
    let shared = handle.0.clone();
    let mut sink: Box<dyn TraceSink> = Box::new(handle);

    sink.emit(TraceEvent::new(2, TraceKind::Suspend, "idle").with_other("flee"));

    let events = shared.borrow();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, TraceKind::Suspend);
    assert_eq!(events[0].other.as_deref(), Some("flee"));
}

#[test]
fn shared_log_is_readable_from_another_handle() {
    let log = SharedTraceLog::new();
    let mut sink: Box<dyn TraceSink> = Box::new(log.clone());

    sink.emit(TraceEvent::new(1, TraceKind::Start, "idle"));
    sink.emit(TraceEvent::new(1, TraceKind::Done, "idle"));

    assert_eq!(log.log().kinds(), vec![TraceKind::Start, TraceKind::Done]);
    assert_eq!(log.log().of_kind(TraceKind::Done).count(), 1);

    let taken = log.take();
    assert_eq!(taken.events.len(), 2);
    assert!(log.log().events.is_empty());
}

#[test]
fn vec_sink_and_log_agree() {
    let mut sink = VecTraceSink::default();
    let mut log = TraceLog::default();
    for kind in [TraceKind::Begin, TraceKind::Start, TraceKind::Stop] {
        let event = TraceEvent::new(0, kind, "idle");
        sink.emit(event.clone());
        log.push(event);
    }
    assert_eq!(sink.events, log.events);
}
