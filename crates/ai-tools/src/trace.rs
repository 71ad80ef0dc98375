#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cell::{Ref, RefCell};
use std::rc::Rc;

/// The kind of stack transition (or arbitration decision) a trace event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TraceKind {
    Begin,
    Start,
    Change,
    Suspend,
    Resume,
    Done,
    Terminate,
    TakeOver,
    EventStored,
    EventDropped,
    SuspendIgnored,
    Collision,
    Refused,
    Stop,
    Complete,
}

impl TraceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TraceKind::Begin => "stack.begin",
            TraceKind::Start => "stack.start",
            TraceKind::Change => "stack.change",
            TraceKind::Suspend => "stack.suspend",
            TraceKind::Resume => "stack.resume",
            TraceKind::Done => "stack.done",
            TraceKind::Terminate => "stack.terminate",
            TraceKind::TakeOver => "stack.take_over",
            TraceKind::EventStored => "event.stored",
            TraceKind::EventDropped => "event.dropped",
            TraceKind::SuspendIgnored => "event.suspend_ignored",
            TraceKind::Collision => "event.collision",
            TraceKind::Refused => "event.refused",
            TraceKind::Stop => "behavior.stop",
            TraceKind::Complete => "behavior.complete",
        }
    }
}

/// A small, allocation-friendly trace event.
///
/// This is "dumb data" so it can be recorded during simulation and rendered later by
/// tooling. `action` is the action the event is about; `other` is the counterpart when
/// there is one (the successor of a change, the interrupter of a suspend, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceEvent {
    pub tick: u64,
    pub kind: TraceKind,
    pub behavior: Cow<'static, str>,
    pub action: Cow<'static, str>,
    pub other: Option<Cow<'static, str>>,
    pub reason: Cow<'static, str>,
}

impl TraceEvent {
    pub fn new(tick: u64, kind: TraceKind, action: impl Into<Cow<'static, str>>) -> Self {
        Self {
            tick,
            kind,
            behavior: Cow::Borrowed(""),
            action: action.into(),
            other: None,
            reason: Cow::Borrowed(""),
        }
    }

    pub fn with_behavior(mut self, behavior: impl Into<Cow<'static, str>>) -> Self {
        self.behavior = behavior.into();
        self
    }

    pub fn with_other(mut self, other: impl Into<Cow<'static, str>>) -> Self {
        self.other = Some(other.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<Cow<'static, str>>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn tag(&self) -> &'static str {
        self.kind.as_str()
    }
}

pub trait TraceSink {
    fn emit(&mut self, event: TraceEvent);
}

#[derive(Debug, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn emit(&mut self, _event: TraceEvent) {}
}

#[derive(Debug, Default)]
pub struct VecTraceSink {
    pub events: Vec<TraceEvent>,
}

impl TraceSink for VecTraceSink {
    fn emit(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

/// Forwards every event to `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn emit(&mut self, event: TraceEvent) {
        tracing::debug!(
            tick = event.tick,
            behavior = %event.behavior,
            action = %event.action,
            other = ?event.other,
            reason = %event.reason,
            "{}",
            event.kind.as_str()
        );
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceLog {
    pub events: Vec<TraceEvent>,
}

impl TraceLog {
    pub fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    pub fn kinds(&self) -> Vec<TraceKind> {
        self.events.iter().map(|e| e.kind).collect()
    }

    pub fn of_kind(&self, kind: TraceKind) -> impl Iterator<Item = &TraceEvent> {
        self.events.iter().filter(move |e| e.kind == kind)
    }
}

/// A cloneable handle onto one [`TraceLog`].
///
/// Install one clone as a sink and keep another to read the log back; everything runs on
/// the simulation thread, so a `RefCell` is enough.
#[derive(Debug, Default, Clone)]
pub struct SharedTraceLog(Rc<RefCell<TraceLog>>);

impl SharedTraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> Ref<'_, TraceLog> {
        self.0.borrow()
    }

    pub fn take(&self) -> TraceLog {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

impl TraceSink for SharedTraceLog {
    fn emit(&mut self, event: TraceEvent) {
        self.0.borrow_mut().push(event);
    }
}
