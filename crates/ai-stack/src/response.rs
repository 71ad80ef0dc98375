use crate::payload::Payload;
use crate::types::{ActionType, Priority, Reason, SuspendBehavior};

/// The kind of request carried by an [`EventResponse`], without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    None,
    Sustain,
    Change,
    Suspend,
    Done,
    TakeOver,
}

#[derive(Debug)]
pub enum EventRequest {
    /// Not interested; broadcast continues to the next action down the stack.
    None,
    /// Swallow the event so actions further down never see it.
    Sustain,
    ChangeTo {
        action: ActionType,
        payload: Option<Payload>,
    },
    SuspendFor {
        action: ActionType,
        payload: Option<Payload>,
        behavior: SuspendBehavior,
    },
    /// Finish the responding action.
    Done,
    /// Make the responding action the top of the stack.
    TakeOver,
}

/// What an action's event handler wants done, and how badly.
#[derive(Debug)]
pub struct EventResponse {
    pub request: EventRequest,
    pub priority: Priority,
    pub reason: Reason,
}

impl Default for EventResponse {
    fn default() -> Self {
        Self::none()
    }
}

impl EventResponse {
    pub fn none() -> Self {
        Self {
            request: EventRequest::None,
            priority: Priority::None,
            reason: Reason::Borrowed(""),
        }
    }

    pub fn sustain(priority: Priority) -> Self {
        Self {
            request: EventRequest::Sustain,
            priority,
            reason: Reason::Borrowed(""),
        }
    }

    /// Swallow the event at the lowest real priority.
    pub fn try_sustain() -> Self {
        Self::sustain(Priority::Try)
    }

    pub fn change_to(action: ActionType, priority: Priority, reason: impl Into<Reason>) -> Self {
        Self {
            request: EventRequest::ChangeTo {
                action,
                payload: None,
            },
            priority,
            reason: reason.into(),
        }
    }

    pub fn suspend_for(action: ActionType, priority: Priority, reason: impl Into<Reason>) -> Self {
        Self {
            request: EventRequest::SuspendFor {
                action,
                payload: None,
                behavior: SuspendBehavior::Normal,
            },
            priority,
            reason: reason.into(),
        }
    }

    pub fn done(priority: Priority, reason: impl Into<Reason>) -> Self {
        Self {
            request: EventRequest::Done,
            priority,
            reason: reason.into(),
        }
    }

    pub fn take_over(priority: Priority, reason: impl Into<Reason>) -> Self {
        Self {
            request: EventRequest::TakeOver,
            priority,
            reason: reason.into(),
        }
    }

    /// Set the suspend behavior. Only meaningful for suspend requests.
    pub fn with_behavior(mut self, value: SuspendBehavior) -> Self {
        if let EventRequest::SuspendFor { behavior, .. } = &mut self.request {
            *behavior = value;
        }
        self
    }

    /// Attach a start payload. Only meaningful for change and suspend requests.
    pub fn with_payload(mut self, value: Payload) -> Self {
        match &mut self.request {
            EventRequest::ChangeTo { payload, .. } | EventRequest::SuspendFor { payload, .. } => {
                *payload = Some(value);
            }
            _ => {}
        }
        self
    }

    pub fn kind(&self) -> RequestKind {
        match self.request {
            EventRequest::None => RequestKind::None,
            EventRequest::Sustain => RequestKind::Sustain,
            EventRequest::ChangeTo { .. } => RequestKind::Change,
            EventRequest::SuspendFor { .. } => RequestKind::Suspend,
            EventRequest::Done => RequestKind::Done,
            EventRequest::TakeOver => RequestKind::TakeOver,
        }
    }

    /// A request at priority `None` counts as no request at all.
    pub fn is_none(&self) -> bool {
        matches!(self.request, EventRequest::None) || self.priority == Priority::None
    }

    /// Change, suspend, done and take-over responses can mutate the stack; sustain cannot.
    pub fn is_change_class(&self) -> bool {
        !self.is_none() && !matches!(self.request, EventRequest::Sustain)
    }

    pub fn target(&self) -> Option<ActionType> {
        match self.request {
            EventRequest::ChangeTo { action, .. } | EventRequest::SuspendFor { action, .. } => {
                Some(action)
            }
            _ => None,
        }
    }

    pub fn suspend_behavior(&self) -> Option<SuspendBehavior> {
        match self.request {
            EventRequest::SuspendFor { behavior, .. } => Some(behavior),
            _ => None,
        }
    }

    /// Whether this response may replace `stored` as an action's pending response.
    ///
    /// Higher priority always wins; an equal priority only replaces a stored sustain.
    pub fn supersedes(&self, stored: &EventResponse) -> bool {
        if stored.is_none() {
            return true;
        }
        self.priority > stored.priority
            || (self.priority == stored.priority
                && matches!(stored.request, EventRequest::Sustain))
    }
}

/// What the dispatcher reports back to whoever delivered an event.
///
/// Arbitration runs at the next tick, so the stack may look different by the time the
/// stored request is acted upon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventReceipt {
    pub responder: ActionType,
    pub kind: RequestKind,
    pub priority: Priority,
    /// False when the response lost against a response already pending on the responder.
    pub stored: bool,
}

/// Question put to an action's request handler during arbitration: "may this buried
/// action's request go ahead?"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgreementRequest {
    pub requester: ActionType,
    pub kind: RequestKind,
    pub target: Option<ActionType>,
    pub priority: Priority,
    /// Effective suspend behavior after any takeover degradation.
    pub behavior: SuspendBehavior,
    /// How many actions sit above the requester, i.e. would be terminated by a
    /// `Normal` request.
    pub above_requester: usize,
    pub reason: Reason,
}

impl AgreementRequest {
    /// Accept only non-destructive suspends above `Try` priority.
    pub fn default_policy(&self) -> bool {
        let non_destructive = match self.behavior {
            SuspendBehavior::Append => true,
            SuspendBehavior::Normal => self.above_requester == 0,
            SuspendBehavior::Takeover | SuspendBehavior::TakeoverAppend => false,
        };
        self.kind == RequestKind::Suspend && non_destructive && self.priority > Priority::Try
    }
}

/// Offer made to an existing action to become the top of the stack.
#[derive(Debug)]
pub struct TakeoverRequest {
    pub requester: ActionType,
    /// The type being searched for; matches the candidate's own type.
    pub target: ActionType,
    pub priority: Priority,
    pub reason: Reason,
    /// Payload the requester meant for a fresh action; the candidate may take it.
    pub payload: Option<Payload>,
}
