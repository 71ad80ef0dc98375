use crate::payload::Payload;
use crate::types::{ActionType, Reason, SuspendBehavior};

/// What an action's `start`, `update` or `resume` step asks the stack to do next.
#[derive(Debug)]
pub enum ActionResult {
    Continue,
    /// Replace this action with a new one of type `action`.
    ChangeTo {
        action: ActionType,
        payload: Option<Payload>,
        reason: Reason,
    },
    /// Push a new action of type `action` on top of this one.
    SuspendFor {
        action: ActionType,
        payload: Option<Payload>,
        reason: Reason,
        behavior: SuspendBehavior,
    },
    /// This action is finished; resume whatever it interrupted.
    Done { reason: Reason },
}

impl ActionResult {
    pub fn change_to(action: ActionType, reason: impl Into<Reason>) -> Self {
        ActionResult::ChangeTo {
            action,
            payload: None,
            reason: reason.into(),
        }
    }

    pub fn suspend_for(action: ActionType, reason: impl Into<Reason>) -> Self {
        ActionResult::SuspendFor {
            action,
            payload: None,
            reason: reason.into(),
            behavior: SuspendBehavior::Normal,
        }
    }

    pub fn done(reason: impl Into<Reason>) -> Self {
        ActionResult::Done {
            reason: reason.into(),
        }
    }

    /// Attach a start payload. No effect on `Continue` and `Done`.
    pub fn with_payload(mut self, value: Payload) -> Self {
        match &mut self {
            ActionResult::ChangeTo { payload, .. } | ActionResult::SuspendFor { payload, .. } => {
                *payload = Some(value);
            }
            ActionResult::Continue | ActionResult::Done { .. } => {}
        }
        self
    }

    pub fn is_continue(&self) -> bool {
        matches!(self, ActionResult::Continue)
    }
}
