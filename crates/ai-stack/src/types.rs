use core::fmt;
use std::borrow::Cow;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Human-readable reason attached to results and responses; shows up in traces only.
pub type Reason = Cow<'static, str>;

/// Type tag of an action.
///
/// The registry instantiates actions by type, and takeover arbitration matches stack
/// entries against a requested type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActionType(pub &'static str);

impl ActionType {
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Priority of an event response. Totally ordered: `None < Try < Important < Critical`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Priority {
    /// Using this on a request means "ignore this request".
    #[default]
    None,
    Try,
    Important,
    /// Dropping a critical request is reported as a collision.
    Critical,
}

/// How a suspend request coming from a buried action may reshape the stack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SuspendBehavior {
    /// Unwind everything above the requester, then suspend the requester.
    #[default]
    Normal,
    /// Leave the stack alone and suspend the current top instead.
    Append,
    /// Prefer handing the stack to an existing action of the target type; else `Normal`.
    Takeover,
    /// Prefer handing the stack to an existing action of the target type; else `Append`.
    TakeoverAppend,
}

impl SuspendBehavior {
    pub fn is_takeover(self) -> bool {
        matches!(self, SuspendBehavior::Takeover | SuspendBehavior::TakeoverAppend)
    }

    /// What a takeover request falls back to when no candidate accepts.
    pub fn degraded(self) -> Self {
        match self {
            SuspendBehavior::Takeover => SuspendBehavior::Normal,
            SuspendBehavior::TakeoverAppend => SuspendBehavior::Append,
            other => other,
        }
    }
}

/// Lifecycle state of one action instance. `Done` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ActionState {
    NotStarted,
    Running,
    Suspended,
    Done,
}

impl ActionState {
    pub fn is_live(self) -> bool {
        matches!(self, ActionState::Running | ActionState::Suspended)
    }
}
