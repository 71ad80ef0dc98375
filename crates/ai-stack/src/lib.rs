//! Interrupt-driven action stack scheduler.
//!
//! A [`Behavior`] owns a stack of [`Action`]s. Only the top action runs each tick;
//! actions below it are suspended and resume when whatever sits on them finishes.
//! External [`Event`]s are broadcast down the stack, each answering action stores a
//! prioritized [`EventResponse`], and once per tick arbitration turns those responses
//! into at most one stack mutation.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod action;
pub mod behavior;
pub mod brain;
pub mod config;
pub mod error;
pub mod events;
pub mod humanoid;
pub mod movement;
pub mod payload;
pub mod registry;
pub mod response;
pub mod result;
pub mod snapshot;
pub mod stack;
pub mod tick;
pub mod types;
pub mod world;

mod arbitration;
mod resolver;

pub use action::Action;
pub use behavior::{Behavior, BehaviorStatus};
pub use brain::{tick_brains, Brain};
pub use config::BehaviorConfig;
pub use error::{Result, StackError};
pub use events::{
    Event, EventCategories, GeneralMessage, HitInfo, MoveRequestId, PathFollowingResult,
    SquadCommand, Vec3,
};
pub use movement::{MoveRequest, MoveRequestResult, MovementWorld, PathRequestCode};
pub use payload::Payload;
pub use registry::ActionRegistry;
pub use response::{
    AgreementRequest, EventReceipt, EventRequest, EventResponse, RequestKind, TakeoverRequest,
};
pub use result::ActionResult;
pub use snapshot::{SnapshotEntry, StackSnapshot};
pub use stack::{ActionId, ActionStack, ActionView};
pub use tick::TickContext;
pub use types::{ActionState, ActionType, Priority, Reason, SuspendBehavior};
pub use world::{AgentId, WorldMut, WorldView};

pub use ai_tools::{SharedTraceLog, TraceEvent, TraceKind, TraceLog, TraceSink};
