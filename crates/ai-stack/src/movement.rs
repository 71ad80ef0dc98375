use crate::events::{MoveRequestId, Vec3};
use crate::world::WorldMut;

/// A request from an action to the movement subsystem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveRequest<E> {
    /// Entity to move towards; `dest` is used when this is `None`.
    pub goal: Option<E>,
    pub dest: Vec3,
    /// Negative means "use the movement subsystem's default".
    pub acceptance_radius: f32,
    pub use_pathfinding: bool,
    pub allow_partial_path: bool,
}

impl<E> MoveRequest<E> {
    pub fn to(dest: Vec3) -> Self {
        Self {
            goal: None,
            dest,
            acceptance_radius: -1.0,
            use_pathfinding: true,
            allow_partial_path: true,
        }
    }

    pub fn to_goal(goal: E, dest: Vec3) -> Self {
        Self {
            goal: Some(goal),
            ..Self::to(dest)
        }
    }

    pub fn with_acceptance_radius(mut self, radius: f32) -> Self {
        self.acceptance_radius = radius;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathRequestCode {
    Failed,
    AlreadyAtGoal,
    RequestSuccessful,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRequestResult {
    pub code: PathRequestCode,
    /// Present when `code` is `RequestSuccessful`; completion comes back as
    /// `Event::MoveToComplete` carrying the same id.
    pub request: Option<MoveRequestId>,
}

impl MoveRequestResult {
    pub fn failed() -> Self {
        Self {
            code: PathRequestCode::Failed,
            request: None,
        }
    }

    pub fn already_at_goal() -> Self {
        Self {
            code: PathRequestCode::AlreadyAtGoal,
            request: None,
        }
    }

    pub fn accepted(request: MoveRequestId) -> Self {
        Self {
            code: PathRequestCode::RequestSuccessful,
            request: Some(request),
        }
    }
}

/// Worlds that can move agents around. Implemented by the owning game/controller.
pub trait MovementWorld: WorldMut {
    fn move_to_goal(
        &mut self,
        agent: Self::Agent,
        request: &MoveRequest<Self::Agent>,
    ) -> MoveRequestResult;
}
