use ai_stack::{
    Event, MoveRequest, MoveRequestId, MoveRequestResult, MovementWorld, PathFollowingResult,
    Vec3, WorldMut, WorldView,
};

struct PendingMove {
    id: MoveRequestId,
    dest: Vec3,
    remaining: u64,
}

/// Minimal world for scenario runs: every path exists and takes a fixed number of ticks.
pub struct DemoWorld {
    move_ticks: u64,
    next_request: u32,
    moves: Vec<PendingMove>,
    pub position: Vec3,
}

impl DemoWorld {
    pub fn new(move_ticks: u64) -> Self {
        Self {
            move_ticks,
            next_request: 0,
            moves: Vec::new(),
            position: Vec3::ZERO,
        }
    }

    /// Advance pending moves by one tick, returning completion events for the finished ones.
    pub fn advance(&mut self) -> Vec<Event<u64>> {
        let mut finished = Vec::new();
        self.moves.retain_mut(|pending| {
            pending.remaining = pending.remaining.saturating_sub(1);
            if pending.remaining == 0 {
                finished.push((pending.id, pending.dest));
                false
            } else {
                true
            }
        });
        finished
            .into_iter()
            .map(|(request, dest)| {
                self.position = dest;
                Event::MoveToComplete {
                    request,
                    result: PathFollowingResult::Success,
                }
            })
            .collect()
    }
}

impl WorldView for DemoWorld {
    type Agent = u64;
}

impl WorldMut for DemoWorld {}

impl MovementWorld for DemoWorld {
    fn move_to_goal(&mut self, agent: u64, request: &MoveRequest<u64>) -> MoveRequestResult {
        let radius = request.acceptance_radius.max(0.0);
        if self.position.distance(request.dest) <= radius {
            return MoveRequestResult::already_at_goal();
        }
        self.next_request += 1;
        let id = MoveRequestId(self.next_request);
        // A newer request replaces whatever the agent was doing.
        for pending in self.moves.drain(..) {
            tracing::debug!(agent, request = pending.id.0, "move aborted");
        }
        self.moves.push(PendingMove {
            id,
            dest: request.dest,
            remaining: self.move_ticks.max(1),
        });
        tracing::debug!(agent, request = id.0, dest = ?request.dest, "move requested");
        MoveRequestResult::accepted(id)
    }
}
