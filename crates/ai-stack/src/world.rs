use core::fmt::Debug;

/// Stable identifier for an agent (and for the entities events refer to).
///
/// Deterministic scheduling needs a stable ordering and a stable numeric id for logs.
pub trait AgentId: Copy + Ord + Eq + Debug + 'static {
    fn stable_id(self) -> u64;
}

macro_rules! impl_agent_id {
    ($($ty:ty),*) => {
        $(
            impl AgentId for $ty {
                fn stable_id(self) -> u64 {
                    self as u64
                }
            }
        )*
    };
}

impl_agent_id!(u64, u32, usize);

/// Read-only access to the world the agent lives in.
///
/// The stack engine only needs to know whether the agent a behavior acts on behalf of
/// still exists; subsystems such as movement extend this with their own traits.
pub trait WorldView {
    type Agent: AgentId;

    /// Whether `agent` still exists. Full-stack teardown skips every `terminate`
    /// callback when this is false, so actions may assume a valid subject.
    fn is_agent_valid(&self, _agent: Self::Agent) -> bool {
        true
    }
}

/// Write access / effect sink.
pub trait WorldMut: WorldView {}
