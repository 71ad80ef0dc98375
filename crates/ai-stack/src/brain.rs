use crate::behavior::Behavior;
use crate::events::Event;
use crate::response::EventReceipt;
use crate::{AgentId, TickContext, WorldMut};

/// Per-agent owner of behaviors: starts, stops, pauses and ticks them together and fans
/// events out to each.
///
/// Call [`Brain::stop_logic`] before dropping a started brain. Dropping has no world to
/// hand the actions, so their `terminate` callbacks never run.
pub struct Brain<W>
where
    W: WorldMut + 'static,
{
    pub agent: W::Agent,
    behaviors: Vec<Behavior<W>>,
    started: bool,
    paused: bool,
}

impl<W> Brain<W>
where
    W: WorldMut + 'static,
{
    pub fn new(agent: W::Agent) -> Self {
        Self {
            agent,
            behaviors: Vec::new(),
            started: false,
            paused: false,
        }
    }

    pub fn behaviors(&self) -> &[Behavior<W>] {
        &self.behaviors
    }

    pub fn behavior(&self, name: &str) -> Option<&Behavior<W>> {
        self.behaviors.iter().find(|b| b.name() == name)
    }

    pub fn behavior_mut(&mut self, name: &str) -> Option<&mut Behavior<W>> {
        self.behaviors.iter_mut().find(|b| b.name() == name)
    }

    pub fn is_running(&self) -> bool {
        self.started && !self.paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Add a behavior; it begins immediately when the brain is already running.
    ///
    /// Rejected when a behavior of the same name exists or it drives another agent.
    pub fn add_behavior(&mut self, ctx: &TickContext, world: &mut W, behavior: Behavior<W>) -> bool {
        if behavior.agent() != self.agent {
            tracing::warn!(
                agent = self.agent.stable_id(),
                behavior = behavior.name(),
                "behavior belongs to another agent"
            );
            return false;
        }
        if self.behavior(behavior.name()).is_some() {
            tracing::warn!(
                agent = self.agent.stable_id(),
                behavior = behavior.name(),
                "behavior already added"
            );
            return false;
        }

        self.behaviors.push(behavior);
        if let Some(added) = self.behaviors.last_mut() {
            added.set_events_paused(self.paused);
            if self.started {
                if let Err(err) = added.begin(ctx, world) {
                    tracing::error!(agent = self.agent.stable_id(), error = %err, "failed to begin behavior");
                }
            }
        }
        true
    }

    /// Stop (without completion) and drop the named behavior.
    pub fn remove_behavior(&mut self, ctx: &TickContext, world: &mut W, name: &str) -> bool {
        let Some(index) = self.behaviors.iter().position(|b| b.name() == name) else {
            return false;
        };
        let mut removed = self.behaviors.remove(index);
        removed.stop(ctx, world, false);
        true
    }

    pub fn start_logic(&mut self, ctx: &TickContext, world: &mut W) {
        if self.started {
            return;
        }
        self.started = true;
        for behavior in &mut self.behaviors {
            behavior.set_events_paused(self.paused);
            if let Err(err) = behavior.begin(ctx, world) {
                tracing::error!(agent = self.agent.stable_id(), error = %err, "failed to begin behavior");
            }
        }
        tracing::debug!(agent = self.agent.stable_id(), behaviors = self.behaviors.len(), "logic started");
    }

    pub fn stop_logic(&mut self, ctx: &TickContext, world: &mut W) {
        if !self.started {
            return;
        }
        for behavior in &mut self.behaviors {
            behavior.stop(ctx, world, false);
        }
        self.started = false;
        tracing::debug!(agent = self.agent.stable_id(), "logic stopped");
    }

    pub fn restart_logic(&mut self, ctx: &TickContext, world: &mut W) {
        self.stop_logic(ctx, world);
        self.start_logic(ctx, world);
    }

    /// Suspend ticking; events delivered while paused are dropped.
    ///
    /// The flag outlives `stop_logic`/`start_logic`, so a brain paused before it starts, or
    /// restarted while paused, stays paused until `resume_logic`.
    pub fn pause_logic(&mut self) {
        self.paused = true;
        for behavior in &mut self.behaviors {
            behavior.set_events_paused(true);
        }
    }

    pub fn resume_logic(&mut self) {
        self.paused = false;
        for behavior in &mut self.behaviors {
            behavior.set_events_paused(false);
        }
    }

    pub fn tick(&mut self, ctx: &TickContext, world: &mut W) {
        if !self.is_running() {
            return;
        }
        for behavior in &mut self.behaviors {
            behavior.run(ctx, world);
        }
    }

    /// Deliver `event` to every behavior, in insertion order.
    pub fn send_event(&mut self, world: &mut W, event: &Event<W::Agent>) -> Vec<EventReceipt> {
        self.behaviors
            .iter_mut()
            .filter_map(|behavior| behavior.handle_event(world, event))
            .collect()
    }
}

impl<W> Drop for Brain<W>
where
    W: WorldMut + 'static,
{
    fn drop(&mut self) {
        if self.started {
            tracing::warn!(
                agent = self.agent.stable_id(),
                behaviors = self.behaviors.len(),
                "brain dropped with logic running; call stop_logic first"
            );
        }
    }
}

/// Tick every brain in stable agent order.
pub fn tick_brains<W>(ctx: &TickContext, world: &mut W, brains: &mut [Brain<W>])
where
    W: WorldMut + 'static,
{
    brains.sort_by_key(|b| b.agent.stable_id());
    for brain in brains.iter_mut() {
        brain.tick(ctx, world);
    }
}
