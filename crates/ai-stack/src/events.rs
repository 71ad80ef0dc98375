//! Events delivered into a behavior from sensing, messaging, and movement sources.
//!
//! Events are grouped into categories. Every action type declares, when it is
//! registered, which categories it handles; the dispatcher skips actions whose set does
//! not contain the category of the event being delivered.

use std::any::Any;
use std::borrow::Cow;
use std::ops::{Add, Mul, Sub};
use std::rc::Rc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Set of event categories an action type handles.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct EventCategories: u8 {
        /// Sight, lost sight, sound and contact.
        const SENSING = 1 << 0;
        /// Move requests and move completion.
        const MOVEMENT = 1 << 1;
        /// Taking damage.
        const INFLICTION = 1 << 2;
        /// Game specific named messages.
        const GENERAL = 1 << 3;
        /// Squad commands.
        const SQUAD = 1 << 4;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance(self, other: Vec3) -> f32 {
        (self - other).length()
    }

    pub fn normalized(self) -> Vec3 {
        let len = self.length();
        if len <= f32::EPSILON {
            Vec3::ZERO
        } else {
            self * (1.0 / len)
        }
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Contact details for [`Event::Contact`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HitInfo {
    pub location: Vec3,
    pub normal: Vec3,
    pub impulse: f32,
}

/// Identifier the movement subsystem hands out for an accepted move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MoveRequestId(pub u32);

/// How a path-following request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PathFollowingResult {
    Success,
    Blocked,
    OffPath,
    Aborted,
    Invalid,
}

/// A game specific message, e.g. "I was set on fire".
#[derive(Clone)]
pub struct GeneralMessage {
    pub name: Cow<'static, str>,
    data: Option<Rc<dyn Any>>,
}

impl GeneralMessage {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            data: None,
        }
    }

    pub fn with_data<T: 'static>(mut self, data: T) -> Self {
        self.data = Some(Rc::new(data));
        self
    }

    pub fn data<T: 'static>(&self) -> Option<&T> {
        self.data.as_deref()?.downcast_ref::<T>()
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }
}

impl core::fmt::Debug for GeneralMessage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GeneralMessage")
            .field("name", &self.name)
            .field("has_data", &self.data.is_some())
            .finish()
    }
}

/// Commands a squad leader hands to its members.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SquadCommand {
    /// Get to a cover location close to you.
    GetToCover(Vec3),
    /// Get to a cover location closer to the target.
    AdvanceCover(Vec3),
    /// Move along the firing line to push the target.
    OrderlyAdvance { firing_location: Vec3, direction: Vec3 },
    /// Search for the target around a location.
    Search(Vec3),
}

/// An external event. `E` is the entity handle type of the world (its agent id).
#[derive(Debug, Clone)]
pub enum Event<E> {
    /// `indirect` is true when the sighting was reported by someone else.
    Sight { subject: E, indirect: bool },
    SightLost { subject: E },
    /// `flags` carries game specific extra information about the sound.
    Sound {
        source: Option<E>,
        location: Vec3,
        volume: f32,
        flags: i32,
    },
    Contact { other: Option<E>, hit: HitInfo },
    TakeDamage {
        amount: f32,
        instigator: Option<E>,
        causer: Option<E>,
    },
    Message(GeneralMessage),
    /// Someone asks the agent to move; only needed when actions track external moves.
    MoveTo { goal: Option<E>, pos: Vec3, range: f32 },
    MoveToComplete {
        request: MoveRequestId,
        result: PathFollowingResult,
    },
    Squad(SquadCommand),
}

impl<E> Event<E> {
    pub fn category(&self) -> EventCategories {
        match self {
            Event::Sight { .. }
            | Event::SightLost { .. }
            | Event::Sound { .. }
            | Event::Contact { .. } => EventCategories::SENSING,
            Event::TakeDamage { .. } => EventCategories::INFLICTION,
            Event::Message(_) => EventCategories::GENERAL,
            Event::MoveTo { .. } | Event::MoveToComplete { .. } => EventCategories::MOVEMENT,
            Event::Squad(_) => EventCategories::SQUAD,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Event::Sight { .. } => "sense.sight",
            Event::SightLost { .. } => "sense.sight_lost",
            Event::Sound { .. } => "sense.sound",
            Event::Contact { .. } => "sense.contact",
            Event::TakeDamage { .. } => "infliction.take_damage",
            Event::Message(_) => "general.message",
            Event::MoveTo { .. } => "movement.move_to",
            Event::MoveToComplete { .. } => "movement.move_to_complete",
            Event::Squad(SquadCommand::GetToCover(_)) => "squad.get_to_cover",
            Event::Squad(SquadCommand::AdvanceCover(_)) => "squad.advance_cover",
            Event::Squad(SquadCommand::OrderlyAdvance { .. }) => "squad.orderly_advance",
            Event::Squad(SquadCommand::Search(_)) => "squad.search",
        }
    }

    pub fn message(name: impl Into<Cow<'static, str>>) -> Self {
        Event::Message(GeneralMessage::new(name))
    }
}
