//! Scenario configuration loading.

use std::path::Path;

use ai_stack::{BehaviorConfig, Event, GeneralMessage, Vec3};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A scripted run of one humanoid, loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Seconds per tick
    pub dt_seconds: f32,

    /// Number of ticks to simulate
    pub ticks: u64,

    /// Log every stack transition at debug level
    pub log_state: bool,

    pub max_resolve_depth: usize,

    /// Ticks a move request takes to complete
    pub move_ticks: u64,

    /// Events to deliver, in tick order
    pub events: Vec<ScheduledEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub tick: u64,
    #[serde(flatten)]
    pub event: ScenarioEvent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioEvent {
    Sight {
        subject: u64,
        #[serde(default)]
        indirect: bool,
    },
    SightLost {
        subject: u64,
    },
    Sound {
        at: [f32; 3],
        volume: f32,
    },
    Damage {
        amount: f32,
        #[serde(default)]
        instigator: Option<u64>,
    },
    Message {
        name: String,
        #[serde(default)]
        at: Option<[f32; 3]>,
    },
}

impl ScenarioEvent {
    pub fn to_event(&self) -> Event<u64> {
        match self {
            ScenarioEvent::Sight { subject, indirect } => Event::Sight {
                subject: *subject,
                indirect: *indirect,
            },
            ScenarioEvent::SightLost { subject } => Event::SightLost { subject: *subject },
            ScenarioEvent::Sound { at, volume } => Event::Sound {
                source: None,
                location: vec3(*at),
                volume: *volume,
                flags: 0,
            },
            ScenarioEvent::Damage { amount, instigator } => Event::TakeDamage {
                amount: *amount,
                instigator: *instigator,
                causer: None,
            },
            ScenarioEvent::Message { name, at } => {
                let message = GeneralMessage::new(name.clone());
                Event::Message(match at {
                    Some(at) => message.with_data(vec3(*at)),
                    None => message,
                })
            }
        }
    }
}

fn vec3([x, y, z]: [f32; 3]) -> Vec3 {
    Vec3::new(x, y, z)
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        let behavior = BehaviorConfig::default();
        Self {
            dt_seconds: 0.1,
            ticks: 50,
            log_state: behavior.log_state,
            max_resolve_depth: behavior.max_resolve_depth,
            move_ticks: 5,
            events: Vec::new(),
        }
    }
}

impl ScenarioConfig {
    /// Load from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse scenario from {}", path.display()))?;
        Ok(config)
    }

    /// Load `path` when given, otherwise the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn behavior_config(&self) -> BehaviorConfig {
        BehaviorConfig {
            max_resolve_depth: self.max_resolve_depth,
            log_state: self.log_state,
        }
    }

    /// Events scheduled for `tick`, in file order.
    pub fn events_at(&self, tick: u64) -> impl Iterator<Item = &ScenarioEvent> {
        self.events
            .iter()
            .filter(move |scheduled| scheduled.tick == tick)
            .map(|scheduled| &scheduled.event)
    }
}

pub const TEMPLATE: &str = r#"# Action stack scenario

dt_seconds: 0.5
ticks: 40
log_state: false
max_resolve_depth: 64
move_ticks: 4

events:
  - tick: 2
    type: sight
    subject: 42
  - tick: 5
    type: sound
    at: [10.0, 0.0, 2.0]
    volume: 0.9
  - tick: 7
    type: sound
    at: [12.0, 0.0, 4.0]
    volume: 1.0
  - tick: 20
    type: damage
    amount: 15.0
    instigator: 42
  - tick: 30
    type: message
    name: humanoid.investigate
    at: [0.0, 0.0, 8.0]
"#;
