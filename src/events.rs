//! Typed battle and run events plus their JSON-line wire form.

use crate::battle::state::BattleOutcome;
use crate::errors::{EngineError, EngineResult};
use crate::run::RunResult;
use schema::{Actor, NodeType, StatusKind, TriggerType};
use serde::{Deserialize, Serialize};

/// One occurrence inside a step, stamped with the run tick it happened on.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Event {
    pub tick: u64,
    #[serde(flatten)]
    pub kind: EventKind,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind")]
pub enum EventKind {
    RunStart {
        seed: u64,
    },
    NodeStart {
        node_index: u32,
        node_type: NodeType,
    },
    BattleStart {
        battle_index: u32,
        enemy_name: String,
    },
    TurnReady {
        actor: Actor,
    },
    ActionUsed {
        actor: Actor,
        action_name: String,
    },
    DamageDealt {
        src: Actor,
        dst: Actor,
        amount: i32,
        dst_hp_after: i32,
    },
    StatusApplied {
        src: Actor,
        dst: Actor,
        status: StatusKind,
        stacks: u32,
        duration: u32,
    },
    StatusTick {
        dst: Actor,
        status: StatusKind,
        amount: i32,
        dst_hp_after: i32,
    },
    StatusExpired {
        dst: Actor,
        status: StatusKind,
    },
    BattleEnd {
        result: BattleOutcome,
        player_hp_after: i32,
    },
    RunEnd {
        result: RunResult,
        final_node_index: u32,
    },
    TraitTriggered {
        trait_name: String,
        trigger_type: TriggerType,
    },
    TraitEffectApplied {
        trait_name: String,
        effect_summary: String,
    },
}

impl EventKind {
    /// The `kind` tag as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::RunStart { .. } => "RunStart",
            EventKind::NodeStart { .. } => "NodeStart",
            EventKind::BattleStart { .. } => "BattleStart",
            EventKind::TurnReady { .. } => "TurnReady",
            EventKind::ActionUsed { .. } => "ActionUsed",
            EventKind::DamageDealt { .. } => "DamageDealt",
            EventKind::StatusApplied { .. } => "StatusApplied",
            EventKind::StatusTick { .. } => "StatusTick",
            EventKind::StatusExpired { .. } => "StatusExpired",
            EventKind::BattleEnd { .. } => "BattleEnd",
            EventKind::RunEnd { .. } => "RunEnd",
            EventKind::TraitTriggered { .. } => "TraitTriggered",
            EventKind::TraitEffectApplied { .. } => "TraitEffectApplied",
        }
    }
}

impl Event {
    pub fn to_json_line(&self) -> EngineResult<String> {
        serde_json::to_string(self).map_err(|err| {
            EngineError::InternalInvariantViolation(format!("event encoding failed: {}", err))
        })
    }

    pub fn from_json_line(line: &str) -> EngineResult<Self> {
        serde_json::from_str(line)
            .map_err(|err| EngineError::InvalidState(format!("malformed event line: {}", err)))
    }
}

/// Append-only event buffer for one step call.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    tick: u64,
    events: Vec<Event>,
}

impl EventLog {
    pub fn new(tick: u64) -> Self {
        Self {
            tick,
            events: Vec::new(),
        }
    }

    /// Tick stamped on every event pushed from now on.
    pub fn set_tick(&mut self, tick: u64) {
        self.tick = tick;
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn push(&mut self, kind: EventKind) {
        self.events.push(Event {
            tick: self.tick,
            kind,
        });
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}
