//! Read-only projection of a run for display.

use crate::battle::combatant::Combatant;
use crate::errors::{EngineError, EngineResult};
use crate::run::{RunResult, RunState};
use schema::{NodeType, StatusKind};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StatusView {
    pub kind: StatusKind,
    pub stacks: u32,
    pub duration: u32,
    pub power: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CombatantView {
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
    /// Gauge points; a turn triggers at 100.
    pub action_gauge: f64,
    pub statuses: Vec<StatusView>,
}

impl CombatantView {
    pub fn from_combatant(combatant: &Combatant, gauge_threshold: i64) -> Self {
        Self {
            name: combatant.name.clone(),
            hp: combatant.hp(),
            max_hp: combatant.max_hp(),
            attack: combatant.attack,
            defense: combatant.defense,
            speed: combatant.speed,
            action_gauge: gauge_points(combatant.action_gauge, gauge_threshold),
            statuses: combatant
                .statuses
                .iter()
                .map(|s| StatusView {
                    kind: s.kind,
                    stacks: s.stacks,
                    duration: s.duration,
                    power: s.power,
                })
                .collect(),
        }
    }
}

/// Milli-points rescaled so the configured threshold reads as 100.
fn gauge_points(gauge: i64, threshold: i64) -> f64 {
    gauge as f64 * 100.0 / threshold as f64
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub node_index: u32,
    pub node_count: u32,
    pub node_type: Option<NodeType>,
    pub battle_index: u32,
    pub tick: u64,
    /// Simulated time units spent in the current battle.
    pub elapsed_time: f64,
    pub run_state: RunState,
    pub run_result: RunResult,
    pub enemy_name: String,
    pub active_traits: Vec<String>,
    pub player: CombatantView,
    pub enemy: CombatantView,
}

impl Snapshot {
    pub fn to_json(&self) -> EngineResult<String> {
        serde_json::to_string(self).map_err(|err| {
            EngineError::InternalInvariantViolation(format!("snapshot encoding failed: {}", err))
        })
    }
}
