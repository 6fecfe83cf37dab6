//! Overstack Run Engine
//!
//! A deterministic, seed-driven battle/run simulation exposed through a narrow
//! stepping API. Callers create a run from a seed, pick a trait, then advance
//! simulated time or answer player turns and read back JSON-line events and
//! snapshots after every step.

// --- MODULE DECLARATIONS ---
pub mod api;
pub mod battle;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod events;
pub mod rng;
pub mod run;
pub mod snapshot;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
pub use schema::{
    Actor, Condition, Effect, EffectTarget, EnemySpec, NodeType, PlayerTemplate, SkillSpec, StatKind,
    StatModifier, StatusKind, TraitSpec, TriggerRule, TriggerType, WeightedSkill,
};

// --- From this crate's modules (`src/`) ---

// Handle API and headless entry point.
pub use api::{autopilot, run_run, RunHandle, RunManager, StepResult};

// Run state machine and its views.
pub use battle::ai::{Behavior, ScoringPilot};
pub use battle::state::{BattleOutcome, PlayerAction};
pub use events::{Event, EventKind, EventLog};
pub use run::{Run, RunResult, RunState, StepOutcome};
pub use snapshot::{CombatantView, Snapshot, StatusView};

// Data, configuration and randomness.
pub use catalog::{default_catalog, Catalog};
pub use config::EngineConfig;
pub use rng::RngSource;

// Crate-specific error and result types.
pub use errors::{CatalogError, CatalogResult, EngineError, EngineResult};
