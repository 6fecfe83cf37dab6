//! Run-level progression: node sequence, player profile and the run state machine.

pub mod controller;
pub mod nodes;
pub mod profile;

pub use controller::{Run, StepOutcome};
pub use nodes::Node;
pub use profile::PlayerProfile;

use serde::{Deserialize, Serialize};
use strum::Display;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RunState {
    TraitSelect,
    Running,
    NeedInput,
    Ended,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RunResult {
    Unset,
    Win,
    Lose,
}

#[cfg(test)]
mod tests;
