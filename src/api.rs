//! Handle-based facade over [`Run`] for hosts that speak in plain values.
//!
//! Every method here is total: failures come back as `false`, empty lists,
//! `None` or a `StepResult` with `error` set, never as a panic.

use crate::battle::ai::{Behavior, ScoringPilot};
use crate::battle::state::PlayerAction;
use crate::catalog::{default_catalog, Catalog};
use crate::config::EngineConfig;
use crate::errors::{EngineError, EngineResult};
use crate::run::{Run, RunState, StepOutcome};
use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Step size used by the autopilot, in simulated time units.
const AUTOPILOT_DT: f64 = 1.0;
const AUTOPILOT_MAX_STEPS: usize = 1_000_000;

/// Opaque identifier of a run owned by a [`RunManager`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunHandle(u32);

impl RunHandle {
    pub fn id(self) -> u32 {
        self.0
    }
}

/// Wire form of a step: one JSON line per event plus status flags.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct StepResult {
    pub events: Vec<String>,
    pub need_input: bool,
    pub ended: bool,
    pub error: Option<String>,
}

impl StepResult {
    pub fn from_outcome(outcome: StepOutcome) -> Self {
        let mut result = StepResult {
            events: Vec::with_capacity(outcome.events.len()),
            need_input: outcome.need_input,
            ended: outcome.ended,
            error: outcome.error.map(|err| err.to_string()),
        };
        for event in &outcome.events {
            match event.to_json_line() {
                Ok(line) => result.events.push(line),
                Err(err) => {
                    result.error = Some(err.to_string());
                    break;
                }
            }
        }
        result
    }

    fn failed(err: EngineError) -> Self {
        StepResult {
            ended: true,
            error: Some(err.to_string()),
            ..StepResult::default()
        }
    }
}

/// Arena of independent runs addressed by [`RunHandle`].
#[derive(Debug)]
pub struct RunManager {
    runs: HashMap<RunHandle, Run>,
    next_handle: u32,
    catalog: Arc<Catalog>,
    config: EngineConfig,
}

impl RunManager {
    /// Manager over the embedded catalog and default configuration.
    pub fn new() -> EngineResult<Self> {
        Self::with_catalog(default_catalog()?, EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> EngineResult<Self> {
        Self::with_catalog(default_catalog()?, config)
    }

    pub fn with_catalog(catalog: Arc<Catalog>, config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            runs: HashMap::new(),
            next_handle: 1,
            catalog,
            config,
        })
    }

    fn insert(&mut self, run: Run) -> RunHandle {
        let handle = RunHandle(self.next_handle);
        self.next_handle += 1;
        self.runs.insert(handle, run);
        handle
    }

    pub fn create_run(&mut self, seed: u64, max_nodes: u32) -> EngineResult<RunHandle> {
        let run = Run::new(seed, max_nodes, self.config.clone(), Arc::clone(&self.catalog))?;
        Ok(self.insert(run))
    }

    pub fn destroy_run(&mut self, handle: RunHandle) -> bool {
        self.runs.remove(&handle).is_some()
    }

    pub fn reset_run(&mut self, handle: RunHandle) -> bool {
        match self.runs.get_mut(&handle) {
            Some(run) => match run.reset() {
                Ok(()) => true,
                Err(err) => {
                    warn!(handle = handle.id(), error = %err, "reset failed");
                    false
                }
            },
            None => false,
        }
    }

    pub fn run(&self, handle: RunHandle) -> Option<&Run> {
        self.runs.get(&handle)
    }

    pub fn run_mut(&mut self, handle: RunHandle) -> Option<&mut Run> {
        self.runs.get_mut(&handle)
    }

    pub fn get_selectable_trait_ids(&self, handle: RunHandle) -> Vec<String> {
        self.run(handle)
            .map(|run| run.offered_trait_ids().to_vec())
            .unwrap_or_default()
    }

    pub fn get_selectable_trait_names(&self, handle: RunHandle) -> Vec<String> {
        self.run(handle)
            .map(Run::offered_trait_names)
            .unwrap_or_default()
    }

    pub fn set_active_trait(&mut self, handle: RunHandle, trait_id: &str) -> bool {
        let Some(run) = self.runs.get_mut(&handle) else {
            return false;
        };
        match run.set_active_trait(trait_id) {
            Ok(()) => true,
            Err(err) => {
                warn!(handle = handle.id(), error = %err, "trait selection rejected");
                false
            }
        }
    }

    pub fn get_active_traits(&self, handle: RunHandle) -> Vec<String> {
        self.run(handle)
            .map(Run::active_trait_names)
            .unwrap_or_default()
    }

    pub fn get_player_skills(&self, handle: RunHandle) -> Vec<String> {
        self.run(handle)
            .map(Run::player_skill_names)
            .unwrap_or_default()
    }

    /// Advances a run. `action_kind` is `"basic"`, `"skill"` (with `action_arg`
    /// as the skill index) or `"none"`.
    pub fn step_with_action(&mut self, handle: RunHandle, dt: f64, action_kind: &str, action_arg: i32) -> StepResult {
        let Some(run) = self.runs.get_mut(&handle) else {
            return StepResult::failed(EngineError::InvalidHandle(handle.id()));
        };
        let action = match PlayerAction::parse(action_kind, action_arg) {
            Ok(action) => action,
            Err(err) => {
                warn!(handle = handle.id(), error = %err, "action rejected");
                return StepResult {
                    need_input: run.state() == RunState::NeedInput,
                    ended: run.state() == RunState::Ended,
                    ..StepResult::default()
                };
            }
        };
        StepResult::from_outcome(run.step(dt, action))
    }

    pub fn get_snapshot(&self, handle: RunHandle) -> Option<Snapshot> {
        self.run(handle).map(Run::snapshot)
    }

    pub fn export_run(&self, handle: RunHandle) -> EngineResult<Vec<u8>> {
        self.run(handle)
            .ok_or(EngineError::InvalidHandle(handle.id()))?
            .export_state()
    }

    /// Restores an exported run under a fresh handle.
    pub fn import_run(&mut self, bytes: &[u8]) -> EngineResult<RunHandle> {
        let run = Run::import_state(bytes, Arc::clone(&self.catalog))?;
        Ok(self.insert(run))
    }
}

/// Plays a whole run headlessly: picks the first offered trait and lets
/// [`ScoringPilot`] answer every player turn. Returns the concatenated event log.
pub fn run_run(seed: u64, max_nodes: u32) -> EngineResult<Vec<String>> {
    let catalog = default_catalog()?;
    let mut run = Run::new(seed, max_nodes, EngineConfig::default(), catalog)?;
    autopilot(&mut run, &ScoringPilot::new())
}

/// Drives `run` to completion with `pilot` and returns its wire log.
pub fn autopilot(run: &mut Run, pilot: &impl Behavior) -> EngineResult<Vec<String>> {
    let first = run
        .offered_trait_ids()
        .first()
        .cloned()
        .ok_or_else(|| EngineError::InvalidTrait("no trait offered".to_string()))?;
    run.set_active_trait(&first)?;

    let mut lines = Vec::new();
    let mut need_input = false;
    for _ in 0..AUTOPILOT_MAX_STEPS {
        let action = if need_input {
            run.battle().map(|battle| pilot.decide_action(battle, run.catalog()))
        } else {
            None
        };
        let outcome = run.step(AUTOPILOT_DT, action);
        if let Some(err) = outcome.error.or(outcome.rejected) {
            return Err(err);
        }
        for event in &outcome.events {
            lines.push(event.to_json_line()?);
        }
        if outcome.ended {
            return Ok(lines);
        }
        need_input = outcome.need_input;
    }
    Err(EngineError::InternalInvariantViolation(
        "autopilot did not finish the run".to_string(),
    ))
}
