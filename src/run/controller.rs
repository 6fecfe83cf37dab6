//! The run state machine.
//!
//! A `Run` owns everything one play-through needs: the RNG stream, the node
//! sequence, the player profile and the battle at the current node. It is
//! advanced only through [`Run::step`], which converts simulated time into
//! fixed engine ticks and returns every event that happened along the way.

use crate::battle::engine::{BattleContext, TickOutcome};
use crate::battle::state::{Battle, BattleOutcome, PlayerAction};
use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::errors::{EngineError, EngineResult};
use crate::events::{Event, EventKind, EventLog};
use crate::rng::RngSource;
use crate::run::nodes::{generate_nodes, Node};
use crate::run::profile::PlayerProfile;
use crate::run::{RunResult, RunState};
use crate::snapshot::{CombatantView, Snapshot};
use schema::TraitSpec;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Upper bound on simulated milliseconds accepted by a single step.
const MAX_STEP_MS: f64 = 1.0e12;

/// Typed result of one [`Run::step`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepOutcome {
    pub events: Vec<Event>,
    pub need_input: bool,
    pub ended: bool,
    /// Fatal error; reported once, after which the run is ended.
    pub error: Option<EngineError>,
    /// Caller input that was refused. The run was not touched.
    pub rejected: Option<EngineError>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Run {
    seed: u64,
    max_nodes: u32,
    config: EngineConfig,
    #[serde(skip)]
    catalog: Arc<Catalog>,
    rng: RngSource,
    nodes: Vec<Node>,
    /// 1-based index of the current node, 0 before the first node is entered.
    node_index: u32,
    battle_count: u32,
    state: RunState,
    result: RunResult,
    tick: u64,
    time_bank_ms: u64,
    started: bool,
    offers: Vec<String>,
    profile: PlayerProfile,
    battle: Option<Battle>,
}

impl Run {
    /// Builds a run in `trait_select`. Draws node types first, then the trait offer.
    pub fn new(seed: u64, max_nodes: u32, config: EngineConfig, catalog: Arc<Catalog>) -> EngineResult<Self> {
        config.validate()?;
        let max_nodes = max_nodes.clamp(1, config.max_nodes_cap);
        let mut rng = RngSource::seeded(seed);
        let nodes = generate_nodes(max_nodes, config.elite_chance, &mut rng);

        let traits = catalog.traits();
        let offers = rng
            .sample_indices(traits.len(), config.offer_size)
            .into_iter()
            .map(|i| traits[i].id.clone())
            .collect();
        let profile = PlayerProfile::from_template(catalog.player());

        debug!(seed, max_nodes, "run created");
        Ok(Self {
            seed,
            max_nodes,
            config,
            catalog,
            rng,
            nodes,
            node_index: 0,
            battle_count: 0,
            state: RunState::TraitSelect,
            result: RunResult::Unset,
            tick: 0,
            time_bank_ms: 0,
            started: false,
            offers,
            profile,
            battle: None,
        })
    }

    /// Rebuilds the run from its seed, back to `trait_select` at tick 0.
    pub fn reset(&mut self) -> EngineResult<()> {
        *self = Run::new(self.seed, self.max_nodes, self.config.clone(), Arc::clone(&self.catalog))?;
        Ok(())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn result(&self) -> RunResult {
        self.result
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    pub fn battle(&self) -> Option<&Battle> {
        self.battle.as_ref()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn rng(&self) -> &RngSource {
        &self.rng
    }

    pub fn offered_trait_ids(&self) -> &[String] {
        &self.offers
    }

    pub fn offered_trait_names(&self) -> Vec<String> {
        self.offers
            .iter()
            .filter_map(|id| self.catalog.trait_spec(id))
            .map(|t| t.name.clone())
            .collect()
    }

    pub fn active_trait_names(&self) -> Vec<String> {
        self.profile
            .active_traits
            .iter()
            .filter_map(|id| self.catalog.trait_spec(id))
            .map(|t| t.name.clone())
            .collect()
    }

    /// Display labels of the player's skills, in skill-index order.
    pub fn player_skill_names(&self) -> Vec<String> {
        self.profile
            .skills
            .iter()
            .map(|id| {
                self.catalog
                    .skill(id)
                    .map(|s| s.name.clone())
                    .unwrap_or_else(|| id.clone())
            })
            .collect()
    }

    /// Locks in one offered trait and starts the run.
    ///
    /// Start-of-run events are emitted by the first step.
    pub fn set_active_trait(&mut self, trait_id: &str) -> EngineResult<()> {
        if self.state != RunState::TraitSelect {
            return Err(EngineError::InvalidState(format!(
                "cannot select a trait while {}",
                self.state
            )));
        }
        if !self.profile.active_traits.is_empty() {
            return Err(EngineError::InvalidTrait(format!("{} (a trait is already active)", trait_id)));
        }
        if !self.offers.iter().any(|id| id == trait_id) {
            return Err(EngineError::InvalidTrait(trait_id.to_string()));
        }
        let catalog = Arc::clone(&self.catalog);
        let spec = catalog
            .trait_spec(trait_id)
            .ok_or_else(|| EngineError::InvalidTrait(trait_id.to_string()))?;

        self.profile.adopt_trait(spec);
        self.state = RunState::Running;
        debug!(trait_id, "trait locked in");
        Ok(())
    }

    /// Advances the run by `dt` simulated time units, or resolves the pending
    /// player turn with `action`.
    pub fn step(&mut self, dt: f64, action: Option<PlayerAction>) -> StepOutcome {
        let mut log = EventLog::new(self.tick);
        let mut outcome = StepOutcome::default();

        match self.step_inner(dt, action, &mut log) {
            Ok(()) => outcome.events = log.into_events(),
            Err(err) if err.is_recoverable() => {
                warn!(error = %err, state = %self.state, "step rejected");
                outcome.rejected = Some(err);
            }
            Err(err) => {
                error!(error = %err, tick = self.tick, "run aborted");
                self.state = RunState::Ended;
                self.battle = None;
                outcome.error = Some(err);
            }
        }

        outcome.need_input = self.state == RunState::NeedInput;
        outcome.ended = self.state == RunState::Ended;
        outcome
    }

    fn step_inner(&mut self, dt: f64, action: Option<PlayerAction>, log: &mut EventLog) -> EngineResult<()> {
        match self.state {
            RunState::Ended => return Ok(()),
            RunState::TraitSelect => {
                return Err(EngineError::InvalidState(
                    "select a trait before stepping".to_string(),
                ))
            }
            RunState::Running | RunState::NeedInput => {}
        }

        if let Some(battle) = &self.battle {
            battle.check_invariants()?;
        }
        if let Some(action) = action {
            self.validate_action(action)?;
        }

        if !self.started {
            self.started = true;
            log.push(EventKind::RunStart { seed: self.seed });
            debug!(seed = self.seed, "run started");
            self.enter_next_node(log)?;
            if self.state == RunState::Ended {
                return Ok(());
            }
        }

        if self.state == RunState::NeedInput {
            let Some(action) = action else {
                return Ok(());
            };
            let outcome = self.with_battle(log, |ctx| ctx.resume(action))?;
            self.state = RunState::Running;
            return self.handle_tick_outcome(outcome, log);
        }

        let mut pending = action;
        self.time_bank_ms += dt_to_ms(dt);
        while self.time_bank_ms >= self.config.tick_ms {
            self.time_bank_ms -= self.config.tick_ms;
            self.tick += 1;
            log.set_tick(self.tick);

            let outcome = self.with_battle(log, |ctx| ctx.advance_tick(&mut pending))?;
            if outcome != TickOutcome::Continue {
                self.time_bank_ms = 0;
                return self.handle_tick_outcome(outcome, log);
            }
        }
        Ok(())
    }

    fn validate_action(&self, action: PlayerAction) -> EngineResult<()> {
        if let PlayerAction::Skill(index) = action {
            if index >= self.profile.skills.len() {
                return Err(EngineError::InvalidSkillIndex(index as i32));
            }
        }
        Ok(())
    }

    fn handle_tick_outcome(&mut self, outcome: TickOutcome, log: &mut EventLog) -> EngineResult<()> {
        match outcome {
            TickOutcome::Continue => Ok(()),
            TickOutcome::NeedInput => {
                self.state = RunState::NeedInput;
                Ok(())
            }
            TickOutcome::Ended(result) => self.finish_battle(result, log),
        }
    }

    /// Borrows the current battle together with the run's RNG and active traits.
    fn with_battle<R>(
        &mut self,
        log: &mut EventLog,
        f: impl FnOnce(&mut BattleContext) -> EngineResult<R>,
    ) -> EngineResult<R> {
        let catalog = Arc::clone(&self.catalog);
        let traits = active_trait_specs(&catalog, &self.profile)?;
        let battle = self
            .battle
            .as_mut()
            .ok_or_else(|| EngineError::InternalInvariantViolation("no active battle".to_string()))?;
        let mut ctx = BattleContext::new(battle, &mut self.rng, log, &catalog, &self.config, traits);
        let result = f(&mut ctx)?;
        battle_ref(&self.battle)?.check_invariants()?;
        Ok(result)
    }

    fn enter_next_node(&mut self, log: &mut EventLog) -> EngineResult<()> {
        let index = self.node_index as usize;
        let node = self
            .nodes
            .get_mut(index)
            .ok_or_else(|| EngineError::InternalInvariantViolation(format!("node {} out of range", index + 1)))?;
        node.visited = true;
        let node_type = node.node_type;
        self.node_index += 1;
        log.push(EventKind::NodeStart {
            node_index: self.node_index,
            node_type,
        });

        let catalog = Arc::clone(&self.catalog);
        let pool = catalog.enemies_of_tier(node_type);
        let pick = self.rng.next_range(0, pool.len() as i64) as usize;
        let enemy = pool
            .get(pick)
            .ok_or_else(|| EngineError::InternalInvariantViolation(format!("no enemy for {}", node_type)))?;

        self.battle_count += 1;
        debug!(node_index = self.node_index, %node_type, enemy = %enemy.id, "entering node");
        self.battle = Some(Battle::new(
            self.battle_count,
            node_type,
            self.profile.to_combatant(),
            enemy,
        ));
        self.state = RunState::Running;
        self.with_battle(log, |ctx| ctx.start())?;

        let decided = battle_ref(&self.battle)?.outcome();
        if let Some(result) = decided {
            return self.finish_battle(result, log);
        }
        Ok(())
    }

    fn finish_battle(&mut self, result: BattleOutcome, log: &mut EventLog) -> EngineResult<()> {
        self.with_battle(log, |ctx| ctx.finish(result))?;
        let battle = self
            .battle
            .take()
            .ok_or_else(|| EngineError::InternalInvariantViolation("no battle to finish".to_string()))?;

        match result {
            BattleOutcome::Win => {
                self.profile.hp = battle.player().hp();
                let healed = self.profile.recover(self.config.post_battle_recover_pct);
                debug!(hp = self.profile.hp, healed, "battle won");
                if self.node_index as usize >= self.nodes.len() {
                    self.end_run(RunResult::Win, log);
                    Ok(())
                } else {
                    self.enter_next_node(log)
                }
            }
            BattleOutcome::Lose => {
                self.profile.hp = battle.player().hp();
                self.end_run(RunResult::Lose, log);
                Ok(())
            }
        }
    }

    fn end_run(&mut self, result: RunResult, log: &mut EventLog) {
        self.state = RunState::Ended;
        self.result = result;
        log.push(EventKind::RunEnd {
            result,
            final_node_index: self.node_index,
        });
        debug!(%result, final_node_index = self.node_index, "run ended");
    }

    pub fn snapshot(&self) -> Snapshot {
        let threshold = self.config.gauge_threshold;
        let (player, enemy, enemy_name, elapsed_ticks, battle_index) = match &self.battle {
            Some(battle) => (
                CombatantView::from_combatant(battle.player(), threshold),
                CombatantView::from_combatant(battle.enemy(), threshold),
                battle.enemy_name.clone(),
                battle.elapsed_ticks,
                battle.battle_index,
            ),
            None => (
                CombatantView::from_combatant(&self.profile.to_combatant(), threshold),
                CombatantView::default(),
                String::new(),
                0,
                self.battle_count,
            ),
        };
        let node_type = match self.node_index {
            0 => None,
            n => self.nodes.get(n as usize - 1).map(|node| node.node_type),
        };

        Snapshot {
            node_index: self.node_index,
            node_count: self.nodes.len() as u32,
            node_type,
            battle_index,
            tick: self.tick,
            elapsed_time: elapsed_ticks as f64 * self.config.tick_seconds(),
            run_state: self.state,
            run_result: self.result,
            enemy_name,
            active_traits: self.active_trait_names(),
            player,
            enemy,
        }
    }

    /// Serializes the full run, RNG position included.
    pub fn export_state(&self) -> EngineResult<Vec<u8>> {
        Ok(postcard::to_allocvec(self)?)
    }

    /// Restores a run exported by [`Run::export_state`] against `catalog`.
    pub fn import_state(bytes: &[u8], catalog: Arc<Catalog>) -> EngineResult<Self> {
        let mut run: Run = postcard::from_bytes(bytes)?;
        run.config.validate()?;
        run.catalog = catalog;
        active_trait_specs(&run.catalog, &run.profile)
            .map_err(|err| EngineError::Snapshot(err.to_string()))?;
        Ok(run)
    }

    #[cfg(test)]
    pub(crate) fn battle_mut(&mut self) -> Option<&mut Battle> {
        self.battle.as_mut()
    }
}

fn battle_ref(battle: &Option<Battle>) -> EngineResult<&Battle> {
    battle
        .as_ref()
        .ok_or_else(|| EngineError::InternalInvariantViolation("no active battle".to_string()))
}

fn active_trait_specs<'c>(catalog: &'c Catalog, profile: &PlayerProfile) -> EngineResult<Vec<&'c TraitSpec>> {
    profile
        .active_traits
        .iter()
        .map(|id| {
            catalog
                .trait_spec(id)
                .ok_or_else(|| EngineError::InternalInvariantViolation(format!("unknown active trait '{}'", id)))
        })
        .collect()
}

/// Whole simulated milliseconds in `dt`; negative or non-finite input counts as zero.
fn dt_to_ms(dt: f64) -> u64 {
    if !dt.is_finite() || dt <= 0.0 {
        return 0;
    }
    (dt * 1000.0).round().min(MAX_STEP_MS) as u64
}
