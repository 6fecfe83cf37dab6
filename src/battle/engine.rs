//! Tick loop and turn resolution for one battle.
//!
//! A `BattleContext` borrows everything a battle needs for the duration of a
//! step: the battle state, the run's RNG stream, the step's event log, the
//! catalog, and the player's active traits. Each engine tick runs the status
//! phase, the battle-end check, the gauge phase and then the turn phase.

use crate::battle::ai::choose_enemy_skill;
use crate::battle::state::{Battle, BattleOutcome, PlayerAction};
use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::errors::{EngineError, EngineResult};
use crate::events::{EventKind, EventLog};
use crate::rng::RngSource;
use schema::{Actor, StatusKind, TraitSpec, TriggerType};
use tracing::debug;

/// What the run should do after a tick or a resumed turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    /// The player's turn is up and no decision is available.
    NeedInput,
    Ended(BattleOutcome),
}

/// Source and destination of the effects resolving under one trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerContext {
    pub trigger: TriggerType,
    pub src: Actor,
    pub dst: Actor,
    pub applied_status: Option<StatusKind>,
}

impl TriggerContext {
    pub fn new(trigger: TriggerType, src: Actor, dst: Actor) -> Self {
        Self {
            trigger,
            src,
            dst,
            applied_status: None,
        }
    }

    pub fn with_status(mut self, status: StatusKind) -> Self {
        self.applied_status = Some(status);
        self
    }
}

pub struct BattleContext<'a> {
    pub battle: &'a mut Battle,
    pub rng: &'a mut RngSource,
    pub log: &'a mut EventLog,
    pub catalog: &'a Catalog,
    pub config: &'a EngineConfig,
    pub(crate) traits: Vec<&'a TraitSpec>,
    /// Indices into `traits` currently resolving, innermost last.
    pub(crate) trait_stack: Vec<usize>,
}

impl<'a> BattleContext<'a> {
    pub fn new(
        battle: &'a mut Battle,
        rng: &'a mut RngSource,
        log: &'a mut EventLog,
        catalog: &'a Catalog,
        config: &'a EngineConfig,
        traits: Vec<&'a TraitSpec>,
    ) -> Self {
        Self {
            battle,
            rng,
            log,
            catalog,
            config,
            traits,
            trait_stack: Vec::new(),
        }
    }

    /// Announces the battle and fires battle-start triggers.
    pub fn start(&mut self) -> EngineResult<()> {
        self.log.push(EventKind::BattleStart {
            battle_index: self.battle.battle_index,
            enemy_name: self.battle.enemy_name.clone(),
        });
        debug!(
            battle_index = self.battle.battle_index,
            enemy = %self.battle.enemy_name,
            "battle started"
        );
        self.fire(TriggerContext::new(TriggerType::OnBattleStart, Actor::Player, Actor::Enemy))
    }

    /// Fires battle-end triggers, then emits `BattleEnd` with the hp they leave behind.
    pub fn finish(&mut self, outcome: BattleOutcome) -> EngineResult<()> {
        self.fire(TriggerContext::new(TriggerType::OnBattleEnd, Actor::Player, Actor::Enemy))?;
        self.log.push(EventKind::BattleEnd {
            result: outcome,
            player_hp_after: self.battle.player().hp(),
        });
        debug!(?outcome, ticks = self.battle.elapsed_ticks, "battle ended");
        Ok(())
    }

    /// Runs one engine tick. The caller has already advanced the run tick.
    ///
    /// `pending` holds a player decision supplied ahead of time; it is consumed
    /// by the first player turn that comes up.
    pub fn advance_tick(&mut self, pending: &mut Option<PlayerAction>) -> EngineResult<TickOutcome> {
        if self.battle.elapsed_ticks >= self.config.battle_tick_limit {
            self.battle.timed_out = true;
            debug!(limit = self.config.battle_tick_limit, "battle hit the tick limit");
            return Ok(self.ended());
        }
        self.battle.elapsed_ticks += 1;

        for actor in Actor::PRIORITY {
            self.status_phase(actor)?;
            if self.battle.is_decided() {
                return Ok(self.ended());
            }
        }

        for actor in Actor::PRIORITY {
            let tick_ms = self.config.tick_ms;
            let combatant = self.battle.combatant_mut(actor);
            if combatant.is_alive() {
                combatant.action_gauge += combatant.gauge_gain(tick_ms);
            }
        }

        self.turn_phase(pending)
    }

    /// Resolves the announced player turn with `action`, then every other
    /// actor whose gauge is already full. Time does not advance.
    pub fn resume(&mut self, action: PlayerAction) -> EngineResult<TickOutcome> {
        if !self.battle.player_turn_announced {
            return Err(EngineError::InternalInvariantViolation(
                "resumed a player turn that was never announced".to_string(),
            ));
        }
        self.resolve_player_turn(action)?;
        if self.battle.is_decided() {
            return Ok(self.ended());
        }
        self.turn_phase(&mut None)
    }

    fn ended(&self) -> TickOutcome {
        TickOutcome::Ended(self.battle.outcome().unwrap_or(BattleOutcome::Lose))
    }

    fn status_phase(&mut self, owner: Actor) -> EngineResult<()> {
        let pulse_ticks = self.config.status_pulse_ticks;
        for kind in self.battle.combatant(owner).statuses.kinds() {
            let combatant = self.battle.combatant_mut(owner);
            if !combatant.statuses.advance_pulse(kind, pulse_ticks) {
                continue;
            }
            let Some(status) = combatant.statuses.get(kind) else {
                continue;
            };
            let amount = status.pulse_damage();
            let source = status.source;

            // Non-damaging kinds still tick, with amount 0.
            let dst_hp_after = combatant.take_damage(amount);
            self.log.push(EventKind::StatusTick {
                dst: owner,
                status: kind,
                amount,
                dst_hp_after,
            });
            self.battle.note_fallen(owner);
            if self.battle.is_decided() {
                return Ok(());
            }
            self.fire(TriggerContext::new(TriggerType::OnStatusTick, source, owner).with_status(kind))?;
            if self.battle.is_decided() {
                return Ok(());
            }

            if self.battle.combatant_mut(owner).statuses.decrement(kind) {
                self.log.push(EventKind::StatusExpired {
                    dst: owner,
                    status: kind,
                });
            }
        }
        Ok(())
    }

    fn ready_actor(&self) -> Option<Actor> {
        let threshold = self.config.gauge_threshold;
        Actor::PRIORITY.into_iter().find(|actor| {
            let combatant = self.battle.combatant(*actor);
            combatant.is_alive() && combatant.action_gauge >= threshold
        })
    }

    fn turn_phase(&mut self, pending: &mut Option<PlayerAction>) -> EngineResult<TickOutcome> {
        while let Some(actor) = self.ready_actor() {
            match actor {
                Actor::Player => {
                    if !self.battle.player_turn_announced {
                        self.battle.player_turn_announced = true;
                        self.announce_turn(Actor::Player)?;
                        if self.battle.is_decided() {
                            return Ok(self.ended());
                        }
                    }
                    let Some(action) = pending.take() else {
                        return Ok(TickOutcome::NeedInput);
                    };
                    self.resolve_player_turn(action)?;
                }
                Actor::Enemy => {
                    self.announce_turn(Actor::Enemy)?;
                    if self.battle.is_decided() {
                        return Ok(self.ended());
                    }
                    let skill_id = choose_enemy_skill(self.battle, self.rng)?;
                    self.battle.combatant_mut(Actor::Enemy).action_gauge -= self.config.gauge_threshold;
                    self.execute_skill(Actor::Enemy, &skill_id)?;
                }
            }
            if self.battle.is_decided() {
                return Ok(self.ended());
            }
        }
        Ok(TickOutcome::Continue)
    }

    fn announce_turn(&mut self, actor: Actor) -> EngineResult<()> {
        self.log.push(EventKind::TurnReady { actor });
        self.fire(TriggerContext::new(TriggerType::OnTurnStart, actor, actor.opponent()))
    }

    fn resolve_player_turn(&mut self, action: PlayerAction) -> EngineResult<()> {
        let skill_id = {
            let player = self.battle.player();
            match action {
                PlayerAction::Basic => player.basic_skill.clone(),
                PlayerAction::Skill(index) => player
                    .skills
                    .get(index)
                    .cloned()
                    .ok_or(EngineError::InvalidSkillIndex(index as i32))?,
            }
        };
        self.battle.player_turn_announced = false;
        self.battle.combatant_mut(Actor::Player).action_gauge -= self.config.gauge_threshold;
        self.execute_skill(Actor::Player, &skill_id)
    }

    /// `ActionUsed`, then action-used triggers, then the skill's effects in order.
    pub fn execute_skill(&mut self, actor: Actor, skill_id: &str) -> EngineResult<()> {
        let catalog = self.catalog;
        let skill = catalog.skill(skill_id).ok_or_else(|| {
            EngineError::InternalInvariantViolation(format!("unknown skill '{}'", skill_id))
        })?;

        self.log.push(EventKind::ActionUsed {
            actor,
            action_name: skill.name.clone(),
        });
        let context = TriggerContext::new(TriggerType::OnActionUsed, actor, actor.opponent());
        self.fire(context)?;

        for effect in &skill.effects {
            if self.battle.is_decided() {
                break;
            }
            self.resolve_effect(effect, &context, false)?;
        }
        Ok(())
    }
}
