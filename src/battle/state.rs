use crate::battle::combatant::Combatant;
use crate::errors::{EngineError, EngineResult};
use schema::{Actor, EnemySpec, NodeType, WeightedSkill};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BattleOutcome {
    Win,
    Lose,
}

/// A decision submitted for the player's pending turn.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    Basic,
    /// Index into the player's skill list.
    Skill(usize),
}

impl PlayerAction {
    /// Parses the wire form `(action_kind, action_arg)`. `"none"` yields `Ok(None)`.
    pub fn parse(kind: &str, arg: i32) -> EngineResult<Option<PlayerAction>> {
        match kind {
            "none" => Ok(None),
            "basic" => Ok(Some(PlayerAction::Basic)),
            "skill" => {
                let index = usize::try_from(arg).map_err(|_| EngineError::InvalidSkillIndex(arg))?;
                Ok(Some(PlayerAction::Skill(index)))
            }
            other => Err(EngineError::InvalidAction(other.to_string())),
        }
    }
}

/// State of the encounter at the current node.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Battle {
    pub battle_index: u32,
    pub node_type: NodeType,
    pub enemy_id: String,
    pub enemy_name: String,
    combatants: [Combatant; 2],
    pub enemy_skills: Vec<WeightedSkill>,
    /// Set once the player's `TurnReady` has been emitted and cleared when the turn resolves.
    pub player_turn_announced: bool,
    pub elapsed_ticks: u64,
    pub first_fallen: Option<Actor>,
    /// Forced result when the battle ran past the tick limit.
    pub timed_out: bool,
}

impl Battle {
    pub fn new(battle_index: u32, node_type: NodeType, player: Combatant, enemy_spec: &EnemySpec) -> Self {
        Self {
            battle_index,
            node_type,
            enemy_id: enemy_spec.id.clone(),
            enemy_name: enemy_spec.name.clone(),
            combatants: [player, Combatant::from_enemy_spec(enemy_spec)],
            enemy_skills: enemy_spec.skills.clone(),
            player_turn_announced: false,
            elapsed_ticks: 0,
            first_fallen: None,
            timed_out: false,
        }
    }

    pub fn combatant(&self, actor: Actor) -> &Combatant {
        &self.combatants[actor.to_index()]
    }

    pub fn combatant_mut(&mut self, actor: Actor) -> &mut Combatant {
        &mut self.combatants[actor.to_index()]
    }

    pub fn player(&self) -> &Combatant {
        self.combatant(Actor::Player)
    }

    pub fn enemy(&self) -> &Combatant {
        self.combatant(Actor::Enemy)
    }

    /// Records the first combatant to reach zero hp.
    pub fn note_fallen(&mut self, actor: Actor) {
        if self.first_fallen.is_none() && !self.combatant(actor).is_alive() {
            self.first_fallen = Some(actor);
        }
    }

    /// True once the result is fixed and only battle-end processing may run.
    pub fn is_decided(&self) -> bool {
        self.first_fallen.is_some() || self.timed_out
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        match self.first_fallen {
            Some(Actor::Enemy) => Some(BattleOutcome::Win),
            Some(Actor::Player) => Some(BattleOutcome::Lose),
            None if self.timed_out => Some(BattleOutcome::Lose),
            None => None,
        }
    }

    pub fn check_invariants(&self) -> EngineResult<()> {
        for combatant in &self.combatants {
            if !combatant.hp_within_bounds() {
                return Err(EngineError::InternalInvariantViolation(format!(
                    "{} hp {} outside 0..={}",
                    combatant.actor,
                    combatant.hp(),
                    combatant.max_hp()
                )));
            }
            if combatant.action_gauge < 0 {
                return Err(EngineError::InternalInvariantViolation(format!(
                    "{} action gauge went negative",
                    combatant.actor
                )));
            }
        }
        Ok(())
    }
}
