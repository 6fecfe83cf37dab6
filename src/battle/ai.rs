//! Action policies: the RNG-weighted enemy policy and player autopilots.

use crate::battle::state::{Battle, PlayerAction};
use crate::catalog::Catalog;
use crate::errors::{EngineError, EngineResult};
use crate::rng::RngSource;

/// Answers a pending player turn. Implemented by autopilots that drive a run headlessly.
pub trait Behavior {
    fn decide_action(&self, battle: &Battle, catalog: &Catalog) -> PlayerAction;
}

/// Prefers skills that would put a new status on the enemy, otherwise attacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringPilot;

impl ScoringPilot {
    pub fn new() -> Self {
        Self
    }

    fn score_action(&self, action: PlayerAction, battle: &Battle, catalog: &Catalog) -> i32 {
        match action {
            PlayerAction::Basic => 1,
            PlayerAction::Skill(index) => {
                let Some(skill) = battle
                    .player()
                    .skills
                    .get(index)
                    .and_then(|id| catalog.skill(id))
                else {
                    return -1;
                };
                let fresh_status = skill
                    .effects
                    .iter()
                    .filter_map(|effect| effect.applied_status())
                    .any(|status| !battle.enemy().statuses.has(status));
                if fresh_status {
                    2
                } else {
                    0
                }
            }
        }
    }
}

impl Behavior for ScoringPilot {
    fn decide_action(&self, battle: &Battle, catalog: &Catalog) -> PlayerAction {
        let candidates = (0..battle.player().skills.len())
            .map(PlayerAction::Skill)
            .chain(std::iter::once(PlayerAction::Basic));

        let mut best = PlayerAction::Basic;
        let mut best_score = i32::MIN;
        for action in candidates {
            let score = self.score_action(action, battle, catalog);
            // Strictly greater keeps the earliest candidate on ties.
            if score > best_score {
                best = action;
                best_score = score;
            }
        }
        best
    }
}

/// Picks the enemy's next skill id with one weighted RNG draw.
pub fn choose_enemy_skill(battle: &Battle, rng: &mut RngSource) -> EngineResult<String> {
    let weights: Vec<u32> = battle.enemy_skills.iter().map(|s| s.weight).collect();
    let index = rng.pick_weighted(&weights).ok_or_else(|| {
        EngineError::InternalInvariantViolation(format!("{} has no usable skill", battle.enemy_name))
    })?;
    Ok(battle.enemy_skills[index].skill.clone())
}
