use crate::battle::status::StatusTable;
use schema::{Actor, EnemySpec, StatKind, StatusKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const MIGHT_ATTACK_PER_STACK: i32 = 2;
const BREAK_DEFENSE_PER_STACK: i32 = 2;
const HASTE_RATE_PER_STACK: i64 = 25;

/// One side of a battle.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Combatant {
    pub actor: Actor,
    pub name: String,
    hp: i32,
    max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
    /// Milli-points; a turn triggers at the configured threshold.
    pub action_gauge: i64,
    pub skills: Vec<String>,
    pub basic_skill: String,
    pub statuses: StatusTable,
    /// Power multipliers (percent) for statuses this combatant applies.
    pub status_power_pct: BTreeMap<StatusKind, u32>,
}

impl Combatant {
    pub fn new(
        actor: Actor,
        name: impl Into<String>,
        hp: i32,
        max_hp: i32,
        attack: i32,
        defense: i32,
        speed: i32,
    ) -> Self {
        let max_hp = max_hp.max(1);
        Self {
            actor,
            name: name.into(),
            hp: hp.clamp(0, max_hp),
            max_hp,
            attack,
            defense,
            speed,
            action_gauge: 0,
            skills: Vec::new(),
            basic_skill: String::new(),
            statuses: StatusTable::new(),
            status_power_pct: BTreeMap::new(),
        }
    }

    pub fn from_enemy_spec(spec: &EnemySpec) -> Self {
        let mut enemy = Self::new(
            Actor::Enemy,
            spec.name.clone(),
            spec.max_hp,
            spec.max_hp,
            spec.attack,
            spec.defense,
            spec.speed,
        );
        enemy.skills = spec.skills.iter().map(|s| s.skill.clone()).collect();
        enemy.basic_skill = spec
            .skills
            .first()
            .map(|s| s.skill.clone())
            .unwrap_or_default();
        enemy
    }

    pub fn with_skills(mut self, basic_skill: impl Into<String>, skills: Vec<String>) -> Self {
        self.basic_skill = basic_skill.into();
        self.skills = skills;
        self
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Applies damage and returns the hp left.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        self.hp = (self.hp - amount.max(0)).max(0);
        self.hp
    }

    /// Restores hp up to the maximum and returns the amount actually healed.
    pub fn heal(&mut self, amount: i32) -> i32 {
        if !self.is_alive() {
            return 0;
        }
        let before = self.hp;
        self.hp = (self.hp + amount.max(0)).min(self.max_hp);
        self.hp - before
    }

    pub fn effective_attack(&self) -> i32 {
        self.attack.max(0) + MIGHT_ATTACK_PER_STACK * self.statuses.stacks_of(StatusKind::Might) as i32
    }

    pub fn effective_defense(&self) -> i32 {
        (self.defense - BREAK_DEFENSE_PER_STACK * self.statuses.stacks_of(StatusKind::Break) as i32).max(0)
    }

    /// Gauge fill rate in percent of base speed.
    pub fn gauge_rate_pct(&self) -> i64 {
        if self.statuses.has(StatusKind::Stun) {
            return 0;
        }
        let rate = 100 + HASTE_RATE_PER_STACK * self.statuses.stacks_of(StatusKind::Haste) as i64;
        if self.statuses.has(StatusKind::Freeze) {
            rate / 2
        } else {
            rate
        }
    }

    /// Milli-points gained over one engine tick.
    pub fn gauge_gain(&self, tick_ms: u64) -> i64 {
        self.speed.max(0) as i64 * tick_ms as i64 * self.gauge_rate_pct() / 100
    }

    pub fn modify_stat(&mut self, stat: StatKind, amount: i32) {
        match stat {
            StatKind::MaxHp => {
                self.max_hp = (self.max_hp + amount).max(1);
                if amount > 0 && self.is_alive() {
                    self.hp += amount;
                }
                self.hp = self.hp.min(self.max_hp);
            }
            StatKind::Attack => self.attack = (self.attack + amount).max(0),
            StatKind::Defense => self.defense = (self.defense + amount).max(0),
            StatKind::Speed => self.speed = (self.speed + amount).max(0),
        }
    }

    pub fn status_power_pct(&self, kind: StatusKind) -> u32 {
        self.status_power_pct.get(&kind).copied().unwrap_or(100)
    }

    /// Records a power multiplier; the strongest one wins.
    pub fn raise_status_power(&mut self, kind: StatusKind, mul_pct: u32) {
        let entry = self.status_power_pct.entry(kind).or_insert(100);
        *entry = (*entry).max(mul_pct);
    }

    pub fn hp_within_bounds(&self) -> bool {
        self.max_hp >= 1 && (0..=self.max_hp).contains(&self.hp)
    }

    #[cfg(test)]
    pub(crate) fn force_hp(&mut self, hp: i32) {
        self.hp = hp;
    }
}
