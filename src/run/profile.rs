use crate::battle::combatant::Combatant;
use schema::{Actor, PlayerTemplate, StatKind, StatModifier, TraitSpec};
use serde::{Deserialize, Serialize};

/// The player's run-persistent record. Each battle builds its player
/// combatant from here and hands the surviving hp back on a win.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PlayerProfile {
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
    pub basic_skill: String,
    pub skills: Vec<String>,
    /// Locked-in trait ids, in selection order.
    pub active_traits: Vec<String>,
}

impl PlayerProfile {
    pub fn from_template(template: &PlayerTemplate) -> Self {
        Self {
            name: template.name.clone(),
            hp: template.max_hp,
            max_hp: template.max_hp,
            attack: template.attack,
            defense: template.defense,
            speed: template.speed,
            basic_skill: template.basic_skill.clone(),
            skills: template.skills.clone(),
            active_traits: Vec::new(),
        }
    }

    /// Locks in a trait and applies its static modifiers once.
    pub fn adopt_trait(&mut self, spec: &TraitSpec) {
        self.active_traits.push(spec.id.clone());
        for modifier in &spec.modifiers {
            self.apply_modifier(modifier);
        }
    }

    pub fn apply_modifier(&mut self, modifier: &StatModifier) {
        match modifier.stat {
            StatKind::MaxHp => {
                self.max_hp = (self.max_hp + modifier.amount).max(1);
                if modifier.amount > 0 {
                    self.hp += modifier.amount;
                }
                self.hp = self.hp.clamp(0, self.max_hp);
            }
            StatKind::Attack => self.attack = (self.attack + modifier.amount).max(0),
            StatKind::Defense => self.defense = (self.defense + modifier.amount).max(0),
            StatKind::Speed => self.speed = (self.speed + modifier.amount).max(0),
        }
    }

    /// Restores `pct` percent of max hp, rounded half up. Returns the amount healed.
    pub fn recover(&mut self, pct: i32) -> i32 {
        let before = self.hp;
        let amount = (self.max_hp * pct + 50) / 100;
        self.hp = (self.hp + amount).min(self.max_hp);
        self.hp - before
    }

    pub fn to_combatant(&self) -> Combatant {
        Combatant::new(
            Actor::Player,
            self.name.clone(),
            self.hp,
            self.max_hp,
            self.attack,
            self.defense,
            self.speed,
        )
        .with_skills(self.basic_skill.clone(), self.skills.clone())
    }
}
