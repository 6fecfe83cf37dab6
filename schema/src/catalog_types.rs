use crate::combat_types::{NodeType, StatKind, TriggerType};
use crate::effect_types::{Condition, Effect};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SkillSpec {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub effects: Vec<Effect>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TriggerRule {
    pub trigger: TriggerType,
    #[serde(default)]
    pub condition: Condition,
    pub effects: Vec<Effect>,
}

/// A permanent adjustment applied to the player once, when a trait is locked in.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatModifier {
    pub stat: StatKind,
    pub amount: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TraitSpec {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub modifiers: Vec<StatModifier>,
    #[serde(default)]
    pub rules: Vec<TriggerRule>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WeightedSkill {
    pub skill: String,
    pub weight: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EnemySpec {
    pub id: String,
    pub name: String,
    pub tier: NodeType,
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
    pub skills: Vec<WeightedSkill>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct PlayerTemplate {
    pub name: String,
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
    pub basic_skill: String,
    pub skills: Vec<String>,
}
