use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};

/// One side of a battle. A battle always has exactly one combatant per side.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, IntoStaticStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Actor {
    Player,
    Enemy,
}

impl Actor {
    /// Turn resolution priority when both gauges are ready in the same tick.
    pub const PRIORITY: [Actor; 2] = [Actor::Player, Actor::Enemy];

    pub fn opponent(self) -> Actor {
        match self {
            Actor::Player => Actor::Enemy,
            Actor::Enemy => Actor::Player,
        }
    }

    pub fn to_index(self) -> usize {
        match self {
            Actor::Player => 0,
            Actor::Enemy => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, IntoStaticStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StatusKind {
    Burn,
    Freeze,
    Shock,
    Break,
    Bleed,
    Stun,
    Might,
    Haste,
}

impl StatusKind {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Maximum number of stacks a single combatant can carry.
    pub fn stack_cap(self) -> u32 {
        match self {
            StatusKind::Burn | StatusKind::Bleed => 5,
            StatusKind::Shock | StatusKind::Break | StatusKind::Might => 3,
            StatusKind::Haste => 2,
            StatusKind::Freeze | StatusKind::Stun => 1,
        }
    }

    /// Kinds that deal `power * stacks` damage on every status pulse.
    pub fn is_damage_over_time(self) -> bool {
        matches!(self, StatusKind::Burn | StatusKind::Shock | StatusKind::Bleed)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StatKind {
    MaxHp,
    Attack,
    Defense,
    Speed,
}

/// Who an effect lands on, resolved against the trigger context.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EffectTarget {
    Src,
    Dst,
    Player,
    Enemy,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NodeType {
    Battle,
    Elite,
    Boss,
}

impl NodeType {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Points in battle resolution where active traits are consulted.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TriggerType {
    OnBattleStart,
    OnTurnStart,
    OnActionUsed,
    OnDamageDealt,
    OnStatusApplied,
    OnStatusTick,
    OnBattleEnd,
}

impl TriggerType {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}
