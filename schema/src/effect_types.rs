use crate::combat_types::{EffectTarget, StatKind, StatusKind};
use serde::{Deserialize, Serialize};

/// Predicate evaluated against a trigger context before an effect resolves.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub enum Condition {
    #[default]
    Always,
    SrcIsPlayer,
    DstIsEnemy,
    AppliedStatusIs(StatusKind),
    /// Consumes one RNG draw unless the chance is trivially 0 or 1.
    RandomRollBelow(f64),
    TargetHpBelowPct(u32),
    TargetHasStatus(StatusKind),
    TargetStatusCountAtLeast(u32),
    All(Vec<Condition>),
}

/// The closed set of things a skill or a trait rule can do.
///
/// Skills and traits share one resolver, so every variant must make sense
/// in both contexts. `DealDamage` is the only variant whose math differs:
/// skills run it through the attack/defense formula with variance, traits
/// treat it as a bonus hit scaled from the source's attack.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Effect {
    DealDamage {
        multiplier_pct: u32,
        #[serde(default)]
        flat: i32,
    },
    DealPureDamage {
        target: EffectTarget,
        amount: i32,
    },
    ApplyStatus {
        target: EffectTarget,
        status: StatusKind,
        chance: f64,
        duration: u32,
        #[serde(default = "one")]
        stacks: u32,
        #[serde(default)]
        power: i32,
    },
    AddStatusStacks {
        target: EffectTarget,
        status: StatusKind,
        stacks: u32,
    },
    ModifyStatusPower {
        status: StatusKind,
        mul_pct: u32,
    },
    ModifyStat {
        target: EffectTarget,
        stat: StatKind,
        amount: i32,
    },
    Heal {
        target: EffectTarget,
        amount: i32,
    },
    Conditional {
        condition: Condition,
        effect: Box<Effect>,
    },
}

fn one() -> u32 {
    1
}

impl Effect {
    /// Short machine-friendly description used in `TraitEffectApplied` events.
    pub fn summary(&self) -> String {
        match self {
            Effect::DealDamage { multiplier_pct, flat } => {
                format!("deal_damage {}% +{}", multiplier_pct, flat)
            }
            Effect::DealPureDamage { amount, .. } => format!("deal_pure_damage {}", amount),
            Effect::ApplyStatus { status, stacks, duration, .. } => {
                format!("apply_status {} x{} for {}", status, stacks, duration)
            }
            Effect::AddStatusStacks { status, stacks, .. } => {
                format!("add_status_stacks {} +{}", status, stacks)
            }
            Effect::ModifyStatusPower { status, mul_pct } => {
                format!("modify_status_power {} {}%", status, mul_pct)
            }
            Effect::ModifyStat { stat, amount, .. } => format!("modify_stat {} {:+}", stat, amount),
            Effect::Heal { amount, .. } => format!("heal {}", amount),
            Effect::Conditional { effect, .. } => effect.summary(),
        }
    }

    /// The status this effect would apply, if any. Used by the autopilot.
    pub fn applied_status(&self) -> Option<StatusKind> {
        match self {
            Effect::ApplyStatus { status, .. } | Effect::AddStatusStacks { status, .. } => Some(*status),
            Effect::Conditional { effect, .. } => effect.applied_status(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conditional_summary_describes_inner_effect() {
        let effect = Effect::Conditional {
            condition: Condition::TargetHasStatus(StatusKind::Freeze),
            effect: Box::new(Effect::ApplyStatus {
                target: EffectTarget::Dst,
                status: StatusKind::Stun,
                chance: 0.5,
                duration: 2,
                stacks: 1,
                power: 0,
            }),
        };
        assert_eq!(effect.summary(), "apply_status stun x1 for 2");
        assert_eq!(effect.applied_status(), Some(StatusKind::Stun));
    }

    #[test]
    fn test_modify_stat_summary_is_signed() {
        let effect = Effect::ModifyStat {
            target: EffectTarget::Player,
            stat: StatKind::Defense,
            amount: 1,
        };
        assert_eq!(effect.summary(), "modify_stat defense +1");
    }
}
