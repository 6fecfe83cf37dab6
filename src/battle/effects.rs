//! The closed effect resolver shared by skills and trait rules, and trait
//! trigger dispatch.

use crate::battle::engine::{BattleContext, TriggerContext};
use crate::errors::EngineResult;
use crate::events::EventKind;
use schema::{Actor, Condition, Effect, EffectTarget, StatusKind, TriggerType};
use tracing::debug;

impl<'a> BattleContext<'a> {
    /// Consults active traits for `context.trigger`, in registration order then rule order.
    ///
    /// A trait never re-enters itself while one of its own effects is resolving,
    /// and nesting stops at `trait_chain_depth_max`.
    pub fn fire(&mut self, context: TriggerContext) -> EngineResult<()> {
        let is_battle_end = context.trigger == TriggerType::OnBattleEnd;
        if self.trait_stack.len() >= self.config.trait_chain_depth_max {
            return Ok(());
        }

        for trait_index in 0..self.traits.len() {
            if self.trait_stack.contains(&trait_index) {
                continue;
            }
            let spec = self.traits[trait_index];
            for rule in &spec.rules {
                if rule.trigger != context.trigger {
                    continue;
                }
                if !is_battle_end && self.battle.is_decided() {
                    return Ok(());
                }
                if !self.evaluate(&rule.condition, &context) {
                    continue;
                }

                self.log.push(EventKind::TraitTriggered {
                    trait_name: spec.name.clone(),
                    trigger_type: rule.trigger,
                });
                debug!(trait_id = %spec.id, trigger = %rule.trigger, "trait triggered");

                self.trait_stack.push(trait_index);
                let resolved = self.resolve_rule_effects(&spec.name, &rule.effects, &context);
                self.trait_stack.pop();
                resolved?;
            }
        }
        Ok(())
    }

    fn resolve_rule_effects(
        &mut self,
        trait_name: &str,
        effects: &[Effect],
        context: &TriggerContext,
    ) -> EngineResult<()> {
        for effect in effects {
            if self.resolve_effect(effect, context, true)? {
                self.log.push(EventKind::TraitEffectApplied {
                    trait_name: trait_name.to_string(),
                    effect_summary: effect.summary(),
                });
            }
        }
        Ok(())
    }

    pub fn evaluate(&mut self, condition: &Condition, context: &TriggerContext) -> bool {
        match condition {
            Condition::Always => true,
            Condition::SrcIsPlayer => context.src == Actor::Player,
            Condition::DstIsEnemy => context.dst == Actor::Enemy,
            Condition::AppliedStatusIs(kind) => context.applied_status == Some(*kind),
            Condition::RandomRollBelow(chance) => self.rng.roll(*chance),
            Condition::TargetHpBelowPct(pct) => {
                let target = self.battle.combatant(context.dst);
                (target.hp() as i64) * 100 < (target.max_hp() as i64) * (*pct as i64)
            }
            Condition::TargetHasStatus(kind) => self.battle.combatant(context.dst).statuses.has(*kind),
            Condition::TargetStatusCountAtLeast(count) => {
                self.battle.combatant(context.dst).statuses.len() >= *count as usize
            }
            Condition::All(conditions) => conditions.iter().all(|c| self.evaluate(c, context)),
        }
    }

    fn resolve_target(&self, target: EffectTarget, context: &TriggerContext) -> Actor {
        match target {
            EffectTarget::Src => context.src,
            EffectTarget::Dst => context.dst,
            EffectTarget::Player => Actor::Player,
            EffectTarget::Enemy => Actor::Enemy,
        }
    }

    /// Resolves one effect. Returns false when nothing happened because a
    /// conditional or chance roll failed, or the target had already fallen.
    ///
    /// `from_trait` switches `DealDamage` from the skill formula to a bonus hit.
    pub fn resolve_effect(
        &mut self,
        effect: &Effect,
        context: &TriggerContext,
        from_trait: bool,
    ) -> EngineResult<bool> {
        let is_battle_end = context.trigger == TriggerType::OnBattleEnd;
        if !is_battle_end && self.battle.is_decided() {
            return Ok(false);
        }

        match effect {
            Effect::DealDamage { multiplier_pct, flat } => {
                if !self.battle.combatant(context.dst).is_alive() {
                    return Ok(false);
                }
                let amount = if from_trait {
                    self.bonus_damage(context.src, *multiplier_pct, *flat)
                } else {
                    self.skill_damage(context.src, context.dst, *multiplier_pct, *flat)
                };
                self.deal_damage(context.src, context.dst, amount)?;
                Ok(true)
            }
            Effect::DealPureDamage { target, amount } => {
                let dst = self.resolve_target(*target, context);
                if !self.battle.combatant(dst).is_alive() {
                    return Ok(false);
                }
                self.deal_damage(context.src, dst, (*amount).max(0))?;
                Ok(true)
            }
            Effect::ApplyStatus {
                target,
                status,
                chance,
                duration,
                stacks,
                power,
            } => {
                let dst = self.resolve_target(*target, context);
                if !self.battle.combatant(dst).is_alive() {
                    return Ok(false);
                }
                if !self.rng.roll(*chance) {
                    return Ok(false);
                }
                self.apply_status(context.src, dst, *status, *stacks, *duration, *power)?;
                Ok(true)
            }
            Effect::AddStatusStacks { target, status, stacks } => {
                let dst = self.resolve_target(*target, context);
                if !self.battle.combatant(dst).is_alive() {
                    return Ok(false);
                }
                self.apply_status(context.src, dst, *status, *stacks, 1, 0)?;
                Ok(true)
            }
            Effect::ModifyStatusPower { status, mul_pct } => {
                self.battle
                    .combatant_mut(context.src)
                    .raise_status_power(*status, *mul_pct);
                let target = self.battle.combatant_mut(context.dst);
                let applied_by_src = target
                    .statuses
                    .get(*status)
                    .is_some_and(|s| s.source == context.src);
                if applied_by_src {
                    target.statuses.scale_power(*status, *mul_pct);
                }
                Ok(true)
            }
            Effect::ModifyStat { target, stat, amount } => {
                let dst = self.resolve_target(*target, context);
                self.battle.combatant_mut(dst).modify_stat(*stat, *amount);
                Ok(true)
            }
            Effect::Heal { target, amount } => {
                let dst = self.resolve_target(*target, context);
                let combatant = self.battle.combatant_mut(dst);
                if !combatant.is_alive() {
                    return Ok(false);
                }
                combatant.heal(*amount);
                Ok(true)
            }
            Effect::Conditional { condition, effect } => {
                if !self.evaluate(condition, context) {
                    return Ok(false);
                }
                self.resolve_effect(effect, context, from_trait)
            }
        }
    }

    /// `(attack * multiplier + flat - defense)` scaled by a variance roll, floored at zero.
    fn skill_damage(&mut self, src: Actor, dst: Actor, multiplier_pct: u32, flat: i32) -> i32 {
        let attack = self.battle.combatant(src).effective_attack();
        let defense = self.battle.combatant(dst).effective_defense();
        let raw = attack * multiplier_pct as i32 / 100 + flat - defense;
        let variance = self.config.damage_variance_pct as i64;
        let roll = self.rng.next_range(-variance, variance + 1);
        let scaled = raw as i64 * (100 + roll) / 100;
        scaled.max(0) as i32
    }

    /// Trait bonus hits ignore defense and variance.
    fn bonus_damage(&self, src: Actor, multiplier_pct: u32, flat: i32) -> i32 {
        let attack = self.battle.combatant(src).effective_attack();
        (attack * multiplier_pct as i32 / 100 + flat).max(0)
    }

    fn deal_damage(&mut self, src: Actor, dst: Actor, amount: i32) -> EngineResult<()> {
        let dst_hp_after = self.battle.combatant_mut(dst).take_damage(amount);
        self.log.push(EventKind::DamageDealt {
            src,
            dst,
            amount,
            dst_hp_after,
        });
        self.battle.note_fallen(dst);
        self.fire(TriggerContext::new(TriggerType::OnDamageDealt, src, dst))
    }

    fn apply_status(
        &mut self,
        src: Actor,
        dst: Actor,
        status: StatusKind,
        stacks: u32,
        duration: u32,
        power: i32,
    ) -> EngineResult<()> {
        let mul_pct = self.battle.combatant(src).status_power_pct(status);
        let scaled = power * mul_pct as i32 / 100;
        let applied = self
            .battle
            .combatant_mut(dst)
            .statuses
            .apply(status, stacks, duration, power, scaled, src);
        self.log.push(EventKind::StatusApplied {
            src,
            dst,
            status,
            stacks: applied.stacks,
            duration: applied.duration,
        });
        self.fire(TriggerContext::new(TriggerType::OnStatusApplied, src, dst).with_status(status))
    }
}
