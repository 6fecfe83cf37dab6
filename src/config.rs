//! Engine tuning knobs.
//!
//! Every field has a default, so a RON override only needs to name the values
//! it changes: `(tick_ms: 50, offer_size: 2)`.

use crate::errors::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper clamp for the `max_nodes` argument of a new run.
    pub max_nodes_cap: u32,
    /// Simulated milliseconds covered by one engine tick.
    pub tick_ms: u64,
    /// Action gauge threshold in milli-points (100 gauge points).
    pub gauge_threshold: i64,
    /// Engine ticks between two status pulses.
    pub status_pulse_ticks: u32,
    pub offer_size: usize,
    pub post_battle_recover_pct: i32,
    /// A battle still undecided after this many ticks counts as lost.
    pub battle_tick_limit: u64,
    pub trait_chain_depth_max: usize,
    pub elite_chance: f64,
    pub damage_variance_pct: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_nodes_cap: 12,
            tick_ms: 100,
            gauge_threshold: 100_000,
            status_pulse_ticks: 10,
            offer_size: 3,
            post_battle_recover_pct: 20,
            battle_tick_limit: 20_000,
            trait_chain_depth_max: 3,
            elite_chance: 0.25,
            damage_variance_pct: 10,
        }
    }
}

impl EngineConfig {
    pub fn from_ron_str(source: &str) -> EngineResult<Self> {
        let config: EngineConfig =
            ron::from_str(source).map_err(|err| EngineError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EngineResult<()> {
        let fail = |msg: &str| Err(EngineError::Config(msg.to_string()));
        if self.max_nodes_cap == 0 {
            return fail("max_nodes_cap must be at least 1");
        }
        if self.tick_ms == 0 {
            return fail("tick_ms must be positive");
        }
        if self.gauge_threshold <= 0 {
            return fail("gauge_threshold must be positive");
        }
        if self.status_pulse_ticks == 0 {
            return fail("status_pulse_ticks must be positive");
        }
        if self.offer_size == 0 {
            return fail("offer_size must be at least 1");
        }
        if !(0..=100).contains(&self.post_battle_recover_pct) {
            return fail("post_battle_recover_pct must be within 0..=100");
        }
        if self.battle_tick_limit == 0 {
            return fail("battle_tick_limit must be positive");
        }
        if !(0.0..=1.0).contains(&self.elite_chance) {
            return fail("elite_chance must be within 0.0..=1.0");
        }
        if !(0..100).contains(&self.damage_variance_pct) {
            return fail("damage_variance_pct must be within 0..100");
        }
        Ok(())
    }

    /// Simulated time units per engine tick (one unit is 1000 ms).
    pub fn tick_seconds(&self) -> f64 {
        self.tick_ms as f64 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_ron_override_keeps_other_defaults() {
        let config = EngineConfig::from_ron_str("(tick_ms: 50, offer_size: 2)").unwrap();
        assert_eq!(config.tick_ms, 50);
        assert_eq!(config.offer_size, 2);
        assert_eq!(config.gauge_threshold, 100_000);
        assert_eq!(config.max_nodes_cap, 12);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let err = EngineConfig::from_ron_str("(tick_ms: 0)").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_malformed_ron_is_a_config_error() {
        assert!(matches!(
            EngineConfig::from_ron_str("(tick_ms: \"fast\")"),
            Err(EngineError::Config(_))
        ));
    }
}
