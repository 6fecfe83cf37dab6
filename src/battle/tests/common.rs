use crate::battle::combatant::Combatant;
use crate::battle::engine::{BattleContext, TickOutcome};
use crate::battle::state::{Battle, PlayerAction};
use crate::catalog::{default_catalog, Catalog};
use crate::config::EngineConfig;
use crate::events::{Event, EventKind, EventLog};
use crate::rng::RngSource;
use schema::{Actor, NodeType, StatusKind};
use std::sync::Arc;

/// A builder for creating test combatants with common defaults.
///
/// # Example
/// ```
/// let enemy = TestCombatantBuilder::enemy()
///     .with_hp(10)
///     .with_status(StatusKind::Burn, 1, 3, 4)
///     .build();
/// ```
pub struct TestCombatantBuilder {
    actor: Actor,
    hp: Option<i32>,
    max_hp: i32,
    attack: i32,
    defense: i32,
    speed: i32,
    gauge: i64,
    statuses: Vec<(StatusKind, u32, u32, i32)>,
}

impl TestCombatantBuilder {
    /// The catalog's player template: 140 hp, 17 attack, 2 defense, 35 speed.
    pub fn player() -> Self {
        Self {
            actor: Actor::Player,
            hp: None,
            max_hp: 140,
            attack: 17,
            defense: 2,
            speed: 35,
            gauge: 0,
            statuses: Vec::new(),
        }
    }

    /// Stats of the Rogue Drone: 84 hp, 11 attack, 1 defense, 28 speed.
    pub fn enemy() -> Self {
        Self {
            actor: Actor::Enemy,
            hp: None,
            max_hp: 84,
            attack: 11,
            defense: 1,
            speed: 28,
            gauge: 0,
            statuses: Vec::new(),
        }
    }

    /// Sets the current HP. If not set, HP will be max.
    pub fn with_hp(mut self, hp: i32) -> Self {
        self.hp = Some(hp);
        self
    }

    pub fn with_stats(mut self, attack: i32, defense: i32, speed: i32) -> Self {
        self.attack = attack;
        self.defense = defense;
        self.speed = speed;
        self
    }

    pub fn with_speed(mut self, speed: i32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_gauge(mut self, gauge: i64) -> Self {
        self.gauge = gauge;
        self
    }

    /// Adds a status as if applied by the opposing side.
    pub fn with_status(mut self, kind: StatusKind, stacks: u32, duration: u32, power: i32) -> Self {
        self.statuses.push((kind, stacks, duration, power));
        self
    }

    pub fn build(self) -> Combatant {
        let catalog = test_catalog();
        let mut combatant = Combatant::new(
            self.actor,
            format!("Test {}", self.actor),
            self.hp.unwrap_or(self.max_hp),
            self.max_hp,
            self.attack,
            self.defense,
            self.speed,
        );
        combatant = match self.actor {
            Actor::Player => {
                let template = catalog.player();
                combatant.with_skills(template.basic_skill.clone(), template.skills.clone())
            }
            Actor::Enemy => combatant.with_skills("basic_attack", vec!["basic_attack".to_string()]),
        };
        combatant.action_gauge = self.gauge;
        for (kind, stacks, duration, power) in self.statuses {
            combatant
                .statuses
                .apply(kind, stacks, duration, power, power, self.actor.opponent());
        }
        combatant
    }
}

pub fn test_catalog() -> Arc<Catalog> {
    match default_catalog() {
        Ok(catalog) => catalog,
        Err(err) => panic!("embedded catalog failed to load: {}", err),
    }
}

/// Config with damage variance disabled so damage numbers are exact.
pub fn exact_config() -> EngineConfig {
    EngineConfig {
        damage_variance_pct: 0,
        ..EngineConfig::default()
    }
}

/// A battle plus everything a `BattleContext` borrows.
pub struct TestBattle {
    pub battle: Battle,
    pub rng: RngSource,
    pub log: EventLog,
    pub catalog: Arc<Catalog>,
    pub config: EngineConfig,
    pub trait_ids: Vec<String>,
}

impl TestBattle {
    pub fn new(player: Combatant, enemy: Combatant) -> Self {
        let catalog = test_catalog();
        let spec = match catalog.enemy("rogue_drone") {
            Some(spec) => spec.clone(),
            None => panic!("rogue_drone missing from catalog"),
        };
        let mut battle = Battle::new(1, NodeType::Battle, player, &spec);
        *battle.combatant_mut(Actor::Enemy) = enemy;
        Self {
            battle,
            rng: RngSource::seeded(42),
            log: EventLog::new(0),
            catalog,
            config: exact_config(),
            trait_ids: Vec::new(),
        }
    }

    pub fn with_traits(mut self, ids: &[&str]) -> Self {
        self.trait_ids = ids.iter().map(|id| id.to_string()).collect();
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn ctx(&mut self) -> BattleContext<'_> {
        let traits = self
            .trait_ids
            .iter()
            .map(|id| match self.catalog.trait_spec(id) {
                Some(spec) => spec,
                None => panic!("unknown trait {}", id),
            })
            .collect();
        BattleContext::new(
            &mut self.battle,
            &mut self.rng,
            &mut self.log,
            &self.catalog,
            &self.config,
            traits,
        )
    }

    /// Runs one engine tick, stamping events with the tick number.
    pub fn tick(&mut self, pending: &mut Option<PlayerAction>) -> TickOutcome {
        let next = self.log.tick() + 1;
        self.log.set_tick(next);
        self.ctx().advance_tick(pending).unwrap()
    }

    /// Ticks until something other than `Continue` happens or `limit` ticks pass.
    pub fn tick_until_stop(&mut self, limit: usize) -> TickOutcome {
        for _ in 0..limit {
            let outcome = self.tick(&mut None);
            if outcome != TickOutcome::Continue {
                return outcome;
            }
        }
        TickOutcome::Continue
    }

    pub fn events(&self) -> &[Event] {
        self.log.events()
    }

    pub fn kinds(&self) -> Vec<&EventKind> {
        self.log.events().iter().map(|e| &e.kind).collect()
    }

    /// Event kind names in order, e.g. `["TurnReady", "ActionUsed"]`.
    pub fn names(&self) -> Vec<&'static str> {
        self.log.events().iter().map(|e| e.kind.name()).collect()
    }

    pub fn player(&self) -> &Combatant {
        self.battle.player()
    }

    pub fn enemy(&self) -> &Combatant {
        self.battle.enemy()
    }
}
