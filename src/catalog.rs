//! Immutable game data: skills, traits, enemies and the player template.
//!
//! The data ships inside the binary as RON files under `data/`. It is parsed
//! and validated once, then shared between runs behind an `Arc`.

use crate::errors::{CatalogError, CatalogResult};
use schema::{EnemySpec, NodeType, PlayerTemplate, SkillSpec, TraitSpec};
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

const SKILLS_RON: &str = include_str!("../data/skills.ron");
const TRAITS_RON: &str = include_str!("../data/traits.ron");
const ENEMIES_RON: &str = include_str!("../data/enemies.ron");
const PLAYER_RON: &str = include_str!("../data/player.ron");

// Global catalog - parsed on first use
static DEFAULT_CATALOG: LazyLock<CatalogResult<Arc<Catalog>>> = LazyLock::new(|| {
    Catalog::from_ron_sources(SKILLS_RON, TRAITS_RON, ENEMIES_RON, PLAYER_RON).map(Arc::new)
});

/// The embedded catalog shared by every run in the process.
pub fn default_catalog() -> CatalogResult<Arc<Catalog>> {
    DEFAULT_CATALOG.clone()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    skills: Vec<SkillSpec>,
    traits: Vec<TraitSpec>,
    enemies: Vec<EnemySpec>,
    player: PlayerTemplate,
}

impl Catalog {
    pub fn from_ron_sources(
        skills: &str,
        traits: &str,
        enemies: &str,
        player: &str,
    ) -> CatalogResult<Self> {
        let catalog = Catalog {
            skills: parse("skills.ron", skills)?,
            traits: parse("traits.ron", traits)?,
            enemies: parse("enemies.ron", enemies)?,
            player: parse("player.ron", player)?,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> CatalogResult<()> {
        unique_ids("skill", self.skills.iter().map(|s| s.id.as_str()))?;
        unique_ids("trait", self.traits.iter().map(|t| t.id.as_str()))?;
        unique_ids("enemy", self.enemies.iter().map(|e| e.id.as_str()))?;

        if self.traits.is_empty() {
            return Err(CatalogError::Malformed("trait catalog is empty".to_string()));
        }

        let player_skills = std::iter::once(&self.player.basic_skill).chain(self.player.skills.iter());
        for skill in player_skills {
            self.require_skill(&self.player.name, skill)?;
        }
        if self.player.max_hp <= 0 {
            return Err(CatalogError::Malformed("player max_hp must be positive".to_string()));
        }

        for enemy in &self.enemies {
            if enemy.max_hp <= 0 {
                return Err(CatalogError::Malformed(format!("{} has no hp", enemy.id)));
            }
            if enemy.skills.iter().all(|s| s.weight == 0) {
                return Err(CatalogError::Malformed(format!("{} has no usable skill", enemy.id)));
            }
            for weighted in &enemy.skills {
                self.require_skill(&enemy.id, &weighted.skill)?;
            }
        }

        for tier in [NodeType::Battle, NodeType::Elite, NodeType::Boss] {
            if self.enemies_of_tier(tier).is_empty() {
                return Err(CatalogError::MissingTier(tier.to_string()));
            }
        }
        Ok(())
    }

    fn require_skill(&self, owner: &str, skill: &str) -> CatalogResult<()> {
        if self.skill(skill).is_none() {
            return Err(CatalogError::UnknownSkill {
                owner: owner.to_string(),
                skill: skill.to_string(),
            });
        }
        Ok(())
    }

    pub fn skill(&self, id: &str) -> Option<&SkillSpec> {
        self.skills.iter().find(|s| s.id == id)
    }

    /// All traits in registration order.
    pub fn traits(&self) -> &[TraitSpec] {
        &self.traits
    }

    pub fn trait_spec(&self, id: &str) -> Option<&TraitSpec> {
        self.traits.iter().find(|t| t.id == id)
    }

    pub fn enemy(&self, id: &str) -> Option<&EnemySpec> {
        self.enemies.iter().find(|e| e.id == id)
    }

    /// Enemies of one tier, in catalog order.
    pub fn enemies_of_tier(&self, tier: NodeType) -> Vec<&EnemySpec> {
        self.enemies.iter().filter(|e| e.tier == tier).collect()
    }

    pub fn player(&self) -> &PlayerTemplate {
        &self.player
    }
}

fn parse<T: serde::de::DeserializeOwned>(file: &'static str, source: &str) -> CatalogResult<T> {
    ron::from_str(source).map_err(|err| CatalogError::Parse {
        file,
        message: err.to_string(),
    })
}

fn unique_ids<'a>(kind: &'static str, ids: impl Iterator<Item = &'a str>) -> CatalogResult<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CatalogError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schema::{Effect, StatusKind, TriggerType};

    #[test]
    fn test_embedded_catalog_loads() {
        let catalog = default_catalog().unwrap();
        assert_eq!(catalog.traits().len(), 9);
        assert_eq!(catalog.player().skills.len(), 4);
        assert_eq!(catalog.player().max_hp, 140);
        assert!(catalog.skill("basic_attack").is_some());
    }

    #[test]
    fn test_every_tier_has_an_enemy() {
        let catalog = default_catalog().unwrap();
        assert_eq!(catalog.enemies_of_tier(NodeType::Boss)[0].name, "Overstack Core");
        assert!(!catalog.enemies_of_tier(NodeType::Battle).is_empty());
        assert!(!catalog.enemies_of_tier(NodeType::Elite).is_empty());
    }

    #[test]
    fn test_trait_rules_parse_into_typed_effects() {
        let catalog = default_catalog().unwrap();
        let cinder = catalog.trait_spec("cinder_scholar").unwrap();
        assert_eq!(cinder.rules[0].trigger, TriggerType::OnStatusApplied);
        assert_eq!(
            cinder.rules[0].effects[0],
            Effect::ModifyStatusPower {
                status: StatusKind::Burn,
                mul_pct: 125
            }
        );
    }

    #[test]
    fn test_unknown_enemy_skill_is_rejected() {
        let enemies = ENEMIES_RON.replace("\"arc_jolt\"", "\"laser_eyes\"");
        let err = Catalog::from_ron_sources(SKILLS_RON, TRAITS_RON, &enemies, PLAYER_RON).unwrap_err();
        assert_eq!(
            err,
            CatalogError::UnknownSkill {
                owner: "rogue_drone".to_string(),
                skill: "laser_eyes".to_string(),
            }
        );
    }

    #[test]
    fn test_duplicate_trait_is_rejected() {
        let traits = TRAITS_RON.replace("\"ruthless\"", "\"overcharge\"");
        let err = Catalog::from_ron_sources(SKILLS_RON, &traits, ENEMIES_RON, PLAYER_RON).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId { kind: "trait", .. }));
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let err = Catalog::from_ron_sources("[", TRAITS_RON, ENEMIES_RON, PLAYER_RON).unwrap_err();
        assert!(matches!(err, CatalogError::Parse { file: "skills.ron", .. }));
    }
}
