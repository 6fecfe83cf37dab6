use crate::rng::RngSource;
use schema::NodeType;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    /// 1-based position in the run.
    pub index: u32,
    pub node_type: NodeType,
    pub visited: bool,
}

/// Precomputes the node sequence. The last node of a multi-node run is the boss;
/// every other node rolls once against `elite_chance`.
pub fn generate_nodes(count: u32, elite_chance: f64, rng: &mut RngSource) -> Vec<Node> {
    (1..=count)
        .map(|index| {
            let node_type = if count > 1 && index == count {
                NodeType::Boss
            } else if rng.roll(elite_chance) {
                NodeType::Elite
            } else {
                NodeType::Battle
            };
            Node {
                index,
                node_type,
                visited: false,
            }
        })
        .collect()
}
