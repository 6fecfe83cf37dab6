#[cfg(test)]
mod tests {
    use crate::battle::state::PlayerAction;
    use crate::errors::EngineError;
    use crate::events::EventKind;
    use crate::run::tests::common::{new_run, play_basic, started_run, step_until_input};
    use crate::run::{RunResult, RunState};
    use pretty_assertions::assert_eq;
    use schema::{Actor, NodeType};
    use std::collections::BTreeSet;

    #[test]
    fn test_new_run_waits_for_trait_selection() {
        // Arrange & Act
        let run = new_run(1234, 6);

        // Assert
        let snapshot = run.snapshot();
        assert_eq!(snapshot.run_state, RunState::TraitSelect);
        assert_eq!(snapshot.run_result, RunResult::Unset);
        assert_eq!(snapshot.node_index, 0);
        assert_eq!(snapshot.battle_index, 0);
        assert_eq!(snapshot.node_count, 6);
        assert_eq!(snapshot.tick, 0);
        assert!(run.battle().is_none());

        let offers: BTreeSet<&String> = run.offered_trait_ids().iter().collect();
        assert_eq!(offers.len(), 3);
        for id in offers {
            assert!(run.catalog().trait_spec(id).is_some());
        }
    }

    #[test]
    fn test_node_count_is_clamped() {
        assert_eq!(new_run(1, 0).nodes().len(), 1);
        assert_eq!(new_run(1, 500).nodes().len(), 12);
    }

    #[test]
    fn test_stepping_before_trait_selection_is_rejected() {
        // Arrange
        let mut run = new_run(1234, 6);

        // Act
        let outcome = run.step(1.0, None);

        // Assert
        assert!(matches!(outcome.rejected, Some(EngineError::InvalidState(_))));
        assert!(outcome.events.is_empty());
        assert!(outcome.error.is_none());
        assert_eq!(run.state(), RunState::TraitSelect);
        assert_eq!(run.tick(), 0);
    }

    #[test]
    fn test_unknown_trait_leaves_selection_open() {
        // Arrange
        let mut run = new_run(1234, 6);

        // Act
        let result = run.set_active_trait("not_a_trait");

        // Assert
        assert_eq!(result, Err(EngineError::InvalidTrait("not_a_trait".to_string())));
        assert_eq!(run.state(), RunState::TraitSelect);
        assert!(run.profile().active_traits.is_empty());
    }

    #[test]
    fn test_trait_can_only_be_selected_once() {
        // Arrange
        let mut run = started_run(1234, 6);
        let second = run.offered_trait_ids()[1].clone();

        // Act
        let result = run.set_active_trait(&second);

        // Assert
        assert!(matches!(result, Err(EngineError::InvalidState(_))));
        assert_eq!(run.profile().active_traits.len(), 1);
        assert_eq!(run.state(), RunState::Running);
    }

    #[test]
    fn test_first_step_announces_run_node_and_battle() {
        // Arrange
        let mut run = started_run(1234, 6);

        // Act
        let outcome = run.step(0.0, None);

        // Assert
        assert_eq!(outcome.events[0].kind, EventKind::RunStart { seed: 1234 });
        assert_eq!(
            outcome.events[1].kind,
            EventKind::NodeStart {
                node_index: 1,
                node_type: run.nodes()[0].node_type,
            }
        );
        assert!(matches!(
            outcome.events[2].kind,
            EventKind::BattleStart { battle_index: 1, .. }
        ));
        assert!(outcome.events.iter().all(|e| e.tick == 0));
        assert_eq!(run.tick(), 0);
        assert_eq!(run.snapshot().node_index, 1);
        assert!(run.nodes()[0].visited);

        let again = run.step(0.0, None);
        assert!(again.events.is_empty());
    }

    #[test]
    fn test_player_turn_pauses_time() {
        // Arrange
        let mut run = started_run(1234, 6);
        let (events, outcome) = step_until_input(&mut run, 0.15, 1_000);
        let paused_at = run.tick();

        // Act
        let idle = run.step(1.0, None);

        // Assert
        assert!(outcome.need_input);
        let last_turn = events.iter().rev().find_map(|e| match e.kind {
            EventKind::TurnReady { actor } => Some(actor),
            _ => None,
        });
        assert_eq!(last_turn, Some(Actor::Player));
        assert!(!outcome.events.is_empty());
        assert!(idle.events.is_empty());
        assert!(idle.need_input);
        assert_eq!(run.tick(), paused_at);
        assert_eq!(run.state(), RunState::NeedInput);
    }

    #[test]
    fn test_answering_a_turn_resumes_the_battle() {
        // Arrange
        let mut run = started_run(1234, 6);
        step_until_input(&mut run, 0.15, 1_000);
        let tick = run.tick();

        // Act
        let outcome = run.step(0.0, Some(PlayerAction::Skill(0)));

        // Assert
        assert!(!outcome.need_input);
        assert!(outcome.rejected.is_none());
        assert_eq!(
            outcome.events[0].kind,
            EventKind::ActionUsed {
                actor: Actor::Player,
                action_name: "Ember Lash".to_string(),
            }
        );
        assert!(outcome.events.iter().all(|e| e.tick == tick));
        assert_eq!(run.tick(), tick);
        assert_eq!(run.state(), RunState::Running);
    }

    #[test]
    fn test_invalid_skill_index_changes_nothing() {
        // Arrange
        let mut run = started_run(1234, 6);
        step_until_input(&mut run, 0.15, 1_000);
        let before = run.snapshot();

        // Act
        let outcome = run.step(0.0, Some(PlayerAction::Skill(9)));

        // Assert
        assert_eq!(outcome.rejected, Some(EngineError::InvalidSkillIndex(9)));
        assert!(outcome.events.is_empty());
        assert!(outcome.need_input);
        assert_eq!(run.snapshot(), before);
    }

    #[test]
    fn test_ended_run_ignores_further_steps() {
        // Arrange
        let mut run = started_run(77, 2);
        play_basic(&mut run, 1.0);
        let tick = run.tick();
        let result = run.result();

        // Act
        let outcome = run.step(5.0, Some(PlayerAction::Basic));

        // Assert
        assert!(outcome.ended);
        assert!(outcome.events.is_empty());
        assert!(outcome.error.is_none());
        assert!(outcome.rejected.is_none());
        assert_eq!(run.tick(), tick);
        assert_eq!(run.result(), result);
        assert_ne!(result, RunResult::Unset);
    }

    #[test]
    fn test_invariant_violation_ends_the_run_once() {
        // Arrange
        let mut run = started_run(1234, 6);
        run.step(0.0, None);
        run.battle_mut()
            .unwrap()
            .combatant_mut(Actor::Player)
            .force_hp(999);

        // Act
        let failed = run.step(1.0, None);
        let after = run.step(1.0, None);

        // Assert
        assert!(matches!(failed.error, Some(EngineError::InternalInvariantViolation(_))));
        assert!(failed.events.is_empty());
        assert!(failed.ended);
        assert_eq!(run.result(), RunResult::Unset);
        assert_eq!(after.error, None);
        assert!(after.ended);
        assert!(after.events.is_empty());
    }

    #[test]
    fn test_reset_restores_the_seeded_start() {
        // Arrange
        let fresh = new_run(1234, 6);
        let mut run = started_run(1234, 6);
        step_until_input(&mut run, 0.5, 1_000);

        // Act
        run.reset().unwrap();

        // Assert
        assert_eq!(run.state(), RunState::TraitSelect);
        assert_eq!(run.tick(), 0);
        assert_eq!(run.offered_trait_ids(), fresh.offered_trait_ids());
        assert_eq!(run.nodes(), fresh.nodes());
        assert_eq!(run.snapshot(), fresh.snapshot());
        assert!(run.profile().active_traits.is_empty());
    }

    #[test]
    fn test_event_ticks_never_decrease() {
        // Arrange
        let mut run = started_run(99, 4);

        // Act
        let events = play_basic(&mut run, 0.35);

        // Assert
        assert!(events.windows(2).all(|pair| pair[0].tick <= pair[1].tick));
        assert_eq!(events.last().map(|e| e.tick), Some(run.tick()));
        assert!(matches!(
            events.last().map(|e| &e.kind),
            Some(EventKind::RunEnd { .. })
        ));
    }

    #[test]
    fn test_status_expiry_always_follows_its_application() {
        // Arrange
        let mut run = started_run(2024, 6);

        // Act
        let events = play_basic(&mut run, 1.0);

        // Assert: a status never expires without first being applied in the same battle.
        let mut active: BTreeSet<(Actor, String)> = BTreeSet::new();
        for event in &events {
            match &event.kind {
                EventKind::BattleStart { .. } => active.clear(),
                EventKind::StatusApplied { dst, status, .. } => {
                    active.insert((*dst, status.to_string()));
                }
                EventKind::StatusTick { dst, status, .. } => {
                    assert!(active.contains(&(*dst, status.to_string())));
                }
                EventKind::StatusExpired { dst, status } => {
                    assert!(active.remove(&(*dst, status.to_string())));
                }
                _ => {}
            }
        }
    }

    #[test]
    fn test_battles_follow_the_node_sequence() {
        // Arrange
        let mut run = started_run(5, 6);

        // Act
        let events = play_basic(&mut run, 1.0);

        // Assert
        let node_starts: Vec<(u32, NodeType)> = events
            .iter()
            .filter_map(|e| match e.kind {
                EventKind::NodeStart { node_index, node_type } => Some((node_index, node_type)),
                _ => None,
            })
            .collect();
        let expected: Vec<(u32, NodeType)> = run
            .nodes()
            .iter()
            .take(node_starts.len())
            .map(|node| (node.index, node.node_type))
            .collect();
        assert_eq!(node_starts, expected);

        let battle_ends = events
            .iter()
            .filter(|e| matches!(e.kind, EventKind::BattleEnd { .. }))
            .count();
        assert_eq!(battle_ends, node_starts.len());

        let final_node = match events.last().map(|e| &e.kind) {
            Some(EventKind::RunEnd { final_node_index, .. }) => *final_node_index,
            other => panic!("expected RunEnd, got {:?}", other),
        };
        assert_eq!(final_node as usize, node_starts.len());
        if run.result() == RunResult::Win {
            assert_eq!(node_starts.len(), 6);
        }
    }
}
