use crate::battle::state::PlayerAction;
use crate::catalog::default_catalog;
use crate::config::EngineConfig;
use crate::events::Event;
use crate::run::{Run, StepOutcome};

/// A run in `trait_select` built from the embedded catalog.
pub fn new_run(seed: u64, max_nodes: u32) -> Run {
    let catalog = match default_catalog() {
        Ok(catalog) => catalog,
        Err(err) => panic!("embedded catalog failed to load: {}", err),
    };
    match Run::new(seed, max_nodes, EngineConfig::default(), catalog) {
        Ok(run) => run,
        Err(err) => panic!("run creation failed: {}", err),
    }
}

/// A run with its first offered trait locked in.
pub fn started_run(seed: u64, max_nodes: u32) -> Run {
    let mut run = new_run(seed, max_nodes);
    let first = run.offered_trait_ids()[0].clone();
    run.set_active_trait(&first).unwrap();
    run
}

/// Steps with `dt` and no action until the run asks for input or ends.
/// Returns every event seen plus the final outcome.
pub fn step_until_input(run: &mut Run, dt: f64, limit: usize) -> (Vec<Event>, StepOutcome) {
    let mut events = Vec::new();
    for _ in 0..limit {
        let outcome = run.step(dt, None);
        assert!(outcome.error.is_none(), "unexpected error: {:?}", outcome.error);
        events.extend(outcome.events.iter().cloned());
        if outcome.need_input || outcome.ended {
            return (events, outcome);
        }
    }
    panic!("run neither paused nor ended within {} steps", limit);
}

/// Plays `run` to the end, always answering with the basic action.
/// Returns the full event stream.
pub fn play_basic(run: &mut Run, dt: f64) -> Vec<Event> {
    let mut events = Vec::new();
    let mut action = None;
    for _ in 0..1_000_000 {
        let outcome = run.step(dt, action.take());
        assert!(outcome.error.is_none(), "unexpected error: {:?}", outcome.error);
        assert!(outcome.rejected.is_none(), "unexpected rejection: {:?}", outcome.rejected);
        events.extend(outcome.events);
        if outcome.ended {
            return events;
        }
        if outcome.need_input {
            action = Some(PlayerAction::Basic);
        }
    }
    panic!("run did not finish");
}
