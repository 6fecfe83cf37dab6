pub mod ai;
pub mod combatant;
pub mod effects;
pub mod engine;
pub mod state;
pub mod status;

#[cfg(test)]
mod tests;
