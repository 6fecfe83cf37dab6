use thiserror::Error;

/// Main error type for the Overstack run engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Trait id unknown, not offered, or a trait is already locked in
    #[error("Invalid trait: {0}")]
    InvalidTrait(String),
    /// Skill index outside the player's skill list
    #[error("Invalid skill index: {0}")]
    InvalidSkillIndex(i32),
    /// Unknown action kind supplied by the caller
    #[error("Invalid action: {0}")]
    InvalidAction(String),
    /// Operation not allowed in the run's current state
    #[error("Invalid state: {0}")]
    InvalidState(String),
    /// No run is registered under the handle
    #[error("Invalid handle: {0}")]
    InvalidHandle(u32),
    /// The engine reached a state it cannot reconcile
    #[error("Internal invariant violation: {0}")]
    InternalInvariantViolation(String),
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("Config error: {0}")]
    Config(String),
    /// Run snapshot could not be encoded or decoded
    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

impl EngineError {
    /// Recoverable errors leave the run untouched and may be retried by the caller.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, EngineError::InternalInvariantViolation(_))
    }
}

/// Errors raised while loading or validating game data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("failed to parse {file}: {message}")]
    Parse { file: &'static str, message: String },
    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },
    #[error("{owner} references unknown skill '{skill}'")]
    UnknownSkill { owner: String, skill: String },
    #[error("no enemy defined for tier {0}")]
    MissingTier(String),
    #[error("malformed data: {0}")]
    Malformed(String),
}

impl From<postcard::Error> for EngineError {
    fn from(err: postcard::Error) -> Self {
        EngineError::Snapshot(err.to_string())
    }
}

/// Type alias for Results using EngineError
pub type EngineResult<T> = Result<T, EngineError>;

/// Type alias for Results using CatalogError
pub type CatalogResult<T> = Result<T, CatalogError>;
