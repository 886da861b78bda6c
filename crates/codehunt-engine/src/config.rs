//! Engine configuration.

use std::collections::BTreeSet;

use codehunt_protocol::ActorId;

/// Length of a secret code unless configured otherwise.
pub const DEFAULT_CODE_LENGTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Seeds `Game::admin_ids` when the game record is first created.
    /// Changing it later has no effect on an existing record.
    pub admin_ids: BTreeSet<ActorId>,

    /// Characters per generated code.
    pub code_length: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            admin_ids: BTreeSet::new(),
            code_length: DEFAULT_CODE_LENGTH,
        }
    }
}

impl EngineConfig {
    pub fn new(admin_ids: impl IntoIterator<Item = ActorId>) -> Self {
        Self {
            admin_ids: admin_ids.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_code_length(mut self, code_length: usize) -> Self {
        self.code_length = code_length;
        self
    }
}
