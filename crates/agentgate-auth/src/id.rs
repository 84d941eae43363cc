//! Identifier types for agentgate.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for an [`Agent`](crate::Agent).
///
/// Generated once at agent construction (UUID v4) and never changed.
/// Two agents with the same name are still distinct identities.
///
/// # Example
///
/// ```
/// use agentgate_auth::AgentId;
///
/// let a = AgentId::new();
/// let b = AgentId::new();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(Uuid);

impl AgentId {
    /// Creates a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
