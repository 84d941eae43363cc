//! Agent identity.

use crate::{AgentError, AgentId, ScopeSet};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Default session time-to-live: one hour.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(3600);

/// Default role for new agents.
pub const DEFAULT_ROLE: &str = "worker";

/// An actor on whose behalf guarded operations execute.
///
/// An agent carries a stable identity (id, name, role), an immutable
/// set of scope patterns, and a session TTL. The agent itself is
/// created once and reused across many activations; the session
/// machinery in `agentgate-guard` stamps and clears the expiry slot
/// on activation and release.
///
/// # Sharing
///
/// Agents are shared via `Arc`. Cloning produces a fresh handle of the
/// same identity with no active session. The expiry slot is the only
/// interior-mutable state; when one `Arc<Agent>` is activated from
/// several contexts at once, the expiry is last-writer-wins per
/// activation. That race is accepted and documented — contexts that
/// need isolation construct independent agents.
///
/// # Example
///
/// ```
/// use agentgate_auth::{Agent, ScopeSet};
/// use std::time::Duration;
///
/// let agent = Agent::new(
///     "OrderBot",
///     ScopeSet::new(["read:orders", "write:refunds"]).expect("valid scopes"),
/// )
/// .expect("valid agent")
/// .with_role("support")
/// .with_session_ttl(Duration::from_secs(600))
/// .expect("positive ttl");
///
/// assert!(agent.has_scope("read:orders"));
/// assert!(!agent.has_scope("delete:orders"));
/// assert!(!agent.is_expired());
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct Agent {
    /// Process-local unique identifier.
    id: AgentId,
    /// Human-readable label, non-empty.
    name: String,
    /// Scope patterns held by this agent.
    scopes: ScopeSet,
    /// Free-form classification.
    role: String,
    /// How long an activated session stays valid.
    session_ttl: Duration,
    /// Expiry of the current session, `None` when not activated.
    /// Written only by the session machinery.
    #[serde(skip)]
    session_expires_at: RwLock<Option<Instant>>,
}

impl Clone for Agent {
    /// Clones the identity. The clone starts with no active session.
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            scopes: self.scopes.clone(),
            role: self.role.clone(),
            session_ttl: self.session_ttl,
            session_expires_at: RwLock::new(None),
        }
    }
}

impl Agent {
    /// Creates an agent with the default role and session TTL.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::EmptyName`] if `name` is empty.
    pub fn new(name: impl Into<String>, scopes: ScopeSet) -> Result<Self, AgentError> {
        let name = name.into();
        if name.is_empty() {
            return Err(AgentError::EmptyName);
        }
        Ok(Self {
            id: AgentId::new(),
            name,
            scopes,
            role: DEFAULT_ROLE.to_string(),
            session_ttl: DEFAULT_SESSION_TTL,
            session_expires_at: RwLock::new(None),
        })
    }

    /// Sets the role. Consuming builder, call before sharing.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    /// Sets the session TTL. Consuming builder, call before sharing.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ZeroTtl`] if `ttl` is zero.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Result<Self, AgentError> {
        if ttl.is_zero() {
            return Err(AgentError::ZeroTtl);
        }
        self.session_ttl = ttl;
        Ok(self)
    }

    /// Returns the agent's identifier.
    #[must_use]
    pub fn id(&self) -> AgentId {
        self.id
    }

    /// Returns the agent's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the held scope patterns.
    #[must_use]
    pub fn scopes(&self) -> &ScopeSet {
        &self.scopes
    }

    /// Returns the agent's role.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Returns the session TTL applied on activation.
    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Returns when the current session expires, or `None` if no
    /// session is active.
    #[must_use]
    pub fn session_expires_at(&self) -> Option<Instant> {
        *self.session_expires_at.read()
    }

    /// Returns `true` if a session was started and its TTL has elapsed.
    ///
    /// An agent with no active session is not expired — it is simply
    /// inactive, which the guard reports separately.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        match *self.session_expires_at.read() {
            Some(until) => Instant::now() >= until,
            None => false,
        }
    }

    /// Returns `true` if any held pattern matches the required scope.
    ///
    /// Pure query, usable for pre-flight checks outside the
    /// enforcement path. See [`ScopeSet::satisfies`] for the matching
    /// rule.
    ///
    /// # Example
    ///
    /// ```
    /// use agentgate_auth::{Agent, ScopeSet};
    ///
    /// let agent = Agent::new("Reader", ScopeSet::new(["read:*"]).expect("valid scopes"))
    ///     .expect("valid agent");
    /// assert!(agent.has_scope("read:orders"));
    /// assert!(agent.has_scope("read:x:y"));
    /// assert!(!agent.has_scope("write:orders"));
    /// ```
    #[must_use]
    pub fn has_scope(&self, required: &str) -> bool {
        self.scopes.satisfies(required)
    }

    /// Stamps a new session expiry at `now + session_ttl` and returns it.
    ///
    /// Called by the session machinery on activation. Re-activation
    /// simply resets the expiry for this instance.
    pub fn begin_session(&self) -> Instant {
        let until = Instant::now() + self.session_ttl;
        *self.session_expires_at.write() = Some(until);
        until
    }

    /// Clears the session expiry.
    ///
    /// Called by the session machinery on release.
    pub fn end_session(&self) {
        *self.session_expires_at.write() = None;
    }
}

impl std::fmt::Display for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.name, self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(scopes: &[&str]) -> Agent {
        Agent::new("TestBot", ScopeSet::new(scopes.iter().copied()).expect("valid scopes"))
            .expect("valid agent")
    }

    #[test]
    fn new_agent_defaults() {
        let a = agent(&["read:orders"]);
        assert_eq!(a.role(), DEFAULT_ROLE);
        assert_eq!(a.session_ttl(), DEFAULT_SESSION_TTL);
        assert!(a.session_expires_at().is_none());
        assert!(!a.is_expired());
    }

    #[test]
    fn empty_name_rejected() {
        let err = Agent::new("", ScopeSet::empty()).expect_err("empty name must fail");
        assert!(matches!(err, AgentError::EmptyName));
    }

    #[test]
    fn zero_ttl_rejected() {
        let err = agent(&["read:*"])
            .with_session_ttl(Duration::ZERO)
            .expect_err("zero ttl must fail");
        assert!(matches!(err, AgentError::ZeroTtl));
    }

    #[test]
    fn builder_overrides() {
        let a = agent(&["read:*"])
            .with_role("auditor")
            .with_session_ttl(Duration::from_secs(60))
            .expect("positive ttl");
        assert_eq!(a.role(), "auditor");
        assert_eq!(a.session_ttl(), Duration::from_secs(60));
    }

    #[test]
    fn begin_and_end_session_toggle_expiry() {
        let a = agent(&["read:*"]);
        let until = a.begin_session();
        assert_eq!(a.session_expires_at(), Some(until));
        assert!(!a.is_expired());

        a.end_session();
        assert!(a.session_expires_at().is_none());
        assert!(!a.is_expired());
    }

    #[test]
    fn short_ttl_expires() {
        let a = agent(&["read:*"])
            .with_session_ttl(Duration::from_millis(10))
            .expect("positive ttl");
        a.begin_session();
        assert!(!a.is_expired());

        std::thread::sleep(Duration::from_millis(30));
        assert!(a.is_expired());
    }

    #[test]
    fn reactivation_resets_expiry() {
        let a = agent(&["read:*"])
            .with_session_ttl(Duration::from_millis(10))
            .expect("positive ttl");
        a.begin_session();
        std::thread::sleep(Duration::from_millis(30));
        assert!(a.is_expired());

        a.begin_session();
        assert!(!a.is_expired());
    }

    #[test]
    fn clone_starts_inactive() {
        let a = agent(&["read:*"]);
        a.begin_session();

        let cloned = a.clone();
        assert_eq!(cloned.id(), a.id());
        assert!(cloned.session_expires_at().is_none());
    }

    #[test]
    fn has_scope_exact_and_wildcard() {
        let a = agent(&["read:orders", "write:*"]);
        assert!(a.has_scope("read:orders"));
        assert!(a.has_scope("write:refunds"));
        assert!(!a.has_scope("read:refunds"));
    }

    #[test]
    fn display_shows_name_and_role() {
        let a = agent(&["read:*"]).with_role("support");
        assert_eq!(format!("{a}"), "TestBot@support");
    }
}
