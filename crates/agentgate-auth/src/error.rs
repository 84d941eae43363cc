//! Permission and construction error types.
//!
//! All enforcement failures derive from one family, [`PermissionError`],
//! so callers can catch broadly (`Err(PermissionError)`) or narrowly
//! (match on a variant). Each variant corresponds to one non-granted
//! [`Disposition`](crate::Disposition):
//!
//! | Error | Disposition |
//! |-------|-------------|
//! | [`NoActiveSession`](PermissionError::NoActiveSession) | `denied_no_session` |
//! | [`SessionExpired`](PermissionError::SessionExpired) | `denied_expired` |
//! | [`ScopeDenied`](PermissionError::ScopeDenied) | `denied_blocked` |
//! | [`ApprovalRejected`](PermissionError::ApprovalRejected) | `rejected_by_callback` |
//!
//! Approval-callback failures are not reinterpreted as denials: they pass
//! through the transparent [`Callback`](PermissionError::Callback) variant
//! with the original error preserved as-is.

use crate::ScopeSet;
use thiserror::Error;

/// Opaque error produced by an approval callback.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error constructing an [`Agent`](crate::Agent) or [`ScopeSet`].
#[derive(Debug, Error)]
pub enum AgentError {
    /// Agent name was empty.
    #[error("agent name must not be empty")]
    EmptyName,

    /// A scope pattern was the empty string.
    #[error("scope patterns must not be empty")]
    EmptyScope,

    /// Session TTL was zero.
    #[error("session_ttl must be positive")]
    ZeroTtl,
}

/// A permission check failed.
///
/// # Example
///
/// ```
/// use agentgate_auth::PermissionError;
///
/// let err = PermissionError::NoActiveSession {
///     function: "delete_order".to_string(),
/// };
/// assert!(err.to_string().contains("delete_order"));
/// assert_eq!(err.kind(), "no_active_session");
/// ```
#[derive(Debug, Error)]
pub enum PermissionError {
    /// No agent has been activated for the current context.
    #[error(
        "'{function}' requires an active agent session; \
         activate one with session::activate or session::with_session"
    )]
    NoActiveSession {
        /// The guarded operation that was attempted.
        function: String,
    },

    /// An agent was active but its session TTL has elapsed.
    #[error("agent '{agent}' session expired; start a new session before calling '{function}'")]
    SessionExpired {
        /// Name of the expired agent.
        agent: String,
        /// The guarded operation that was attempted.
        function: String,
    },

    /// The active agent holds no pattern matching the required scope.
    #[error(
        "agent '{agent}' missing required scope '{required}' for '{function}'; \
         agent holds: [{held}]"
    )]
    ScopeDenied {
        /// Name of the denied agent.
        agent: String,
        /// The scope that was required.
        required: String,
        /// The patterns the agent actually holds, for remediation.
        held: ScopeSet,
        /// The guarded operation that was attempted.
        function: String,
    },

    /// An approval callback explicitly returned `false`.
    #[error("approval rejected for scope '{required}' on '{function}'")]
    ApprovalRejected {
        /// The scope the callback rejected.
        required: String,
        /// The guarded operation that was attempted.
        function: String,
    },

    /// An approval callback failed. The source error passes through
    /// unchanged and is distinct from [`ApprovalRejected`](Self::ApprovalRejected).
    #[error(transparent)]
    Callback(#[from] CallbackError),
}

impl PermissionError {
    /// Returns the error kind as a stable snake_case string.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoActiveSession { .. } => "no_active_session",
            Self::SessionExpired { .. } => "session_expired",
            Self::ScopeDenied { .. } => "scope_denied",
            Self::ApprovalRejected { .. } => "approval_rejected",
            Self::Callback(_) => "callback",
        }
    }
}
