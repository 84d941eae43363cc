//! Decision records and the telemetry sink seam.
//!
//! Every guarded invocation produces one [`DecisionRecord`] that is
//! handed to a [`DecisionSink`] and then discarded — the core keeps no
//! history. The sink is the seam where external telemetry (dashboards,
//! audit stores) plugs in; `agentgate-guard` ships a tracing-backed
//! default and an in-memory sink for tests.

use crate::{Agent, AgentId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The categorical outcome of one authorization check.
///
/// # Example
///
/// ```
/// use agentgate_auth::Disposition;
///
/// assert!(Disposition::Granted.allowed());
/// assert!(Disposition::ApprovedByCallback.allowed());
/// assert!(!Disposition::DeniedLogged.allowed());
/// assert_eq!(Disposition::DeniedBlocked.as_str(), "denied_blocked");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Scope matched; operation proceeded.
    Granted,
    /// Scope missing; operation blocked.
    DeniedBlocked,
    /// Scope missing; violation recorded but operation proceeded
    /// (audit mode).
    DeniedLogged,
    /// No agent was active in the calling context.
    DeniedNoSession,
    /// The active agent's session TTL had elapsed.
    DeniedExpired,
    /// Scope missing, but an approval callback allowed the operation.
    ApprovedByCallback,
    /// An approval callback rejected the operation.
    RejectedByCallback,
}

impl Disposition {
    /// Returns `true` if the check itself passed (the scope matched or
    /// an approver allowed it). `DeniedLogged` is a violation even
    /// though the operation runs.
    #[must_use]
    pub fn allowed(&self) -> bool {
        matches!(self, Self::Granted | Self::ApprovedByCallback)
    }

    /// Returns the disposition as a stable snake_case string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::DeniedBlocked => "denied_blocked",
            Self::DeniedLogged => "denied_logged",
            Self::DeniedNoSession => "denied_no_session",
            Self::DeniedExpired => "denied_expired",
            Self::ApprovedByCallback => "approved_by_callback",
            Self::RejectedByCallback => "rejected_by_callback",
        }
    }
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One authorization decision, created fresh per guarded invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// Identifier of the agent the decision applies to.
    pub agent_id: AgentId,
    /// Name of the agent.
    pub agent_name: String,
    /// The scope the operation required.
    pub required_scope: String,
    /// Name of the guarded operation.
    pub function: String,
    /// Whether the check passed. See [`Disposition::allowed`].
    pub allowed: bool,
    /// The categorical outcome.
    pub disposition: Disposition,
    /// When the decision was made.
    pub timestamp: DateTime<Utc>,
}

impl DecisionRecord {
    /// Builds a record for `agent` with the current timestamp.
    #[must_use]
    pub fn new(
        agent: &Agent,
        required_scope: impl Into<String>,
        function: impl Into<String>,
        disposition: Disposition,
    ) -> Self {
        Self {
            agent_id: agent.id(),
            agent_name: agent.name().to_string(),
            required_scope: required_scope.into(),
            function: function.into(),
            allowed: disposition.allowed(),
            disposition,
            timestamp: Utc::now(),
        }
    }
}

/// Structured-event sink consuming decision records.
///
/// The core defines the record shape but not transport or storage.
/// Implementations must be cheap and non-blocking; the guard calls
/// [`record`](Self::record) inline on the checking path.
pub trait DecisionSink: Send + Sync {
    /// Consumes one decision record.
    fn record(&self, record: &DecisionRecord);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScopeSet;

    fn agent() -> Agent {
        Agent::new("OrderBot", ScopeSet::new(["read:*"]).expect("valid scopes"))
            .expect("valid agent")
    }

    #[test]
    fn allowed_follows_disposition() {
        let a = agent();
        let granted = DecisionRecord::new(&a, "read:orders", "read_orders", Disposition::Granted);
        assert!(granted.allowed);

        let logged =
            DecisionRecord::new(&a, "delete:orders", "delete_order", Disposition::DeniedLogged);
        assert!(!logged.allowed);

        let approved = DecisionRecord::new(
            &a,
            "write:refunds",
            "process_refund",
            Disposition::ApprovedByCallback,
        );
        assert!(approved.allowed);
    }

    #[test]
    fn record_carries_agent_fields() {
        let a = agent();
        let record = DecisionRecord::new(&a, "read:orders", "read_orders", Disposition::Granted);
        assert_eq!(record.agent_id, a.id());
        assert_eq!(record.agent_name, "OrderBot");
        assert_eq!(record.function, "read_orders");
    }

    #[test]
    fn disposition_serializes_snake_case() {
        let json = serde_json::to_string(&Disposition::DeniedNoSession).expect("serialize");
        assert_eq!(json, "\"denied_no_session\"");
    }

    #[test]
    fn record_serde_roundtrip() {
        let a = agent();
        let record = DecisionRecord::new(&a, "read:orders", "read_orders", Disposition::Granted);
        let json = serde_json::to_string(&record).expect("serialize");
        let parsed: DecisionRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.agent_id, record.agent_id);
        assert_eq!(parsed.disposition, record.disposition);
    }

    #[test]
    fn as_str_matches_serde() {
        for d in [
            Disposition::Granted,
            Disposition::DeniedBlocked,
            Disposition::DeniedLogged,
            Disposition::DeniedNoSession,
            Disposition::DeniedExpired,
            Disposition::ApprovedByCallback,
            Disposition::RejectedByCallback,
        ] {
            let json = serde_json::to_string(&d).expect("serialize");
            assert_eq!(json, format!("\"{}\"", d.as_str()));
        }
    }
}
