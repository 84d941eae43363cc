//! Decision sink implementations.
//!
//! ```text
//! DecisionSink trait (agentgate-auth)   ← abstract definition
//!          │
//!          ├── TracingSink (THIS MODULE) ← structured tracing events, the default
//!          └── MemorySink  (THIS MODULE) ← in-memory capture for tests
//! ```

use agentgate_auth::{DecisionRecord, DecisionSink, Disposition};
use parking_lot::Mutex;

/// Forwards decision records to `tracing` as structured events.
///
/// Severity follows the disposition: granted decisions log at `debug`
/// (not visible by default), callback approvals at `info`, audit
/// violations at `warn`, and blocking denials at `error`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DecisionSink for TracingSink {
    fn record(&self, record: &DecisionRecord) {
        match record.disposition {
            Disposition::Granted => tracing::debug!(
                agent = %record.agent_name,
                scope = %record.required_scope,
                function = %record.function,
                disposition = %record.disposition,
                "access granted"
            ),
            Disposition::ApprovedByCallback => tracing::info!(
                agent = %record.agent_name,
                scope = %record.required_scope,
                function = %record.function,
                disposition = %record.disposition,
                "access approved by callback"
            ),
            Disposition::DeniedLogged => tracing::warn!(
                agent = %record.agent_name,
                scope = %record.required_scope,
                function = %record.function,
                disposition = %record.disposition,
                "audit violation"
            ),
            Disposition::DeniedBlocked
            | Disposition::DeniedNoSession
            | Disposition::DeniedExpired
            | Disposition::RejectedByCallback => tracing::error!(
                agent = %record.agent_name,
                scope = %record.required_scope,
                function = %record.function,
                disposition = %record.disposition,
                "access denied"
            ),
        }
    }
}

/// Captures decision records in memory.
///
/// For tests and inspection; production telemetry implements
/// [`DecisionSink`] against its own transport.
///
/// # Example
///
/// ```
/// use agentgate_auth::{Agent, DecisionRecord, DecisionSink, Disposition, ScopeSet};
/// use agentgate_guard::MemorySink;
///
/// let sink = MemorySink::new();
/// let agent = Agent::new("OrderBot", ScopeSet::new(["read:*"]).expect("valid scopes"))
///     .expect("valid agent");
///
/// sink.record(&DecisionRecord::new(&agent, "read:orders", "list_orders", Disposition::Granted));
/// assert_eq!(sink.len(), 1);
/// assert_eq!(sink.records()[0].disposition, Disposition::Granted);
/// ```
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<DecisionRecord>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all captured records, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<DecisionRecord> {
        self.records.lock().clone()
    }

    /// Returns the number of captured records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Returns `true` if nothing has been captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Discards all captured records.
    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl DecisionSink for MemorySink {
    fn record(&self, record: &DecisionRecord) {
        self.records.lock().push(record.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentgate_auth::{Agent, ScopeSet};

    fn record(disposition: Disposition) -> DecisionRecord {
        let agent = Agent::new("TestBot", ScopeSet::new(["read:*"]).expect("valid scopes"))
            .expect("valid agent");
        DecisionRecord::new(&agent, "read:orders", "list_orders", disposition)
    }

    #[test]
    fn memory_sink_captures_in_order() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());

        sink.record(&record(Disposition::Granted));
        sink.record(&record(Disposition::DeniedBlocked));

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].disposition, Disposition::Granted);
        assert_eq!(records[1].disposition, Disposition::DeniedBlocked);
    }

    #[test]
    fn memory_sink_clear() {
        let sink = MemorySink::new();
        sink.record(&record(Disposition::Granted));
        assert_eq!(sink.len(), 1);

        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn tracing_sink_accepts_all_dispositions() {
        // Smoke test: no subscriber installed, events are discarded.
        let sink = TracingSink;
        for d in [
            Disposition::Granted,
            Disposition::DeniedBlocked,
            Disposition::DeniedLogged,
            Disposition::DeniedNoSession,
            Disposition::DeniedExpired,
            Disposition::ApprovedByCallback,
            Disposition::RejectedByCallback,
        ] {
            sink.record(&record(d));
        }
    }
}
