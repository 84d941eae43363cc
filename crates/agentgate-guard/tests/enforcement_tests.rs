//! End-to-end enforcement tests.
//!
//! Exercises the full path from agent construction through session
//! activation, guard evaluation, and decision recording, the way an
//! embedding application would wire it.

use agentgate_auth::{
    Agent, CallbackError, DecisionSink, Disposition, PermissionError, ScopeSet,
};
use agentgate_guard::guard::CallContext;
use agentgate_guard::{scoped, session, Guard, MemorySink, OnDeny, ScopedPayload};
use serde::Deserialize;
use std::sync::Arc;

fn support_agent() -> Arc<Agent> {
    Arc::new(
        Agent::new(
            "SupportBot",
            ScopeSet::new(["read:*", "write:tickets"]).expect("valid scopes"),
        )
        .expect("valid agent")
        .with_role("support"),
    )
}

// =============================================================================
// Wildcard scopes through the guard
// =============================================================================

mod wildcard_enforcement {
    use super::*;

    #[test]
    fn prefix_wildcard_grants_whole_family() {
        let agent = support_agent();
        let _session = session::activate(&agent);

        for function in ["read:orders", "read:customers", "read:tickets"] {
            Guard::new(function, "lookup")
                .enforce(|| ())
                .expect("read:* covers every read scope");
        }
    }

    #[test]
    fn wildcard_does_not_cross_verbs() {
        let agent = support_agent();
        let _session = session::activate(&agent);

        let err = Guard::new("delete:tickets", "purge_ticket")
            .enforce(|| ())
            .expect_err("no delete scope held");
        assert!(matches!(err, PermissionError::ScopeDenied { .. }));
    }

    #[test]
    fn exact_scope_grants_only_itself() {
        let agent = support_agent();
        let _session = session::activate(&agent);

        Guard::new("write:tickets", "update_ticket")
            .enforce(|| ())
            .expect("exact scope held");

        let err = Guard::new("write:orders", "update_order")
            .enforce(|| ())
            .expect_err("write:tickets is not a pattern");
        assert!(matches!(err, PermissionError::ScopeDenied { .. }));
    }
}

// =============================================================================
// Decision records across a realistic call sequence
// =============================================================================

mod decision_trail {
    use super::*;

    #[test]
    fn mixed_outcomes_leave_one_record_each() {
        let agent = support_agent();
        let sink = Arc::new(MemorySink::new());
        let _session = session::activate(&agent);

        let read = Guard::new("read:orders", "list_orders")
            .with_sink(Arc::clone(&sink) as Arc<dyn DecisionSink>);
        let purge = Guard::new("delete:orders", "purge_orders")
            .with_sink(Arc::clone(&sink) as Arc<dyn DecisionSink>);
        let audit_purge = Guard::new("delete:orders", "purge_orders")
            .on_deny(OnDeny::Log)
            .with_sink(Arc::clone(&sink) as Arc<dyn DecisionSink>);

        read.enforce(|| ()).expect("granted");
        purge.enforce(|| ()).expect_err("blocked");
        audit_purge.enforce(|| ()).expect("audit mode runs anyway");

        let records = sink.records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].disposition, Disposition::Granted);
        assert_eq!(records[1].disposition, Disposition::DeniedBlocked);
        assert_eq!(records[2].disposition, Disposition::DeniedLogged);
        assert!(records[0].allowed);
        assert!(!records[1].allowed);
        assert!(!records[2].allowed);

        for record in &records {
            assert_eq!(record.agent_name, "SupportBot");
            assert_eq!(record.agent_id, agent.id());
        }
    }

    #[test]
    fn no_record_without_identity() {
        let sink = Arc::new(MemorySink::new());

        Guard::new("read:orders", "list_orders")
            .with_sink(Arc::clone(&sink) as Arc<dyn DecisionSink>)
            .enforce(|| ())
            .expect_err("no session");

        assert!(sink.is_empty());
    }
}

// =============================================================================
// Approval workflow
// =============================================================================

mod approval_workflow {
    use super::*;

    #[test]
    fn escalation_approves_based_on_arguments() {
        let agent = support_agent();
        let sink = Arc::new(MemorySink::new());
        let _session = session::activate(&agent);

        // Approve refunds up to 100, reject anything larger.
        let small_refunds_only =
            |_: &Agent, _: &str, ctx: &CallContext| -> Result<bool, CallbackError> {
                Ok(ctx.args["amount"].as_u64().is_some_and(|a| a <= 100))
            };
        let guard = Guard::new("write:refunds", "issue_refund")
            .on_deny(OnDeny::Approval(Arc::new(small_refunds_only)))
            .with_sink(Arc::clone(&sink) as Arc<dyn DecisionSink>);

        guard
            .enforce_with_args(serde_json::json!({ "amount": 25 }), || ())
            .expect("small refund approved");

        let err = guard
            .enforce_with_args(serde_json::json!({ "amount": 5000 }), || ())
            .expect_err("large refund rejected");
        assert!(matches!(err, PermissionError::ApprovalRejected { .. }));

        let records = sink.records();
        assert_eq!(records[0].disposition, Disposition::ApprovedByCallback);
        assert_eq!(records[1].disposition, Disposition::RejectedByCallback);
    }
}

// =============================================================================
// Scope-checked payloads inside sessions
// =============================================================================

mod scoped_payloads {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct TicketUpdate {
        ticket_id: String,
        status: String,
    }

    impl ScopedPayload for TicketUpdate {
        fn required_scope() -> &'static str {
            "write:tickets"
        }
    }

    #[test]
    fn payload_construction_follows_the_session() {
        let raw = serde_json::json!({ "ticket_id": "t-7", "status": "resolved" });

        let outside = scoped::from_value::<TicketUpdate>(raw.clone());
        assert!(outside.is_err());

        let agent = support_agent();
        let _session = session::activate(&agent);
        let update = scoped::from_value::<TicketUpdate>(raw).expect("scope held");
        assert_eq!(update.ticket_id, "t-7");
        assert_eq!(update.status, "resolved");
    }

    #[test]
    fn payload_denied_for_underprivileged_agent() {
        let reader = Arc::new(
            Agent::new("Reader", ScopeSet::new(["read:*"]).expect("valid scopes"))
                .expect("valid agent"),
        );
        let _session = session::activate(&reader);

        let err = scoped::validated(TicketUpdate {
            ticket_id: "t-7".to_string(),
            status: "resolved".to_string(),
        })
        .expect_err("write scope missing");
        assert!(matches!(err, PermissionError::ScopeDenied { .. }));
    }
}
