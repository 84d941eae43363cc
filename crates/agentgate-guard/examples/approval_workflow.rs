//! Approval Workflow Example
//!
//! Demonstrates:
//! - Async sessions with `with_session`
//! - `OnDeny::Approval` — delegating denied calls to a callback
//! - Inspecting call arguments in the approval decision
//!
//! # Usage
//!
//! ```bash
//! cargo run --example approval_workflow
//! ```

use agentgate_auth::{Agent, CallbackError, ScopeSet};
use agentgate_guard::guard::CallContext;
use agentgate_guard::{session, Guard, OnDeny};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    println!("=== Approval Workflow Example ===\n");

    let agent = Arc::new(
        Agent::new("RefundBot", ScopeSet::new(["read:*"]).expect("valid scopes"))
            .expect("valid agent"),
    );

    // RefundBot holds no write scope; refunds up to 100 are approved
    // case by case, larger ones are rejected.
    let small_refunds_only =
        |agent: &Agent, scope: &str, ctx: &CallContext| -> Result<bool, CallbackError> {
            let amount = ctx.args["amount"].as_u64().unwrap_or(u64::MAX);
            println!("  approval request: {agent} wants {scope} for amount {amount}");
            Ok(amount <= 100)
        };
    let issue_refund = Guard::new("write:refunds", "issue_refund")
        .on_deny(OnDeny::Approval(Arc::new(small_refunds_only)));

    session::with_session(agent, async move {
        for amount in [25u64, 5000] {
            let args = serde_json::json!({ "order_id": "o-42", "amount": amount });
            match issue_refund.enforce_with_args(args, || format!("refunded {amount}")) {
                Ok(done) => println!("amount {amount}: {done}"),
                Err(err) => println!("amount {amount}: {err}"),
            }
        }
    })
    .await;
}
