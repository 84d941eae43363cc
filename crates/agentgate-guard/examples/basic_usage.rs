//! Basic Usage Example
//!
//! Demonstrates:
//! - Agent construction with wildcard scopes
//! - Session activation (RAII)
//! - Guarding a function with a required scope
//!
//! # Usage
//!
//! ```bash
//! cargo run --example basic_usage
//! ```

use agentgate_auth::{Agent, ScopeSet};
use agentgate_guard::{session, Guard};
use std::sync::Arc;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .init();

    println!("=== Basic Usage Example ===\n");

    let scopes = ScopeSet::new(["read:*", "write:tickets"]).expect("valid scopes");
    let agent = Arc::new(
        Agent::new("SupportBot", scopes)
            .expect("valid agent")
            .with_role("support"),
    );
    println!("agent: {agent} with scopes [{}]\n", agent.scopes());

    let list_orders = Guard::new("read:orders", "list_orders");
    let purge_orders = Guard::new("delete:orders", "purge_orders");

    // Outside any session every guarded call is blocked.
    match list_orders.enforce(|| vec!["o-1", "o-2"]) {
        Ok(_) => println!("unexpected: ran without a session"),
        Err(err) => println!("without a session: {err}"),
    }

    // Activate the agent; the guard now resolves it from the context.
    let _session = session::activate(&agent);

    match list_orders.enforce(|| vec!["o-1", "o-2"]) {
        Ok(orders) => println!("list_orders granted via read:* -> {orders:?}"),
        Err(err) => println!("unexpected denial: {err}"),
    }

    match purge_orders.enforce(|| ()) {
        Ok(()) => println!("unexpected: purge ran"),
        Err(err) => println!("purge_orders denied: {err}"),
    }
}
