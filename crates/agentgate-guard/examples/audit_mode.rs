//! Audit Mode Example
//!
//! Demonstrates:
//! - `OnDeny::Log` — record violations but never block
//! - Capturing the decision trail with `MemorySink`
//!
//! Useful when introducing permissions into an existing system: run in
//! audit mode first, review what would have been blocked, then switch
//! the guards to the blocking default.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example audit_mode
//! ```

use agentgate_auth::{Agent, DecisionSink, ScopeSet};
use agentgate_guard::{session, Guard, MemorySink, OnDeny};
use std::sync::Arc;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_target(false)
        .init();

    println!("=== Audit Mode Example ===\n");

    let agent = Arc::new(
        Agent::new("LegacyBot", ScopeSet::new(["read:orders"]).expect("valid scopes"))
            .expect("valid agent"),
    );
    let sink = Arc::new(MemorySink::new());
    let _session = session::activate(&agent);

    let operations = [
        ("read:orders", "list_orders"),
        ("write:orders", "update_order"),
        ("delete:orders", "purge_orders"),
    ];

    for (scope, function) in operations {
        let guard = Guard::new(scope, function)
            .on_deny(OnDeny::Log)
            .with_sink(Arc::clone(&sink) as Arc<dyn DecisionSink>);
        match guard.enforce(|| ()) {
            Ok(()) => println!("{function}: ran"),
            Err(err) => println!("{function}: {err}"),
        }
    }

    println!("\ndecision trail ({} records):", sink.len());
    for record in sink.records() {
        println!(
            "  {} {} required={} allowed={}",
            record.timestamp.format("%H:%M:%S%.3f"),
            record.function,
            record.required_scope,
            record.allowed
        );
    }
}
