//! Permission enforcement runtime for agentgate.
//!
//! Sits on top of `agentgate-auth` (the data model) and provides the
//! pieces that actually gate execution: context-local sessions, the
//! function guard, decision sinks, scope-checked payloads, and content
//! guardrails.
//!
//! # Crate Architecture
//!
//! ```text
//! agentgate-auth  (Agent, ScopeSet, DecisionRecord, DecisionSink, errors)
//!       ↑
//! agentgate-guard  ◄── THIS CRATE
//!   session    context-local agent sessions (sync + async)
//!   guard      per-function scope enforcement with denial responses
//!   sink       TracingSink / MemorySink implementations of DecisionSink
//!   scoped     payload types that require a scope to construct
//!   guardrails content validation independent of scopes
//! ```
//!
//! # Design Principles
//!
//! - **Trait definitions in `agentgate-auth`, implementations here** —
//!   [`DecisionSink`] is defined next to [`DecisionRecord`]; this crate
//!   provides [`TracingSink`] and [`MemorySink`]
//! - **Sessions are ambient, checks are explicit** — activating an agent
//!   never grants anything by itself; every gated function carries its
//!   own [`Guard`]
//! - **Fail closed** — no session or an expired session always blocks,
//!   regardless of the configured denial response
//!
//! # Example
//!
//! ```
//! use agentgate_auth::{Agent, ScopeSet};
//! use agentgate_guard::{session, Guard};
//! use std::sync::Arc;
//!
//! let agent = Arc::new(
//!     Agent::new("OrderBot", ScopeSet::new(["read:*"]).expect("valid scopes"))
//!         .expect("valid agent"),
//! );
//! let _session = session::activate(&agent);
//!
//! let guard = Guard::new("read:orders", "list_orders");
//! let orders = guard.enforce(|| vec!["o-1", "o-2"]).expect("scope held");
//! assert_eq!(orders.len(), 2);
//! ```

pub mod guard;
pub mod guardrails;
pub mod scoped;
pub mod session;
pub mod sink;

// Re-export core types
pub use guard::{ApprovalCallback, CallContext, Guard, OnDeny};
pub use guardrails::{GuardrailViolation, Guardrails, Verdict, ViolationAction};
pub use scoped::{ScopedError, ScopedPayload};
pub use session::{ActiveSession, with_session};
pub use sink::{MemorySink, TracingSink};

// Re-export the data model from agentgate_auth for convenience
pub use agentgate_auth::{
    Agent, AgentError, AgentId, CallbackError, DecisionRecord, DecisionSink, Disposition,
    PermissionError, ScopeSet,
};
