//! Permission primitives for agentgate.
//!
//! This crate owns the data model and the pure decision logic of the
//! permission gate: who an agent is, which scope patterns it holds,
//! whether a required scope is satisfied, and what a decision looks
//! like once made. Enforcement — activating agents for a context and
//! running guarded operations — lives in `agentgate-guard`.
//!
//! # Crate Architecture
//!
//! ```text
//! agentgate-auth  (Agent, ScopeSet, PermissionError, DecisionRecord, DecisionSink)
//!       ↑
//! agentgate-guard (session activation, Guard combinator, sinks, scoped payloads)
//! ```
//!
//! # Design Principles
//!
//! - **Trait definitions here, implementations in consumers** —
//!   [`DecisionSink`] is defined here; `agentgate-guard` provides the
//!   tracing-backed default.
//! - **Pure queries stay pure** — [`Agent::has_scope`] and
//!   [`ScopeSet::satisfies`] never mutate state and are safe for
//!   pre-flight checks.
//! - **One error family** — every enforcement failure is a
//!   [`PermissionError`] variant, so callers match as broadly or as
//!   narrowly as they need.

pub mod agent;
pub mod error;
pub mod id;
pub mod record;
pub mod scope;

pub use agent::{Agent, DEFAULT_ROLE, DEFAULT_SESSION_TTL};
pub use error::{AgentError, CallbackError, PermissionError};
pub use id::AgentId;
pub use record::{DecisionRecord, DecisionSink, Disposition};
pub use scope::ScopeSet;
