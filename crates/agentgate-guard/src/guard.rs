//! Scope enforcement.
//!
//! [`Guard`] wraps a target operation with a permission check. Given a
//! required scope and the currently active agent, it decides the
//! outcome, emits one [`DecisionRecord`] per invocation, and applies
//! the configured denial response:
//!
//! | `OnDeny` | Scope missing → |
//! |----------|-----------------|
//! | [`Raise`](OnDeny::Raise) (default) | block with [`PermissionError::ScopeDenied`] |
//! | [`Log`](OnDeny::Log) | record the violation, run anyway (audit mode) |
//! | [`Approval`](OnDeny::Approval) | ask a callback; run or block on its verdict |
//!
//! A missing or expired session always raises, regardless of `OnDeny`
//! — there is no identity to audit or to evaluate a callback against.

use crate::session;
use crate::sink::TracingSink;
use agentgate_auth::{
    Agent, CallbackError, DecisionRecord, DecisionSink, Disposition, PermissionError,
};
use std::sync::Arc;

/// Call-site context handed to approval callbacks.
#[derive(Debug, Clone)]
pub struct CallContext {
    /// Name of the guarded operation.
    pub function: String,
    /// Call arguments as JSON, `Null` when the caller supplied none.
    pub args: serde_json::Value,
}

/// Decides whether a denied operation may proceed anyway.
///
/// Invoked only when the agent's session is valid but the required
/// scope is missing. Returning `Ok(true)` allows the operation,
/// `Ok(false)` rejects it, and `Err` propagates to the caller
/// unchanged (it is not converted into a denial).
///
/// Implemented for plain closures:
///
/// ```
/// use agentgate_guard::guard::{ApprovalCallback, CallContext};
/// use agentgate_auth::{Agent, CallbackError};
///
/// let only_readers = |agent: &Agent, _scope: &str, _ctx: &CallContext| -> Result<bool, CallbackError> {
///     Ok(agent.role() == "reader")
/// };
/// let _cb: &dyn ApprovalCallback = &only_readers;
/// ```
pub trait ApprovalCallback: Send + Sync {
    /// Returns the approval verdict for one denied invocation.
    ///
    /// # Errors
    ///
    /// Any error is surfaced to the guarded operation's caller as-is.
    fn approve(
        &self,
        agent: &Agent,
        required_scope: &str,
        ctx: &CallContext,
    ) -> Result<bool, CallbackError>;
}

impl<F> ApprovalCallback for F
where
    F: Fn(&Agent, &str, &CallContext) -> Result<bool, CallbackError> + Send + Sync,
{
    fn approve(
        &self,
        agent: &Agent,
        required_scope: &str,
        ctx: &CallContext,
    ) -> Result<bool, CallbackError> {
        self(agent, required_scope, ctx)
    }
}

/// Behavior when the active agent lacks the required scope.
#[derive(Clone, Default)]
pub enum OnDeny {
    /// Block and raise [`PermissionError::ScopeDenied`].
    #[default]
    Raise,
    /// Record the violation at high severity and run the operation
    /// anyway. Audit-only; never blocks.
    Log,
    /// Delegate the verdict to an approval callback.
    Approval(Arc<dyn ApprovalCallback>),
}

impl std::fmt::Debug for OnDeny {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Raise => f.write_str("Raise"),
            Self::Log => f.write_str("Log"),
            Self::Approval(_) => f.write_str("Approval(..)"),
        }
    }
}

/// The enforcement wrapper for one guarded operation.
///
/// # Example
///
/// ```
/// use agentgate_auth::{Agent, PermissionError, ScopeSet};
/// use agentgate_guard::{session, Guard};
/// use std::sync::Arc;
///
/// let agent = Arc::new(
///     Agent::new("OrderBot", ScopeSet::new(["read:*"]).expect("valid scopes"))
///         .expect("valid agent"),
/// );
/// let _session = session::activate(&agent);
///
/// let orders = Guard::new("read:orders", "list_orders")
///     .enforce(|| vec!["order-1", "order-2"])
///     .expect("scope held");
/// assert_eq!(orders.len(), 2);
///
/// let denied = Guard::new("delete:orders", "delete_order").enforce(|| ());
/// assert!(matches!(denied, Err(PermissionError::ScopeDenied { .. })));
/// ```
#[derive(Clone)]
pub struct Guard {
    required_scope: String,
    function: String,
    on_deny: OnDeny,
    sink: Arc<dyn DecisionSink>,
}

impl Guard {
    /// Creates a guard requiring `scope` for the operation named
    /// `function`, with the default blocking denial response and the
    /// tracing-backed sink.
    #[must_use]
    pub fn new(required_scope: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            required_scope: required_scope.into(),
            function: function.into(),
            on_deny: OnDeny::Raise,
            sink: Arc::new(TracingSink),
        }
    }

    /// Sets the denial response.
    #[must_use]
    pub fn on_deny(mut self, on_deny: OnDeny) -> Self {
        self.on_deny = on_deny;
        self
    }

    /// Replaces the decision sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DecisionSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Returns the required scope.
    #[must_use]
    pub fn required_scope(&self) -> &str {
        &self.required_scope
    }

    /// Returns the guarded operation's name.
    #[must_use]
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Checks the current session and, if allowed, runs `op`.
    ///
    /// # Errors
    ///
    /// - [`PermissionError::NoActiveSession`] — no agent activated.
    /// - [`PermissionError::SessionExpired`] — agent's TTL elapsed.
    /// - [`PermissionError::ScopeDenied`] — scope missing, `OnDeny::Raise`.
    /// - [`PermissionError::ApprovalRejected`] — callback said no.
    /// - [`PermissionError::Callback`] — callback itself failed.
    pub fn enforce<T>(&self, op: impl FnOnce() -> T) -> Result<T, PermissionError> {
        self.enforce_with_args(serde_json::Value::Null, op)
    }

    /// Like [`enforce`](Self::enforce), with call arguments made
    /// available to approval callbacks via [`CallContext`].
    pub fn enforce_with_args<T>(
        &self,
        args: serde_json::Value,
        op: impl FnOnce() -> T,
    ) -> Result<T, PermissionError> {
        self.authorize(args)?;
        Ok(op())
    }

    /// Converts the guard into a reusable guarded callable.
    ///
    /// # Example
    ///
    /// ```
    /// use agentgate_auth::{Agent, ScopeSet};
    /// use agentgate_guard::{session, Guard};
    /// use std::sync::Arc;
    ///
    /// let fetch = Guard::new("read:orders", "fetch_orders").wrap(|| 42);
    ///
    /// let agent = Arc::new(
    ///     Agent::new("OrderBot", ScopeSet::new(["read:*"]).expect("valid scopes"))
    ///         .expect("valid agent"),
    /// );
    /// let _session = session::activate(&agent);
    /// assert_eq!(fetch().expect("scope held"), 42);
    /// ```
    pub fn wrap<T, F>(self, op: F) -> impl Fn() -> Result<T, PermissionError>
    where
        F: Fn() -> T,
    {
        move || self.enforce(&op)
    }

    /// Runs steps 1–4 of the check and reports whether the operation
    /// may proceed. Emits decision records along the way.
    fn authorize(&self, args: serde_json::Value) -> Result<(), PermissionError> {
        // 1. Resolve the current agent. Always raises on miss.
        let Some(agent) = session::current() else {
            tracing::warn!(function = %self.function, "blocked: no active agent session");
            return Err(PermissionError::NoActiveSession {
                function: self.function.clone(),
            });
        };

        // 2. Session expiry. Always raises.
        if agent.is_expired() {
            tracing::warn!(
                agent = %agent.name(),
                function = %self.function,
                "blocked: agent session expired"
            );
            return Err(PermissionError::SessionExpired {
                agent: agent.name().to_string(),
                function: self.function.clone(),
            });
        }

        // 3. Scope match.
        if agent.has_scope(&self.required_scope) {
            self.emit(&agent, Disposition::Granted);
            return Ok(());
        }

        // 4. Denial handling.
        match &self.on_deny {
            OnDeny::Raise => {
                self.emit(&agent, Disposition::DeniedBlocked);
                Err(PermissionError::ScopeDenied {
                    agent: agent.name().to_string(),
                    required: self.required_scope.clone(),
                    held: agent.scopes().clone(),
                    function: self.function.clone(),
                })
            }
            OnDeny::Log => {
                self.emit(&agent, Disposition::DeniedLogged);
                Ok(())
            }
            OnDeny::Approval(callback) => {
                let ctx = CallContext {
                    function: self.function.clone(),
                    args,
                };
                // A failing callback propagates unchanged, it is not a denial.
                if callback.approve(&agent, &self.required_scope, &ctx)? {
                    self.emit(&agent, Disposition::ApprovedByCallback);
                    Ok(())
                } else {
                    self.emit(&agent, Disposition::RejectedByCallback);
                    Err(PermissionError::ApprovalRejected {
                        required: self.required_scope.clone(),
                        function: self.function.clone(),
                    })
                }
            }
        }
    }

    fn emit(&self, agent: &Agent, disposition: Disposition) {
        self.sink.record(&DecisionRecord::new(
            agent,
            &self.required_scope,
            &self.function,
            disposition,
        ));
    }
}

impl std::fmt::Debug for Guard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Guard")
            .field("required_scope", &self.required_scope)
            .field("function", &self.function)
            .field("on_deny", &self.on_deny)
            .finish()
    }
}
