//! Context-local agent sessions.
//!
//! Tracks which [`Agent`], if any, is authorized to act in the current
//! logical execution context, and enforces session expiry. The binding
//! is context-local, never global: two independent flows of execution
//! never observe each other's activated agent.
//!
//! # Two entry points
//!
//! - [`activate`] — synchronous, RAII. Pushes the agent onto the
//!   calling context's stack and returns an [`ActiveSession`] guard
//!   that restores the previous binding when dropped, on every exit
//!   path including unwinding. The guard is `!Send`, so it cannot be
//!   carried into a spawned task by accident.
//! - [`with_session`] — asynchronous. Wraps a future so the binding is
//!   visible across `.await` points (backed by `tokio::task_local!`).
//!   Release runs even when the future is cancelled mid-flight.
//!
//! # Nesting
//!
//! Activations nest; the innermost agent fully shadows the outer one
//! (no union of scopes) and the outer agent becomes current again on
//! exit:
//!
//! ```
//! use agentgate_auth::{Agent, ScopeSet};
//! use agentgate_guard::session;
//! use std::sync::Arc;
//!
//! let a = Arc::new(
//!     Agent::new("A", ScopeSet::new(["read:*"]).expect("valid scopes")).expect("valid agent"),
//! );
//! let b = Arc::new(
//!     Agent::new("B", ScopeSet::new(["write:*"]).expect("valid scopes")).expect("valid agent"),
//! );
//!
//! let _outer = session::activate(&a);
//! {
//!     let _inner = session::activate(&b);
//!     assert_eq!(session::current().expect("active").name(), "B");
//! }
//! assert_eq!(session::current().expect("active").name(), "A");
//! ```
//!
//! # Inheritance on spawn
//!
//! A future built by [`with_session`] captures the caller's stack as a
//! snapshot at construction time; later changes in the parent do not
//! retroactively affect it. Independently spawned tasks start with no
//! binding — propagate explicitly:
//!
//! ```no_run
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use agentgate_guard::session;
//!
//! let agent = session::current().expect("active session");
//! tokio::spawn(session::with_session(agent, async {
//!     // sees the parent's agent
//! }));
//! # }
//! ```
//!
//! # Shared agents
//!
//! Activation stamps `session_expires_at` on the agent and release
//! clears it. When one `Arc<Agent>` is activated concurrently from
//! several contexts, the expiry slot is last-writer-wins — an accepted
//! race, see [`Agent`] docs.

use agentgate_auth::Agent;
use std::cell::RefCell;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

thread_local! {
    /// Activation stack for plain synchronous callers.
    static THREAD_STACK: RefCell<Vec<Arc<Agent>>> = const { RefCell::new(Vec::new()) };
}

tokio::task_local! {
    /// Activation stack for a task wrapped by [`with_session`].
    /// Seeded with a snapshot of the caller's stack, so nested sync
    /// activations inside the task land here.
    static TASK_STACK: RefCell<Vec<Arc<Agent>>>;
}

/// Returns the innermost active agent for the calling context, or
/// `None` if no activation is in effect.
#[must_use]
pub fn current() -> Option<Arc<Agent>> {
    if let Ok(found) = TASK_STACK.try_with(|cell| cell.borrow().last().cloned()) {
        return found;
    }
    THREAD_STACK.with(|cell| cell.borrow().last().cloned())
}

/// Activates `agent` for the current context until the returned guard
/// is dropped.
///
/// Stamps the session expiry (`now + session_ttl`), publishes the
/// agent as current, and emits a `session_start` event. Re-entrant:
/// activating while another agent is current creates a nested scope.
///
/// Nesting the *same* `Arc<Agent>` shares its single expiry slot: the
/// inner release clears the expiry while the outer activation is still
/// current, so the agent reads as unexpired (no expiry) until the
/// outer scope ends. Same slot, same caveat as the shared-agent race
/// described on [`Agent`].
///
/// Inside async code, prefer [`with_session`]; the returned guard is
/// `!Send` and must not be held across `.await` points outside a
/// [`with_session`] scope.
///
/// # Example
///
/// ```
/// use agentgate_auth::{Agent, ScopeSet};
/// use agentgate_guard::session;
/// use std::sync::Arc;
///
/// let agent = Arc::new(
///     Agent::new("OrderBot", ScopeSet::new(["read:*"]).expect("valid scopes"))
///         .expect("valid agent"),
/// );
///
/// assert!(session::current().is_none());
/// {
///     let _session = session::activate(&agent);
///     assert!(session::current().is_some());
///     assert!(agent.session_expires_at().is_some());
/// }
/// assert!(session::current().is_none());
/// assert!(agent.session_expires_at().is_none());
/// ```
#[must_use]
pub fn activate(agent: &Arc<Agent>) -> ActiveSession {
    let in_task = TASK_STACK
        .try_with(|cell| cell.borrow_mut().push(Arc::clone(agent)))
        .is_ok();
    if !in_task {
        THREAD_STACK.with(|cell| cell.borrow_mut().push(Arc::clone(agent)));
    }
    ActiveSession {
        span: SessionSpan::begin(Arc::clone(agent)),
        in_task,
        _not_send: PhantomData,
    }
}

/// Wraps `fut` so that `agent` is the current agent for its entire
/// execution, across `.await` points and task migration.
///
/// The caller's activation stack is captured as a snapshot when this
/// function is called, so nesting works the same as with [`activate`]:
/// the wrapped future sees `agent` as innermost, and whoever awaits it
/// sees their own binding unchanged afterwards.
///
/// Session release (expiry cleared, `session_end` emitted) runs when
/// the wrapped future completes or is dropped — including cancellation
/// via `JoinHandle::abort` or a dropped select branch.
///
/// # Example
///
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use agentgate_auth::{Agent, ScopeSet};
/// use agentgate_guard::session;
/// use std::sync::Arc;
///
/// let agent = Arc::new(
///     Agent::new("OrderBot", ScopeSet::new(["read:*"]).expect("valid scopes"))
///         .expect("valid agent"),
/// );
///
/// let name = session::with_session(agent, async {
///     session::current().expect("active session").name().to_string()
/// })
/// .await;
/// assert_eq!(name, "OrderBot");
/// # }
/// ```
pub fn with_session<F>(agent: Arc<Agent>, fut: F) -> impl Future<Output = F::Output>
where
    F: Future,
{
    let mut stack = TASK_STACK
        .try_with(|cell| cell.borrow().clone())
        .unwrap_or_else(|_| THREAD_STACK.with(|cell| cell.borrow().clone()));
    stack.push(Arc::clone(&agent));

    async move {
        let _span = SessionSpan::begin(agent);
        TASK_STACK.scope(RefCell::new(stack), fut).await
    }
}

/// RAII handle for a synchronous activation. See [`activate`].
pub struct ActiveSession {
    span: SessionSpan,
    in_task: bool,
    // Keeps the guard on the thread/task that created it.
    _not_send: PhantomData<*const ()>,
}

impl ActiveSession {
    /// Returns the activated agent.
    #[must_use]
    pub fn agent(&self) -> &Arc<Agent> {
        &self.span.agent
    }
}

impl Drop for ActiveSession {
    fn drop(&mut self) {
        let agent = Arc::clone(&self.span.agent);
        let removed = if self.in_task {
            TASK_STACK
                .try_with(|cell| remove_innermost(&mut cell.borrow_mut(), &agent))
                .unwrap_or(false)
        } else {
            THREAD_STACK.with(|cell| remove_innermost(&mut cell.borrow_mut(), &agent))
        };
        if !removed {
            tracing::warn!(agent = %agent.name(), "session guard found no binding to release");
        }
        // self.span drops next and clears the expiry.
    }
}

impl std::fmt::Debug for ActiveSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveSession")
            .field("agent", &self.span.agent.name())
            .finish()
    }
}

/// Removes the innermost stack entry for `agent`. Out-of-order guard
/// drops release their own entry, not whatever is on top.
fn remove_innermost(stack: &mut Vec<Arc<Agent>>, agent: &Arc<Agent>) -> bool {
    match stack.last() {
        Some(top) if Arc::ptr_eq(top, agent) => {
            stack.pop();
            true
        }
        _ => match stack.iter().rposition(|a| Arc::ptr_eq(a, agent)) {
            Some(pos) => {
                stack.remove(pos);
                true
            }
            None => false,
        },
    }
}

/// Stamps the expiry on construction, clears it on drop. Dropping is
/// the single release point for both sync and async activations, so
/// release runs on unwinding and cancellation alike.
struct SessionSpan {
    agent: Arc<Agent>,
}

impl SessionSpan {
    fn begin(agent: Arc<Agent>) -> Self {
        agent.begin_session();
        tracing::info!(
            agent = %agent.name(),
            role = %agent.role(),
            ttl_ms = agent.session_ttl().as_millis() as u64,
            "session_start"
        );
        Self { agent }
    }
}

impl Drop for SessionSpan {
    fn drop(&mut self) {
        self.agent.end_session();
        tracing::info!(agent = %self.agent.name(), "session_end");
    }
}
