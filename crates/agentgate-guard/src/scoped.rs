//! Scope-checked payload construction.
//!
//! Lets a structured data object declare the scope its construction
//! requires, so handing an instance to downstream code implies the
//! check already passed. Composition, not inheritance: the payload is
//! a plain struct and the check is an explicit construction step.
//!
//! Only the blocking denial response applies here — there is no
//! audit-mode or callback construction.
//!
//! ```
//! use agentgate_auth::{Agent, ScopeSet};
//! use agentgate_guard::{scoped, session, ScopedPayload};
//! use serde::Deserialize;
//! use std::sync::Arc;
//!
//! #[derive(Debug, Deserialize)]
//! struct RefundParams {
//!     order_id: String,
//! }
//!
//! impl ScopedPayload for RefundParams {
//!     fn required_scope() -> &'static str {
//!         "write:refunds"
//!     }
//! }
//!
//! let agent = Arc::new(
//!     Agent::new("RefundBot", ScopeSet::new(["write:refunds"]).expect("valid scopes"))
//!         .expect("valid agent"),
//! );
//! let _session = session::activate(&agent);
//!
//! let params = scoped::validated(RefundParams {
//!     order_id: "o-42".to_string(),
//! })
//! .expect("scope held");
//! assert_eq!(params.order_id, "o-42");
//! ```

use crate::session;
use crate::sink::TracingSink;
use agentgate_auth::{DecisionRecord, DecisionSink, Disposition, PermissionError};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// A payload type whose construction requires a scope.
pub trait ScopedPayload: 'static {
    /// The scope the active agent must hold to construct this payload.
    fn required_scope() -> &'static str;

    /// Name used in decision records and error messages. Defaults to
    /// the unqualified type name.
    #[must_use]
    fn payload_name() -> &'static str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }
}

/// Error constructing a scope-checked payload from raw data.
#[derive(Debug, Error)]
pub enum ScopedError {
    /// The permission check failed.
    #[error(transparent)]
    Permission(#[from] PermissionError),

    /// The raw data did not decode into the payload type.
    #[error("invalid payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Checks the current session against `T`'s required scope and hands
/// the value back untouched on success.
///
/// # Errors
///
/// [`PermissionError::NoActiveSession`],
/// [`PermissionError::SessionExpired`], or
/// [`PermissionError::ScopeDenied`] — always blocking.
pub fn validated<T: ScopedPayload>(value: T) -> Result<T, PermissionError> {
    let name = T::payload_name();
    let required = T::required_scope();

    let Some(agent) = session::current() else {
        tracing::warn!(payload = name, "blocked: payload constructed outside agent session");
        return Err(PermissionError::NoActiveSession {
            function: name.to_string(),
        });
    };

    if agent.is_expired() {
        tracing::warn!(
            agent = %agent.name(),
            payload = name,
            "blocked: agent session expired"
        );
        return Err(PermissionError::SessionExpired {
            agent: agent.name().to_string(),
            function: name.to_string(),
        });
    }

    if agent.has_scope(required) {
        TracingSink.record(&DecisionRecord::new(
            &agent,
            required,
            name,
            Disposition::Granted,
        ));
        Ok(value)
    } else {
        TracingSink.record(&DecisionRecord::new(
            &agent,
            required,
            name,
            Disposition::DeniedBlocked,
        ));
        Err(PermissionError::ScopeDenied {
            agent: agent.name().to_string(),
            required: required.to_string(),
            held: agent.scopes().clone(),
            function: name.to_string(),
        })
    }
}

/// Decodes `value` into `T`, then runs the same check as [`validated`].
///
/// Decoding happens first: malformed data fails with
/// [`ScopedError::Decode`] before any permission is consulted.
///
/// # Errors
///
/// [`ScopedError::Decode`] on malformed data, [`ScopedError::Permission`]
/// on a failed check.
pub fn from_value<T>(value: serde_json::Value) -> Result<T, ScopedError>
where
    T: ScopedPayload + DeserializeOwned,
{
    let payload: T = serde_json::from_value(value)?;
    Ok(validated(payload)?)
}
