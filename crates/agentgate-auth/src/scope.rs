//! Scope patterns and wildcard matching.
//!
//! A scope is a string permission token such as `read:orders` or
//! `write:refunds`. Patterns held by an agent may contain the `*`
//! wildcard, which matches zero or more characters anywhere in the
//! required scope. Matching is case-sensitive and anchored to the
//! whole string — there is no implicit prefix matching:
//!
//! | Pattern | Required scope | Match |
//! |---------|----------------|-------|
//! | `read:orders` | `read:orders` | yes |
//! | `read:*` | `read:orders:archive` | yes |
//! | `write:orders` | `write:orders:refunds` | no |
//! | `*` | anything | yes |

use crate::AgentError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Returns `true` if `pattern` matches `value` under whole-string
/// glob semantics, where `*` matches zero or more characters.
///
/// Patterns without `*` match only by exact equality. Uses iterative
/// backtracking, so patterns with several wildcards stay linear in
/// practice and nothing is compiled or cached.
///
/// # Example
///
/// ```
/// use agentgate_auth::scope::wildcard_match;
///
/// assert!(wildcard_match("read:*", "read:orders"));
/// assert!(wildcard_match("*", "anything"));
/// assert!(!wildcard_match("write:orders", "write:orders:refunds"));
/// ```
#[must_use]
pub fn wildcard_match(pattern: &str, value: &str) -> bool {
    if pattern == "*" {
        return true;
    }

    let pattern = pattern.as_bytes();
    let value = value.as_bytes();
    let (mut p, mut v) = (0usize, 0usize);
    // Position of the last `*` seen and where its match currently ends.
    let (mut star, mut resume) = (None, 0usize);

    while v < value.len() {
        if p < pattern.len() && pattern[p] == b'*' {
            star = Some(p);
            resume = v;
            p += 1;
            continue;
        }

        if p < pattern.len() && pattern[p] == value[v] {
            p += 1;
            v += 1;
            continue;
        }

        // Mismatch: widen the last wildcard by one character, if any.
        if let Some(s) = star {
            p = s + 1;
            resume += 1;
            v = resume;
            continue;
        }

        return false;
    }

    while p < pattern.len() && pattern[p] == b'*' {
        p += 1;
    }

    p == pattern.len()
}

/// A deduplicated set of scope patterns held by an agent.
///
/// Insertion order is irrelevant and duplicates collapse. The set is
/// immutable after construction; granting different scopes means
/// constructing a new [`Agent`](crate::Agent).
///
/// # Example
///
/// ```
/// use agentgate_auth::ScopeSet;
///
/// let scopes = ScopeSet::new(["read:orders", "write:*"]).expect("valid scopes");
/// assert!(scopes.satisfies("read:orders"));
/// assert!(scopes.satisfies("write:refunds"));
/// assert!(!scopes.satisfies("delete:orders"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeSet(BTreeSet<String>);

impl ScopeSet {
    /// Builds a scope set from pattern strings.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::EmptyScope`] if any pattern is empty.
    pub fn new<I, S>(patterns: I) -> Result<Self, AgentError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = BTreeSet::new();
        for pattern in patterns {
            let pattern = pattern.into();
            if pattern.is_empty() {
                return Err(AgentError::EmptyScope);
            }
            set.insert(pattern);
        }
        Ok(Self(set))
    }

    /// Returns an empty scope set (an agent that can do nothing).
    #[must_use]
    pub fn empty() -> Self {
        Self(BTreeSet::new())
    }

    /// Returns `true` if any held pattern matches the required scope.
    ///
    /// This is a pure query: repeated calls with the same inputs
    /// always return the same result.
    #[must_use]
    pub fn satisfies(&self, required: &str) -> bool {
        // Exact hit first, wildcard scan only on miss.
        if self.0.contains(required) {
            return true;
        }
        self.0
            .iter()
            .any(|pattern| pattern.contains('*') && wildcard_match(pattern, required))
    }

    /// Returns `true` if the exact pattern string is held.
    #[must_use]
    pub fn contains(&self, pattern: &str) -> bool {
        self.0.contains(pattern)
    }

    /// Iterates over the held patterns in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Returns the number of distinct patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no patterns are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ScopeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for pattern in &self.0 {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{pattern}")?;
            first = false;
        }
        Ok(())
    }
}
