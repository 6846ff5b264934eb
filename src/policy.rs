//! What a slot does after its constructor fails.

use std::fmt;
use std::str::FromStr;

/// Behaviour of a slot after a failed (or panicking) construction.
///
/// # Examples
///
/// ```rust
/// use lazy_singleton_registry::FailurePolicy;
///
/// let policy: FailurePolicy = "poison".parse().unwrap();
/// assert_eq!(policy, FailurePolicy::Poison);
/// assert_eq!(FailurePolicy::default(), FailurePolicy::Retry);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FailurePolicy {
    /// The slot stays empty and the next caller runs its own constructor.
    #[default]
    Retry,
    /// The slot is marked poisoned and every later call fails without
    /// running a constructor.
    Poison,
}

impl FailurePolicy {
    /// Lowercase name, as accepted by `FromStr`.
    ///
    /// ```rust
    /// use lazy_singleton_registry::FailurePolicy;
    ///
    /// assert_eq!(FailurePolicy::Poison.as_str(), "poison");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            FailurePolicy::Retry => "retry",
            FailurePolicy::Poison => "poison",
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not a known [`FailurePolicy`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown failure policy `{0}` (expected `retry` or `poison`)")]
pub struct ParsePolicyError(pub String);

impl FromStr for FailurePolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "retry" => Ok(FailurePolicy::Retry),
            "poison" => Ok(FailurePolicy::Poison),
            _ => Err(ParsePolicyError(s.to_string())),
        }
    }
}
