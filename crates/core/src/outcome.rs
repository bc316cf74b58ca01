use std::time::Duration;

use crate::group::FileGroup;

/// The result of resolving a link token.
///
/// This tri-state is the single source of truth for every read path:
/// status checks, single-file downloads, and archive downloads all
/// re-evaluate it at call time instead of trusting a cached validity
/// flag, because expiry is wall-clock-relative and records are not
/// eagerly deleted at the instant they expire.
#[derive(Debug, Clone)]
pub enum ResolveOutcome {
    /// The group exists and has not expired.
    Valid {
        /// The resolved group metadata.
        group: FileGroup,
        /// Lifetime left at the moment of resolution.
        remaining: Duration,
    },
    /// No record exists for the id (never created, or already reaped).
    NotFound,
    /// A record exists but its deadline has passed. Indistinguishable
    /// from [`ResolveOutcome::NotFound`] to the end user; logged
    /// differently.
    Expired,
}

impl ResolveOutcome {
    /// Whether the outcome is [`ResolveOutcome::Valid`].
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }
}
