/// Cascade state definitions for tracking one company's search
///
/// A company moves from `Pending` through one or more `TryingTier` states and
/// ends in exactly one terminal state.
use std::fmt;

/// Represents where a company's query cascade currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CascadeState {
    // ===== Active States =====
    /// Company is queued but no query has been issued yet
    Pending,

    /// The query tier at this index is being tried
    TryingTier(usize),

    // ===== Terminal States =====
    /// A tier produced an accepted document
    Succeeded,

    /// Every tier was tried without an accepted document
    Exhausted,

    /// The run was cancelled before this company reached a verdict
    Cancelled,
}

impl CascadeState {
    /// Returns true if this is a terminal state (no further tiers will run)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Exhausted | Self::Cancelled)
    }

    /// Returns true if the cascade is still able to issue requests
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Checks whether moving to `next` respects the cascade ordering
    ///
    /// Tiers only ever advance forward, terminal states never change, and a
    /// company can only succeed or exhaust while it is trying a tier.
    pub fn can_transition_to(&self, next: CascadeState) -> bool {
        match (self, next) {
            (Self::Pending, Self::TryingTier(_)) => true,
            (Self::Pending, Self::Cancelled) => true,
            (Self::Pending, Self::Exhausted) => true,
            (Self::TryingTier(current), Self::TryingTier(next)) => next > *current,
            (Self::TryingTier(_), Self::Succeeded) => true,
            (Self::TryingTier(_), Self::Exhausted) => true,
            (Self::TryingTier(_), Self::Cancelled) => true,
            _ => false,
        }
    }

    /// Short label used in audit lines
    pub fn label(&self) -> String {
        match self {
            Self::Pending => "pending".to_string(),
            Self::TryingTier(index) => format!("tier {}", index + 1),
            Self::Succeeded => "succeeded".to_string(),
            Self::Exhausted => "exhausted".to_string(),
            Self::Cancelled => "cancelled".to_string(),
        }
    }
}

impl fmt::Display for CascadeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
