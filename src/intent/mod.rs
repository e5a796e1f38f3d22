//! Availability intent detection in free-text chat messages.
//!
//! A message is scanned against per-intent trigger banks; the text after
//! the assembled trigger phrase becomes the time clause handed to
//! [`crate::temporal`].

pub mod classifier;
pub mod phrases;

pub use classifier::IntentClassifier;

/// What a message says about the author's future presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Available,
    Unavailable,
}

impl Intent {
    /// The stored `userIsAvailable` flag for this intent.
    #[must_use]
    pub fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }

    #[must_use]
    pub fn from_available(is_available: bool) -> Self {
        if is_available {
            Self::Available
        } else {
            Self::Unavailable
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available => write!(f, "available"),
            Self::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// A classified message: the intent and the clause following the trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub intent: Intent,
    pub clause: String,
}
