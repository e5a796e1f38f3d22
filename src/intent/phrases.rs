//! Built-in trigger phrase banks.
//!
//! Each intent has a *singles* bank of standalone triggers and a *pairs*
//! bank of two independent word sets. Bank order is scan order and decides
//! the order of tokens in the assembled phrase.

/// Two word sets that must both be represented somewhere in a message.
#[derive(Debug, Clone, Copy)]
pub struct PairBank {
    pub first: &'static [&'static str],
    pub second: &'static [&'static str],
}

/// Singles + pairs for one intent.
#[derive(Debug, Clone, Copy)]
pub struct PhraseBanks {
    pub singles: &'static [&'static str],
    pub pairs: &'static [PairBank],
}

const ACTIVITY_VERBS: &[&str] = &["join", "attend", "play", "come"];

pub const UNAVAILABLE: PhraseBanks = PhraseBanks {
    singles: &[
        "unavailable",
        "not available",
        "can't make it",
        "cannot make it",
        "won't make it",
        "can't be there",
        "won't be there",
        "can't come",
        "busy",
    ],
    pairs: &[PairBank {
        first: &["can't", "cannot", "won't", "unable to"],
        second: ACTIVITY_VERBS,
    }],
};

pub const AVAILABLE: PhraseBanks = PhraseBanks {
    singles: &[
        "available",
        "can make it",
        "will be there",
        "will make it",
        "free",
    ],
    pairs: &[PairBank {
        first: &["will", "can", "could"],
        second: ACTIVITY_VERBS,
    }],
};
