//! Trigger phrase scan and clause extraction.

use crate::intent::phrases::{self, PhraseBanks};
use crate::intent::{Classification, Intent};
use regex::RegexBuilder;

/// Scans chat messages for availability triggers.
#[derive(Debug, Clone, Default)]
pub struct IntentClassifier {
    word_boundaries: bool,
}

impl IntentClassifier {
    /// Loose substring matching, as triggers have always behaved.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchor triggers on word boundaries (`"free"` no longer matches `"freedom"`).
    #[must_use]
    pub fn with_word_boundaries(mut self, enabled: bool) -> Self {
        self.word_boundaries = enabled;
        self
    }

    /// Classify a message. Unavailability is checked first; when it matches,
    /// availability is never attempted.
    #[must_use]
    pub fn classify(&self, text: &str) -> Option<Classification> {
        self.classify_as(text, Intent::Unavailable)
            .or_else(|| self.classify_as(text, Intent::Available))
    }

    /// Classify a message against a single intent's banks.
    #[must_use]
    pub fn classify_as(&self, text: &str, intent: Intent) -> Option<Classification> {
        let text = normalize_apostrophes(text);
        let banks = banks_for(intent);

        let phrase = [self.singles_phrase(&text, banks), self.pairs_phrase(&text, banks)]
            .into_iter()
            .find(|phrase| !phrase.is_empty())?;

        let clause = self.capture_clause(&text, &phrase)?;
        tracing::debug!(%intent, %phrase, %clause, "message classified");
        Some(Classification { intent, clause })
    }

    fn singles_phrase(&self, text: &str, banks: &PhraseBanks) -> String {
        banks
            .singles
            .iter()
            .copied()
            .filter(|token| self.contains(text, token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn pairs_phrase(&self, text: &str, banks: &PhraseBanks) -> String {
        let mut tokens = Vec::new();
        for pair in banks.pairs {
            let first: Vec<&str> = pair
                .first
                .iter()
                .copied()
                .filter(|token| self.contains(text, token))
                .collect();
            let second: Vec<&str> = pair
                .second
                .iter()
                .copied()
                .filter(|token| self.contains(text, token))
                .collect();
            if !first.is_empty() && !second.is_empty() {
                tokens.extend(first);
                tokens.extend(second);
            }
        }
        tokens.join(" ")
    }

    fn contains(&self, text: &str, token: &str) -> bool {
        if !self.word_boundaries {
            return text.to_lowercase().contains(&token.to_lowercase());
        }
        RegexBuilder::new(&format!(r"\b{}\b", regex::escape(token)))
            .case_insensitive(true)
            .build()
            .is_ok_and(|re| re.is_match(text))
    }

    fn capture_clause(&self, text: &str, phrase: &str) -> Option<String> {
        let escaped = phrase
            .split(' ')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(" ");
        let boundary = if self.word_boundaries { r"\b" } else { "" };
        let re = RegexBuilder::new(&format!("{boundary}{escaped} (.+)"))
            .case_insensitive(true)
            .build()
            .ok()?;
        let clause = re.captures(text)?.get(1)?.as_str().trim();
        if clause.is_empty() {
            None
        } else {
            Some(clause.to_owned())
        }
    }
}

fn banks_for(intent: Intent) -> &'static PhraseBanks {
    match intent {
        Intent::Available => &phrases::AVAILABLE,
        Intent::Unavailable => &phrases::UNAVAILABLE,
    }
}

fn normalize_apostrophes(text: &str) -> String {
    text.replace(['\u{2019}', '\u{2018}'], "'")
}
