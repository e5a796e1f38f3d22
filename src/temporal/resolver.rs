//! Clause → absolute timestamp resolution with default day/time fallbacks.

use crate::config::ScheduleConfig;
use crate::error::{Result, RollcallError};
use crate::temporal::parser::{TemporalParser, weekday_name};
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Tz;

/// Leading words stripped before parsing.
const STRIPPED_PREFIXES: [&str; 3] = ["next ", "on ", "at "];

/// Phrases replaced with the configured default day and time.
const VAGUE_PHRASES: [&str; 2] = ["next week", "next time"];

/// Turns natural-language clauses into UTC timestamps.
#[derive(Debug, Clone)]
pub struct TimeResolver {
    parser: TemporalParser,
    tz: Tz,
    default_weekday: Weekday,
    default_time: NaiveTime,
    default_hour_offset: u32,
}

impl TimeResolver {
    pub fn new(
        tz: Tz,
        default_weekday: Weekday,
        default_time: NaiveTime,
        default_hour_offset: u32,
    ) -> Result<Self> {
        Ok(Self {
            parser: TemporalParser::new()?,
            tz,
            default_weekday,
            default_time,
            default_hour_offset,
        })
    }

    pub fn from_config(config: &ScheduleConfig) -> Result<Self> {
        Self::new(
            config.tz()?,
            config.weekday()?,
            config.time()?,
            config.default_hour_offset,
        )
    }

    /// Timezone clauses are read in.
    #[must_use]
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Apply the vague-phrase substitutions and strip leading filler words.
    #[must_use]
    pub fn preprocess(&self, clause: &str) -> String {
        let default_phrase = format!(
            "{} {}",
            weekday_name(self.default_weekday),
            self.default_time.format("%H:%M")
        );

        let mut text = clause.trim().to_lowercase();
        for phrase in VAGUE_PHRASES {
            text = text.replace(phrase, &default_phrase);
        }

        while let Some(rest) = STRIPPED_PREFIXES
            .iter()
            .find_map(|prefix| text.strip_prefix(prefix))
        {
            text = rest.trim_start().to_owned();
        }
        text
    }

    /// Resolve a clause against the current time.
    pub fn resolve(&self, clause: &str) -> Result<DateTime<Utc>> {
        self.resolve_at(clause, Utc::now())
    }

    /// Resolve a clause against `now`.
    ///
    /// The result may still lie in the past (e.g. "today" at night); use
    /// [`TimeResolver::resolve_future_at`] when only future instants are acceptable.
    pub fn resolve_at(&self, clause: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let text = self.preprocess(clause);
        let reference = now.with_timezone(&self.tz).naive_local();
        let parsed = self
            .parser
            .parse(&text, reference)
            .ok_or_else(|| RollcallError::InvalidTime(format!("no date or time in {clause:?}")))?;

        let out_of_range = || RollcallError::InvalidTime(format!("{clause:?} is out of range"));
        let mut local = parsed.local;
        if local.time() == NaiveTime::MIN {
            local = Duration::try_hours(i64::from(self.default_hour_offset))
                .and_then(|offset| local.checked_add_signed(offset))
                .ok_or_else(out_of_range)?;
        }

        let mut resolved = self.to_utc(local)?;
        if resolved <= now
            && let Some(step) = parsed.roll_forward
        {
            let rolled = local.checked_add_signed(step).ok_or_else(out_of_range)?;
            resolved = self.to_utc(rolled)?;
        }
        Ok(resolved)
    }

    /// Resolve a clause and require the result to be strictly after now.
    pub fn resolve_future(&self, clause: &str) -> Result<DateTime<Utc>> {
        self.resolve_future_at(clause, Utc::now())
    }

    /// Resolve a clause and require the result to be strictly after `now`.
    pub fn resolve_future_at(&self, clause: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let resolved = self.resolve_at(clause, now)?;
        if resolved <= now {
            return Err(RollcallError::InvalidTime(format!(
                "{clause:?} resolves to {resolved}, which is not in the future"
            )));
        }
        Ok(resolved)
    }

    fn to_utc(&self, local: chrono::NaiveDateTime) -> Result<DateTime<Utc>> {
        let local = local
            .with_second(0)
            .ok_or_else(|| RollcallError::InvalidTime(format!("bad local time {local}")))?;
        self.tz
            .from_local_datetime(&local)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| {
                RollcallError::InvalidTime(format!("{local} does not exist in {}", self.tz))
            })
    }
}

/// Human-readable form of an instant in `tz`, e.g. `Monday, 26 October at 20:00 (UTC)`.
#[must_use]
pub fn describe_instant(instant: DateTime<Utc>, tz: Tz) -> String {
    format!(
        "{} ({tz})",
        instant.with_timezone(&tz).format("%A, %-d %B at %H:%M")
    )
}
