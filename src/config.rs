//! Configuration types for the availability bot.

use crate::error::{Result, RollcallError};
use chrono::{Duration, NaiveTime, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable that overrides `discord.bot_token`.
pub const DISCORD_TOKEN_ENV: &str = "ROLLCALL_DISCORD_TOKEN";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RollcallConfig {
    /// Discord connection settings.
    pub discord: DiscordConfig,
    /// Availability file storage.
    pub storage: StorageConfig,
    /// Default day/time fallbacks and timezone.
    pub schedule: ScheduleConfig,
    /// Trigger phrase matching.
    pub intent: IntentConfig,
    /// Confirmation prompt behaviour.
    pub workflow: WorkflowConfig,
    /// Log output.
    pub logging: LoggingConfig,
}

/// Discord gateway and REST settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Bot token. Prefer the `ROLLCALL_DISCORD_TOKEN` environment variable.
    pub bot_token: String,
    /// Application id used to register slash commands.
    pub application_id: Option<String>,
    /// Restrict commands and messages to one guild.
    pub guild_id: Option<String>,
    /// REST API base URL.
    pub api_base: String,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            application_id: None,
            guild_id: None,
            api_base: "https://discord.com/api/v10".to_owned(),
        }
    }
}

impl DiscordConfig {
    /// Token from the environment, falling back to the config file value.
    #[must_use]
    pub fn resolved_bot_token(&self) -> String {
        match std::env::var(DISCORD_TOKEN_ENV) {
            Ok(token) if !token.trim().is_empty() => token.trim().to_owned(),
            _ => self.bot_token.trim().to_owned(),
        }
    }
}

/// Per-user availability file storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding one JSON file per user.
    pub availabilities_dir: PathBuf,
    /// Maximum records retained per user (oldest evicted first).
    pub max_availabilities_per_user: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            availabilities_dir: crate::rollcall_dirs::availabilities_dir(),
            max_availabilities_per_user: 5,
        }
    }
}

/// Fallbacks for vague temporal phrases.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Weekday substituted for "next week" / "next time".
    pub default_weekday: String,
    /// Time of day (`HH:MM`) substituted for "next week" / "next time".
    pub default_time: String,
    /// Hours added when a clause resolves to exactly midnight.
    pub default_hour_offset: u32,
    /// IANA timezone clauses are interpreted in.
    pub timezone: String,
    /// Name of the recurring event, used in replies ("raid").
    pub event_label: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            default_weekday: "monday".to_owned(),
            default_time: "19:00".to_owned(),
            default_hour_offset: 19,
            timezone: "UTC".to_owned(),
            event_label: "raid".to_owned(),
        }
    }
}

impl ScheduleConfig {
    /// Parsed [`ScheduleConfig::default_weekday`].
    pub fn weekday(&self) -> Result<Weekday> {
        self.default_weekday.trim().parse::<Weekday>().map_err(|_| {
            RollcallError::Config(format!(
                "unknown default_weekday `{}`",
                self.default_weekday
            ))
        })
    }

    /// Parsed [`ScheduleConfig::default_time`].
    pub fn time(&self) -> Result<NaiveTime> {
        NaiveTime::parse_from_str(self.default_time.trim(), "%H:%M").map_err(|e| {
            RollcallError::Config(format!(
                "default_time `{}` is not HH:MM: {e}",
                self.default_time
            ))
        })
    }

    /// Parsed [`ScheduleConfig::timezone`].
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .trim()
            .parse::<Tz>()
            .map_err(|e| {
                RollcallError::Config(format!("unknown timezone `{}`: {e}", self.timezone))
            })
    }
}

/// Trigger phrase matching.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentConfig {
    /// Require triggers to sit on word boundaries instead of plain substring matches.
    pub word_boundaries: bool,
}

/// Confirmation prompt behaviour.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Drop unanswered prompts after this many seconds. `None` keeps them forever.
    pub prompt_ttl_secs: Option<u64>,
}

impl WorkflowConfig {
    /// Parsed [`WorkflowConfig::prompt_ttl_secs`].
    pub fn prompt_ttl(&self) -> Result<Option<Duration>> {
        self.prompt_ttl_secs
            .map(|secs| {
                i64::try_from(secs)
                    .ok()
                    .and_then(Duration::try_seconds)
                    .ok_or_else(|| {
                        RollcallError::Config(format!("prompt_ttl_secs {secs} is out of range"))
                    })
            })
            .transpose()
    }
}

/// Log output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Also write daily-rotated log files here.
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            log_dir: None,
        }
    }
}

/// Severity of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueSeverity {
    Warning,
    Error,
}

/// Validation issue found before startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub id: String,
    pub severity: ConfigIssueSeverity,
    pub summary: String,
}

impl ConfigIssue {
    fn error(id: &str, summary: impl Into<String>) -> Self {
        Self {
            id: id.to_owned(),
            severity: ConfigIssueSeverity::Error,
            summary: summary.into(),
        }
    }

    fn warning(id: &str, summary: impl Into<String>) -> Self {
        Self {
            id: id.to_owned(),
            severity: ConfigIssueSeverity::Warning,
            summary: summary.into(),
        }
    }
}

impl RollcallConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| RollcallError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| RollcallError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        crate::rollcall_dirs::config_file()
    }

    /// Validate configuration without touching the network.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.discord.resolved_bot_token().is_empty() {
            issues.push(ConfigIssue::error(
                "discord-missing-token",
                format!(
                    "Discord bot token is empty; set discord.bot_token or {DISCORD_TOKEN_ENV}."
                ),
            ));
        }
        if self.discord.application_id.is_none() {
            issues.push(ConfigIssue::warning(
                "discord-missing-application-id",
                "discord.application_id is unset; slash commands will not be registered.",
            ));
        }
        if self.storage.max_availabilities_per_user == 0 {
            issues.push(ConfigIssue::warning(
                "storage-zero-capacity",
                "max_availabilities_per_user is 0; one record per user will be kept.",
            ));
        }
        if self.storage.availabilities_dir.is_file() {
            issues.push(ConfigIssue::error(
                "storage-dir-is-file",
                format!(
                    "{} exists and is not a directory.",
                    self.storage.availabilities_dir.display()
                ),
            ));
        }
        if let Err(e) = self.schedule.weekday() {
            issues.push(ConfigIssue::error("schedule-bad-weekday", e.to_string()));
        }
        if let Err(e) = self.schedule.time() {
            issues.push(ConfigIssue::error("schedule-bad-time", e.to_string()));
        }
        if let Err(e) = self.schedule.tz() {
            issues.push(ConfigIssue::error("schedule-bad-timezone", e.to_string()));
        }
        if let Err(e) = self.workflow.prompt_ttl() {
            issues.push(ConfigIssue::error("workflow-bad-prompt-ttl", e.to_string()));
        }
        if let Err(e) = crate::logging::level_filter(&self.logging.level) {
            issues.push(ConfigIssue::error("logging-bad-level", e.to_string()));
        }
        if self.schedule.default_hour_offset > 23 {
            issues.push(ConfigIssue::error(
                "schedule-bad-hour-offset",
                "default_hour_offset must be between 0 and 23.",
            ));
        }

        issues
    }
}
