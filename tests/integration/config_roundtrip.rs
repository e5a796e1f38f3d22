//! Config file loading as the binary does it.

use rollcall::config::{ConfigIssueSeverity, RollcallConfig};
use rollcall::runtime::RuntimeContext;

#[test]
fn written_config_builds_a_runtime_context() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        format!(
            r#"
[discord]
bot_token = "token"
application_id = "1234"

[storage]
availabilities_dir = "{}"
max_availabilities_per_user = 3

[schedule]
default_weekday = "thursday"
default_time = "20:30"
timezone = "Europe/Berlin"
event_label = "session"
"#,
            dir.path().join("data").display()
        ),
    )
    .unwrap();

    let config = RollcallConfig::from_file(&path).unwrap();
    assert!(
        !config
            .validate()
            .iter()
            .any(|issue| issue.severity == ConfigIssueSeverity::Error)
    );

    let ctx = RuntimeContext::from_config(config).unwrap();
    assert_eq!(ctx.store.max_per_user(), 3);
    assert_eq!(ctx.resolver.timezone(), chrono_tz::Europe::Berlin);
    assert_eq!(ctx.config.schedule.event_label, "session");
}

#[test]
fn bad_timezone_fails_context_construction() {
    let mut config = RollcallConfig::default();
    config.schedule.timezone = "Nowhere/Special".to_owned();
    assert!(RuntimeContext::from_config(config).is_err());
}
