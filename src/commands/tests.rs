use super::*;
use crate::digest::DigestSettings;
use crate::state::{BotState, RuntimeToggles};
use crate::testing::{Event, FakePlatform};
use chrono_tz::Europe::Kyiv;
use recap_core::traits::ChatPlatform;
use std::sync::Arc;

use std::sync::atomic::{AtomicU64, Ordering};

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

fn parse(text: &str) -> Option<Result<Command, CommandError>> {
    Command::parse(text, "!")
}

#[test]
fn test_parse_all_commands() {
    assert_eq!(parse("!digest"), Some(Ok(Command::Digest)));
    assert_eq!(
        parse("!toggle_role_mentions"),
        Some(Ok(Command::ToggleRoleMentions))
    );
    assert_eq!(parse("!reload_channels"), Some(Ok(Command::ReloadChannels)));
    assert_eq!(parse("!check_schedule"), Some(Ok(Command::CheckSchedule)));
    assert_eq!(
        parse("!restart_scheduler"),
        Some(Ok(Command::RestartScheduler))
    );
    assert_eq!(parse("!help"), Some(Ok(Command::Help)));
    assert_eq!(parse("!set_max_messages 50"), Some(Ok(Command::SetMaxMessages(50))));
    assert_eq!(parse("!set_timeout 120"), Some(Ok(Command::SetTimeout(120))));
}

#[test]
fn test_parse_ignores_non_commands() {
    assert_eq!(parse("hello there"), None);
    assert_eq!(parse("!unknown"), None);
    assert_eq!(parse("!"), None);
    assert_eq!(parse("digest"), None);
    assert_eq!(parse("!digesting"), None);
}

#[test]
fn test_parse_custom_prefix_and_whitespace() {
    assert_eq!(Command::parse("  ?digest  ", "?"), Some(Ok(Command::Digest)));
    assert_eq!(Command::parse("!digest", "?"), None);
    // Extra arguments to argument-less commands are ignored.
    assert_eq!(parse("!digest now please"), Some(Ok(Command::Digest)));
}

#[test]
fn test_parse_digest_from_refs() {
    assert_eq!(
        parse("!digest_from <#123> 456"),
        Some(Ok(Command::DigestFrom(vec![123, 456])))
    );
    assert_eq!(parse("!digest_from"), Some(Err(CommandError::NoChannels)));
    assert!(matches!(
        parse("!digest_from #general"),
        Some(Err(CommandError::Usage(spec))) if spec.name == "digest_from"
    ));
}

#[test]
fn test_parse_int_minimums() {
    assert!(matches!(
        parse("!set_max_messages 9"),
        Some(Err(CommandError::BelowMinimum(spec))) if spec.name == "set_max_messages"
    ));
    assert_eq!(parse("!set_max_messages 10"), Some(Ok(Command::SetMaxMessages(10))));
    assert!(matches!(
        parse("!set_timeout 29"),
        Some(Err(CommandError::BelowMinimum(spec))) if spec.name == "set_timeout"
    ));
    assert_eq!(parse("!set_timeout 30"), Some(Ok(Command::SetTimeout(30))));
}

#[test]
fn test_parse_int_usage_errors() {
    for text in [
        "!set_max_messages",
        "!set_max_messages ten",
        "!set_max_messages -5",
        "!set_timeout 30 60",
    ] {
        assert!(
            matches!(parse(text), Some(Err(CommandError::Usage(_)))),
            "{text}"
        );
    }
}

#[test]
fn test_error_replies() {
    let below = parse("!set_timeout 5").unwrap().unwrap_err();
    assert_eq!(below.reply("!", "English"), i18n::t("timeout_min", "English"));
    let below = parse("!set_max_messages 5").unwrap().unwrap_err();
    assert_eq!(
        below.reply("!", "Russian"),
        i18n::t("max_messages_min", "Russian")
    );
    let usage = parse("!set_timeout x").unwrap().unwrap_err();
    assert!(usage.reply("!", "English").contains("`!set_timeout <seconds>`"));
}

#[test]
fn test_parse_channel_ref() {
    assert_eq!(parse_channel_ref("<#42>"), Some(42));
    assert_eq!(parse_channel_ref("42"), Some(42));
    assert_eq!(parse_channel_ref("<#42"), None);
    assert_eq!(parse_channel_ref("<@42>"), None);
    assert_eq!(parse_channel_ref("99999999999999999999999"), None);
}

#[test]
fn test_command_table_is_consistent() {
    for spec in COMMANDS {
        assert_eq!(find(spec.name), Some(spec));
        assert_ne!(i18n::t(spec.summary, "English"), "???", "{}", spec.name);
        assert_ne!(i18n::t(spec.summary, "Russian"), "???", "{}", spec.name);
    }
}

#[test]
fn test_help_lists_every_command() {
    let help = status::handle_help("!", "English");
    assert!(help.starts_with("**Commands**"));
    for spec in COMMANDS {
        assert!(help.contains(&format!("`!{}", spec.name)), "{}", spec.name);
    }
    assert!(help.contains("`!digest_from #channel [#channel ...]`"));
}

// --- handlers ---

struct Harness {
    platform: Arc<FakePlatform>,
    digester: Arc<Digester>,
    scheduler: DailyScheduler,
    dir: std::path::PathBuf,
}

impl Harness {
    fn new() -> Self {
        let platform = Arc::new(FakePlatform::new());
        let dyn_platform: Arc<dyn ChatPlatform> = platform.clone();
        let settings = DigestSettings {
            guild_id: 1,
            summary_channel_id: 900,
            mention_role_id: 77,
            digest_role_id: 77,
            title: "Digest {date}".to_string(),
            language: "English".to_string(),
            tz: Kyiv,
        };
        let state = BotState::new(
            RuntimeToggles {
                include_role_mentions: true,
                max_messages: 500,
                timeout_secs: 300,
            },
            vec![1, 2],
        );
        let digester = Arc::new(Digester::new(dyn_platform, settings, state));
        let scheduler = DailyScheduler::new("00:01", Kyiv, digester.clone()).unwrap();

        let id = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir =
            std::env::temp_dir().join(format!("__recap_cmd_test_{}_{}__", std::process::id(), id));
        let _ = std::fs::create_dir_all(&dir);
        Self {
            platform,
            digester,
            scheduler,
            dir,
        }
    }

    fn path(&self, name: &str) -> String {
        self.dir.join(name).to_string_lossy().to_string()
    }

    async fn run(&self, text: &str) -> Option<String> {
        let cmd = Command::parse(text, "!").unwrap().unwrap();
        let config_path = self.path("config.toml");
        let env_path = self.path(".env");
        let ctx = CommandContext {
            digester: &self.digester,
            scheduler: &self.scheduler,
            channel_id: 555,
            lang: "English",
            prefix: "!",
            config_path: &config_path,
            env_path: &env_path,
        };
        handle(cmd, &ctx).await
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

#[tokio::test]
async fn test_toggle_and_settings_update_state() {
    let h = Harness::new();
    let reply = h.run("!toggle_role_mentions").await.unwrap();
    assert_eq!(reply, i18n::role_mentions_toggled("English", false));

    let reply = h.run("!set_max_messages 25").await.unwrap();
    assert_eq!(reply, i18n::max_messages_set("English", 25));
    let reply = h.run("!set_timeout 45").await.unwrap();
    assert_eq!(reply, i18n::timeout_set("English", 45));

    let snapshot = h.digester.state().snapshot().await;
    assert!(!snapshot.toggles.include_role_mentions);
    assert_eq!(snapshot.toggles.max_messages, 25);
    assert_eq!(snapshot.toggles.timeout_secs, 45);
}

#[tokio::test]
async fn test_reload_channels_reports_diff() {
    let h = Harness::new();
    std::fs::write(h.path(".env"), "DISCORD_CHANNELS=2, 3, 4\n").unwrap();
    let reply = h.run("!reload_channels").await.unwrap();
    assert_eq!(reply, i18n::channels_reloaded("English", 3, &[3, 4], &[1]));
    assert_eq!(
        h.digester.state().snapshot().await.priority_channels,
        vec![2, 3, 4]
    );
}

#[tokio::test]
async fn test_reload_channels_falls_back_to_config_file() {
    let h = Harness::new();
    std::fs::write(h.path("config.toml"), "[digest]\nchannels = \"1\"\n").unwrap();
    let reply = h.run("!reload_channels").await.unwrap();
    assert_eq!(reply, i18n::channels_reloaded("English", 1, &[], &[2]));
}

#[tokio::test]
async fn test_check_schedule_inactive_then_active() {
    let h = Harness::new();
    let reply = h.run("!check_schedule").await.unwrap();
    assert_eq!(reply, i18n::t("scheduler_inactive", "English"));

    h.scheduler.start().await;
    let reply = h.run("!check_schedule").await.unwrap();
    assert!(reply.starts_with("✅ The job is active."));
    assert!(reply.contains("(Europe/Kyiv)"));
    h.scheduler.cancel().await;
}

#[tokio::test]
async fn test_restart_scheduler_reports_next_run() {
    let h = Harness::new();
    let reply = h.run("!restart_scheduler").await.unwrap();
    assert!(reply.starts_with(i18n::t("scheduler_restarted", "English")));
    assert!(reply.contains("Next run:"));
    assert!(h.scheduler.is_running().await);
    h.scheduler.cancel().await;
}

#[tokio::test]
async fn test_digest_posts_indicator_and_result_in_invoking_channel() {
    let h = Harness::new();
    assert_eq!(h.run("!digest").await, None);

    let events = h.platform.events();
    match &events[0] {
        Event::Sent {
            channel_id, text, ..
        } => {
            assert_eq!(*channel_id, 555);
            assert_eq!(text, i18n::t("progress_preparing", "English"));
        }
        other => panic!("unexpected event: {other:?}"),
    }
    // The guild has no channels, so the run ends with the empty notice.
    assert!(events.iter().any(|e| matches!(
        e,
        Event::Sent { channel_id: 555, text, .. } if text == i18n::t("no_messages", "English")
    )));
    assert!(events.iter().any(|e| matches!(e, Event::Deleted { .. })));
}

#[tokio::test]
async fn test_digest_from_announces_channel_count() {
    let h = Harness::new();
    assert_eq!(h.run("!digest_from <#7> <#8>").await, None);
    assert_eq!(h.platform.sent()[0], i18n::preparing_channels("English", 2));
}
