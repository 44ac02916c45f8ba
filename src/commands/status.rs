//! Scheduler and information command handlers: check_schedule,
//! restart_scheduler, help.

use super::{usage_line, CommandContext, COMMANDS};
use crate::i18n;
use chrono::Utc;
use tracing::info;

pub(super) async fn handle_check_schedule(ctx: &CommandContext<'_>) -> String {
    if !ctx.scheduler.is_running().await {
        return i18n::t("scheduler_inactive", ctx.lang).to_string();
    }
    let now = Utc::now();
    match ctx.scheduler.next_fire(now).await {
        Some(next) => {
            i18n::schedule_active(ctx.lang, next, now.with_timezone(&ctx.scheduler.tz()))
        }
        None => i18n::t("scheduler_no_next_run", ctx.lang).to_string(),
    }
}

pub(super) async fn handle_restart_scheduler(ctx: &CommandContext<'_>) -> String {
    ctx.scheduler.restart().await;
    info!("scheduler restarted on request");
    let head = i18n::t("scheduler_restarted", ctx.lang);
    let now = Utc::now();
    match ctx.scheduler.next_fire(now).await {
        Some(next) => format!(
            "{head}\n{}",
            i18n::next_run(ctx.lang, next, now.with_timezone(&ctx.scheduler.tz()))
        ),
        None => format!("{head}\n{}", i18n::t("scheduler_no_next_run", ctx.lang)),
    }
}

pub(super) fn handle_help(prefix: &str, lang: &str) -> String {
    let mut out = format!("**{}**", i18n::t("commands_header", lang));
    for spec in COMMANDS {
        out.push_str(&format!(
            "\n`{}` - {}",
            usage_line(prefix, spec),
            i18n::t(spec.summary, lang)
        ));
    }
    out
}
