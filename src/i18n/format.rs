//! Format helpers for strings with interpolation.

use chrono::{DateTime, TimeDelta};
use chrono_tz::Tz;
use recap_core::message::ChannelId;

fn is_ru(lang: &str) -> bool {
    lang == "Russian"
}

/// Progress indicator text while collecting.
pub fn progress(lang: &str, current: usize, total: usize, collected: usize) -> String {
    let percent = if total > 0 { current * 100 / total } else { 0 };
    if is_ru(lang) {
        format!(
            "🔄 Собираю дайджест... {percent}% ({current}/{total} каналов)\nСобрано сообщений: {collected}"
        )
    } else {
        format!(
            "🔄 Collecting digest... {percent}% ({current}/{total} channels)\nMessages collected: {collected}"
        )
    }
}

/// Progress indicator text once collection has finished.
pub fn progress_done(lang: &str, total: usize, collected: usize) -> String {
    if is_ru(lang) {
        format!(
            "🔄 Собираю дайджест... 100% ({total}/{total} каналов)\n✅ Сбор завершен! Всего: {collected} сообщений"
        )
    } else {
        format!(
            "🔄 Collecting digest... 100% ({total}/{total} channels)\n✅ Collection complete! Total: {collected} messages"
        )
    }
}

pub fn preparing_channels(lang: &str, count: usize) -> String {
    if is_ru(lang) {
        format!("🔄 Подготовка к сбору из {count} каналов...")
    } else {
        format!("🔄 Preparing to collect from {count} channels...")
    }
}

pub fn timeout_notice(lang: &str, secs: u64) -> String {
    if is_ru(lang) {
        format!(
            "⚠️ Превышен таймаут ({secs}s). Попробуйте уменьшить количество каналов или отключить сбор тегов ролей."
        )
    } else {
        format!(
            "⚠️ Collection timed out ({secs}s). Try fewer channels or turn off role-mention collection."
        )
    }
}

pub fn digest_error(lang: &str, detail: &str) -> String {
    if is_ru(lang) {
        format!("❌ Ошибка формирования дайджеста: {detail}")
    } else {
        format!("❌ Failed to build the digest: {detail}")
    }
}

pub fn role_mentions_toggled(lang: &str, enabled: bool) -> String {
    match (is_ru(lang), enabled) {
        (true, true) => "🔄 Сбор сообщений с тегом роли включено. Теперь бот будет собирать сообщения с тегом роли из всех каналов.".to_string(),
        (true, false) => "🔄 Сбор сообщений с тегом роли выключено. Теперь бот будет собирать сообщения с тегом роли только из указанных каналов.".to_string(),
        (false, true) => "🔄 Role-mention collection enabled. Messages tagging the role are now collected from all channels.".to_string(),
        (false, false) => "🔄 Role-mention collection disabled. Only the listed channels are collected now.".to_string(),
    }
}

pub fn max_messages_set(lang: &str, limit: usize) -> String {
    if is_ru(lang) {
        format!("✅ Максимальное количество сообщений: {limit}")
    } else {
        format!("✅ Max messages per channel: {limit}")
    }
}

pub fn timeout_set(lang: &str, secs: u64) -> String {
    if is_ru(lang) {
        format!("✅ Таймаут сбора: {secs} секунд")
    } else {
        format!("✅ Collection timeout: {secs} seconds")
    }
}

fn join_ids(ids: &[ChannelId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn channels_reloaded(
    lang: &str,
    count: usize,
    added: &[ChannelId],
    removed: &[ChannelId],
) -> String {
    let ru = is_ru(lang);
    let mut out = if ru {
        format!("♻️ Список каналов обновлен: {count} каналов")
    } else {
        format!("♻️ Channel list reloaded: {count} channels")
    };
    if !added.is_empty() {
        let label = if ru { "Добавлено" } else { "Added" };
        out.push_str(&format!("\n✅ {label}: {}", join_ids(added)));
    }
    if !removed.is_empty() {
        let label = if ru { "Удалено" } else { "Removed" };
        out.push_str(&format!("\n❌ {label}: {}", join_ids(removed)));
    }
    out
}

/// "N days, H hours, M minutes, S seconds" until `next`.
pub fn time_until(lang: &str, remaining: TimeDelta) -> String {
    let total = remaining.num_seconds().max(0);
    let days = total / 86_400;
    let hours = (total % 86_400) / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if is_ru(lang) {
        format!("{days} дней, {hours} часов, {minutes} минут, {seconds} секунд")
    } else {
        format!("{days} days, {hours} hours, {minutes} minutes, {seconds} seconds")
    }
}

/// Next-run report shared by `check_schedule` and `restart_scheduler`.
pub fn next_run(lang: &str, next: DateTime<Tz>, now: DateTime<Tz>) -> String {
    let when = next.format("%d.%m.%Y %H:%M:%S");
    let zone = next.timezone().name();
    let left = time_until(lang, next - now);
    if is_ru(lang) {
        format!("⏰ Следующий запуск: {when} ({zone})\n⏱️ Осталось: {left}")
    } else {
        format!("⏰ Next run: {when} ({zone})\n⏱️ Remaining: {left}")
    }
}

pub fn schedule_active(lang: &str, next: DateTime<Tz>, now: DateTime<Tz>) -> String {
    let head = if is_ru(lang) {
        "✅ Задача активна."
    } else {
        "✅ The job is active."
    };
    format!("{head}\n{}", next_run(lang, next, now))
}

pub fn command_failed(lang: &str, detail: &str) -> String {
    if is_ru(lang) {
        format!("❌ Ошибка: {detail}")
    } else {
        format!("❌ Error: {detail}")
    }
}

pub fn usage(lang: &str, usage: &str) -> String {
    if is_ru(lang) {
        format!("⚠️ Использование: `{usage}`")
    } else {
        format!("⚠️ Usage: `{usage}`")
    }
}
