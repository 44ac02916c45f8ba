//! Internationalization: localized strings for bot replies and notices.
//!
//! Uses a simple `t(key, lang)` function for static strings and
//! format helpers for strings with interpolation.
//! Supported languages: English (fallback) and Russian.

mod format;


pub use format::*;

/// Return a localized static string for `key` in the given `lang`.
/// Falls back to English for unsupported languages and to `"???"` for unknown keys.
pub fn t(key: &str, lang: &str) -> &'static str {
    let ru = lang == "Russian";
    match key {
        "progress_preparing" => {
            if ru {
                "🔄 Подготовка к сбору сообщений..."
            } else {
                "🔄 Preparing to collect messages..."
            }
        }
        "progress_started" => {
            if ru {
                "🔄 Собираю дайджест..."
            } else {
                "🔄 Collecting digest..."
            }
        }
        "no_messages" => {
            if ru {
                "ℹ️ Нет сообщений за вчерашний день."
            } else {
                "ℹ️ No messages for yesterday."
            }
        }
        "no_title" => {
            if ru {
                "Пост без заголовка"
            } else {
                "no title"
            }
        }
        "max_messages_min" => {
            if ru {
                "⚠️ Минимальное значение: 10 сообщений"
            } else {
                "⚠️ Minimum value: 10 messages"
            }
        }
        "timeout_min" => {
            if ru {
                "⚠️ Минимальное значение: 30 секунд"
            } else {
                "⚠️ Minimum value: 30 seconds"
            }
        }
        "digest_from_usage" => {
            if ru {
                "⚠️ Укажите хотя бы один канал. Например: `!digest_from #general #announcements`"
            } else {
                "⚠️ Name at least one channel. Example: `!digest_from #general #announcements`"
            }
        }
        "scheduler_no_next_run" => {
            if ru {
                "⚠️ Задача активна, но время следующего запуска неизвестно."
            } else {
                "⚠️ The job is active, but the next run time is unknown."
            }
        }
        "scheduler_inactive" => {
            if ru {
                "❌ Планировщик не активен! Перезапустите бота."
            } else {
                "❌ The scheduler is not running! Use restart_scheduler or restart the bot."
            }
        }
        "scheduler_restarted" => {
            if ru {
                "🔄 Планировщик перезапущен."
            } else {
                "🔄 Scheduler restarted."
            }
        }
        "commands_header" => {
            if ru {
                "Команды"
            } else {
                "Commands"
            }
        }
        "help_digest" => {
            if ru {
                "Собрать дайджест за вчера из настроенных каналов"
            } else {
                "Build yesterday's digest from the configured channels"
            }
        }
        "help_digest_from" => {
            if ru {
                "Собрать дайджест за вчера из указанных каналов"
            } else {
                "Build yesterday's digest from the given channels"
            }
        }
        "help_toggle_role_mentions" => {
            if ru {
                "Включить или выключить сбор сообщений с тегом роли"
            } else {
                "Turn role-mention collection on or off"
            }
        }
        "help_set_max_messages" => {
            if ru {
                "Максимум сообщений на канал (не меньше 10)"
            } else {
                "Max messages per channel (at least 10)"
            }
        }
        "help_set_timeout" => {
            if ru {
                "Таймаут сбора в секундах (не меньше 30)"
            } else {
                "Collection timeout in seconds (at least 30)"
            }
        }
        "help_reload_channels" => {
            if ru {
                "Перечитать список каналов из .env"
            } else {
                "Re-read the channel list from .env"
            }
        }
        "help_check_schedule" => {
            if ru {
                "Показать состояние планировщика"
            } else {
                "Show scheduler state and the next run"
            }
        }
        "help_restart_scheduler" => {
            if ru {
                "Перезапустить планировщик"
            } else {
                "Restart the scheduler"
            }
        }
        "help_help" => {
            if ru {
                "Список команд"
            } else {
                "List commands"
            }
        }
        _ => "???",
    }
}
