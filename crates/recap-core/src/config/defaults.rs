//! Default values for serde and `Config::default`.

pub(super) fn default_language() -> String {
    "English".to_string()
}
pub(super) fn default_log_dir() -> String {
    "logs".to_string()
}
pub(super) fn default_log_level() -> String {
    "info".to_string()
}
pub(super) fn default_true() -> bool {
    true
}
pub(super) fn default_command_prefix() -> String {
    "!".to_string()
}
pub(super) fn default_max_messages() -> usize {
    500
}
pub(super) fn default_timeout_secs() -> u64 {
    300
}
pub(super) fn default_title() -> String {
    "📚 **2TOP SQUAD digest for {date}**".to_string()
}
pub(super) fn default_schedule_time() -> String {
    "00:01".to_string()
}
pub(super) fn default_timezone() -> String {
    "Europe/Kyiv".to_string()
}
