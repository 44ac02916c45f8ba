//! Chat commands: a static command table, argument parsing, and dispatch.

mod digest;
mod settings;
mod status;

#[cfg(test)]
mod tests;

use crate::digest::Digester;
use crate::gateway::scheduler::DailyScheduler;
use crate::i18n;
use recap_core::config::{MIN_MAX_MESSAGES, MIN_TIMEOUT_SECS};
use recap_core::message::ChannelId;
use regex::Regex;
use std::sync::LazyLock;

static CHANNEL_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:<#(\d+)>|(\d+))$").expect("valid channel ref regex"));

/// Grouped context for command execution.
pub struct CommandContext<'a> {
    pub digester: &'a Digester,
    pub scheduler: &'a DailyScheduler,
    /// Channel the command was posted in; replies and digests go here.
    pub channel_id: ChannelId,
    pub lang: &'a str,
    pub prefix: &'a str,
    pub config_path: &'a str,
    pub env_path: &'a str,
}

/// Expected arguments of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgSchema {
    None,
    /// One or more `<#id>` mentions or bare ids.
    ChannelRefs,
    /// A single integer of at least `min`.
    Int { min: u64 },
}

/// One row of the command table.
#[derive(Debug, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub args: ArgSchema,
    /// Argument placeholder shown in usage and help.
    pub usage: &'static str,
    /// i18n key of the one-line description.
    pub summary: &'static str,
}

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "digest",
        args: ArgSchema::None,
        usage: "",
        summary: "help_digest",
    },
    CommandSpec {
        name: "digest_from",
        args: ArgSchema::ChannelRefs,
        usage: "#channel [#channel ...]",
        summary: "help_digest_from",
    },
    CommandSpec {
        name: "toggle_role_mentions",
        args: ArgSchema::None,
        usage: "",
        summary: "help_toggle_role_mentions",
    },
    CommandSpec {
        name: "set_max_messages",
        args: ArgSchema::Int {
            min: MIN_MAX_MESSAGES as u64,
        },
        usage: "<count>",
        summary: "help_set_max_messages",
    },
    CommandSpec {
        name: "set_timeout",
        args: ArgSchema::Int {
            min: MIN_TIMEOUT_SECS,
        },
        usage: "<seconds>",
        summary: "help_set_timeout",
    },
    CommandSpec {
        name: "reload_channels",
        args: ArgSchema::None,
        usage: "",
        summary: "help_reload_channels",
    },
    CommandSpec {
        name: "check_schedule",
        args: ArgSchema::None,
        usage: "",
        summary: "help_check_schedule",
    },
    CommandSpec {
        name: "restart_scheduler",
        args: ArgSchema::None,
        usage: "",
        summary: "help_restart_scheduler",
    },
    CommandSpec {
        name: "help",
        args: ArgSchema::None,
        usage: "",
        summary: "help_help",
    },
];

/// Look up a command by name.
pub fn find(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|c| c.name == name)
}

/// Known bot commands with parsed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Digest,
    DigestFrom(Vec<ChannelId>),
    ToggleRoleMentions,
    SetMaxMessages(usize),
    SetTimeout(u64),
    ReloadChannels,
    CheckSchedule,
    RestartScheduler,
    Help,
}

/// Why a known command was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Missing or malformed arguments.
    Usage(&'static CommandSpec),
    /// `digest_from` without any channel.
    NoChannels,
    /// An integer argument under the command's minimum.
    BelowMinimum(&'static CommandSpec),
}

impl CommandError {
    /// Reply text for the invoking channel.
    pub fn reply(&self, prefix: &str, lang: &str) -> String {
        match self {
            Self::Usage(spec) => i18n::usage(lang, &usage_line(prefix, spec)),
            Self::NoChannels => i18n::t("digest_from_usage", lang).to_string(),
            Self::BelowMinimum(spec) => match spec.name {
                "set_timeout" => i18n::t("timeout_min", lang).to_string(),
                _ => i18n::t("max_messages_min", lang).to_string(),
            },
        }
    }
}

/// `!name args`, trimmed when the command takes no arguments.
pub fn usage_line(prefix: &str, spec: &CommandSpec) -> String {
    format!("{prefix}{} {}", spec.name, spec.usage)
        .trim_end()
        .to_string()
}

impl Command {
    /// Parse a chat message. Returns `None` when the text is not a known
    /// command, so unrelated chatter is ignored.
    pub fn parse(text: &str, prefix: &str) -> Option<Result<Self, CommandError>> {
        let rest = text.trim().strip_prefix(prefix)?;
        let mut words = rest.split_whitespace();
        let spec = find(words.next()?)?;
        let args: Vec<&str> = words.collect();
        Some(Self::from_args(spec, &args))
    }

    fn from_args(spec: &'static CommandSpec, args: &[&str]) -> Result<Self, CommandError> {
        match spec.args {
            ArgSchema::None => Ok(match spec.name {
                "digest" => Self::Digest,
                "toggle_role_mentions" => Self::ToggleRoleMentions,
                "reload_channels" => Self::ReloadChannels,
                "check_schedule" => Self::CheckSchedule,
                "restart_scheduler" => Self::RestartScheduler,
                _ => Self::Help,
            }),
            ArgSchema::ChannelRefs => {
                if args.is_empty() {
                    return Err(CommandError::NoChannels);
                }
                args.iter()
                    .map(|a| parse_channel_ref(a))
                    .collect::<Option<Vec<_>>>()
                    .map(Self::DigestFrom)
                    .ok_or(CommandError::Usage(spec))
            }
            ArgSchema::Int { min } => {
                let [raw] = args else {
                    return Err(CommandError::Usage(spec));
                };
                let value: u64 = raw.parse().map_err(|_| CommandError::Usage(spec))?;
                if value < min {
                    return Err(CommandError::BelowMinimum(spec));
                }
                Ok(match spec.name {
                    "set_timeout" => Self::SetTimeout(value),
                    _ => Self::SetMaxMessages(
                        usize::try_from(value).map_err(|_| CommandError::Usage(spec))?,
                    ),
                })
            }
        }
    }
}

/// `<#123>` or `123` → `123`.
pub fn parse_channel_ref(raw: &str) -> Option<ChannelId> {
    let caps = CHANNEL_REF.captures(raw)?;
    caps.get(1).or_else(|| caps.get(2))?.as_str().parse().ok()
}

/// Handle a command. Returns the reply text, or `None` when the command
/// already posted its own output (digest runs).
pub async fn handle(cmd: Command, ctx: &CommandContext<'_>) -> Option<String> {
    match cmd {
        Command::Digest => {
            digest::handle_digest(ctx, None).await;
            None
        }
        Command::DigestFrom(ids) => {
            digest::handle_digest(ctx, Some(ids)).await;
            None
        }
        Command::ToggleRoleMentions => Some(settings::handle_toggle_role_mentions(ctx).await),
        Command::SetMaxMessages(limit) => Some(settings::handle_set_max_messages(ctx, limit).await),
        Command::SetTimeout(secs) => Some(settings::handle_set_timeout(ctx, secs).await),
        Command::ReloadChannels => Some(settings::handle_reload_channels(ctx).await),
        Command::CheckSchedule => Some(status::handle_check_schedule(ctx).await),
        Command::RestartScheduler => Some(status::handle_restart_scheduler(ctx).await),
        Command::Help => Some(status::handle_help(ctx.prefix, ctx.lang)),
    }
}
