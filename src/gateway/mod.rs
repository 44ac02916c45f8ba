//! Gateway: the main event loop connecting command intake, the digest
//! orchestrator, and the daily scheduler.
//!
//! Includes: auth enforcement, per-command tasks, and graceful shutdown.

pub mod scheduler;

use crate::commands::{self, Command, CommandContext};
use crate::digest::Digester;
use recap_core::{
    config::DiscordConfig,
    message::IncomingCommand,
    traits::ChatPlatform,
};
use scheduler::DailyScheduler;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Who may run commands.
#[derive(Debug, Clone, Default)]
pub struct AuthPolicy {
    /// Allowed user ids. Empty = everyone.
    pub admin_users: Vec<u64>,
}

impl AuthPolicy {
    pub fn from_config(cfg: &DiscordConfig) -> Self {
        Self {
            admin_users: cfg.admin_users.clone(),
        }
    }

    /// Bots are never obeyed; humans must be admins when a list is set.
    pub fn allows(&self, cmd: &IncomingCommand) -> bool {
        if cmd.author_is_bot {
            return false;
        }
        self.admin_users.is_empty() || self.admin_users.contains(&cmd.author_id)
    }
}

/// Settings the gateway needs besides its components.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub prefix: String,
    pub language: String,
    pub auth: AuthPolicy,
    pub scheduler_enabled: bool,
    /// Config and `.env` paths, re-read by `reload_channels`.
    pub config_path: String,
    pub env_path: String,
}

/// The central gateway that routes chat commands to handlers.
pub struct Gateway {
    platform: Arc<dyn ChatPlatform>,
    digester: Arc<Digester>,
    scheduler: Arc<DailyScheduler>,
    settings: GatewaySettings,
}

impl Gateway {
    pub fn new(
        platform: Arc<dyn ChatPlatform>,
        digester: Arc<Digester>,
        scheduler: Arc<DailyScheduler>,
        settings: GatewaySettings,
    ) -> Self {
        Self {
            platform,
            digester,
            scheduler,
            settings,
        }
    }

    /// Run the main event loop until ctrl-c or until command intake closes.
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        info!(
            "Recap gateway running | platform: {} | prefix: {} | auth: {}",
            self.platform.name(),
            self.settings.prefix,
            if self.settings.auth.admin_users.is_empty() {
                "everyone"
            } else {
                "admins only"
            },
        );

        let mut rx = self
            .platform
            .start()
            .await
            .map_err(|e| anyhow::anyhow!("failed to start {}: {e}", self.platform.name()))?;

        if self.settings.scheduler_enabled {
            self.scheduler.start().await;
        } else {
            info!("Daily scheduler disabled");
        }

        loop {
            tokio::select! {
                incoming = rx.recv() => match incoming {
                    Some(cmd) => {
                        let gw = self.clone();
                        tokio::spawn(async move {
                            gw.dispatch_command(cmd).await;
                        });
                    }
                    None => {
                        warn!("command intake closed");
                        break;
                    }
                },
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        self.shutdown().await;
        Ok(())
    }

    /// Parse, authorize, and handle one command, replying in its channel.
    pub async fn dispatch_command(&self, incoming: IncomingCommand) {
        let prefix = self.settings.prefix.as_str();
        let lang = self.settings.language.as_str();

        let parsed = match Command::parse(&incoming.content, prefix) {
            Some(parsed) => parsed,
            None => return,
        };
        if !self.settings.auth.allows(&incoming) {
            info!(
                "ignoring command from unauthorized user {} in {}",
                incoming.author_id, incoming.channel_id
            );
            return;
        }
        info!(
            "command from {} in {}: {}",
            incoming.author_id, incoming.channel_id, incoming.content
        );

        let reply = match parsed {
            Ok(cmd) => {
                let ctx = CommandContext {
                    digester: &self.digester,
                    scheduler: &self.scheduler,
                    channel_id: incoming.channel_id,
                    lang,
                    prefix,
                    config_path: &self.settings.config_path,
                    env_path: &self.settings.env_path,
                };
                commands::handle(cmd, &ctx).await
            }
            Err(e) => Some(e.reply(prefix, lang)),
        };

        if let Some(text) = reply {
            if let Err(e) = self.platform.send(incoming.channel_id, &text).await {
                error!("failed to reply in {}: {e}", incoming.channel_id);
            }
        }
    }

    /// Graceful shutdown: stop the scheduler and let a digest in progress
    /// finish, then stop command intake.
    async fn shutdown(&self) {
        info!("Shutting down...");
        self.scheduler.shutdown().await;
        if let Err(e) = self.platform.stop().await {
            warn!("failed to stop {}: {e}", self.platform.name());
        }
        info!("Shutdown complete.");
    }
}
