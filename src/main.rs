mod commands;
mod digest;
mod gateway;
mod i18n;
mod logfile;
mod state;

#[cfg(test)]
mod testing;

use chrono::Utc;
use clap::{Parser, Subcommand};
use digest::{DigestSettings, Digester};
use gateway::{scheduler::DailyScheduler, AuthPolicy, Gateway, GatewaySettings};
use recap_channels::discord::DiscordChannel;
use recap_core::config::{self, Config, EnvSource};
use recap_core::traits::ChatPlatform;
use state::BotState;
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

#[derive(Parser)]
#[command(name = "recap", version, about = "Recap: daily Discord channel digests")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Path to the .env file.
    #[arg(short, long, default_value = ".env")]
    env_file: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot: command intake plus the daily schedule.
    Start,
    /// Print the resolved configuration and the next scheduled run.
    Status,
    /// Post one digest to the summary channel and exit.
    Digest,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Variables already set in the process win over the file.
    if let Err(e) = dotenvy::from_path(&cli.env_file) {
        if !e.not_found() {
            anyhow::bail!("failed to read {}: {e}", cli.env_file);
        }
    }
    let cfg = config::resolve(&cli.config, &EnvSource::from_process())?;
    let _guard = init_logging(&cfg)?;

    match cli.command {
        Commands::Start => {
            let (platform, digester) = build(&cfg)?;
            let scheduler = Arc::new(DailyScheduler::new(
                &cfg.scheduler.time,
                cfg.scheduler.tz()?,
                digester.clone(),
            )?);
            let settings = GatewaySettings {
                prefix: cfg.discord.command_prefix.clone(),
                language: cfg.recap.language.clone(),
                auth: AuthPolicy::from_config(&cfg.discord),
                scheduler_enabled: cfg.scheduler.enabled,
                config_path: cli.config.clone(),
                env_path: cli.env_file.clone(),
            };
            info!(
                "Starting Recap | guild: {} | priority channels: {}",
                cfg.discord.guild_id,
                cfg.digest.priority_channels().len()
            );
            let gw = Arc::new(Gateway::new(platform, digester, scheduler, settings));
            gw.run().await?;
        }
        Commands::Status => {
            let tz = cfg.scheduler.tz()?;
            println!("Recap: Status\n");
            println!("Config:            {}", cli.config);
            println!("Env file:          {}", cli.env_file);
            println!("Guild:             {}", cfg.discord.guild_id);
            println!("Summary channel:   {}", cfg.discord.summary_channel_id);
            println!("Mention role:      {}", cfg.discord.mention_role_id);
            println!("Digest role:       {}", cfg.discord.digest_role());
            println!("Command prefix:    {}", cfg.discord.command_prefix);
            println!("Priority channels: {:?}", cfg.digest.priority_channels());
            println!("Role mentions:     {}", cfg.digest.include_role_mentions);
            println!("Max messages:      {}", cfg.digest.max_messages);
            println!("Timeout:           {}s", cfg.digest.timeout_secs);
            if cfg.scheduler.enabled {
                let schedule = gateway::scheduler::DailySchedule::new(&cfg.scheduler.time, tz)?;
                match schedule.next_after(Utc::now()) {
                    Some(next) => println!(
                        "Next run:          {} ({})",
                        next.format("%d.%m.%Y %H:%M:%S"),
                        tz.name()
                    ),
                    None => println!("Next run:          unknown"),
                }
            } else {
                println!("Scheduler:         disabled");
            }
        }
        Commands::Digest => {
            let (_, digester) = build(&cfg)?;
            match digester.run_daily_summary().await {
                Some(outcome) => println!("{outcome:?}"),
                None => anyhow::bail!(
                    "could not post to summary channel {}",
                    cfg.discord.summary_channel_id
                ),
            }
        }
    }

    Ok(())
}

/// Build the Discord client and the digest orchestrator.
fn build(cfg: &Config) -> anyhow::Result<(Arc<dyn ChatPlatform>, Arc<Digester>)> {
    let platform: Arc<dyn ChatPlatform> = Arc::new(DiscordChannel::new(cfg.discord.clone()));
    let digester = Arc::new(Digester::new(
        platform.clone(),
        DigestSettings::from_config(cfg)?,
        BotState::from_config(&cfg.digest),
    ));
    Ok((platform, digester))
}

/// Log to stdout and to a daily-rotated file, keeping the last three files.
fn init_logging(cfg: &Config) -> anyhow::Result<WorkerGuard> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_file = logfile::SizeCappedFile::open(
        std::path::Path::new(&cfg.recap.log_dir),
        logfile::LOG_FILE_NAME,
        logfile::MAX_LOG_BYTES,
        logfile::LOG_BACKUPS,
    )?;
    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.recap.log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .init();

    Ok(guard)
}
