//! Daily digest scheduling: one task sleeping until the next local fire time.

use crate::digest::Digester;
use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use recap_core::error::RecapError;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Work fired by the scheduler.
#[async_trait]
pub trait ScheduledJob: Send + Sync + 'static {
    fn name(&self) -> &str;

    async fn fire(&self);
}

#[async_trait]
impl ScheduledJob for Digester {
    fn name(&self) -> &str {
        "daily_summary"
    }

    async fn fire(&self) {
        self.run_daily_summary().await;
    }
}

/// A fixed local time of day in a zone.
#[derive(Debug, Clone)]
pub struct DailySchedule {
    schedule: Schedule,
    tz: Tz,
}

impl DailySchedule {
    /// Parse `"HH:MM"` into a daily cron schedule in `tz`.
    pub fn new(time: &str, tz: Tz) -> Result<Self, RecapError> {
        let at = NaiveTime::parse_from_str(time.trim(), "%H:%M")
            .map_err(|e| RecapError::Schedule(format!("invalid time of day '{time}': {e}")))?;
        let expr = format!("0 {} {} * * *", at.minute(), at.hour());
        let schedule: Schedule = expr
            .parse()
            .map_err(|e| RecapError::Schedule(format!("invalid cron expression '{expr}': {e}")))?;
        Ok(Self { schedule, tz })
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// First fire time strictly after `now`.
    pub fn next_after(&self, now: DateTime<Utc>) -> Option<DateTime<Tz>> {
        self.schedule.after(&now.with_timezone(&self.tz)).next()
    }

    /// First fire time after both `now` and the previous fire.
    ///
    /// A timer that wakes slightly early still lands on the following day.
    pub fn next_after_fire(
        &self,
        now: DateTime<Utc>,
        previous: Option<DateTime<Tz>>,
    ) -> Option<DateTime<Tz>> {
        let from = match previous {
            Some(prev) => now.max(prev.with_timezone(&Utc)),
            None => now,
        };
        self.next_after(from)
    }
}

type RunHandles = Arc<Mutex<Vec<JoinHandle<()>>>>;

/// Runs a [`ScheduledJob`] once a day.
///
/// A missed fire time is not replayed: after each run the next fire time is
/// computed from the current clock. Each run gets its own task, so cancelling
/// or restarting the schedule leaves a digest in progress running.
pub struct DailyScheduler {
    schedule: Arc<DailySchedule>,
    job: Arc<dyn ScheduledJob>,
    task: Mutex<Option<JoinHandle<()>>>,
    runs: RunHandles,
}

impl DailyScheduler {
    pub fn new(time: &str, tz: Tz, job: Arc<dyn ScheduledJob>) -> Result<Self, RecapError> {
        Ok(Self {
            schedule: Arc::new(DailySchedule::new(time, tz)?),
            job,
            task: Mutex::new(None),
            runs: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// Spawn the scheduling loop. No-op if it is already running.
    pub async fn start(&self) {
        let mut task = self.task.lock().await;
        if task.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }
        let schedule = Arc::clone(&self.schedule);
        let job = Arc::clone(&self.job);
        let runs = Arc::clone(&self.runs);
        *task = Some(tokio::spawn(run_loop(schedule, job, runs)));
        info!("scheduler: job '{}' started", self.job.name());
    }

    /// Stop the loop. A run already in progress finishes on its own.
    pub async fn cancel(&self) {
        if let Some(handle) = self.task.lock().await.take() {
            handle.abort();
            info!("scheduler: job '{}' cancelled", self.job.name());
        }
    }

    pub async fn restart(&self) {
        self.cancel().await;
        self.start().await;
    }

    /// Stop the loop and wait for runs in progress to finish.
    pub async fn shutdown(&self) {
        self.cancel().await;
        let pending = std::mem::take(&mut *self.runs.lock().await);
        if !pending.is_empty() {
            info!(
                "scheduler: waiting for {} '{}' run(s) to finish",
                pending.len(),
                self.job.name()
            );
        }
        for handle in pending {
            if let Err(e) = handle.await {
                warn!("scheduler: '{}' run ended abnormally: {e}", self.job.name());
            }
        }
    }

    pub async fn is_running(&self) -> bool {
        self.task
            .lock()
            .await
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Next fire time after `now`, or `None` when the loop is not running.
    pub async fn next_fire(&self, now: DateTime<Utc>) -> Option<DateTime<Tz>> {
        if !self.is_running().await {
            return None;
        }
        self.schedule.next_after(now)
    }

    pub fn tz(&self) -> Tz {
        self.schedule.tz()
    }
}

async fn run_loop(schedule: Arc<DailySchedule>, job: Arc<dyn ScheduledJob>, runs: RunHandles) {
    let mut previous = None;
    loop {
        let now = Utc::now();
        let Some(next) = schedule.next_after_fire(now, previous) else {
            warn!("scheduler: no future fire time for '{}', stopping", job.name());
            return;
        };
        let wait = (next.with_timezone(&Utc) - now).to_std().unwrap_or_default();
        info!(
            "scheduler: next '{}' run at {} ({})",
            job.name(),
            next.format("%d.%m.%Y %H:%M:%S"),
            next.timezone().name()
        );
        tokio::time::sleep(wait).await;
        previous = Some(next);

        info!("scheduler: firing '{}'", job.name());
        let run = {
            let job = Arc::clone(&job);
            tokio::spawn(async move { job.fire().await })
        };
        let mut tracked = runs.lock().await;
        tracked.retain(|h| !h.is_finished());
        tracked.push(run);
    }
}
