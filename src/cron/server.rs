//! Scheduler adapter for the application lifecycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::cron::manager::{execute, CronManager};
use crate::cron::schedule::Schedule;
use crate::cron::task::Task;
use crate::lifecycle::{Server, ServerError, Shutdown};

/// Runs every scheduled task of a [`CronManager`] until stopped.
///
/// A run that overlaps its next fire time delays it rather than running twice.
pub struct CronServer {
    manager: Arc<CronManager>,
    shutdown: Shutdown,
    started: AtomicBool,
}

impl CronServer {
    pub fn new(manager: Arc<CronManager>) -> Self {
        Self {
            manager,
            shutdown: Shutdown::new(),
            started: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Server for CronServer {
    fn name(&self) -> &str {
        "cron"
    }

    async fn start(&self, _ctx: CancellationToken) -> Result<(), ServerError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(ServerError::AlreadyStarted(self.name().to_string()));
        }

        let scheduled = self.manager.scheduled();
        tracing::info!(tasks = scheduled.len(), "Cron scheduler started");

        for (task, schedule) in scheduled {
            let stop = self.shutdown.token();
            self.shutdown
                .track(tokio::spawn(schedule_loop(task, schedule, stop)));
        }
        Ok(())
    }

    async fn stop(&self, deadline: Instant) -> Result<(), ServerError> {
        tracing::info!("Cron scheduler stopping");
        self.shutdown.trigger_and_wait(deadline).await
    }
}

async fn schedule_loop(task: Arc<dyn Task>, schedule: Schedule, stop: CancellationToken) {
    let name = task.info().name.clone();
    let mut last_fire: Option<NaiveDateTime> = None;

    loop {
        let now = Local::now().naive_local();
        let from = last_fire.map_or(now, |last| last.max(now));
        let Some(next) = schedule.next_after(from) else {
            tracing::warn!(task = %name, spec = %schedule, "Schedule never fires again");
            return;
        };
        let wait = (next - now).to_std().unwrap_or_default();

        tokio::select! {
            _ = stop.cancelled() => break,
            _ = tokio::time::sleep(wait) => {}
        }

        last_fire = Some(next);
        // Failures are logged by execute; the schedule keeps going.
        let _ = execute(task.as_ref(), &stop).await;
    }

    tracing::debug!(task = %name, "Schedule loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cron::task::{TaskInfo, TaskResult};
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    struct TickTask {
        info: TaskInfo,
        runs: AtomicUsize,
    }

    impl TickTask {
        fn every_second(name: &str) -> Self {
            Self {
                info: TaskInfo {
                    name: name.to_string(),
                    description: "ticks".to_string(),
                    enabled: true,
                    spec: "* * * * * *".to_string(),
                    timeout: Duration::from_secs(1),
                },
                runs: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Task for TickTask {
        fn info(&self) -> &TaskInfo {
            &self.info
        }

        async fn run(&self, _ctx: &CancellationToken) -> TaskResult {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_runs_on_schedule_until_stopped() {
        let task = Arc::new(TickTask::every_second("tick"));
        let mut manager = CronManager::new();
        manager.register_task(task.clone()).unwrap();
        let server = CronServer::new(Arc::new(manager));

        server.start(CancellationToken::new()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(2200)).await;
        server
            .stop(Instant::now() + Duration::from_secs(1))
            .await
            .unwrap();

        let runs = task.runs.load(Ordering::SeqCst);
        assert!(runs >= 1, "expected at least one run, got {runs}");

        tokio::time::sleep(Duration::from_millis(1200)).await;
        assert_eq!(task.runs.load(Ordering::SeqCst), runs);
    }

    #[tokio::test]
    async fn test_disabled_task_never_runs() {
        let task = Arc::new(TickTask::every_second("quiet"));
        let mut manager = CronManager::new().with_disabled(["quiet"]);
        manager.register_task(task.clone()).unwrap();
        let server = CronServer::new(Arc::new(manager));

        server.start(CancellationToken::new()).await.unwrap();
        assert_eq!(server.shutdown.running_tasks(), 0);
        server
            .stop(Instant::now() + Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(task.runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_second_start_rejected() {
        let server = CronServer::new(Arc::new(CronManager::new()));
        server.start(CancellationToken::new()).await.unwrap();
        let err = server.start(CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, ServerError::AlreadyStarted(_)));
    }
}
