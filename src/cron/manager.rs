//! Task registry and execution.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use crate::cron::schedule::Schedule;
use crate::cron::task::Task;
use crate::cron::CronError;
use crate::observability::metrics;

struct Entry {
    task: Arc<dyn Task>,
    schedule: Schedule,
}

/// Registry of every task known to the process.
#[derive(Default)]
pub struct CronManager {
    entries: Vec<Entry>,
    disabled: HashSet<String>,
}

impl CronManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclude tasks from scheduling by name. They can still be run manually.
    pub fn with_disabled<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disabled.extend(names.into_iter().map(Into::into));
        self
    }

    /// Register a task, parsing its schedule up front.
    pub fn register_task(&mut self, task: Arc<dyn Task>) -> Result<(), CronError> {
        let info = task.info();
        if self.entries.iter().any(|e| e.task.info().name == info.name) {
            return Err(CronError::DuplicateTask(info.name.clone()));
        }
        let schedule = Schedule::parse(&info.spec)?;

        tracing::debug!(task = %info.name, spec = %info.spec, "Registered task");
        self.entries.push(Entry { task, schedule });
        Ok(())
    }

    /// Names of all registered tasks in registration order.
    pub fn task_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|e| e.task.info().name.as_str())
            .collect()
    }

    /// Whether the scheduler will run `name` on its schedule.
    pub fn is_scheduled(&self, name: &str) -> bool {
        self.entries.iter().any(|e| {
            let info = e.task.info();
            info.name == name && info.enabled && !self.disabled.contains(name)
        })
    }

    /// Tasks the scheduler should run, with their schedules.
    pub fn scheduled(&self) -> Vec<(Arc<dyn Task>, Schedule)> {
        self.entries
            .iter()
            .filter(|e| self.is_scheduled(&e.task.info().name))
            .map(|e| (Arc::clone(&e.task), e.schedule.clone()))
            .collect()
    }

    /// Run a registered task once, regardless of its schedule or enabled flag.
    pub async fn run_task(&self, name: &str, ctx: &CancellationToken) -> Result<(), CronError> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.task.info().name == name)
            .ok_or_else(|| CronError::TaskNotFound(name.to_string()))?;
        execute(entry.task.as_ref(), ctx).await
    }
}

/// Run the task hooks under the task timeout and record the outcome.
pub(crate) async fn execute(task: &dyn Task, ctx: &CancellationToken) -> Result<(), CronError> {
    let info = task.info();
    let start = Instant::now();
    let run_ctx = ctx.child_token();

    let result = if info.timeout.is_zero() {
        run_hooks(task, &run_ctx).await
    } else {
        match tokio::time::timeout(info.timeout, run_hooks(task, &run_ctx)).await {
            Ok(result) => result,
            Err(_) => Err(CronError::Timeout {
                task: info.name.clone(),
                timeout: info.timeout,
            }),
        }
    };
    run_ctx.cancel();

    metrics::record_task_run(&info.name, result.is_ok(), start);
    match &result {
        Ok(()) => tracing::info!(
            task = %info.name,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Task finished"
        ),
        Err(e) => tracing::error!(task = %info.name, error = %e, "Task failed"),
    }
    result
}

async fn run_hooks(task: &dyn Task, ctx: &CancellationToken) -> Result<(), CronError> {
    let failed = |stage: &'static str| {
        move |e: Box<dyn std::error::Error + Send + Sync>| CronError::TaskFailed {
            task: task.info().name.clone(),
            stage,
            message: e.to_string(),
        }
    };

    task.before_run(ctx).await.map_err(failed("before_run"))?;
    task.run(ctx).await.map_err(failed("run"))?;
    task.after_run(ctx).await.map_err(failed("after_run"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cron::task::{TaskInfo, TaskResult};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    struct ScriptedTask {
        info: TaskInfo,
        fail_stage: Option<&'static str>,
        run_for: Duration,
        calls: Mutex<Vec<&'static str>>,
    }

    impl ScriptedTask {
        fn new(name: &str) -> Self {
            Self {
                info: TaskInfo {
                    name: name.to_string(),
                    description: "test".to_string(),
                    enabled: true,
                    spec: "0 * * * * *".to_string(),
                    timeout: Duration::from_secs(5),
                },
                fail_stage: None,
                run_for: Duration::ZERO,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn step(&self, stage: &'static str) -> TaskResult {
            self.calls.lock().unwrap().push(stage);
            if self.fail_stage == Some(stage) {
                return Err(format!("{stage} broke").into());
            }
            Ok(())
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Task for ScriptedTask {
        fn info(&self) -> &TaskInfo {
            &self.info
        }

        async fn before_run(&self, _ctx: &CancellationToken) -> TaskResult {
            self.step("before_run")
        }

        async fn run(&self, _ctx: &CancellationToken) -> TaskResult {
            tokio::time::sleep(self.run_for).await;
            self.step("run")
        }

        async fn after_run(&self, _ctx: &CancellationToken) -> TaskResult {
            self.step("after_run")
        }
    }

    #[tokio::test]
    async fn test_hooks_run_in_order() {
        let task = Arc::new(ScriptedTask::new("ordered"));
        let mut manager = CronManager::new();
        manager.register_task(task.clone()).unwrap();

        manager
            .run_task("ordered", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(task.calls(), vec!["before_run", "run", "after_run"]);
    }

    #[tokio::test]
    async fn test_failure_stops_remaining_hooks() {
        let mut task = ScriptedTask::new("broken");
        task.fail_stage = Some("before_run");
        let task = Arc::new(task);
        let mut manager = CronManager::new();
        manager.register_task(task.clone()).unwrap();

        let err = manager
            .run_task("broken", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CronError::TaskFailed { stage: "before_run", .. }));
        assert_eq!(task.calls(), vec!["before_run"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let mut task = ScriptedTask::new("slow");
        task.run_for = Duration::from_secs(60);
        task.info.timeout = Duration::from_secs(1);
        let mut manager = CronManager::new();
        manager.register_task(Arc::new(task)).unwrap();

        let err = manager
            .run_task("slow", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CronError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_unknown_task() {
        let manager = CronManager::new();
        let err = manager
            .run_task("missing", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CronError::TaskNotFound(name) if name == "missing"));
    }

    #[test]
    fn test_register_rejects_duplicates_and_bad_specs() {
        let mut manager = CronManager::new();
        manager.register_task(Arc::new(ScriptedTask::new("a"))).unwrap();

        let err = manager
            .register_task(Arc::new(ScriptedTask::new("a")))
            .unwrap_err();
        assert!(matches!(err, CronError::DuplicateTask(_)));

        let mut bad = ScriptedTask::new("b");
        bad.info.spec = "every minute".to_string();
        let err = manager.register_task(Arc::new(bad)).unwrap_err();
        assert!(matches!(err, CronError::InvalidSchedule { .. }));

        assert_eq!(manager.task_names(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_disabled_tasks_not_scheduled_but_runnable() {
        let mut off = ScriptedTask::new("off");
        off.info.enabled = false;
        let mut manager = CronManager::new().with_disabled(["muted"]);
        manager.register_task(Arc::new(ScriptedTask::new("on"))).unwrap();
        manager.register_task(Arc::new(ScriptedTask::new("muted"))).unwrap();
        manager.register_task(Arc::new(off)).unwrap();

        assert!(manager.is_scheduled("on"));
        assert!(!manager.is_scheduled("muted"));
        assert!(!manager.is_scheduled("off"));
        assert_eq!(manager.scheduled().len(), 1);

        manager
            .run_task("off", &CancellationToken::new())
            .await
            .unwrap();
    }
}
