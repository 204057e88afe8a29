//! Constructor wiring for the binaries.
//!
//! ```text
//! repository → UserService → AppState → router → HttpServer
//! repository → DemoTask → CronManager → CronServer
//! ```

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::schema::{AppConfig, BusinessConfig};
use crate::cron::{CronError, CronManager, DemoTask};
use crate::http::{build_router, AppState, HttpServer};
use crate::observability::alarm::{self, AlarmSink};
use crate::user::{InMemoryUserRepository, UserRepository, UserService};

/// The user store shared by services and tasks of one process.
pub fn provide_user_repository() -> Arc<dyn UserRepository> {
    Arc::new(InMemoryUserRepository::new())
}

/// Build the HTTP API server. Nothing is bound until the server starts.
pub fn initialize_api(
    config: &AppConfig,
    repo: Arc<dyn UserRepository>,
    business: Arc<ArcSwap<BusinessConfig>>,
) -> HttpServer {
    let state = AppState {
        users: UserService::new(repo),
        business,
    };
    let router = build_router(config, state);
    HttpServer::new(config.http.clone(), router)
}

/// Build the task registry with every task of the process registered.
pub fn initialize_cron(
    config: &AppConfig,
    repo: Arc<dyn UserRepository>,
) -> Result<CronManager, CronError> {
    let mut manager = CronManager::new().with_disabled(config.cron.disabled_tasks.clone());
    manager.register_task(Arc::new(DemoTask::new(repo)))?;
    Ok(manager)
}

/// Alarm sink for lifecycle events. Debug mode only logs them.
pub fn initialize_alarm(config: &AppConfig) -> Result<Option<Arc<dyn AlarmSink>>, reqwest::Error> {
    if config.is_debug() {
        return Ok(None);
    }
    alarm::from_config(&config.alarm).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RunMode;

    #[test]
    fn test_initialize_cron_registers_demo_task() {
        let mut config = AppConfig::default();
        let manager = initialize_cron(&config, provide_user_repository()).unwrap();
        assert_eq!(manager.task_names(), vec!["demo_task"]);
        assert!(manager.is_scheduled("demo_task"));

        config.cron.disabled_tasks = vec!["demo_task".to_string()];
        let manager = initialize_cron(&config, provide_user_repository()).unwrap();
        assert!(!manager.is_scheduled("demo_task"));
    }

    #[test]
    fn test_alarm_only_outside_debug() {
        let mut config = AppConfig::default();
        assert!(initialize_alarm(&config).unwrap().is_none());

        config.base.mode = RunMode::Release;
        assert!(initialize_alarm(&config).unwrap().is_some());
    }
}
