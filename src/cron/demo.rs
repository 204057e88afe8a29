//! Example task wired into the `cron` binary.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::cron::task::{Task, TaskInfo, TaskResult};
use crate::user::UserRepository;

/// Logs the number of live users once a minute.
pub struct DemoTask {
    info: TaskInfo,
    users: Arc<dyn UserRepository>,
}

impl DemoTask {
    pub const NAME: &'static str = "demo_task";

    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self {
            info: TaskInfo {
                name: Self::NAME.to_string(),
                description: "demo".to_string(),
                enabled: true,
                spec: "0 * * * * *".to_string(),
                // Finish before the next minute fires.
                timeout: Duration::from_secs(55),
            },
            users,
        }
    }
}

#[async_trait]
impl Task for DemoTask {
    fn info(&self) -> &TaskInfo {
        &self.info
    }

    async fn run(&self, _ctx: &CancellationToken) -> TaskResult {
        let total = self.users.count().await?;
        tracing::info!(task = Self::NAME, users = total, "Demo task ran");
        Ok(())
    }
}
