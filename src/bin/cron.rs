//! Scheduled task binary.
//!
//! `cron -c config.toml` runs the scheduler until a termination signal.
//! `cron -c config.toml -t demo_task` runs one task once and exits.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use service_scaffold::config::load_config;
use service_scaffold::cron::CronServer;
use service_scaffold::observability::logging;
use service_scaffold::{wire, Application};

#[derive(Parser)]
#[command(name = "cron")]
#[command(about = "Scheduled task runner", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Run this task once instead of scheduling
    #[arg(short, long)]
    task: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    logging::init_logging(&config.observability);

    let repo = wire::provide_user_repository();
    let manager = wire::initialize_cron(&config, repo)?;

    if let Some(task) = cli.task {
        println!("Start task: {task}");
        manager.run_task(&task, &CancellationToken::new()).await?;
        println!("Task {task} executed successfully.");
        return Ok(());
    }

    let mut app = Application::new(format!("{}-cron", config.base.app_name));
    if let Some(alarm) = wire::initialize_alarm(&config)? {
        app = app.with_alarm(alarm);
    }
    app.add_server(CronServer::new(Arc::new(manager)));

    app.run(CancellationToken::new()).await?;
    Ok(())
}
