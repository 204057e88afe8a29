//! HTTP API binary.
//!
//! ```text
//! load config → init logging/metrics → wire → Application { http, config-watcher }
//!     → run until SIGINT/SIGTERM/SIGQUIT
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwap;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use service_scaffold::config::{load_config, ConfigWatcher};
use service_scaffold::observability::logging;
use service_scaffold::{wire, Application};

#[derive(Parser)]
#[command(name = "service-scaffold")]
#[command(about = "HTTP API service", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    logging::init_logging(&config.observability);

    tracing::info!(
        app = %config.base.app_name,
        config = %cli.config.display(),
        bind_address = %config.http.bind_address,
        mode = ?config.base.mode,
        "Configuration loaded"
    );

    let business = Arc::new(ArcSwap::from_pointee(config.business.clone()));
    let repo = wire::provide_user_repository();
    let api = wire::initialize_api(&config, repo, Arc::clone(&business));

    let mut app = Application::new(config.base.app_name.clone());
    if let Some(alarm) = wire::initialize_alarm(&config)? {
        app = app.with_alarm(alarm);
    }
    app.add_server(api);
    if config.base.hot_reload {
        app.add_server(ConfigWatcher::new(&cli.config, business));
    }

    app.run(CancellationToken::new()).await?;
    Ok(())
}
