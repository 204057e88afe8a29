//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (app.rs):
//!     add_server(..) → run() → start every Server concurrently
//!
//! Running:
//!     wait for SIGINT/SIGTERM/SIGQUIT (signals.rs), parent cancellation,
//!     or the first Server::start error
//!
//! Shutdown (app.rs, shutdown.rs):
//!     stop every Server concurrently → join with one shared deadline → exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: any start error shuts the whole application down
//! - Best effort stop: one server failing to stop never blocks the others
//! - Shutdown has a fixed grace period: stragglers are abandoned after the deadline
//! - No ordering between servers; dependencies are resolved at construction time

pub mod app;
pub mod server;
pub mod shutdown;
pub mod signals;

pub use app::{AppError, Application, LifecycleState, SHUTDOWN_GRACE_PERIOD};
pub use server::{Server, ServerError};
pub use shutdown::Shutdown;
