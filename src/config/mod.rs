//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!
//! On file change (base.hot_reload):
//!     watcher.rs detects change
//!     → loader.rs loads and validates
//!     → business section swapped into Arc<ArcSwap<BusinessConfig>>
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Only the business section is hot reloadable

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{AppConfig, BusinessConfig, HttpConfig, ObservabilityConfig};
pub use watcher::ConfigWatcher;
