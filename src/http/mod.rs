//! HTTP API subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (HttpServer: bind, serve, graceful stop)
//!     → request.rs (request id, metrics)
//!     → trim.rs (whitespace trimming of query/JSON/form input)
//!     → routes.rs (system routes, /api/v1 user routes)
//!     → response.rs (JSON envelope)
//! ```

pub mod request;
pub mod response;
pub mod routes;
pub mod server;
pub mod trim;

pub use request::X_REQUEST_ID;
pub use response::{ApiError, ApiResponse};
pub use routes::build_router;
pub use server::{AppState, HttpServer};
