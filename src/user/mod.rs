//! User management.
//!
//! # Data Flow
//! ```text
//! HTTP request
//!     → handler.rs (extract + validate DTOs)
//!     → service.rs (DTO ↔ model mapping)
//!     → repository.rs (storage behind the UserRepository trait)
//! ```

pub mod dto;
pub mod handler;
pub mod model;
pub mod repository;
pub mod service;

use thiserror::Error;

pub use model::User;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;

/// Errors produced by user operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserError {
    /// Request failed validation; one message per problem.
    #[error("invalid request: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("user not found: {0}")]
    NotFound(String),

    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Result type for user operations.
pub type UserResult<T> = Result<T, UserError>;
