//! User model.

use chrono::{DateTime, Local};
use serde::Serialize;

/// A stored user. The password is never serialized.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub email: String,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>,
    pub deleted_at: Option<DateTime<Local>>,
}

impl User {
    /// A user not yet persisted; the repository assigns the id.
    pub fn new(username: impl Into<String>, password: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Local::now();
        Self {
            id: 0,
            username: username.into(),
            password: password.into(),
            email: email.into(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
