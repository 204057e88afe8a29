//! Request and response payloads for the user API.

use serde::{Deserialize, Serialize};

use crate::user::model::User;
use crate::user::{UserError, UserResult};

/// Largest page a list request may ask for.
pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserCreateRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl UserCreateRequest {
    pub fn validate(&self) -> UserResult<()> {
        let mut problems = Vec::new();
        if self.username.is_empty() {
            problems.push("username is required".to_string());
        } else if self.username.chars().count() > 32 {
            problems.push("username must be at most 32 characters".to_string());
        }
        if self.password.is_empty() {
            problems.push("password is required".to_string());
        }
        if self.email.is_empty() {
            problems.push("email is required".to_string());
        } else if !is_valid_email(&self.email) {
            problems.push("email is invalid".to_string());
        }
        into_result(problems)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserUpdateRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UserUpdateRequest {
    pub fn validate(&self) -> UserResult<()> {
        let mut problems = Vec::new();
        if self.email.is_none() && self.password.is_none() {
            problems.push("at least one of email or password is required".to_string());
        }
        if let Some(email) = &self.email {
            if !is_valid_email(email) {
                problems.push("email is invalid".to_string());
            }
        }
        if matches!(&self.password, Some(p) if p.is_empty()) {
            problems.push("password must not be empty".to_string());
        }
        into_result(problems)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserListRequest {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub keyword: Option<String>,
}

impl UserListRequest {
    pub fn validate(&self) -> UserResult<()> {
        let mut problems = Vec::new();
        match self.page {
            None => problems.push("page is required".to_string()),
            Some(0) => problems.push("page must be at least 1".to_string()),
            Some(_) => {}
        }
        match self.page_size {
            None => problems.push("page_size is required".to_string()),
            Some(size) if size == 0 || size > MAX_PAGE_SIZE => {
                problems.push(format!("page_size must be between 1 and {MAX_PAGE_SIZE}"));
            }
            Some(_) => {}
        }
        into_result(problems)
    }

    /// Offset and limit of the requested page. Call after [`validate`](Self::validate).
    pub fn bounds(&self) -> (u64, u64) {
        let page = self.page.unwrap_or(1).max(1);
        let size = self.page_size.unwrap_or(MAX_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        ((page - 1).saturating_mul(size), size)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserResponse {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub create_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            create_at: user.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserListResponse {
    pub total: u64,
    pub list: Vec<UserResponse>,
}

fn into_result(problems: Vec<String>) -> UserResult<()> {
    if problems.is_empty() {
        Ok(())
    } else {
        Err(UserError::Validation(problems))
    }
}

/// Shape check only: one `@`, a non-empty local part and a dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("a@example.com"));
        assert!(is_valid_email("first.last@mail.example.org"));
        assert!(!is_valid_email("example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("a@example"));
        assert!(!is_valid_email("a@@example.com"));
        assert!(!is_valid_email("a@example..com"));
        assert!(!is_valid_email("a b@example.com"));
    }

    #[test]
    fn test_create_request_reports_every_problem() {
        let request = UserCreateRequest {
            username: String::new(),
            password: String::new(),
            email: "nope".to_string(),
        };
        let err = request.validate().unwrap_err();
        assert_eq!(
            err,
            UserError::Validation(vec![
                "username is required".to_string(),
                "password is required".to_string(),
                "email is invalid".to_string(),
            ])
        );
    }

    #[test]
    fn test_update_request_needs_a_field() {
        assert!(UserUpdateRequest::default().validate().is_err());
        let request = UserUpdateRequest {
            email: Some("b@example.com".to_string()),
            password: None,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_list_request_bounds() {
        let request = UserListRequest {
            page: Some(3),
            page_size: Some(20),
            keyword: None,
        };
        request.validate().unwrap();
        assert_eq!(request.bounds(), (40, 20));

        let too_big = UserListRequest {
            page: Some(1),
            page_size: Some(MAX_PAGE_SIZE + 1),
            keyword: None,
        };
        assert!(too_big.validate().is_err());
        assert!(UserListRequest::default().validate().is_err());
    }

    #[test]
    fn test_list_request_huge_page_saturates() {
        let request = UserListRequest {
            page: Some(u64::MAX),
            page_size: Some(MAX_PAGE_SIZE),
            keyword: None,
        };
        request.validate().unwrap();
        assert_eq!(request.bounds(), (u64::MAX, MAX_PAGE_SIZE));
    }
}
