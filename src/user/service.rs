//! User business logic.

use std::sync::Arc;

use crate::user::dto::{
    UserCreateRequest, UserListRequest, UserListResponse, UserResponse, UserUpdateRequest,
};
use crate::user::model::User;
use crate::user::repository::UserRepository;
use crate::user::UserResult;

/// Validates requests and maps them onto the repository.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, request: UserCreateRequest) -> UserResult<UserResponse> {
        request.validate()?;
        let user = self
            .repo
            .create(User::new(request.username, request.password, request.email))
            .await?;
        tracing::info!(user_id = user.id, username = %user.username, "User created");
        Ok(UserResponse::from(&user))
    }

    pub async fn get(&self, id: u64) -> UserResult<UserResponse> {
        let user = self.repo.find_by_id(id).await?;
        Ok(UserResponse::from(&user))
    }

    pub async fn list(&self, request: UserListRequest) -> UserResult<UserListResponse> {
        request.validate()?;
        let (offset, limit) = request.bounds();
        let keyword = request.keyword.as_deref().unwrap_or_default();
        let (users, total) = self.repo.list(offset, limit, keyword).await?;
        Ok(UserListResponse {
            total,
            list: users.iter().map(UserResponse::from).collect(),
        })
    }

    pub async fn update(&self, id: u64, request: UserUpdateRequest) -> UserResult<UserResponse> {
        request.validate()?;
        let mut user = self.repo.find_by_id(id).await?;
        if let Some(email) = request.email {
            user.email = email;
        }
        if let Some(password) = request.password {
            user.password = password;
        }
        let user = self.repo.update(user).await?;
        tracing::info!(user_id = user.id, "User updated");
        Ok(UserResponse::from(&user))
    }

    pub async fn delete(&self, id: u64) -> UserResult<()> {
        self.repo.delete(id).await?;
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }

    /// Number of live users.
    pub async fn count(&self) -> UserResult<u64> {
        self.repo.count().await
    }

    /// Whether the backing store is reachable.
    pub async fn store_healthy(&self) -> bool {
        self.repo.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::repository::InMemoryUserRepository;
    use crate::user::UserError;

    fn service() -> UserService {
        UserService::new(Arc::new(InMemoryUserRepository::new()))
    }

    fn create_request(name: &str) -> UserCreateRequest {
        UserCreateRequest {
            username: name.to_string(),
            password: "secret".to_string(),
            email: format!("{name}@example.com"),
        }
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let service = service();
        let created = service.create(create_request("alice")).await.unwrap();
        let fetched = service.get(created.id).await.unwrap();
        assert_eq!(created, fetched);
        assert_eq!(fetched.email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_request() {
        let service = service();
        let mut request = create_request("alice");
        request.email = "broken".to_string();
        assert!(matches!(
            service.create(request).await,
            Err(UserError::Validation(_))
        ));
        assert_eq!(service.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_changes_email() {
        let service = service();
        let created = service.create(create_request("alice")).await.unwrap();
        let updated = service
            .update(
                created.id,
                UserUpdateRequest {
                    email: Some("new@example.com".to_string()),
                    password: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.email, "new@example.com");
        assert_eq!(updated.username, "alice");
    }

    #[tokio::test]
    async fn test_list_pages() {
        let service = service();
        for name in ["a1", "a2", "a3", "b1"] {
            service.create(create_request(name)).await.unwrap();
        }
        let page = service
            .list(UserListRequest {
                page: Some(2),
                page_size: Some(2),
                keyword: Some("a".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(page.total, 4);
        assert_eq!(page.list.len(), 2);
        assert_eq!(page.list[0].username, "a3");
    }

    #[tokio::test]
    async fn test_list_page_past_the_end_is_empty() {
        let service = service();
        service.create(create_request("a1")).await.unwrap();
        let page = service
            .list(UserListRequest {
                page: Some(u64::MAX),
                page_size: Some(100),
                keyword: None,
            })
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert!(page.list.is_empty());
    }
}
