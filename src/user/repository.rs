//! User storage.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Local;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::user::model::User;
use crate::user::{UserError, UserResult};

/// Storage for users. Deletion is soft: deleted users stay stored but are invisible.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user and return it with its assigned id.
    async fn create(&self, user: User) -> UserResult<User>;

    async fn find_by_id(&self, id: u64) -> UserResult<User>;

    async fn find_by_username(&self, username: &str) -> UserResult<User>;

    /// Users whose username or email contains `keyword`, ordered by id, with the
    /// total number of matches before paging.
    async fn list(&self, offset: u64, limit: u64, keyword: &str) -> UserResult<(Vec<User>, u64)>;

    /// Replace a stored user.
    async fn update(&self, user: User) -> UserResult<User>;

    async fn delete(&self, id: u64) -> UserResult<()>;

    /// Number of live users.
    async fn count(&self) -> UserResult<u64>;

    /// Whether the storage backend is reachable.
    async fn health_check(&self) -> bool {
        true
    }
}

/// Process-local repository backed by concurrent maps.
#[derive(Debug)]
pub struct InMemoryUserRepository {
    users: DashMap<u64, User>,
    usernames: DashMap<String, u64>,
    next_id: AtomicU64,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            usernames: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    fn live(&self, id: u64) -> UserResult<User> {
        self.users
            .get(&id)
            .map(|r| r.value().clone())
            .filter(|user| !user.is_deleted())
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, mut user: User) -> UserResult<User> {
        match self.usernames.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(UserError::UsernameTaken(user.username)),
            Entry::Vacant(slot) => {
                user.id = self.next_id.fetch_add(1, Ordering::SeqCst);
                slot.insert(user.id);
                self.users.insert(user.id, user.clone());
                Ok(user)
            }
        }
    }

    async fn find_by_id(&self, id: u64) -> UserResult<User> {
        self.live(id)
    }

    async fn find_by_username(&self, username: &str) -> UserResult<User> {
        let id = self
            .usernames
            .get(username)
            .map(|r| *r.value())
            .ok_or_else(|| UserError::NotFound(username.to_string()))?;
        self.live(id)
    }

    async fn list(&self, offset: u64, limit: u64, keyword: &str) -> UserResult<(Vec<User>, u64)> {
        let mut matches: Vec<User> = self
            .users
            .iter()
            .map(|r| r.value().clone())
            .filter(|user| !user.is_deleted())
            .filter(|user| {
                keyword.is_empty() || user.username.contains(keyword) || user.email.contains(keyword)
            })
            .collect();
        matches.sort_by_key(|user| user.id);

        let total = matches.len() as u64;
        let page = matches
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect();
        Ok((page, total))
    }

    async fn update(&self, mut user: User) -> UserResult<User> {
        let mut stored = self
            .users
            .get_mut(&user.id)
            .filter(|r| !r.value().is_deleted())
            .ok_or_else(|| UserError::NotFound(user.id.to_string()))?;
        user.updated_at = Local::now();
        *stored = user.clone();
        Ok(user)
    }

    async fn delete(&self, id: u64) -> UserResult<()> {
        let username = {
            let mut stored = self
                .users
                .get_mut(&id)
                .filter(|r| !r.value().is_deleted())
                .ok_or_else(|| UserError::NotFound(id.to_string()))?;
            let now = Local::now();
            stored.deleted_at = Some(now);
            stored.updated_at = now;
            stored.username.clone()
        };
        self.usernames.remove_if(&username, |_, owner| *owner == id);
        Ok(())
    }

    async fn count(&self) -> UserResult<u64> {
        Ok(self.users.iter().filter(|r| !r.value().is_deleted()).count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> InMemoryUserRepository {
        let repo = InMemoryUserRepository::new();
        for (name, email) in [
            ("alice", "alice@example.com"),
            ("bob", "bob@corp.example"),
            ("carol", "carol@example.com"),
        ] {
            repo.create(User::new(name, "pw", email)).await.unwrap();
        }
        repo
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let repo = seeded().await;
        assert_eq!(repo.find_by_username("alice").await.unwrap().id, 1);
        assert_eq!(repo.find_by_username("carol").await.unwrap().id, 3);
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let repo = seeded().await;
        let err = repo.create(User::new("bob", "pw", "other@example.com")).await.unwrap_err();
        assert_eq!(err, UserError::UsernameTaken("bob".to_string()));
    }

    #[tokio::test]
    async fn test_list_filters_and_pages() {
        let repo = seeded().await;

        let (page, total) = repo.list(0, 2, "").await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(page.iter().map(|u| u.id).collect::<Vec<_>>(), vec![1, 2]);

        let (page, total) = repo.list(2, 2, "").await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(page.len(), 1);

        let (page, total) = repo.list(0, 10, "example.com").await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(page[1].username, "carol");

        let (_, total) = repo.list(0, 10, "bo").await.unwrap();
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let repo = InMemoryUserRepository::new();
        let mut ghost = User::new("ghost", "pw", "ghost@example.com");
        ghost.id = 42;
        assert_eq!(
            repo.update(ghost).await.unwrap_err(),
            UserError::NotFound("42".to_string())
        );
    }

    #[tokio::test]
    async fn test_delete_is_soft_and_frees_username() {
        let repo = seeded().await;
        repo.delete(2).await.unwrap();

        assert!(matches!(repo.find_by_id(2).await, Err(UserError::NotFound(_))));
        assert!(matches!(repo.delete(2).await, Err(UserError::NotFound(_))));
        assert_eq!(repo.count().await.unwrap(), 2);
        assert!(repo.users.get(&2).unwrap().is_deleted());

        let again = repo.create(User::new("bob", "pw", "bob@example.com")).await.unwrap();
        assert_eq!(again.id, 4);
    }
}
