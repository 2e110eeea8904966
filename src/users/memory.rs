use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::users::repo::{StoreResult, UserStore};
use crate::users::repo_types::{NewUser, User};

/// In-process user collection. Keeps insertion order; never fails.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: &NewUser) -> StoreResult<User> {
        let user = user.clone().into_user(Uuid::new_v4());
        self.users.write().await.push(user.clone());
        Ok(user)
    }

    async fn find(&self) -> StoreResult<Vec<User>> {
        Ok(self.users.read().await.clone())
    }

    async fn find_one(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn update_by_id(&self, id: Uuid, user: &NewUser) -> StoreResult<Option<User>> {
        let mut users = self.users.write().await;
        let Some(slot) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        *slot = user.clone().into_user(id);
        Ok(Some(slot.clone()))
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str) -> NewUser {
        NewUser::new(
            Some(name.to_string()),
            Some(format!("{name}@example.com")),
            Some("password".to_string()),
        )
        .expect("valid user")
    }

    #[tokio::test]
    async fn create_assigns_distinct_ids() {
        let store = MemoryUserStore::new();
        let a = store.create(&new_user("ann")).await.unwrap();
        let b = store.create(&new_user("bob")).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.find().await.unwrap(), vec![a.clone(), b]);
        assert_eq!(store.find_one(a.id).await.unwrap(), Some(a));
    }

    #[tokio::test]
    async fn update_replaces_fields_and_keeps_id() {
        let store = MemoryUserStore::new();
        let a = store.create(&new_user("ann")).await.unwrap();
        let updated = store
            .update_by_id(a.id, &new_user("anna"))
            .await
            .unwrap()
            .expect("user exists");
        assert_eq!(updated.id, a.id);
        assert_eq!(updated.name, "anna");
        assert_eq!(updated.email, "anna@example.com");
    }

    #[tokio::test]
    async fn update_of_unknown_id_creates_nothing() {
        let store = MemoryUserStore::new();
        let res = store.update_by_id(Uuid::new_v4(), &new_user("ghost")).await.unwrap();
        assert!(res.is_none());
        assert!(store.find().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_was_removed() {
        let store = MemoryUserStore::new();
        let a = store.create(&new_user("ann")).await.unwrap();
        let b = store.create(&new_user("bob")).await.unwrap();
        assert!(store.delete_by_id(a.id).await.unwrap());
        assert!(!store.delete_by_id(a.id).await.unwrap());
        assert_eq!(store.find().await.unwrap(), vec![b]);
    }
}
