use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::users::repo_types::{NewUser, User};

pub type StoreResult<T> = Result<T, sqlx::Error>;

/// Storage operations on the user collection. Handlers reach the database only
/// through this trait, held in `AppState`.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user; the store assigns the id.
    async fn create(&self, user: &NewUser) -> StoreResult<User>;
    /// All users, in whatever order the backend yields them.
    async fn find(&self) -> StoreResult<Vec<User>>;
    async fn find_one(&self, id: Uuid) -> StoreResult<Option<User>>;
    /// Replace all three fields. `None` when no user has this id.
    async fn update_by_id(&self, id: Uuid, user: &NewUser) -> StoreResult<Option<User>>;
    /// `true` when a user was removed.
    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: &NewUser) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password
            "#,
        )
        .bind(user.name())
        .bind(user.email())
        .bind(user.password())
        .fetch_one(&self.db)
        .await
    }

    async fn find(&self) -> StoreResult<Vec<User>> {
        sqlx::query_as::<_, User>(r#"SELECT id, name, email, password FROM users"#)
            .fetch_all(&self.db)
            .await
    }

    async fn find_one(&self, id: Uuid) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"SELECT id, name, email, password FROM users WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
    }

    async fn update_by_id(&self, id: Uuid, user: &NewUser) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $2, email = $3, password = $4
            WHERE id = $1
            RETURNING id, name, email, password
            "#,
        )
        .bind(id)
        .bind(user.name())
        .bind(user.email())
        .bind(user.password())
        .fetch_optional(&self.db)
        .await
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool> {
        let res = sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
