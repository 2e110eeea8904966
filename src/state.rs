use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

use crate::config::{AppConfig, AuthConfig, DatabaseConfig};
use crate::users::{memory::MemoryUserStore, repo::PgUserStore, repo::UserStore};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Connects to the database (with retries) and wires the Postgres-backed store.
    /// Returns the pool too so the caller can run migrations on it.
    pub async fn init(config: AppConfig) -> anyhow::Result<(Self, PgPool)> {
        let db = connect_with_retry(&config.database).await?;
        let users = Arc::new(PgUserStore::new(db.clone())) as Arc<dyn UserStore>;
        Ok((Self::from_parts(users, Arc::new(config)), db))
    }

    pub fn from_parts(users: Arc<dyn UserStore>, config: Arc<AppConfig>) -> Self {
        Self { users, config }
    }

    /// State backed by an empty in-process store, guarded by `api_token`.
    pub fn in_memory(api_token: &str) -> Self {
        let config = AppConfig {
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 1,
                connect_attempts: 1,
                retry_delay: std::time::Duration::ZERO,
                connect_timeout: std::time::Duration::ZERO,
            },
            auth: AuthConfig {
                api_token: api_token.to_string(),
            },
            host: "127.0.0.1".into(),
            port: 0,
        };
        Self::from_parts(Arc::new(MemoryUserStore::new()), Arc::new(config))
    }
}

async fn connect_with_retry(cfg: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let attempts = cfg.connect_attempts.max(1);
    let mut delay = cfg.retry_delay;
    let mut attempt = 1;

    loop {
        let res = PgPoolOptions::new()
            .max_connections(cfg.max_connections)
            .acquire_timeout(cfg.connect_timeout)
            .connect(&cfg.url)
            .await;

        match res {
            Ok(pool) => {
                info!(attempt, "database connected");
                return Ok(pool);
            }
            Err(e) if attempt < attempts => {
                warn!(error = %e, attempt, attempts, retry_in_ms = delay.as_millis() as u64, "database connection failed; retrying");
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2);
                attempt += 1;
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("connect to database after {attempts} attempts"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn unreachable_config() -> AppConfig {
        let mut config = AppConfig::from_lookup(|key| match key {
            "API_TOKEN" => Some("t".into()),
            "DATABASE_URL" => Some("postgres://u:p@127.0.0.1:1/x".into()),
            _ => None,
        })
        .expect("config");
        config.database.connect_attempts = 2;
        config.database.retry_delay = Duration::from_millis(10);
        config.database.connect_timeout = Duration::from_millis(200);
        config
    }

    #[tokio::test]
    async fn init_gives_up_after_configured_attempts() {
        let started = Instant::now();
        let err = match AppState::init(unreachable_config()).await {
            Ok(_) => panic!("connected to an unreachable database"),
            Err(e) => e,
        };
        assert!(
            err.to_string().contains("after 2 attempts"),
            "unexpected error: {err:#}"
        );
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
