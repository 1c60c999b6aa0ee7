use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::jwt::JwtKeys;
use crate::config::AppConfig;
use crate::store::{BlogStore, MemoryStore, PgStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BlogStore>,
    pub keys: JwtKeys,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let store: Arc<dyn BlogStore> = match &config.database_url {
            Some(url) => {
                let pg = PgStore::connect(url).await?;
                pg.migrate().await?;
                info!("connected to postgres");
                Arc::new(pg)
            }
            None => {
                warn!("DATABASE_URL not set; using in-memory store, data is lost on exit");
                Arc::new(MemoryStore::new())
            }
        };

        Ok(Self::from_parts(store, config))
    }

    pub fn from_parts(store: Arc<dyn BlogStore>, config: AppConfig) -> Self {
        Self {
            store,
            keys: JwtKeys::new(&config.jwt),
            config: Arc::new(config),
        }
    }
}

#[cfg(test)]
impl AppState {
    pub fn fake() -> Self {
        Self::fake_with_store(Arc::new(MemoryStore::new()))
    }

    pub fn fake_with_store(store: Arc<dyn BlogStore>) -> Self {
        let config = AppConfig {
            database_url: None,
            jwt: crate::config::JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                ttl_minutes: None,
            },
            host: "127.0.0.1".into(),
            port: 0,
            enable_testing_routes: true,
        };
        Self::from_parts(store, config)
    }
}
