use std::sync::Arc;

use db::DbService;
use services::services::{activity::ActivityRecorder, auth::JwtService, notify::Notifier};
use sqlx::SqlitePool;

pub mod auth;
pub mod config;
pub mod error;
pub mod file_logging;
pub mod routes;

use config::Config;

#[derive(Clone)]
pub struct AppState {
    db: DbService,
    config: Arc<Config>,
    jwt: Arc<JwtService>,
    activity: ActivityRecorder,
    notifier: Notifier,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db = DbService::new(&config.database_path).await?;
        let jwt = JwtService::new(
            &config.jwt_secret,
            &config.jwt_algorithm,
            config.access_token_expiry_minutes,
        )?;
        let activity = ActivityRecorder::new(db.pool.clone());
        let notifier = Notifier::new(db.pool.clone());

        Ok(Self {
            db,
            config: Arc::new(config),
            jwt: Arc::new(jwt),
            activity,
            notifier,
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db.pool
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn jwt(&self) -> Arc<JwtService> {
        Arc::clone(&self.jwt)
    }

    pub fn activity(&self) -> &ActivityRecorder {
        &self.activity
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }
}
