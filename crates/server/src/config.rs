//! Server configuration from environment variables.
//!
//! All variables carry the `TB_` prefix; `.env` files are loaded by the
//! binary before this runs. Every value has a development default.

use std::path::PathBuf;

use utils::assets::{asset_dir, database_path};

/// Default cap on uploaded file size (10 MiB).
const DEFAULT_MAX_UPLOAD_SIZE: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    /// HS256, HS384 or HS512.
    pub jwt_algorithm: String,
    pub access_token_expiry_minutes: i64,
    pub refresh_token_expiry_days: i64,
    /// CORS allowlist; empty means permissive.
    pub allowed_origins: Vec<String>,
    pub upload_dir: PathBuf,
    pub max_upload_size: u64,
    pub default_page_size: i64,
    pub max_page_size: i64,
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        let allowed_origins = std::env::var("TB_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            database_path: database_path(),
            host: env_or("TB_HOST", "127.0.0.1".to_string()),
            port: env_or("TB_PORT", 8000),
            jwt_secret: std::env::var("TB_JWT_SECRET")
                .unwrap_or_else(|_| "change-me-in-production-min-32-chars!!".to_string()),
            jwt_algorithm: env_or("TB_JWT_ALGORITHM", "HS256".to_string()),
            access_token_expiry_minutes: env_or("TB_ACCESS_TOKEN_EXPIRY_MINUTES", 15),
            refresh_token_expiry_days: env_or("TB_REFRESH_TOKEN_EXPIRY_DAYS", 7),
            allowed_origins,
            upload_dir: std::env::var("TB_UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| asset_dir().join("uploads")),
            max_upload_size: env_or("TB_MAX_UPLOAD_SIZE", DEFAULT_MAX_UPLOAD_SIZE),
            default_page_size: env_or("TB_DEFAULT_PAGE_SIZE", 50),
            max_page_size: env_or("TB_MAX_PAGE_SIZE", 100),
        }
    }

    /// Clamp pagination params: missing limit falls back to the default page
    /// size, oversized limits are capped.
    pub fn page_window(&self, skip: Option<i64>, limit: Option<i64>) -> (i64, i64) {
        let offset = skip.unwrap_or(0).max(0);
        let limit = limit
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size);
        (offset, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_env();
        assert_eq!(config.jwt_algorithm, "HS256");
        assert_eq!(config.access_token_expiry_minutes, 15);
        assert_eq!(config.refresh_token_expiry_days, 7);
        assert_eq!(config.default_page_size, 50);
        assert_eq!(config.max_page_size, 100);
        assert_eq!(config.max_upload_size, DEFAULT_MAX_UPLOAD_SIZE);
    }

    #[test]
    fn test_page_window_clamps() {
        let config = Config::from_env();
        assert_eq!(config.page_window(None, None), (0, 50));
        assert_eq!(config.page_window(Some(20), Some(10)), (20, 10));
        assert_eq!(config.page_window(Some(-5), Some(10_000)), (0, 100));
        assert_eq!(config.page_window(None, Some(0)), (0, 1));
    }

    #[test]
    fn test_origin_list_parsing() {
        unsafe {
            std::env::set_var(
                "TB_ALLOWED_ORIGINS",
                "http://localhost:3000, http://localhost:5173 ,",
            )
        };
        let config = Config::from_env();
        assert_eq!(
            config.allowed_origins,
            vec!["http://localhost:3000", "http://localhost:5173"]
        );
        unsafe { std::env::remove_var("TB_ALLOWED_ORIGINS") };
    }
}
