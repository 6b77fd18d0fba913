use std::path::PathBuf;

/// Root directory for runtime assets (database, logs, uploads).
///
/// Resolution order: `TB_ASSET_DIR`, then `~/.taskboard`, then the current
/// directory as a last resort.
pub fn asset_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TB_ASSET_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .map(|home| home.join(".taskboard"))
        .unwrap_or_else(|| PathBuf::from(".taskboard"))
}

/// Path of the SQLite database file, overridable via `TB_DATABASE_PATH`.
pub fn database_path() -> PathBuf {
    std::env::var("TB_DATABASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| asset_dir().join("taskboard.db"))
}
