use std::path::PathBuf;

/// Server configuration
///
/// Every field can be overridden through an environment variable:
///
/// | Variable             | Default               | Meaning                          |
/// |----------------------|-----------------------|----------------------------------|
/// | WORK_DIR             | /var/lib/souq/server  | Work directory (database, logs)  |
/// | HTTP_PORT            | 3000                  | HTTP API port                    |
/// | ENVIRONMENT          | development           | development \| staging \| production |
/// | CANCEL_WINDOW_SECS   | 60                    | Customer cancellation window     |
/// | FEED_CAPACITY        | 256                   | Order feed channel capacity      |
#[derive(Debug, Clone)]
pub struct Config {
    /// Work directory holding the database and log files
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// Seconds after creation during which the customer may cancel a
    /// pending order. A policy parameter, not a hard-coded rule.
    pub cancel_window_secs: i64,
    /// Broadcast capacity of the order feed channels
    pub feed_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/souq/server".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            cancel_window_secs: std::env::var("CANCEL_WINDOW_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            feed_capacity: std::env::var("FEED_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(256),
        }
    }

    /// Override work dir and port; used by tests.
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// Directory holding the embedded database files.
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// Ensure the work directory structure exists.
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(PathBuf::from(&self.work_dir).join("logs"))?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
