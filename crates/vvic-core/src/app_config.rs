use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub vvic_app_id: String,
    pub vvic_app_secret: String,
    pub vvic_endpoint: String,
    pub vvic_lang: String,
    /// Flat file receiving `item_vid` + raw body for rejected detail requests.
    pub failure_log_path: PathBuf,
    pub ids_url: String,
    pub index_queue: String,
    pub default_region: i32,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub http_timeout_secs: u64,
    pub queue_connect_timeout_secs: u64,
    pub worker_poll_interval_ms: u64,
    pub notify_max_retries: u32,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("vvic_app_id", &self.vvic_app_id)
            .field("vvic_app_secret", &"[redacted]")
            .field("vvic_endpoint", &self.vvic_endpoint)
            .field("vvic_lang", &self.vvic_lang)
            .field("failure_log_path", &self.failure_log_path)
            .field("ids_url", &self.ids_url)
            .field("index_queue", &self.index_queue)
            .field("default_region", &self.default_region)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field(
                "queue_connect_timeout_secs",
                &self.queue_connect_timeout_secs,
            )
            .field("worker_poll_interval_ms", &self.worker_poll_interval_ms)
            .field("notify_max_retries", &self.notify_max_retries)
            .finish()
    }
}
