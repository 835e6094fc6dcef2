use anyhow::Result;
use serde::Deserialize;
use anyhow::{anyhow, Context};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8000, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
    #[serde(default = "default_true")]
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
            auto_migrate: true,
        }
    }
}

fn default_max_connections() -> u32 { 100 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_true() -> bool { true }

/// Name and version reported by the root endpoint of a service.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ServiceConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
}

impl ServiceConfig {
    /// Fill blank fields with the caller's defaults.
    pub fn with_defaults(mut self, name: &str, version: &str) -> Self {
        if self.name.trim().is_empty() { self.name = name.to_string(); }
        if self.version.trim().is_empty() { self.version = version.to_string(); }
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_admin_title")]
    pub title: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_openapi_ttl")]
    pub openapi_cache_ttl_secs: u64,
    #[serde(default = "default_service_b_url")]
    pub service_b_url: String,
    #[serde(default)]
    pub game_service: Option<GameServiceConfig>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            title: default_admin_title(),
            request_timeout_secs: default_request_timeout(),
            openapi_cache_ttl_secs: default_openapi_ttl(),
            service_b_url: default_service_b_url(),
            game_service: None,
        }
    }
}

/// Game service reached through the API gateway; its admin endpoints require a bearer token.
#[derive(Debug, Clone, Deserialize)]
pub struct GameServiceConfig {
    pub gateway_url: String,
    pub game_service_path: String,
}

fn default_admin_title() -> String { "Quiz Admin Panel".into() }
fn default_request_timeout() -> u64 { 10 }
fn default_openapi_ttl() -> u64 { 300 }
fn default_service_b_url() -> String { "http://service-b-core:8000".into() }

fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

/// `Ok(None)` only when the file does not exist; unreadable or malformed files are errors.
pub fn load_optional_file(path: &str) -> Result<Option<AppConfig>> {
    match std::fs::read_to_string(path) {
        Ok(content) => load_from_str(&content).map(Some).with_context(|| format!("invalid config file {path}")),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(anyhow::Error::new(e).context(format!("cannot read config file {path}"))),
    }
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Config file when present, otherwise environment variables only.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let mut cfg = match load_optional_file(path)? {
            Some(cfg) => cfg,
            None => Self::from_env(),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn from_env() -> Self {
        let mut cfg = AppConfig::default();
        if let Ok(host) = std::env::var("SERVER_HOST") { cfg.server.host = host; }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = port;
        }
        cfg.server.worker_threads = std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok());
        if let Ok(name) = std::env::var("SERVICE_NAME") { cfg.service.name = name; }
        if let Ok(version) = std::env::var("SERVICE_VERSION") { cfg.service.version = version; }
        if let Ok(url) = std::env::var("SERVICE_B_URL") { cfg.admin.service_b_url = url; }
        if let (Ok(gateway_url), Ok(game_service_path)) = (std::env::var("API_GATEWAY_URL"), std::env::var("GAME_SERVICE_PATH")) {
            cfg.admin.game_service = Some(GameServiceConfig { gateway_url, game_service_path });
        }
        cfg
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        self.admin.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl DatabaseConfig {
    /// Fill the URL from `DATABASE_URL`, or from the `POSTGRES_*` variables, when the
    /// TOML leaves it empty.
    pub fn normalize_from_env(&mut self) {
        if !self.url.trim().is_empty() {
            return;
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.url = url;
            return;
        }
        let parts = ["POSTGRES_USER", "POSTGRES_PASSWORD", "POSTGRES_HOST", "POSTGRES_PORT", "POSTGRES_DB"]
            .map(|k| std::env::var(k).ok());
        if let [Some(user), Some(password), Some(host), Some(port), Some(db)] = parts {
            self.url = format!("postgresql://{user}:{password}@{host}:{port}/{db}");
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://") || lower.starts_with("sqlite:")) {
            return Err(anyhow!("database.url must start with postgresql://, postgres:// or sqlite:"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }

    /// Single-connection in-memory SQLite, used by tests.
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".into(),
            max_connections: 1,
            min_connections: 1,
            ..Self::default()
        }
    }
}

impl AdminConfig {
    fn validate(&self) -> Result<()> {
        if !(self.service_b_url.starts_with("http://") || self.service_b_url.starts_with("https://")) {
            return Err(anyhow!("admin.service_b_url must start with http(s)://"));
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("admin.request_timeout_secs must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_toml() {
        let cfg = load_from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8001

            [database]
            url = "postgres://u:p@db:5432/library"
            max_connections = 20

            [service]
            name = "Service B"

            [admin]
            title = "Admin"
            service_b_url = "http://localhost:8001"

            [admin.game_service]
            gateway_url = "http://gateway"
            game_service_path = "/game/"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 8001);
        assert_eq!(cfg.database.max_connections, 20);
        assert_eq!(cfg.database.min_connections, 2);
        assert!(cfg.database.auto_migrate);
        assert_eq!(cfg.service.name, "Service B");
        assert!(cfg.service.version.is_empty());
        assert_eq!(cfg.admin.game_service.unwrap().game_service_path, "/game/");
    }

    #[test]
    fn validate_rejects_unknown_scheme() {
        let mut db = DatabaseConfig { url: "mysql://x".into(), ..DatabaseConfig::default() };
        assert!(db.validate().is_err());
        db.url = "sqlite::memory:".into();
        assert!(db.validate().is_ok());
    }

    #[test]
    fn validate_rejects_inverted_pool_bounds() {
        let db = DatabaseConfig { url: "postgres://x".into(), max_connections: 1, min_connections: 2, ..DatabaseConfig::default() };
        assert!(db.validate().is_err());
    }

    #[test]
    fn server_normalize_fills_defaults() {
        let mut s = ServerConfig { host: " ".into(), port: 9000, worker_threads: Some(0) };
        s.normalize().unwrap();
        assert_eq!(s.host, "127.0.0.1");
        assert_eq!(s.worker_threads, Some(4));
    }

    #[test]
    fn service_defaults_only_fill_blanks() {
        let s = ServiceConfig { name: "Custom".into(), version: String::new() }.with_defaults("Service A", "1.2.3");
        assert_eq!(s.name, "Custom");
        assert_eq!(s.version, "1.2.3");
    }

    fn temp_config(name: &str, content: &str) -> String {
        let path = std::env::temp_dir().join(format!("library-admin-{}-{name}.toml", std::process::id()));
        std::fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn malformed_config_file_is_an_error() {
        let path = temp_config("broken", "[server\nport = ");
        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("invalid config file"));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_config_file_falls_back_to_env() {
        let path = std::env::temp_dir().join("library-admin-does-not-exist.toml");
        assert!(load_optional_file(&path.to_string_lossy()).unwrap().is_none());
    }

    #[test]
    fn present_config_file_is_loaded() {
        let path = temp_config("valid", "[server]\nhost = \"0.0.0.0\"\nport = 8123\n[database]\nurl = \"sqlite::memory:\"\n");
        let cfg = AppConfig::load_from(&path).unwrap();
        assert_eq!(cfg.server.port, 8123);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn admin_requires_http_service_url() {
        let admin = AdminConfig { service_b_url: "service-b:8000".into(), ..AdminConfig::default() };
        assert!(admin.validate().is_err());
    }
}
