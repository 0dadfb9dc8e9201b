use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
    /// Insert a demo edition with categories on startup when the database is empty.
    pub seed_demo: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Account with this email is granted the admin role on sign-up and sign-in.
    pub owner_email: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaymentsConfig {
    /// Provider secret key. Unset means checkout for paid categories is disabled.
    pub secret_key: Option<String>,
    pub api_base: String,
    /// ISO 4217 currency code for checkout line items.
    pub currency: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotifyConfig {
    /// Relay form id. Unset means notifications are logged and dropped.
    pub form_id: Option<String>,
    pub endpoint: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub payments: PaymentsConfig,
    pub notify: NotifyConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("server.seed_demo", false)?
            .set_default("payments.api_base", "https://api.stripe.com")?
            .set_default("payments.currency", "eur")?
            .set_default("payments.timeout_secs", 10)?
            .set_default("notify.endpoint", "https://formspree.io/f")?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., FINISHLINE__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("FINISHLINE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
