use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    /// PostgreSQL connection URL for the account/ledger store.
    /// Overridden by the DATABASE_URL environment variable when set.
    #[serde(default)]
    pub postgres_url: Option<String>,
    #[serde(default)]
    pub notification: NotificationConfig,
    #[serde(default)]
    pub settlement: SettlementConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

/// Customer notification delivery. Without a webhook URL, notices are
/// logged and dropped.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NotificationConfig {
    pub webhook_url: Option<String>,
    pub sender_name: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            sender_name: "Online Banking System".to_string(),
        }
    }
}

/// Settlement callback endpoint protection (X-Internal-Secret header).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SettlementConfig {
    pub internal_secret: String,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            internal_secret: "dev-secret".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .unwrap_or_else(|_| panic!("Failed to read config file: {}", config_path));
        serde_yaml::from_str(&content).expect("Failed to parse config yaml")
    }

    /// Resolved store DSN: DATABASE_URL wins over the config file.
    pub fn database_url(&self) -> Option<String> {
        std::env::var("DATABASE_URL")
            .ok()
            .or_else(|| self.postgres_url.clone())
    }
}
