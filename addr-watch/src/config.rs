use serde::{Deserialize, Serialize};
use std::path::Path;
use watch_util::{
    BLOCKCHAIN_INFO_API_URL, CONFIG_FILE_NAME, HISTORY_PAGE_LIMIT, NEXMO_API_KEY_ENV,
    NEXMO_API_SECRET_ENV, VONAGE_SMS_API_URL,
};

fn default_interval_secs() -> u64 {
    60
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default)]
    pub address: String,

    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    // Stop after this many polls without a match, unbounded if not set
    #[serde(default)]
    pub max_cycles: Option<u64>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            interval_secs: default_interval_secs(),
            max_cycles: None,
        }
    }
}

fn default_feed_base_url() -> String {
    BLOCKCHAIN_INFO_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_history_limit() -> u32 {
    HISTORY_PAGE_LIMIT
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_feed_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_history_limit")]
    pub history_limit: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_feed_base_url(),
            timeout_secs: default_timeout_secs(),
            history_limit: default_history_limit(),
        }
    }
}

fn default_sms_api_url() -> String {
    VONAGE_SMS_API_URL.to_string()
}

fn default_sms_from() -> String {
    "AddrWatch".to_string()
}

fn default_sms_text() -> String {
    "BTC was sent from the watched address".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmsConfig {
    #[serde(default = "default_sms_api_url")]
    pub api_url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub api_secret: String,

    #[serde(default = "default_sms_from")]
    pub from: String,

    #[serde(default)]
    pub to: String,

    #[serde(default = "default_sms_text")]
    pub text: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            api_url: default_sms_api_url(),
            api_key: String::new(),
            api_secret: String::new(),
            from: default_sms_from(),
            to: String::new(),
            text: default_sms_text(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AddrWatchConfig {
    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub feed: FeedConfig,

    #[serde(default)]
    pub sms: SmsConfig,
}

impl AddrWatchConfig {
    pub fn load(root_dir: &Path) -> Result<Self, String> {
        let path = root_dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            let default_config = AddrWatchConfig::default();
            info!(
                "Config file {} does not exist. Using default configuration.",
                path.display()
            );
            if let Ok(s) = toml::to_string_pretty(&default_config) {
                info!("Default config: {}", s);
            }
            Ok(default_config)
        } else {
            info!("Loading config from {}", path.display());
            let config_data = std::fs::read_to_string(&path).map_err(|e| {
                let msg = format!("Failed to read config file {}: {}", path.display(), e);
                error!("{}", msg);
                msg
            })?;

            let config: AddrWatchConfig = toml::from_str(&config_data).map_err(|e| {
                let msg = format!("Failed to parse config file {}: {}", path.display(), e);
                error!("{}", msg);
                msg
            })?;

            Ok(config)
        }
    }

    /// Fills empty provider credentials through `lookup`, keyed by the
    /// NEXMO_* variable names. Values already in the config win.
    pub fn fill_credentials_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.sms.api_key.is_empty() {
            if let Some(key) = lookup(NEXMO_API_KEY_ENV) {
                debug!("Using SMS api key from {}", NEXMO_API_KEY_ENV);
                self.sms.api_key = key;
            }
        }

        if self.sms.api_secret.is_empty() {
            if let Some(secret) = lookup(NEXMO_API_SECRET_ENV) {
                debug!("Using SMS api secret from {}", NEXMO_API_SECRET_ENV);
                self.sms.api_secret = secret;
            }
        }
    }

    // Checked before the watch loop starts
    pub fn validate_watch(&self) -> Result<(), String> {
        if self.watch.address.trim().is_empty() {
            let msg = "No watch address configured".to_string();
            error!("{}", msg);
            return Err(msg);
        }

        if self.watch.interval_secs == 0 {
            let msg = "Polling interval must be at least one second".to_string();
            error!("{}", msg);
            return Err(msg);
        }

        if self.sms.to.trim().is_empty() {
            let msg = "No notification recipient configured".to_string();
            error!("{}", msg);
            return Err(msg);
        }

        Ok(())
    }
}
