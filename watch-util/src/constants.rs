// Service names
pub const ADDR_WATCH_SERVICE_NAME: &str = "addr-watch";

// Directory constants
pub const ADDR_WATCH_ROOT_DIR: &str = ".addrwatch";
pub const CONFIG_FILE_NAME: &str = "config.toml";

// Data provider
pub const BLOCKCHAIN_INFO_API_URL: &str = "https://blockchain.info";
pub const HISTORY_PAGE_LIMIT: u32 = 500;

// Messaging provider
pub const VONAGE_SMS_API_URL: &str = "https://rest.nexmo.com/sms/json";
pub const NEXMO_API_KEY_ENV: &str = "NEXMO_API_KEY";
pub const NEXMO_API_SECRET_ENV: &str = "NEXMO_API_SECRET";
