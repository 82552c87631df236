//! Default value functions used by serde for config deserialization.

pub fn default_name() -> String {
    "suitcast".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

pub fn default_send_timeout_secs() -> u64 {
    10
}

pub fn default_poll_timeout_secs() -> u64 {
    30
}

pub fn default_max_destinations() -> usize {
    5
}

pub fn default_webhook_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_webhook_port() -> u16 {
    10000
}
