//! CLI command implementations.

pub mod config;
pub mod measure;
pub mod probes;
pub mod results;

use atlas_api::AtlasClient;
use atlas_core::config::AppConfig;
use atlas_core::error::AtlasResult;

/// Helper to create an API client from config.
pub fn create_api_client(config: &AppConfig) -> AtlasResult<AtlasClient> {
    AtlasClient::new(&config.api)
}

/// Print a JSON value, pretty-printed.
pub fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

/// Truncate a string to a maximum number of characters, appending an
/// ellipsis if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    } else {
        s.chars().take(max_len).collect()
    }
}

/// Mask all but the last four characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count == 0 {
        return "(unset)".to_string();
    }
    let visible: String = secret.chars().skip(count.saturating_sub(4)).collect();
    format!("{}{visible}", "*".repeat(count.saturating_sub(4)))
}
