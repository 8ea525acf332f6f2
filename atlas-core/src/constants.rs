//! Client-wide constants.

/// Identifier used as the first component of the User-Agent header.
pub const CLIENT_ID: &str = "atlas-rs";

/// Client version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Public RIPE Atlas REST API root.
pub const DEFAULT_BASE_URL: &str = "https://atlas.ripe.net/api/v2";

/// Default per-request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Page size for probe listings, and batch size for id lookups.
pub const PAGE_SIZE: usize = 40;

/// Default end of a result window (unix seconds).
pub const RESULTS_STOP_MAX: i64 = 9_999_999_999;

/// Directory name under the platform config dir.
pub const CONFIG_DIR_NAME: &str = "ripe-atlas";

/// Build the User-Agent header value for a named client.
pub fn user_agent(client_name: &str) -> String {
    format!("{CLIENT_ID}/{APP_VERSION}/{client_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_includes_name() {
        let ua = user_agent("monitoring");
        assert!(ua.starts_with("atlas-rs/"));
        assert!(ua.ends_with("/monitoring"));
    }
}
