//! Configuration
//!
//! Service configuration loaded from environment variables. Every variable
//! has a default; notably the API token defaults to empty and is NOT
//! validated at startup - a missing token surfaces as provider-side
//! authentication failures on the first sync cycle instead.

/// Default change-notification delivery URL.
const DEFAULT_NOTIFICATION_URL: &str = "https://smee.io/2mxhU4Pb2YrNvF8E";

/// Default provider base name.
const DEFAULT_BASE_NAME: &str = "Purrfect Creations";

/// Default table to mirror.
const DEFAULT_TABLE_NAME: &str = "Orders";

/// Default view records are fetched from.
const DEFAULT_VIEW_NAME: &str = "Grid view";

/// Default HTTP listen port.
const DEFAULT_HTTP_PORT: u16 = 3000;

/// Complete service configuration.
///
/// # Environment Variables
///
/// - `AIRTABLE_API_TOKEN`: provider API token (default: empty)
/// - `SMEE_URL`: webhook delivery URL (default: a shared smee.io channel)
/// - `BASE_NAME`: provider base name (default: "Purrfect Creations")
/// - `TABLE_NAME`: table to mirror (default: "Orders")
/// - `VIEW_NAME`: view to fetch from (default: "Grid view")
/// - `HTTP_PORT`: HTTP listen port (default: 3000)
#[derive(Clone)]
pub struct AppConfig {
    /// Provider API token.
    pub api_token: String,
    /// URL the provider delivers change notifications to.
    pub notification_url: String,
    /// Provider base name, resolved to an id at startup.
    pub base_name: String,
    /// Table to mirror.
    pub table_name: String,
    /// View records are fetched from.
    pub view_name: String,
    /// HTTP listen port.
    pub http_port: u16,
}

impl AppConfig {
    /// Load configuration from environment variables, falling back to the
    /// documented defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_token: env_or("AIRTABLE_API_TOKEN", defaults.api_token),
            notification_url: env_or("SMEE_URL", defaults.notification_url),
            base_name: env_or("BASE_NAME", defaults.base_name),
            table_name: env_or("TABLE_NAME", defaults.table_name),
            view_name: env_or("VIEW_NAME", defaults.view_name),
            http_port: parse_env_u16("HTTP_PORT", defaults.http_port),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            notification_url: DEFAULT_NOTIFICATION_URL.to_string(),
            base_name: DEFAULT_BASE_NAME.to_string(),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            view_name: DEFAULT_VIEW_NAME.to_string(),
            http_port: DEFAULT_HTTP_PORT,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_token", &"[REDACTED]")
            .field("notification_url", &self.notification_url)
            .field("base_name", &self.base_name)
            .field("table_name", &self.table_name)
            .field("view_name", &self.view_name)
            .field("http_port", &self.http_port)
            .finish()
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

fn parse_env_u16(key: &str, default: u16) -> u16 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.api_token, "");
        assert_eq!(config.notification_url, DEFAULT_NOTIFICATION_URL);
        assert_eq!(config.base_name, "Purrfect Creations");
        assert_eq!(config.table_name, "Orders");
        assert_eq!(config.view_name, "Grid view");
        assert_eq!(config.http_port, 3000);
    }

    #[test]
    fn token_is_redacted_in_debug() {
        let config = AppConfig {
            api_token: "pat-secret-123".to_string(),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("pat-secret-123"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn parse_env_u16_falls_back_on_garbage() {
        // The variable is unset in tests, so the default applies.
        assert_eq!(parse_env_u16("ORDER_HUB_UNSET_PORT_FOR_TEST", 1234), 1234);
    }
}
