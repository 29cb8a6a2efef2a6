//! Project-wide constants.

use std::path::PathBuf;
use std::time::Duration;

/// Host suffix of the regional text-analytics endpoint.
pub const TEXT_ANALYTICS_HOST_SUFFIX: &str = "api.cognitive.microsoft.com";

/// Entity recognition route on the text-analytics endpoint.
pub const ENTITIES_PATH: &str = "/text/analytics/v2.1-preview/entities";

/// Header carrying the subscription key.
pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Default store key for results when none is configured.
pub const DEFAULT_RESULT_KEY: &str = "httprequest";

/// Default upper bound on a single outbound exchange.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment fallbacks for the text-analytics connection.
pub const KEY_ENV_VAR: &str = "TEXT_ANALYTICS_KEY";
pub const REGION_ENV_VAR: &str = "TEXT_ANALYTICS_REGION";

/// Context keys the webchat reads avatar overrides from.
pub const BOT_AVATAR_KEY: &str = "botAvatarOverrideUrl";
pub const USER_AVATAR_KEY: &str = "userAvatarOverrideUrl";

/// Default database path: `~/.extnodes/extnodes.db`.
/// Single DB for connections and config.
pub fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".extnodes")
        .join("extnodes.db")
}

/// Regional endpoint host, e.g. `westeurope.api.cognitive.microsoft.com`.
pub fn text_analytics_host(region: &str) -> String {
    format!("{}.{}", region.trim(), TEXT_ANALYTICS_HOST_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_is_built_from_region() {
        assert_eq!(
            text_analytics_host("westeurope"),
            "westeurope.api.cognitive.microsoft.com"
        );
    }

    #[test]
    fn host_trims_region_whitespace() {
        assert_eq!(
            text_analytics_host(" eastus "),
            "eastus.api.cognitive.microsoft.com"
        );
    }

    #[test]
    fn default_db_path_ends_with_file_name() {
        let path = default_db_path();
        assert!(path.ends_with(".extnodes/extnodes.db"));
    }

    #[test]
    fn entities_path_is_absolute() {
        assert!(ENTITIES_PATH.starts_with('/'));
    }
}
