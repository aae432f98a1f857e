//! Environment-based configuration.
//!
//! Credentials come from the environment (or a `.env` file), never from the
//! command line, so the token stays out of shell history.

use std::env;

use thiserror::Error;

/// Production API base URL.
pub const DEFAULT_BASE_URL: &str = "https://argus.app.br/apiargus";

/// Environment variable holding the API token.
pub const TOKEN_VAR: &str = "ARGUS_API_TOKEN";

/// Environment variable optionally restricting the run to one campaign.
pub const CAMPAIGN_VAR: &str = "ARGUS_CAMPAIGN_ID";

/// Environment variable overriding the API base URL.
pub const BASE_URL_VAR: &str = "ARGUS_API_BASE_URL";

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The API token is not set (or empty).
    #[error("API token not set: define {TOKEN_VAR} in the environment or .env file")]
    MissingToken,

    /// The campaign id filter is not a valid integer.
    #[error("invalid {CAMPAIGN_VAR} value {value:?}: expected an integer campaign id")]
    InvalidCampaignId {
        /// The rejected value.
        value: String,
    },
}

/// Runtime configuration resolved from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// API token sent as the `Token-Signature` header.
    pub api_token: String,
    /// API base URL.
    pub base_url: String,
    /// Optional campaign filter; `None` processes the whole catalog.
    pub campaign_id: Option<i64>,
}

impl Config {
    /// Loads configuration from the process environment, reading a `.env`
    /// file first when one exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingToken`] when the token is absent and
    /// [`ConfigError::InvalidCampaignId`] when the campaign filter does not
    /// parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(
            env::var(TOKEN_VAR).ok(),
            env::var(CAMPAIGN_VAR).ok(),
            env::var(BASE_URL_VAR).ok(),
        )
    }

    fn from_vars(
        token: Option<String>,
        campaign: Option<String>,
        base_url: Option<String>,
    ) -> Result<Self, ConfigError> {
        let api_token = match token {
            Some(t) if !t.trim().is_empty() => t,
            _ => return Err(ConfigError::MissingToken),
        };

        let campaign_id = match campaign {
            Some(raw) if !raw.trim().is_empty() => {
                Some(raw.trim().parse::<i64>().map_err(|_| {
                    ConfigError::InvalidCampaignId { value: raw.clone() }
                })?)
            }
            _ => None,
        };

        Ok(Self {
            api_token,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            campaign_id,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_requires_token() {
        let result = Config::from_vars(None, None, None);
        assert!(matches!(result, Err(ConfigError::MissingToken)));

        let result = Config::from_vars(Some("  ".to_string()), None, None);
        assert!(matches!(result, Err(ConfigError::MissingToken)));
    }

    #[test]
    fn test_config_defaults_base_url() {
        let config = Config::from_vars(Some("tok".to_string()), None, None).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.campaign_id, None);
    }

    #[test]
    fn test_config_parses_campaign_filter() {
        let config =
            Config::from_vars(Some("tok".to_string()), Some("42".to_string()), None).unwrap();
        assert_eq!(config.campaign_id, Some(42));
    }

    #[test]
    fn test_config_empty_campaign_filter_means_all() {
        let config =
            Config::from_vars(Some("tok".to_string()), Some(String::new()), None).unwrap();
        assert_eq!(config.campaign_id, None);
    }

    #[test]
    fn test_config_rejects_non_numeric_campaign() {
        let result =
            Config::from_vars(Some("tok".to_string()), Some("abc".to_string()), None);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidCampaignId { .. })
        ));
    }

    #[test]
    fn test_config_honors_base_url_override() {
        let config = Config::from_vars(
            Some("tok".to_string()),
            None,
            Some("http://localhost:9000".to_string()),
        )
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:9000");
    }
}
