//! Client configuration.

use std::fmt;
use std::sync::Arc;

use crate::http::Transport;

/// Root of the public Neon API.
pub const DEFAULT_BASE_URL: &str = "https://console.neon.tech/api/v2";

/// Environment variable consulted when no token is configured explicitly.
pub const TOKEN_ENV_VAR: &str = "NEON_API_KEY";

/// Inputs to [`crate::NeonClient::new`].
///
/// When `transport` is `None` the client uses a [`crate::UreqTransport`] with
/// the default timeout.
#[derive(Clone)]
pub struct Config {
    pub token: Option<String>,
    pub transport: Option<Arc<dyn Transport>>,
    pub base_url: String,
    /// Environment variable read when `token` is absent; `None` disables it.
    pub token_env: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: None,
            transport: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            token_env: Some(TOKEN_ENV_VAR.to_string()),
        }
    }
}

impl Config {
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn without_env_fallback(mut self) -> Self {
        self.token_env = None;
        self
    }

    /// Explicit token first, then the environment. Empty strings are ignored.
    pub fn resolve_token(&self) -> Option<String> {
        self.resolve_token_with(|name| std::env::var(name).ok())
    }

    pub(crate) fn resolve_token_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        let explicit = self.token.clone().filter(|t| !t.is_empty());
        explicit.or_else(|| {
            self.token_env
                .as_deref()
                .and_then(lookup)
                .filter(|t| !t.is_empty())
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("transport", &self.transport.as_ref().map(|t| if t.is_mock() { "mock" } else { "custom" }))
            .field("base_url", &self.base_url)
            .field("token_env", &self.token_env)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with(value: &'static str) -> impl Fn(&str) -> Option<String> {
        move |name| (name == TOKEN_ENV_VAR).then(|| value.to_string())
    }

    #[test]
    fn explicit_token_wins_over_env() {
        let config = Config::default().with_token("explicit");
        assert_eq!(config.resolve_token_with(env_with("from-env")).as_deref(), Some("explicit"));
    }

    #[test]
    fn env_token_used_when_no_explicit_token() {
        let config = Config::default();
        assert_eq!(config.resolve_token_with(env_with("from-env")).as_deref(), Some("from-env"));
    }

    #[test]
    fn empty_values_count_as_absent() {
        let config = Config::default().with_token("");
        assert_eq!(config.resolve_token_with(env_with("")), None);
        assert_eq!(config.resolve_token_with(env_with("from-env")).as_deref(), Some("from-env"));
    }

    #[test]
    fn env_fallback_can_be_disabled() {
        let config = Config::default().without_env_fallback();
        assert_eq!(config.resolve_token_with(env_with("from-env")), None);
    }

    #[test]
    fn debug_output_redacts_token() {
        let config = Config::default().with_token("secret-token");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("<redacted>"));
    }
}
