use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Base URL of the backend API, without a trailing slash.
    pub api_base_url: String,
    pub api_timeout: Duration,
    pub cache_ttl: Duration,
    pub session_idle_timeout: Duration,
    pub static_path: PathBuf,
    pub currency: String,
    pub locale: String,
    pub org_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            api_base_url: "http://127.0.0.1:8000".into(),
            api_timeout: Duration::from_secs(30),
            cache_ttl: Duration::from_secs(60),
            session_idle_timeout: Duration::from_secs(60 * 60),
            static_path: PathBuf::from("static"),
            currency: "KES".into(),
            locale: "en-US".into(),
            org_name: "Umoja SACCO".into(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source. Unparseable numbers
    /// fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let secs = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(default)
        };

        Self {
            host: lookup("SACCO_HOST").unwrap_or(defaults.host),
            port: lookup("SACCO_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            api_base_url: lookup("SACCO_API_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.api_base_url),
            api_timeout: secs("SACCO_API_TIMEOUT_SECS", defaults.api_timeout),
            cache_ttl: secs("SACCO_CACHE_TTL_SECS", defaults.cache_ttl),
            session_idle_timeout: lookup("SACCO_SESSION_IDLE_MINS")
                .and_then(|v| v.parse::<u64>().ok())
                .map(|mins| Duration::from_secs(mins * 60))
                .unwrap_or(defaults.session_idle_timeout),
            static_path: lookup("SACCO_STATIC_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_path),
            currency: lookup("SACCO_CURRENCY")
                .map(|c| c.to_uppercase())
                .unwrap_or(defaults.currency),
            locale: lookup("SACCO_LOCALE").unwrap_or(defaults.locale),
            org_name: lookup("SACCO_ORG_NAME").unwrap_or(defaults.org_name),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.address(), "0.0.0.0:8080");
        assert_eq!(config.api_base_url, "http://127.0.0.1:8000");
        assert_eq!(config.currency, "KES");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = Config::from_lookup(lookup_from(&[(
            "SACCO_API_BASE_URL",
            "https://api.example.org/",
        )]));
        assert_eq!(config.api_base_url, "https://api.example.org");
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("SACCO_PORT", "not-a-port"),
            ("SACCO_CACHE_TTL_SECS", "-5"),
            ("SACCO_SESSION_IDLE_MINS", "15"),
        ]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.session_idle_timeout, Duration::from_secs(900));
    }

    #[test]
    fn test_currency_uppercased() {
        let config = Config::from_lookup(lookup_from(&[("SACCO_CURRENCY", "ugx")]));
        assert_eq!(config.currency, "UGX");
    }
}
