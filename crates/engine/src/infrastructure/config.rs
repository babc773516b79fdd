//! Engine configuration read from the environment.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_DATABASE_URL: &str = "sqlite:hexrealm.db?mode=rwc";

/// Runtime settings. `Default` matches an empty environment.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    /// `None` leaves the engine without animations.
    pub art_service_url: Option<String>,
    pub art_service_timeout: Duration,
    pub combat_tick: Duration,
    pub view_radius: u32,
    pub wizard_ttl: Duration,
    pub generation_timeout: Duration,
    pub token_ttl: chrono::Duration,
    /// realm -> access code, for realms that are gated.
    pub realm_access_codes: HashMap<String, String>,
    pub cors_allowed_origins: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            art_service_url: None,
            art_service_timeout: Duration::from_secs(60),
            combat_tick: Duration::from_millis(1500),
            view_radius: 5,
            wizard_ttl: Duration::from_secs(30 * 60),
            generation_timeout: Duration::from_secs(180),
            token_ttl: chrono::Duration::hours(720),
            realm_access_codes: HashMap::new(),
            cors_allowed_origins: None,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let server_port = get("SERVER_PORT")
            .or_else(|| get("PORT"))
            .map(|raw| parse_or("SERVER_PORT", &raw, defaults.server_port))
            .unwrap_or(defaults.server_port);

        Self {
            server_host: get("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port,
            database_url: get("DATABASE_URL").unwrap_or(defaults.database_url),
            art_service_url: get("ART_SERVICE_URL"),
            art_service_timeout: Duration::from_secs(numeric(
                &get,
                "ART_SERVICE_TIMEOUT_SECS",
                60,
            )),
            combat_tick: Duration::from_millis(numeric(&get, "COMBAT_TICK_MS", 1500).max(1)),
            view_radius: numeric(&get, "VIEW_RADIUS", defaults.view_radius),
            wizard_ttl: Duration::from_secs(numeric(&get, "WIZARD_TTL_SECS", 30 * 60)),
            generation_timeout: Duration::from_secs(numeric(
                &get,
                "GENERATION_TIMEOUT_SECS",
                180,
            )),
            token_ttl: chrono::Duration::hours(numeric(&get, "TOKEN_TTL_HOURS", 720)),
            realm_access_codes: get("REALM_ACCESS_CODES")
                .map(|raw| parse_access_codes(&raw))
                .unwrap_or_default(),
            cors_allowed_origins: get("CORS_ALLOWED_ORIGINS"),
        }
    }
}

fn numeric<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    get(key)
        .map(|raw| parse_or(key, &raw, default))
        .unwrap_or(default)
}

fn parse_or<T>(key: &str, raw: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    raw.parse().unwrap_or_else(|_| {
        tracing::warn!(key, value = raw, default = %default, "Unparseable setting, using default");
        default
    })
}

/// `realm:code,realm:code`. Malformed pairs are skipped.
fn parse_access_codes(raw: &str) -> HashMap<String, String> {
    raw.split(',')
        .filter_map(|pair| {
            let (realm, code) = pair.split_once(':')?;
            let (realm, code) = (realm.trim(), code.trim());
            if realm.is_empty() || code.is_empty() {
                tracing::warn!(pair, "Skipping malformed realm access code");
                return None;
            }
            Some((realm.to_string(), code.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> EngineConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.view_radius, 5);
        assert_eq!(config.combat_tick, Duration::from_millis(1500));
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert!(config.art_service_url.is_none());
        assert!(config.realm_access_codes.is_empty());
    }

    #[test]
    fn port_falls_back_to_port_variable() {
        assert_eq!(config_from(&[("PORT", "8080")]).server_port, 8080);
        assert_eq!(
            config_from(&[("PORT", "8080"), ("SERVER_PORT", "9000")]).server_port,
            9000
        );
    }

    #[test]
    fn bad_numbers_use_defaults() {
        let config = config_from(&[("COMBAT_TICK_MS", "fast"), ("VIEW_RADIUS", "-2")]);
        assert_eq!(config.combat_tick, Duration::from_millis(1500));
        assert_eq!(config.view_radius, 5);
    }

    #[test]
    fn access_codes_parse_and_skip_garbage() {
        let config = config_from(&[("REALM_ACCESS_CODES", "alpha:open-sesame, beta:xyzzy,broken")]);
        assert_eq!(config.realm_access_codes.len(), 2);
        assert_eq!(config.realm_access_codes["beta"], "xyzzy");
    }

    #[test]
    fn blank_art_url_counts_as_unset() {
        assert!(config_from(&[("ART_SERVICE_URL", "  ")]).art_service_url.is_none());
    }
}
