//! # Configuration
//!
//! Like the rest of DogRS, dog-flags reads configuration from a plain
//! string key/value store, so hosts can layer values from whatever source
//! they like. [`FlagsOptions`] is the typed view the composition root and
//! the HTTP adapter consume.
//!
//! ```rust
//! use dog_flags::{FlagsConfig, FlagsOptions};
//!
//! let mut config = FlagsConfig::new();
//! config.set("flags.dashboard_path", "/admin/flags");
//! config.set("flags.allowed_roles", "Admin, Ops");
//!
//! let options = FlagsOptions::from_config(&config.snapshot());
//! assert_eq!(options.dashboard_path, "/admin/flags");
//! assert_eq!(options.allowed_roles, vec!["Admin", "Ops"]);
//! assert!(!options.create_missing_features_on_start);
//! ```
//!
//! ## Environment overrides
//! `load_env_config` strips a prefix from environment variable names,
//! lowercases the rest and turns `__` into `.`. With prefix `DOGFLAGS__`:
//!
//! ```bash
//! export DOGFLAGS__FLAGS__REQUIRE_AUTHENTICATION=false   # flags.require_authentication
//! export DOGFLAGS__HTTP__PORT=3040                       # http.port
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const DEFAULT_DASHBOARD_PATH: &str = "/flagsmith";

#[derive(Debug, Default)]
pub struct FlagsConfig {
    values: HashMap<String, String>,
}

impl FlagsConfig {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Copy every `{prefix}A__B` variable from `vars` into key `a.b`.
    pub fn load_vars<I>(&mut self, prefix: &str, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(prefix) {
                let normalized = stripped.to_lowercase().replace("__", ".");
                self.set(normalized, value);
            }
        }
    }

    /// `load_vars` over the process environment.
    pub fn load_env_config(&mut self, prefix: &str) {
        self.load_vars(prefix, std::env::vars());
    }

    pub fn snapshot(&self) -> FlagsConfigSnapshot {
        FlagsConfigSnapshot {
            map: self.values.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FlagsConfigSnapshot {
    map: HashMap<String, String>,
}

impl FlagsConfigSnapshot {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.trim().parse::<bool>().ok())
    }

    /// Comma-separated list, blanks dropped.
    pub fn get_list(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
    }
}

/// Options recognised by the feature-flag layer.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FlagsOptions {
    /// Mount the administrative API.
    pub enable_dashboard: bool,
    /// Base path; the API lives under `{dashboard_path}/api`.
    pub dashboard_path: String,
    /// Reconcile declared feature ids once during startup.
    pub create_missing_features_on_start: bool,
    /// Gate the administrative API behind an authentication provider.
    pub require_authentication: bool,
    pub allowed_roles: Vec<String>,
}

impl Default for FlagsOptions {
    fn default() -> Self {
        Self {
            enable_dashboard: true,
            dashboard_path: DEFAULT_DASHBOARD_PATH.to_string(),
            create_missing_features_on_start: false,
            require_authentication: true,
            allowed_roles: vec!["Admin".to_string()],
        }
    }
}

impl FlagsOptions {
    /// Build from `flags.*` keys. Missing or unparseable values keep their
    /// defaults.
    pub fn from_config(config: &FlagsConfigSnapshot) -> Self {
        let defaults = Self::default();
        Self {
            enable_dashboard: config
                .get_bool("flags.enable_dashboard")
                .unwrap_or(defaults.enable_dashboard),
            dashboard_path: config
                .get_string("flags.dashboard_path")
                .map(|p| normalize_path(&p))
                .unwrap_or(defaults.dashboard_path),
            create_missing_features_on_start: config
                .get_bool("flags.create_missing_features_on_start")
                .unwrap_or(defaults.create_missing_features_on_start),
            require_authentication: config
                .get_bool("flags.require_authentication")
                .unwrap_or(defaults.require_authentication),
            allowed_roles: config
                .get_list("flags.allowed_roles")
                .unwrap_or(defaults.allowed_roles),
        }
    }

    /// `{dashboard_path}/api`
    pub fn api_path(&self) -> String {
        match normalize_path(&self.dashboard_path).as_str() {
            "/" => "/api".to_string(),
            base => format!("{base}/api"),
        }
    }
}

// leading slash, no trailing slash; "" and "/" both become "/"
fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let o = FlagsOptions::default();
        assert!(o.enable_dashboard);
        assert_eq!(o.dashboard_path, "/flagsmith");
        assert!(!o.create_missing_features_on_start);
        assert!(o.require_authentication);
        assert_eq!(o.allowed_roles, vec!["Admin"]);
        assert_eq!(o.api_path(), "/flagsmith/api");
    }

    #[test]
    fn unparseable_values_fall_back() {
        let mut config = FlagsConfig::new();
        config.set("flags.require_authentication", "nope");
        config.set("flags.create_missing_features_on_start", " true ");
        config.set("flags.dashboard_path", "admin/flags/");

        let o = FlagsOptions::from_config(&config.snapshot());
        assert!(o.require_authentication);
        assert!(o.create_missing_features_on_start);
        assert_eq!(o.dashboard_path, "/admin/flags");
    }

    #[test]
    fn prefixed_vars_become_dotted_keys() {
        let mut config = FlagsConfig::new();
        config.load_vars(
            "FLAGS__",
            vec![
                ("FLAGS__HTTP__PORT".to_string(), "3040".to_string()),
                ("FLAGS__FLAGS__ENABLE_DASHBOARD".to_string(), "false".to_string()),
                ("PATH".to_string(), "/usr/bin".to_string()),
            ],
        );

        assert_eq!(config.get("http.port"), Some("3040"));
        assert!(config.has("flags.enable_dashboard"));
        assert!(!config.has("path"));
        assert!(!FlagsOptions::from_config(&config.snapshot()).enable_dashboard);
    }

    #[test]
    fn root_dashboard_path_keeps_single_slash_api() {
        let o = FlagsOptions {
            dashboard_path: "/".to_string(),
            ..FlagsOptions::default()
        };
        assert_eq!(o.api_path(), "/api");
    }
}
