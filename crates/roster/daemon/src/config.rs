//! Configuration for rosterd

use roster_sweeper::SweeperConfig;
use roster_types::{RoleCatalog, ANY_ROLE};
use serde::{Deserialize, Serialize};

/// Main daemon configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterConfig {
    /// Retention and sweep cadence
    #[serde(default)]
    pub sweeper: SweeperConfig,

    /// Roles organizers may pick from
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Pending creation drafts
    #[serde(default)]
    pub drafts: DraftConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            sweeper: SweeperConfig::default(),
            catalog: CatalogConfig::default(),
            drafts: DraftConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Role catalog configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_roles")]
    pub roles: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            roles: default_roles(),
        }
    }
}

impl CatalogConfig {
    pub fn catalog(&self) -> RoleCatalog {
        RoleCatalog::new(self.roles.iter().cloned())
    }
}

/// Draft configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftConfig {
    /// Seconds an unfinished draft is kept
    #[serde(default = "default_draft_ttl")]
    pub ttl_secs: u64,
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_draft_ttl(),
        }
    }
}

impl DraftConfig {
    pub fn ttl(&self) -> chrono::Duration {
        // One year is far past any useful draft lifetime.
        chrono::Duration::seconds(self.ttl_secs.min(365 * 24 * 60 * 60) as i64)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_roles() -> Vec<String> {
    RoleCatalog::reference()
        .iter()
        .map(|role| role.as_str().to_string())
        .collect()
}

fn default_draft_ttl() -> u64 {
    15 * 60
}

fn default_log_level() -> String {
    "info".to_string()
}

impl RosterConfig {
    /// Load configuration from defaults, an optional file, and `ROSTER_` env vars.
    ///
    /// Nested keys use a double underscore: `ROSTER_SWEEPER__RETENTION_SECS`.
    /// The role list is comma separated: `ROSTER_CATALOG__ROLES=Tank,Healer`.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&RosterConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("ROSTER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("catalog.roles"),
        );

        builder.build()?.try_deserialize()
    }

    /// The catalog, falling back to the generic option when configured empty
    pub fn catalog(&self) -> RoleCatalog {
        let catalog = self.catalog.catalog();
        if catalog.is_empty() {
            RoleCatalog::new([ANY_ROLE])
        } else {
            catalog
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RosterConfig::default();
        assert_eq!(config.sweeper.interval_secs, 3600);
        assert_eq!(config.sweeper.retention_secs, 7 * 24 * 3600);
        assert_eq!(config.drafts.ttl_secs, 900);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_default_catalog_is_reference() {
        let config = RosterConfig::default();
        assert_eq!(config.catalog.roles.len(), 19);
        assert_eq!(config.catalog(), RoleCatalog::reference());
    }

    #[test]
    fn test_empty_catalog_falls_back() {
        let config = RosterConfig {
            catalog: CatalogConfig { roles: vec![] },
            ..Default::default()
        };
        let catalog = config.catalog();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.contains(&ANY_ROLE.into()));
    }

    #[test]
    fn test_load_without_file() {
        let config = RosterConfig::load(None).unwrap();
        assert_eq!(config.sweeper, SweeperConfig::default());
        assert_eq!(config.drafts, DraftConfig::default());
    }

    #[test]
    fn test_catalog_roles_from_env() {
        std::env::set_var("ROSTER_CATALOG__ROLES", "Tank,Healer");
        let loaded = RosterConfig::load(None);
        std::env::remove_var("ROSTER_CATALOG__ROLES");

        let config = loaded.unwrap();
        assert_eq!(config.catalog.roles, vec!["Tank", "Healer"]);
        assert_eq!(config.catalog().len(), 2);
        assert_eq!(config.sweeper, SweeperConfig::default());
    }

    #[test]
    fn test_partial_sections_deserialize() {
        let config: RosterConfig =
            serde_json::from_str(r#"{"sweeper": {"retention_secs": 60}}"#).unwrap();
        assert_eq!(config.sweeper.retention_secs, 60);
        assert_eq!(config.sweeper.interval_secs, 3600);
        assert_eq!(config.catalog.roles.len(), 19);
    }
}
