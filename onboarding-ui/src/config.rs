//! Application configuration loaded from TOML.
//!
//! ```toml
//! [logging]
//! level = "info"
//! console = false
//! file = "onboarding.log"
//!
//! [flow]
//! steps = ["welcome", "select_skill", "paywall"]
//! on_finish = "restart"
//! fallback_skill = "amateur"
//!
//! [paywall]
//! currency_symbol = "$"
//! products_csv = "products.csv"
//! ```
//!
//! Every section and key is optional. Relative paths are resolved against
//! the directory containing the config file.

use std::fs;
use std::path::{Path, PathBuf};

use onboarding_core::{FlowConfig, PaywallCatalog};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::product_loader::{self, ProductLoadError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot load products from '{path}': {source}")]
    Products {
        path: PathBuf,
        #[source]
        source: ProductLoadError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// EnvFilter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    /// Mirror log records to stderr.
    pub console: bool,
    /// Append log records to this file.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console: false,
            file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaywallConfig {
    pub currency_symbol: String,
    /// Product catalog; the built-in catalog is used when absent.
    pub products_csv: Option<PathBuf>,
}

impl Default for PaywallConfig {
    fn default() -> Self {
        Self {
            currency_symbol: PaywallCatalog::default().currency_symbol,
            products_csv: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub flow: FlowConfig,
    pub paywall: PaywallConfig,
}

impl AppConfig {
    pub fn from_toml_str(
        data: &str,
        origin: &Path,
    ) -> Result<Self, ConfigError> {
        toml::from_str(data).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Reads `path` and resolves relative file paths against its directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&data, path)?;

        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    fn resolve_relative_to(
        &mut self,
        base: &Path,
    ) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        if let Some(file) = self.logging.file.as_mut() {
            resolve(file);
        }
        if let Some(csv) = self.paywall.products_csv.as_mut() {
            resolve(csv);
        }
    }

    /// Builds the paywall catalog, reading the product CSV when configured.
    pub fn catalog(&self) -> Result<PaywallCatalog, ConfigError> {
        let products = match &self.paywall.products_csv {
            Some(path) => {
                product_loader::load_from_file(path).map_err(|source| ConfigError::Products {
                    path: path.clone(),
                    source,
                })?
            }
            None => PaywallCatalog::default().products,
        };

        Ok(PaywallCatalog::new(
            self.paywall.currency_symbol.clone(),
            products,
        ))
    }

    /// Flow configuration with the catalog filled in.
    pub fn flow_config(&self) -> Result<FlowConfig, ConfigError> {
        Ok(self.flow.clone().with_catalog(self.catalog()?))
    }
}

#[cfg(test)]
mod tests {
    use onboarding_core::{DjSkill, StepKind, TerminalBehavior};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = AppConfig::from_toml_str("", Path::new("empty.toml")).unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.flow.steps.len(), 3);
        assert!(!config.logging.console);
    }

    #[test]
    fn sections_override_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [logging]
            level = "debug"
            console = true

            [flow]
            steps = ["welcome", "paywall"]
            on_finish = "finish"
            fallback_skill = "new"

            [paywall]
            currency_symbol = "€"
            "#,
            Path::new("custom.toml"),
        )
        .unwrap();

        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.console);
        assert_eq!(config.flow.steps, vec![StepKind::Welcome, StepKind::Paywall]);
        assert_eq!(config.flow.on_finish, TerminalBehavior::Finish);
        assert_eq!(config.flow.fallback_skill, DjSkill::New);
        assert_eq!(config.catalog().unwrap().currency_symbol, "€");
    }

    #[test]
    fn unknown_section_is_rejected() {
        let err = AppConfig::from_toml_str("[theme]\ndark = true\n", Path::new("bad.toml"))
            .unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn relative_paths_resolve_against_config_dir() {
        let mut config = AppConfig::from_toml_str(
            "[logging]\nfile = \"logs/flow.log\"\n[paywall]\nproducts_csv = \"/abs/products.csv\"\n",
            Path::new("cfg.toml"),
        )
        .unwrap();

        config.resolve_relative_to(Path::new("/etc/djay"));

        assert_eq!(
            config.logging.file,
            Some(PathBuf::from("/etc/djay/logs/flow.log"))
        );
        assert_eq!(
            config.paywall.products_csv,
            Some(PathBuf::from("/abs/products.csv"))
        );
    }

    #[test]
    fn missing_products_file_is_reported() {
        let config = AppConfig {
            paywall: PaywallConfig {
                products_csv: Some(PathBuf::from("/nonexistent/products.csv")),
                ..PaywallConfig::default()
            },
            ..AppConfig::default()
        };

        let err = config.flow_config().unwrap_err();

        assert!(matches!(err, ConfigError::Products { .. }));
    }

    #[test]
    fn missing_config_file_is_read_error() {
        let err = AppConfig::load(Path::new("/nonexistent/onboarding.toml")).unwrap_err();

        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
