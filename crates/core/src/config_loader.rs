use crate::config::AppConfig;
use crate::error::Result;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

/// Default location of the credential file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "credentials.toml";

/// Prefix for environment overrides, e.g. `PRICETRACK_POSTGRES__PASSWORD`.
pub const ENV_PREFIX: &str = "PRICETRACK_";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration from [`DEFAULT_CONFIG_PATH`] merged with environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or a value has the wrong shape.
    pub fn load() -> Result<AppConfig> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Loads configuration from a TOML file merged with environment variables.
    ///
    /// A missing file yields defaults, so environment-only setups work.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or a value has the wrong shape.
    pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig> {
        let path = path.as_ref();
        let config: AppConfig = Self::figment(path).extract()?;

        tracing::debug!(
            path = %path.display(),
            postgres = %config.postgres.redacted_conninfo(),
            "loaded configuration"
        );

        Ok(config)
    }

    /// Returns the provider stack used by [`ConfigLoader::load_from`].
    #[must_use]
    pub fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}
