//! Configuration file loader with multi-source merging

use super::file_config::{ConfigValidationError, FileConfig};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};
use thiserror::Error;

const PROJECT_FILES: [&str; 2] = ["conclave.toml", ".conclave.toml"];

/// Prefix of environment overrides, e.g. `CONCLAVE_DELIBERATION__MAX_ROUNDS=5`
pub const ENV_PREFIX: &str = "CONCLAVE_";

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Parse(#[from] Box<figment::Error>),

    #[error(transparent)]
    Invalid(#[from] ConfigValidationError),
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Explicit config path (if provided)
    /// 2. Project root: `./conclave.toml` or `./.conclave.toml`
    /// 3. XDG config: `$XDG_CONFIG_HOME/conclave/config.toml`
    /// 4. Environment: `CONCLAVE_<SECTION>__<KEY>`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, ConfigLoadError> {
        if let Some(path) = config_path
            && !path.exists()
        {
            return Err(ConfigLoadError::NotFound(path.to_path_buf()));
        }

        let config: FileConfig = Self::figment(
            Self::global_config_path().as_deref(),
            Self::project_config_path().as_deref(),
            config_path,
        )
        .extract()
        .map_err(Box::new)?;

        config.validate()?;
        Ok(config)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    fn figment(global: Option<&Path>, project: Option<&Path>, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(FileConfig::default()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        if let Some(path) = global
            && path.exists()
        {
            figment = figment.merge(Toml::file(path));
        }

        if let Some(path) = project {
            figment = figment.merge(Toml::file(path));
        }

        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }

        figment
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/conclave/config.toml if set,
    /// otherwise falls back to ~/.config/conclave/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("conclave").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources() {
        println!("Configuration sources (in priority order):");

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./conclave.toml or ./.conclave.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        let overrides: Vec<String> = std::env::vars()
            .map(|(key, _)| key)
            .filter(|key| key.starts_with(ENV_PREFIX) && key.contains("__"))
            .collect();
        if overrides.is_empty() {
            println!("  [     ] Env:     {}<SECTION>__<KEY>", ENV_PREFIX);
        } else {
            println!("  [FOUND] Env:     {}", overrides.join(", "));
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conclave_application::FailurePolicy;
    use figment::Jail;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert!(config.experts.is_empty());
        assert!(config.quality.enabled);
        assert_eq!(config.deliberation.max_rounds, 3);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("conclave"));
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        let result = ConfigLoader::load(Some(Path::new("/nonexistent/conclave.toml")));
        assert!(matches!(result, Err(ConfigLoadError::NotFound(_))));
    }

    #[test]
    fn test_explicit_file_overrides_project_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "conclave.toml",
                r#"
[deliberation]
max_rounds = 4
consensus_threshold = 60.0
"#,
            )?;
            jail.create_file(
                "custom.toml",
                r#"
[deliberation]
max_rounds = 7
"#,
            )?;

            let config: FileConfig = ConfigLoader::figment(
                None,
                Some(Path::new("conclave.toml")),
                Some(Path::new("custom.toml")),
            )
            .extract()?;

            assert_eq!(config.deliberation.max_rounds, 7);
            assert_eq!(config.deliberation.consensus_threshold, 60.0);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_defaults_but_not_files() {
        Jail::expect_with(|jail| {
            jail.set_env("CONCLAVE_DELIBERATION__MAX_ROUNDS", "9");
            jail.set_env("CONCLAVE_DELIBERATION__FAILURE_POLICY", "skip_expert");
            jail.set_env("CONCLAVE_PROVIDER__BASE_URL", "http://env.local");
            jail.create_file(
                "conclave.toml",
                r#"
[provider]
base_url = "http://file.local"
"#,
            )?;

            let config: FileConfig =
                ConfigLoader::figment(None, Some(Path::new("conclave.toml")), None).extract()?;

            assert_eq!(config.deliberation.max_rounds, 9);
            assert_eq!(config.deliberation.failure_policy, FailurePolicy::SkipExpert);
            assert_eq!(config.provider.base_url, "http://file.local");
            Ok(())
        });
    }

    #[test]
    fn test_load_validates_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[provider]\ntimeout_seconds = 0\n").unwrap();

        let result = ConfigLoader::load(Some(&path));
        assert!(matches!(
            result,
            Err(ConfigLoadError::Invalid(ConfigValidationError::InvalidTimeout))
        ));
    }
}
