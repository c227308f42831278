use crate::executor::request::ErrorPreference;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CoreConfig {
    #[serde(default = "default_shell")]
    pub shell: String,

    #[serde(default)]
    pub error_preference: ErrorPreference,

    #[serde(default)]
    pub ignore_exit_code: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub core: CoreConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            core: CoreConfig::default(),
        }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            shell: default_shell(),
            error_preference: ErrorPreference::default(),
            ignore_exit_code: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_cascading(None)
    }

    pub fn load_with_override(config_path: Option<PathBuf>) -> Result<Self> {
        Self::load_cascading(config_path)
    }

    fn load_cascading(override_path: Option<PathBuf>) -> Result<Self> {
        let mut config = Self::default();

        // Global config
        if let Some(global_config_path) = Self::get_global_config_path() {
            if global_config_path.exists() {
                let global_config = Self::load_from_file(&global_config_path)?;
                config = config.merge_with(global_config);
            }
        }

        // Project-local config
        if let Some(project_config_path) = Self::find_project_config()? {
            let project_config = Self::load_from_file(&project_config_path)?;
            config = config.merge_with(project_config);
        }

        // Explicit override (highest file precedence)
        if let Some(override_path) = override_path {
            if override_path.exists() {
                let override_config = Self::load_from_file(&override_path)?;
                config = config.merge_with(override_config);
            } else {
                return Err(anyhow!("Config file not found: {}", override_path.display()));
            }
        }

        // Environment variables win over every file layer
        config = config.apply_env_overrides();

        Ok(config)
    }

    fn get_global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|config_dir| config_dir.join("shrun").join("shrun.toml"))
    }

    fn find_project_config() -> Result<Option<PathBuf>> {
        let current_dir = std::env::current_dir()?;
        let mut dir = current_dir.as_path();

        loop {
            let config_path = dir.join(".shrun.toml");
            if config_path.exists() {
                return Ok(Some(config_path));
            }

            if let Some(parent) = dir.parent() {
                dir = parent;
            } else {
                break;
            }
        }

        Ok(None)
    }

    fn load_from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    fn merge_with(mut self, other: Self) -> Self {
        if other.core.shell != default_shell() {
            self.core.shell = other.core.shell;
        }
        if other.core.error_preference != ErrorPreference::default() {
            self.core.error_preference = other.core.error_preference;
        }
        if other.core.ignore_exit_code {
            self.core.ignore_exit_code = other.core.ignore_exit_code;
        }

        self
    }

    fn apply_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("SHRUN_SHELL") {
            if !val.is_empty() {
                self.core.shell = val;
            }
        }

        if let Ok(val) = std::env::var("SHRUN_ERROR_PREFERENCE") {
            if let Ok(pref) = val.parse::<ErrorPreference>() {
                self.core.error_preference = pref;
            }
        }

        if let Ok(val) = std::env::var("SHRUN_IGNORE_EXIT_CODE") {
            self.core.ignore_exit_code = val.parse().unwrap_or(false);
        }

        self
    }
}

fn default_shell() -> String {
    "/bin/sh".to_string()
}
