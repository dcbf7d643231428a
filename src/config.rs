use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tokio::time::Duration;

/// `Inhibit` flags: 4 (suspend) | 8 (idle).
pub const DEFAULT_FLAGS: u32 = 12;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub reason: String,
    pub flags: u32,
    pub fullscreen_delay_ms: u64,
    pub watch_fullscreen: bool,
    pub monitors: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reason: "Inhibit by Inhibit Suspend".to_string(),
            flags: DEFAULT_FLAGS,
            fullscreen_delay_ms: 2000,
            watch_fullscreen: true,
            monitors: 1,
        }
    }
}

impl Config {
    pub fn fullscreen_delay(&self) -> Duration {
        Duration::from_millis(self.fullscreen_delay_ms)
    }
}

const APP_NAME: &str = "inhibit-suspend";
const ENV_PREFIX: &str = "INHIBIT_SUSPEND_";

pub fn default_config_file() -> anyhow::Result<PathBuf> {
    let config_dir =
        dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
    Ok(config_dir.join(APP_NAME).join("config.toml"))
}

/// Defaults, then `path` (or the per-user config file), then environment.
pub fn get_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config_file = match path {
        Some(path) => path.to_path_buf(),
        None => default_config_file()?,
    };
    let config: Config = load_figment(&config_file).extract()?;
    Ok(config)
}

fn load_figment(config_file: &Path) -> Figment {
    Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(config_file))
        .merge(Env::prefixed(ENV_PREFIX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_without_file() {
        Jail::expect_with(|jail| {
            let config: Config = load_figment(&jail.directory().join("missing.toml")).extract()?;
            assert_eq!(config, Config::default());
            assert_eq!(config.flags, 12);
            assert_eq!(config.fullscreen_delay(), Duration::from_secs(2));
            Ok(())
        });
    }

    #[test]
    fn file_then_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                    reason = "Watching a movie"
                    fullscreen_delay_ms = 500
                    monitors = 2
                "#,
            )?;
            jail.set_env("INHIBIT_SUSPEND_MONITORS", "3");

            let config: Config = load_figment(&jail.directory().join("config.toml")).extract()?;
            assert_eq!(config.reason, "Watching a movie");
            assert_eq!(config.fullscreen_delay_ms, 500);
            assert_eq!(config.monitors, 3);
            assert!(config.watch_fullscreen);
            Ok(())
        });
    }
}
