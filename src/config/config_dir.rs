use std::path::{Path, PathBuf};

use super::error::{ConfigError, ConfigResult};

/// Points at an explicit config file, bypassing the lookup below.
pub const CONFIG_PATH_ENV: &str = "SKILLFORGE_CONFIG";

const LOCAL_CONFIG: &str = "./config.toml";

/// `$HOME/.config/skillforge/config.toml` on unix, `%APPDATA%\skillforge\config.toml` on windows.
fn user_config_path() -> Option<PathBuf> {
    #[cfg(unix)]
    let base = std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"));
    #[cfg(windows)]
    let base = std::env::var_os("APPDATA").map(PathBuf::from);
    #[cfg(not(any(unix, windows)))]
    let base: Option<PathBuf> = None;

    base.map(|dir| app_config_in(&dir))
}

fn app_config_in(dir: &Path) -> PathBuf {
    dir.join(crate::APPLICATION_NAME).join("config.toml")
}

/// Resolution order: `SKILLFORGE_CONFIG`, then `./config.toml` when `use_local`,
/// then the per-user file if it exists, then `./config.toml`.
pub fn find_config_file(use_local: bool) -> PathBuf {
    if let Some(explicit) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(explicit);
    }
    if use_local {
        return PathBuf::from(LOCAL_CONFIG);
    }

    user_config_path()
        .filter(|path| path.exists())
        .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG))
}

pub fn read_config(use_local: bool) -> ConfigResult<Vec<u8>> {
    let path = find_config_file(use_local);
    tracing::trace!("looking for config at: {}", path.display());
    read_config_from(&path)
}

pub fn read_config_from(path: &Path) -> ConfigResult<Vec<u8>> {
    if !path.is_file() {
        return Err(ConfigError::ConfigNotFound);
    }
    tracing::debug!("using {} as configuration file", path.canonicalize()?.display());
    Ok(std::fs::read(path)?)
}
