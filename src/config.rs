use std::path::PathBuf;
use std::time::Duration;

use crate::LOG_DOMAIN;
use crate::game::GridSize;

pub const APP_ID: &str = "io.github.memorymatch.MemoryMatch";
pub const APP_NAME: &str = "Memory Match";

pub const DEFAULT_REVEAL_DELAY_MS: u64 = 600;
pub const DEFAULT_GRID_SIZE: u32 = 4;

const ENV_REVEAL_DELAY: &str = "MEMORY_MATCH_REVEAL_DELAY_MS";
const ENV_GRID_SIZE: &str = "MEMORY_MATCH_GRID_SIZE";
const ENV_DATA_DIR: &str = "MEMORY_MATCH_DATA_DIR";

#[derive(Clone, Debug)]
pub struct Settings {
    /// How long a revealed pair stays face up before it is resolved
    pub reveal_delay: Duration,
    /// Size preselected in the grid-size selector
    pub default_size: GridSize,
    /// Directory holding the game history
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    glib::user_config_dir().join("memory-match")
}

fn parse_reveal_delay(raw: Option<&str>) -> Duration {
    let Some(raw) = raw else {
        return Duration::from_millis(DEFAULT_REVEAL_DELAY_MS);
    };
    match raw.trim().parse::<u64>() {
        Ok(ms) => Duration::from_millis(ms),
        Err(err) => {
            glib::g_warning!(
                LOG_DOMAIN,
                "Ignoring {}={:?}: {}",
                ENV_REVEAL_DELAY,
                raw,
                err
            );
            Duration::from_millis(DEFAULT_REVEAL_DELAY_MS)
        }
    }
}

fn default_grid_size() -> GridSize {
    GridSize::new(DEFAULT_GRID_SIZE).unwrap_or_else(|_| GridSize::max())
}

fn parse_grid_size(raw: Option<&str>) -> GridSize {
    let Some(raw) = raw else {
        return default_grid_size();
    };
    let parsed = raw
        .trim()
        .parse::<u32>()
        .map_err(|err| err.to_string())
        .and_then(|size| GridSize::new(size).map_err(|err| err.to_string()));
    match parsed {
        Ok(size) => size,
        Err(reason) => {
            glib::g_warning!(LOG_DOMAIN, "Ignoring {}={:?}: {}", ENV_GRID_SIZE, raw, reason);
            default_grid_size()
        }
    }
}

fn parse_data_dir(raw: Option<&str>) -> PathBuf {
    match raw.map(str::trim) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => default_data_dir(),
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok();
        Self {
            reveal_delay: parse_reveal_delay(var(ENV_REVEAL_DELAY).as_deref()),
            default_size: parse_grid_size(var(ENV_GRID_SIZE).as_deref()),
            data_dir: parse_data_dir(var(ENV_DATA_DIR).as_deref()),
        }
    }
}
