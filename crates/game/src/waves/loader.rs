//! Wave definition sources.
//!
//! The manager only sees the [`WaveConfigLoader`] trait. [`ScheduledWaveLoader`]
//! reads the on-disk layout, [`InMemoryWaveLoader`] serves tests and tools.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::config::{UnitConfig, WaveManagerConfig};
use super::error::WaveError;

pub const SCHEDULE_FILE: &str = "schedule.ron";

/// Collaborator resolving wave order and wave contents.
pub trait WaveConfigLoader: Send + Sync {
    /// Wave that follows `previous` on `map`, or the first wave when `previous` is `None`.
    fn find_next_wave(&self, map: &str, previous: Option<&str>) -> Option<String>;

    /// Ordered unit records of one wave. An empty list is a legitimate empty wave.
    fn load_wave(&self, map: &str, wave: &str) -> Result<Vec<UnitConfig>, WaveError>;
}

/// Next entry of `order` after `previous`. Unknown `previous` ends the sequence.
pub fn next_in_order(order: &[String], previous: Option<&str>) -> Option<String> {
    let next_index = match previous {
        None => 0,
        Some(previous) => order.iter().position(|w| w == previous)? + 1,
    };
    order.get(next_index).cloned()
}

/// Reads `<root>/<map>/schedule.ron`.
pub fn load_schedule(root: &Path, map: &str) -> Result<WaveManagerConfig, WaveError> {
    let path = root.join(map).join(SCHEDULE_FILE);
    let content = fs::read_to_string(&path).map_err(|source| WaveError::Io {
        path: path.clone(),
        source,
    })?;

    let mut config: WaveManagerConfig =
        ron::from_str(&content).map_err(|e| WaveError::CorruptWave {
            map: map.to_string(),
            wave: SCHEDULE_FILE.to_string(),
            reason: e.to_string(),
        })?;

    if config.map_name.is_empty() {
        config.map_name = map.to_string();
    }

    Ok(config)
}

/// File-backed loader: `<root>/<map>/<wave>.ron`, falling back to `<wave>.json`.
#[derive(Debug, Clone)]
pub struct ScheduledWaveLoader {
    root: PathBuf,
    order: Vec<String>,
}

impl ScheduledWaveLoader {
    pub fn new(root: impl Into<PathBuf>, order: Vec<String>) -> Self {
        Self {
            root: root.into(),
            order,
        }
    }

    pub fn from_config(root: impl Into<PathBuf>, config: &WaveManagerConfig) -> Self {
        Self::new(root, config.waves.clone())
    }

    fn read_optional(path: &Path) -> Result<Option<String>, WaveError> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(WaveError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl WaveConfigLoader for ScheduledWaveLoader {
    fn find_next_wave(&self, _map: &str, previous: Option<&str>) -> Option<String> {
        next_in_order(&self.order, previous)
    }

    fn load_wave(&self, map: &str, wave: &str) -> Result<Vec<UnitConfig>, WaveError> {
        let dir = self.root.join(map);
        let corrupt = |reason: String| WaveError::CorruptWave {
            map: map.to_string(),
            wave: wave.to_string(),
            reason,
        };

        if let Some(content) = Self::read_optional(&dir.join(format!("{wave}.ron")))? {
            return ron::from_str(&content).map_err(|e| corrupt(e.to_string()));
        }

        if let Some(content) = Self::read_optional(&dir.join(format!("{wave}.json")))? {
            return serde_json::from_str(&content).map_err(|e| corrupt(e.to_string()));
        }

        Err(WaveError::WaveNotFound {
            map: map.to_string(),
            wave: wave.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryWaveLoader {
    order: Vec<String>,
    waves: HashMap<String, Vec<UnitConfig>>,
}

impl InMemoryWaveLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a wave to the play order.
    pub fn with_wave(mut self, name: impl Into<String>, units: Vec<UnitConfig>) -> Self {
        let name = name.into();
        self.order.push(name.clone());
        self.waves.insert(name, units);
        self
    }

    /// Lists a wave in the play order without any definition behind it.
    pub fn with_missing_wave(mut self, name: impl Into<String>) -> Self {
        self.order.push(name.into());
        self
    }
}

impl WaveConfigLoader for InMemoryWaveLoader {
    fn find_next_wave(&self, _map: &str, previous: Option<&str>) -> Option<String> {
        next_in_order(&self.order, previous)
    }

    fn load_wave(&self, map: &str, wave: &str) -> Result<Vec<UnitConfig>, WaveError> {
        self.waves
            .get(wave)
            .cloned()
            .ok_or_else(|| WaveError::WaveNotFound {
                map: map.to_string(),
                wave: wave.to_string(),
            })
    }
}
