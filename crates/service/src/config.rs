//! Service configuration and the environment variables that override it.

use std::path::PathBuf;
use std::sync::Arc;

use bevy::log::warn;

use lot::LotTopology;
use store::{FileStore, MemoryStore, ParkingStore};

use crate::error::ParkingError;

/// Data directory for the file store. Unset means an in-memory store.
pub const ENV_DATA_DIR: &str = "PARKING_DATA_DIR";
pub const ENV_LEVELS: &str = "PARKING_LEVELS";
pub const ENV_SPOTS_PER_LEVEL: &str = "PARKING_SPOTS_PER_LEVEL";
pub const ENV_SPOTS_PER_ROW: &str = "PARKING_SPOTS_PER_ROW";
pub const ENV_MAX_RETRIES: &str = "PARKING_MAX_RETRIES";
/// `0` or `false` stores files uncompressed.
pub const ENV_COMPRESS: &str = "PARKING_COMPRESS";

/// Default number of re-sync attempts after losing a revision race.
pub const DEFAULT_MAX_CONFLICT_RETRIES: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub topology: LotTopology,
    pub data_dir: Option<PathBuf>,
    pub compress: bool,
    pub max_conflict_retries: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            topology: LotTopology::default(),
            data_dir: None,
            compress: true,
            max_conflict_retries: DEFAULT_MAX_CONFLICT_RETRIES,
        }
    }
}

impl ServiceConfig {
    /// Defaults overridden by the `PARKING_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    /// Unparseable values are ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let number = |key: &str, default: usize| -> usize {
            match lookup(key) {
                None => default,
                Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                    warn!("{key}={raw:?} is not a number; using {default}");
                    default
                }),
            }
        };

        let topology = LotTopology {
            levels: number(ENV_LEVELS, defaults.topology.levels),
            spots_per_level: number(ENV_SPOTS_PER_LEVEL, defaults.topology.spots_per_level),
            spots_per_row: number(ENV_SPOTS_PER_ROW, defaults.topology.spots_per_row),
        };
        let max_conflict_retries =
            number(ENV_MAX_RETRIES, defaults.max_conflict_retries as usize) as u32;
        let compress = match lookup(ENV_COMPRESS).as_deref().map(str::trim) {
            Some("0") | Some("false") => false,
            _ => defaults.compress,
        };
        let data_dir = lookup(ENV_DATA_DIR)
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        Self {
            topology,
            data_dir,
            compress,
            max_conflict_retries,
        }
    }

    pub fn validate(&self) -> Result<(), ParkingError> {
        self.topology.validate()?;
        Ok(())
    }

    /// Open the store this configuration points at.
    pub fn open_store(&self) -> Result<Arc<dyn ParkingStore>, ParkingError> {
        match &self.data_dir {
            Some(dir) => Ok(Arc::new(FileStore::open(dir.clone(), self.compress)?)),
            None => Ok(Arc::new(MemoryStore::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_no_overrides_is_default() {
        assert_eq!(ServiceConfig::from_lookup(|_| None), ServiceConfig::default());
    }

    #[test]
    fn test_overrides_apply() {
        let config = ServiceConfig::from_lookup(lookup(&[
            (ENV_LEVELS, "2"),
            (ENV_SPOTS_PER_LEVEL, " 40 "),
            (ENV_SPOTS_PER_ROW, "8"),
            (ENV_MAX_RETRIES, "7"),
            (ENV_COMPRESS, "false"),
            (ENV_DATA_DIR, "/var/lib/parking"),
        ]));
        assert_eq!(config.topology, LotTopology::new(2, 40, 8).unwrap());
        assert_eq!(config.max_conflict_retries, 7);
        assert!(!config.compress);
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/parking")));
    }

    #[test]
    fn test_bad_numbers_fall_back() {
        let config = ServiceConfig::from_lookup(lookup(&[(ENV_LEVELS, "many")]));
        assert_eq!(config.topology.levels, 5);
    }

    #[test]
    fn test_zero_row_width_fails_validation() {
        let config = ServiceConfig::from_lookup(lookup(&[(ENV_SPOTS_PER_ROW, "0")]));
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind(), "InvalidConfig");
    }

    #[test]
    fn test_blank_data_dir_means_memory() {
        let config = ServiceConfig::from_lookup(lookup(&[(ENV_DATA_DIR, "  ")]));
        assert_eq!(config.data_dir, None);
        assert!(config.open_store().is_ok());
    }
}
