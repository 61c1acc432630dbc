//! Engine configuration.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes:
//!
//! ```json
//! { "superko": true }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{DEFAULT_BOARD_SIZE, MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use crate::error::{ReplayError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReplayConfig {
    /// Board size for records without a usable `SZ`.
    pub default_board_size: usize,
    /// Reject any repetition of a position on the current path, not just
    /// an immediate retake.
    pub superko: bool,
    /// Mark the moves of sibling nodes on the board.
    pub sibling_markers: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            default_board_size: DEFAULT_BOARD_SIZE,
            superko: false,
            sibling_markers: true,
        }
    }
}

impl ReplayConfig {
    /// Load a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        check_board_size(self.default_board_size).map(|_| ())
    }

    /// Size to use for a record declaring `declared` (the raw `SZ` value).
    /// Missing, unparsable, or out-of-range sizes fall back to the default.
    pub fn board_size(&self, declared: Option<&str>) -> usize {
        declared
            .and_then(|s| s.trim().parse::<usize>().ok())
            .and_then(|n| check_board_size(n).ok())
            .unwrap_or(self.default_board_size)
    }
}

pub fn check_board_size(size: usize) -> Result<usize> {
    if (MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
        Ok(size)
    } else {
        Err(ReplayError::BoardSize(size))
    }
}
