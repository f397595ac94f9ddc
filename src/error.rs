/*
 * This file is part of Rackfan.
 *
 * Copyright (C) 2025 Rackfan contributors
 *
 * Rackfan is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Rackfan is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Rackfan. If not, see <https://www.gnu.org/licenses/>.
 */

//! Unified error handling for Rackfan
//!
//! Every fallible operation in the crate returns [`FanControlError`]. The
//! variants follow the failure taxonomy of the control loop: configuration
//! problems are fatal at startup, sensor and actuator failures end the
//! current loop run (after automatic mode has been restored), and range
//! errors reject a single command or expose a defect in the step table.

use std::io;
use std::path::PathBuf;

/// Result type alias using FanControlError
pub type Result<T> = std::result::Result<T, FanControlError>;

#[derive(thiserror::Error, Debug)]
pub enum FanControlError {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("No configuration file found (searched: {})", display_paths(.searched))]
    ConfigMissing {
        searched: Vec<PathBuf>,
    },

    #[error("Invalid configuration value for {field}: {reason}")]
    ConfigInvalid {
        field: String,
        reason: String,
    },

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Failed to read configuration {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: io::Error,
    },

    #[error("{0} command not found")]
    ToolNotFound(String),

    // ============================================================================
    // Hardware Access Errors
    // ============================================================================
    #[error("Sensor unavailable: {0}")]
    SensorUnavailable(String),

    #[error("Actuator unavailable: {0}")]
    ActuatorUnavailable(String),

    // ============================================================================
    // Policy Errors
    // ============================================================================
    #[error("No speed step covers {temp:.1}°C")]
    NoMatchingRange {
        temp: f64,
    },

    #[error("Fan speed {value}% out of acceptable range ({min}-{max})")]
    OutOfRange {
        value: u8,
        min: u8,
        max: u8,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl FanControlError {
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn sensor(msg: impl Into<String>) -> Self {
        Self::SensorUnavailable(msg.into())
    }

    pub fn actuator(msg: impl Into<String>) -> Self {
        Self::ActuatorUnavailable(msg.into())
    }

    /// True for errors that must stop the program before the loop starts.
    pub fn is_fatal_config(&self) -> bool {
        matches!(
            self,
            Self::ConfigMissing { .. }
                | Self::ConfigInvalid { .. }
                | Self::ConfigParse(_)
                | Self::ConfigRead { .. }
                | Self::ToolNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_missing_lists_paths() {
        let err = FanControlError::ConfigMissing {
            searched: vec![PathBuf::from("/etc/rackfan/fan-control.json"), PathBuf::from("fan-control.json")],
        };
        let msg = err.to_string();
        assert!(msg.contains("/etc/rackfan/fan-control.json"));
        assert!(msg.contains(", fan-control.json"));
    }

    #[test]
    fn test_out_of_range_message() {
        let err = FanControlError::OutOfRange { value: 5, min: 10, max: 100 };
        assert_eq!(err.to_string(), "Fan speed 5% out of acceptable range (10-100)");
    }

    #[test]
    fn test_no_matching_range_message() {
        let err = FanControlError::NoMatchingRange { temp: 82.34 };
        assert_eq!(err.to_string(), "No speed step covers 82.3°C");
    }

    #[test]
    fn test_fatal_config_classification() {
        assert!(FanControlError::invalid_config("interval", "must be > 0").is_fatal_config());
        assert!(FanControlError::ToolNotFound("ipmitool".into()).is_fatal_config());
        assert!(!FanControlError::sensor("sensors failed").is_fatal_config());
        assert!(!FanControlError::actuator("ipmitool failed").is_fatal_config());
        assert!(!FanControlError::NoMatchingRange { temp: 1.0 }.is_fatal_config());
    }
}
