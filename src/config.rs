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

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::constants::{paths, speed, tools, MAX_COOL_DOWN_SECS, MAX_INTERVAL_SECS, MAX_SPEED_STEPS};
use crate::error::{FanControlError, Result};

/// Management controller connection, handed through to the IPMI adapter.
#[derive(Clone, PartialEq, Eq)]
pub struct IpmiConnection {
    pub host: String,
    pub user: String,
    pub pass: String,
    pub interface: String,
}

impl std::fmt::Debug for IpmiConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpmiConnection")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("pass", &"***")
            .field("interface", &self.interface)
            .finish()
    }
}

fn default_interface() -> String { tools::DEFAULT_INTERFACE.to_string() }

/// One row of the step table: `from..=to` (or `from..to` when half-open) maps to `percent`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SpeedStep {
    pub from: f64,
    pub to: f64,
    pub percent: u8,
    #[serde(default)]
    pub half_open: bool,
}

impl SpeedStep {
    pub fn closed(from: f64, to: f64, percent: u8) -> Self {
        Self { from, to, percent, half_open: false }
    }

    pub fn half_open(from: f64, to: f64, percent: u8) -> Self {
        Self { from, to, percent, half_open: true }
    }

    pub fn contains(&self, temp: f64) -> bool {
        if self.half_open {
            temp >= self.from && temp < self.to
        } else {
            temp >= self.from && temp <= self.to
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub host: String,
    pub user: String,
    pub pass: String,
    #[serde(default = "default_interface")]
    pub interface: String,
    /// Above this CPU temperature (°C) manual control is abandoned
    pub max_manual_temp: f64,
    /// Seconds to stay in automatic mode after an over-temperature event
    pub cool_down_time: u64,
    /// Seconds between normal ticks
    pub interval: u64,
    pub speed_steps: Vec<SpeedStep>,
}

impl Config {
    pub fn connection(&self) -> IpmiConnection {
        IpmiConnection {
            host: self.host.clone(),
            user: self.user.clone(),
            pass: self.pass.clone(),
            interface: self.interface.clone(),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn cool_down(&self) -> Duration {
        Duration::from_secs(self.cool_down_time)
    }
}

/// Candidate config locations in search order.
pub fn config_search_paths() -> Vec<PathBuf> {
    let mut out = Vec::new();
    if let Ok(p) = env::var(paths::CONFIG_ENV) {
        if !p.is_empty() {
            out.push(PathBuf::from(p));
        }
    }
    out.extend(paths::CONFIG_LOCATIONS.iter().map(PathBuf::from));
    out
}

/// Load the first config found, or the explicit path when one is given.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let searched = config_search_paths();
            match searched.iter().find(|p| p.is_file()) {
                Some(p) => p.clone(),
                None => return Err(FanControlError::ConfigMissing { searched }),
            }
        }
    };
    info!("Loading configuration from {}", path.display());
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path).map_err(|source| FanControlError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg: Config = serde_json::from_str(&data)?;
    validate_config(&cfg)?;
    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> Result<()> {
    if cfg.host.trim().is_empty() {
        return Err(FanControlError::invalid_config("host", "must not be empty"));
    }
    if cfg.user.is_empty() {
        return Err(FanControlError::invalid_config("user", "must not be empty"));
    }
    if cfg.interface.is_empty() || !cfg.interface.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(FanControlError::invalid_config("interface", "must be an ipmitool interface name"));
    }
    if !cfg.max_manual_temp.is_finite() {
        return Err(FanControlError::invalid_config("max_manual_temp", "must be a finite number"));
    }
    if cfg.interval == 0 {
        return Err(FanControlError::invalid_config("interval", "must be at least 1 second"));
    }
    if cfg.interval > MAX_INTERVAL_SECS {
        return Err(FanControlError::invalid_config(
            "interval",
            format!("too long (max {}s)", MAX_INTERVAL_SECS),
        ));
    }
    if cfg.cool_down_time > MAX_COOL_DOWN_SECS {
        return Err(FanControlError::invalid_config(
            "cool_down_time",
            format!("too long (max {}s)", MAX_COOL_DOWN_SECS),
        ));
    }
    validate_speed_steps(&cfg.speed_steps)
}

pub fn validate_speed_steps(steps: &[SpeedStep]) -> Result<()> {
    if steps.is_empty() {
        return Err(FanControlError::invalid_config("speed_steps", "at least one step required"));
    }
    if steps.len() > MAX_SPEED_STEPS {
        return Err(FanControlError::invalid_config(
            "speed_steps",
            format!("too many steps (max {})", MAX_SPEED_STEPS),
        ));
    }
    for (i, s) in steps.iter().enumerate() {
        let field = format!("speed_steps[{}]", i);
        if s.from.is_nan() || s.to.is_nan() {
            return Err(FanControlError::invalid_config(field, "temperature cannot be NaN"));
        }
        if s.from > s.to {
            return Err(FanControlError::invalid_config(field, "from must not exceed to"));
        }
        if !(speed::MIN_PERCENT..=speed::MAX_PERCENT).contains(&s.percent) {
            return Err(FanControlError::invalid_config(
                field,
                format!("percent {} outside {}-{}", s.percent, speed::MIN_PERCENT, speed::MAX_PERCENT),
            ));
        }
    }
    // Gaps and overlaps are tolerated; an uncovered temperature fails at lookup time.
    for (i, w) in steps.windows(2).enumerate() {
        if w[1].from > w[0].to {
            warn!("speed_steps[{}] and [{}] leave a gap between {}°C and {}°C", i, i + 1, w[0].to, w[1].from);
        } else if w[1].from < w[0].to {
            warn!("speed_steps[{}] and [{}] overlap; the earlier step wins", i, i + 1);
        }
    }
    Ok(())
}
