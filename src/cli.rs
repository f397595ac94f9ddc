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

//! Command Line Interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::constants::speed;
use crate::ports::{AmbientReading, FanSpeedReading, TemperatureReading};

#[derive(Parser, Debug)]
#[command(name = "rackfan")]
#[command(version)]
#[command(about = "Rackfan - adaptive IPMI fan control for rack servers")]
#[command(long_about = "Rackfan - adaptive IPMI fan control for rack servers

Drives chassis fans from a CPU temperature step table through the
management controller, and hands control back to the firmware whenever
the CPU runs too hot or anything goes wrong.

EXAMPLES:
    rackfan temp                 Show CPU core temperature range
    rackfan ambient              Show chassis inlet temperature
    rackfan fanspeed             Show fan RPM range
    rackfan setspeed 30          Pin all fans at 30%
    rackfan reset                Return to automatic fan control
    rackfan start                Run the control loop until interrupted

ENVIRONMENT VARIABLES:
    RACKFAN_CONFIG=PATH    Configuration file to use
    RACKFAN_LOG=debug      Log filter (trace, debug, info, warn, error)

FILES:
    /etc/rackfan/fan-control.json    System configuration
    ./fan-control.json               Fallback configuration")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (overrides RACKFAN_CONFIG and the default locations)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log to the systemd journal when available
    #[arg(long, global = true)]
    pub journald: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Show current fan speed (min-max RPM)
    Fanspeed,

    /// Show current CPU temperature (min-max °C)
    Temp,

    /// Show ambient temperature and its thresholds
    Ambient,

    /// Set a fixed fan speed in percent
    Setspeed {
        #[arg(value_parser = clap::value_parser!(u8).range(speed::MIN_PERCENT as i64..=speed::MAX_PERCENT as i64))]
        percent: u8,
    },

    /// Return fan control to the management controller
    Reset,

    /// Run the adaptive control loop until interrupted
    Start,
}

pub fn format_fan_speed(r: &FanSpeedReading) -> String {
    format!("Current fan speed: {}-{}RPM (min/max)", r.min, r.max)
}

pub fn format_temperature(r: &TemperatureReading) -> String {
    format!("Current CPU temperature: {:.1}-{:.1}°C (min/max)", r.min, r.max)
}

fn threshold(v: Option<i32>) -> String {
    v.map(|t| format!("{}°C", t)).unwrap_or_else(|| "n/a".to_string())
}

/// Three lines: reading and status, warning threshold, critical threshold.
pub fn format_ambient(r: &AmbientReading) -> [String; 3] {
    [
        format!(
            "Current ambient temperature: {}°C - Status: {}",
            r.current,
            r.status.as_deref().unwrap_or("unknown")
        ),
        format!("Ambient warning threshold: {}", threshold(r.warn)),
        format!("Ambient critical threshold: {}", threshold(r.crit)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_setspeed() {
        let cli = Cli::try_parse_from(["rackfan", "setspeed", "35"]).unwrap();
        assert_eq!(cli.command, Commands::Setspeed { percent: 35 });
    }

    #[test]
    fn test_setspeed_bounds() {
        assert!(Cli::try_parse_from(["rackfan", "setspeed", "10"]).is_ok());
        assert!(Cli::try_parse_from(["rackfan", "setspeed", "100"]).is_ok());
        assert!(Cli::try_parse_from(["rackfan", "setspeed", "9"]).is_err());
        assert!(Cli::try_parse_from(["rackfan", "setspeed", "101"]).is_err());
        assert!(Cli::try_parse_from(["rackfan", "setspeed", "fast"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["rackfan", "start", "--config", "/tmp/fc.json", "-v", "--journald"]).unwrap();
        assert_eq!(cli.command, Commands::Start);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/fc.json")));
        assert!(cli.verbose);
        assert!(cli.journald);
    }

    #[test]
    fn test_format_readings() {
        assert_eq!(
            format_fan_speed(&FanSpeedReading { min: 3480, max: 3720 }),
            "Current fan speed: 3480-3720RPM (min/max)"
        );
        assert_eq!(
            format_temperature(&TemperatureReading { min: 36.5, max: 44.0 }),
            "Current CPU temperature: 36.5-44.0°C (min/max)"
        );
    }

    #[test]
    fn test_format_ambient_missing_thresholds() {
        let lines = format_ambient(&AmbientReading { current: 23, warn: Some(42), crit: None, status: None });
        assert_eq!(lines[0], "Current ambient temperature: 23°C - Status: unknown");
        assert_eq!(lines[1], "Ambient warning threshold: 42°C");
        assert_eq!(lines[2], "Ambient critical threshold: n/a");
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["rackfan"]).is_err());
    }
}
