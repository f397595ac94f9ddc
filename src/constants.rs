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

//! Constants shared by the control loop, the adapters and the CLI.

/// Manual fan speed bounds in percent of maximum.
pub mod speed {
    /// Lowest percent accepted by `setspeed` and by the step table.
    pub const MIN_PERCENT: u8 = 10;
    /// Highest percent accepted by `setspeed` and by the step table.
    pub const MAX_PERCENT: u8 = 100;
}

/// Configuration file discovery.
pub mod paths {
    /// Environment variable that points at an explicit config file
    pub const CONFIG_ENV: &str = "RACKFAN_CONFIG";

    /// Locations searched in order when no explicit config is given
    pub const CONFIG_LOCATIONS: &[&str] = &["/etc/rackfan/fan-control.json", "fan-control.json"];

    /// Present when systemd-journald is accepting native log messages
    pub const JOURNALD_SOCKET: &str = "/run/systemd/journal/socket";
}

/// Logging setup.
pub mod logging {
    /// Log filter environment variable (trace, debug, info, warn, error)
    pub const LOG_ENV: &str = "RACKFAN_LOG";
    pub const DEFAULT_LEVEL: &str = "info";
}

/// External tools invoked by the adapters.
pub mod tools {
    pub const IPMITOOL: &str = "ipmitool";
    pub const SENSORS: &str = "sensors";
    pub const DEFAULT_INTERFACE: &str = "lanplus";
    /// SDR record holding the chassis inlet temperature
    pub const AMBIENT_SENSOR: &str = "Ambient Temp";
}

/// Raw IPMI payloads for the Dell fan controller (netfn 0x30, cmd 0x30).
pub mod raw {
    pub const FAN_MODE_MANUAL: &[&str] = &["0x30", "0x30", "0x01", "0x00"];
    pub const FAN_MODE_AUTOMATIC: &[&str] = &["0x30", "0x30", "0x01", "0x01"];
    /// Followed by the speed byte; 0xff addresses all fans
    pub const FAN_SPEED_PREFIX: &[&str] = &["0x30", "0x30", "0x02", "0xff"];
}

/// Upper bound on configured speed steps.
pub const MAX_SPEED_STEPS: usize = 64;

/// Upper bound on `interval`, in seconds.
pub const MAX_INTERVAL_SECS: u64 = 3_600;

/// Upper bound on `cool_down_time`, in seconds.
pub const MAX_COOL_DOWN_SECS: u64 = 86_400;
