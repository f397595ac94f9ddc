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

use std::path::PathBuf;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::constants::tools;
use crate::error::{FanControlError, Result};
use crate::ipmi::IpmiTool;
use crate::ports::{AmbientReading, FanSpeedReading, SensorPort, TemperatureReading};
use crate::transport::{locate_tool, CommandRunner, SystemRunner};

lazy_static! {
    // lm-sensors coretemp line, e.g. "Core 0:       +38.0°C  (high = +80.0°C, crit = +100.0°C)"
    static ref CORE_TEMP_RE: Regex =
        Regex::new(r"^Core.*\+(\d+\.\d+)°C\s+\(").expect("core temperature pattern");
    static ref SENSOR_READING_RE: Regex =
        Regex::new(r"Sensor Reading\s+:\s+(\d+)").expect("sensor reading pattern");
    static ref UPPER_CRIT_RE: Regex =
        Regex::new(r"Upper critical\s+:\s+(\d+)").expect("upper critical pattern");
    static ref UPPER_NON_CRIT_RE: Regex =
        Regex::new(r"Upper non-critical\s+:\s+(\d+)").expect("upper non-critical pattern");
    static ref STATUS_RE: Regex = Regex::new(r"Status\s+:\s+(\w+)").expect("status pattern");
    static ref FAN_RPM_RE: Regex = Regex::new(r"(\d+)\s+RPM$").expect("fan rpm pattern");
}

fn capture<T: std::str::FromStr>(re: &Regex, line: &str) -> Option<T> {
    re.captures(line)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Min/max over every CPU core line of `sensors` output.
pub fn parse_core_temperatures(output: &str) -> Option<TemperatureReading> {
    let mut reading: Option<TemperatureReading> = None;
    for line in output.lines() {
        let Some(t) = capture::<f64>(&CORE_TEMP_RE, line) else { continue };
        reading = Some(match reading {
            Some(r) => TemperatureReading { min: r.min.min(t), max: r.max.max(t) },
            None => TemperatureReading { min: t, max: t },
        });
    }
    reading
}

/// Fields of `ipmitool sdr get "Ambient Temp"`. The current reading is required.
pub fn parse_ambient(output: &str) -> Option<AmbientReading> {
    let mut current = None;
    let mut warn = None;
    let mut crit = None;
    let mut status = None;
    for line in output.lines() {
        if let Some(v) = capture(&SENSOR_READING_RE, line) {
            current = Some(v);
        } else if let Some(v) = capture(&UPPER_CRIT_RE, line) {
            crit = Some(v);
        } else if let Some(v) = capture(&UPPER_NON_CRIT_RE, line) {
            warn = Some(v);
        } else if let Some(v) = capture::<String>(&STATUS_RE, line) {
            status = Some(v);
        }
    }
    Some(AmbientReading { current: current?, warn, crit, status })
}

/// Min/max RPM over the lines of `ipmitool sdr type Fan`.
pub fn parse_fan_speeds(output: &str) -> Option<FanSpeedReading> {
    let mut reading: Option<FanSpeedReading> = None;
    for line in output.lines() {
        let Some(rpm) = capture::<u32>(&FAN_RPM_RE, line.trim_end()) else { continue };
        reading = Some(match reading {
            Some(r) => FanSpeedReading { min: r.min.min(rpm), max: r.max.max(rpm) },
            None => FanSpeedReading { min: rpm, max: rpm },
        });
    }
    reading
}

/// CPU temperatures from lm-sensors, ambient and fans from the management controller.
#[derive(Debug, Clone)]
pub struct HostSensors<R: CommandRunner = SystemRunner> {
    sensors_program: PathBuf,
    ipmi: IpmiTool<R>,
    runner: R,
}

impl HostSensors<SystemRunner> {
    /// Locate `sensors` on `$PATH`.
    pub fn discover(ipmi: IpmiTool<SystemRunner>) -> Result<Self> {
        let program = locate_tool(tools::SENSORS)?;
        Ok(Self::new(program, ipmi, SystemRunner))
    }
}

impl<R: CommandRunner> HostSensors<R> {
    pub fn new(sensors_program: PathBuf, ipmi: IpmiTool<R>, runner: R) -> Self {
        Self { sensors_program, ipmi, runner }
    }
}

impl<R: CommandRunner> SensorPort for HostSensors<R> {
    fn read_temperature(&self) -> Result<TemperatureReading> {
        let output = self
            .runner
            .run(&self.sensors_program, &[])
            .map_err(|e| FanControlError::sensor(format!("cpu temperature: {}", e)))?;
        let reading = parse_core_temperatures(&output)
            .ok_or_else(|| FanControlError::sensor("cpu temperature: no core readings in sensors output"))?;
        debug!("READ: cpu {:.1}-{:.1}°C", reading.min, reading.max);
        Ok(reading)
    }

    fn read_ambient(&self) -> Result<AmbientReading> {
        let output = self
            .ipmi
            .sdr_ambient()
            .map_err(|e| FanControlError::sensor(format!("ambient temperature: {}", e)))?;
        parse_ambient(&output)
            .ok_or_else(|| FanControlError::sensor("ambient temperature: no sensor reading in sdr output"))
    }

    fn read_fan_speed(&self) -> Result<FanSpeedReading> {
        let output = self
            .ipmi
            .sdr_fans()
            .map_err(|e| FanControlError::sensor(format!("fan speed: {}", e)))?;
        parse_fan_speeds(&output)
            .ok_or_else(|| FanControlError::sensor("fan speed: no RPM values in sdr output"))
    }
}
