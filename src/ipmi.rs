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

//! Management controller access through `ipmitool`.
//!
//! Fan mode and speed are driven with the Dell OEM raw commands; the SDR
//! queries for ambient temperature and fan RPM go through the same handle
//! so that connection parameters live in exactly one place.

use std::path::PathBuf;

use tracing::debug;

use crate::config::IpmiConnection;
use crate::constants::{raw, speed, tools};
use crate::error::{FanControlError, Result};
use crate::ports::ActuatorPort;
use crate::transport::{locate_tool, CommandRunner, SystemRunner};

/// Speed byte for the raw set-speed command, e.g. `35` -> `0x23`.
pub fn speed_byte(percent: u8) -> String {
    format!("0x{:02X}", percent)
}

pub fn check_speed_percent(percent: u8) -> Result<()> {
    if (speed::MIN_PERCENT..=speed::MAX_PERCENT).contains(&percent) {
        Ok(())
    } else {
        Err(FanControlError::OutOfRange {
            value: percent,
            min: speed::MIN_PERCENT,
            max: speed::MAX_PERCENT,
        })
    }
}

#[derive(Debug, Clone)]
pub struct IpmiTool<R: CommandRunner = SystemRunner> {
    program: PathBuf,
    connection: IpmiConnection,
    runner: R,
}

impl IpmiTool<SystemRunner> {
    /// Locate `ipmitool` on `$PATH`.
    pub fn discover(connection: IpmiConnection) -> Result<Self> {
        let program = locate_tool(tools::IPMITOOL)?;
        Ok(Self::new(program, connection, SystemRunner))
    }
}

impl<R: CommandRunner> IpmiTool<R> {
    pub fn new(program: PathBuf, connection: IpmiConnection, runner: R) -> Self {
        Self { program, connection, runner }
    }

    pub fn connection(&self) -> &IpmiConnection {
        &self.connection
    }

    fn session_args(&self) -> Vec<String> {
        let c = &self.connection;
        vec![
            "-I".to_string(), c.interface.clone(),
            "-H".to_string(), c.host.clone(),
            "-U".to_string(), c.user.clone(),
            "-P".to_string(), c.pass.clone(),
        ]
    }

    /// Run one ipmitool command against the configured endpoint.
    /// The argument list carries the password and is never logged.
    pub fn invoke(&self, args: &[&str]) -> std::result::Result<String, String> {
        let mut full = self.session_args();
        full.extend(args.iter().map(|a| a.to_string()));
        self.runner.run(&self.program, &full)
    }

    pub fn sdr_ambient(&self) -> std::result::Result<String, String> {
        self.invoke(&["sdr", "get", tools::AMBIENT_SENSOR])
    }

    pub fn sdr_fans(&self) -> std::result::Result<String, String> {
        self.invoke(&["sdr", "type", "Fan"])
    }

    fn raw(&self, payload: &[&str]) -> std::result::Result<String, String> {
        let mut args = vec!["raw"];
        args.extend_from_slice(payload);
        self.invoke(&args)
    }
}

impl<R: CommandRunner> ActuatorPort for IpmiTool<R> {
    fn set_manual(&self) -> Result<()> {
        self.raw(raw::FAN_MODE_MANUAL)
            .map_err(|e| FanControlError::actuator(format!("enable manual fan control: {}", e)))?;
        debug!("ACTION: manual fan control enabled on {}", self.connection.host);
        Ok(())
    }

    fn set_automatic(&self) -> Result<()> {
        self.raw(raw::FAN_MODE_AUTOMATIC)
            .map_err(|e| FanControlError::actuator(format!("restore automatic fan control: {}", e)))?;
        debug!("ACTION: automatic fan control restored on {}", self.connection.host);
        Ok(())
    }

    fn set_speed(&self, percent: u8) -> Result<()> {
        check_speed_percent(percent)?;
        let byte = speed_byte(percent);
        let mut payload: Vec<&str> = raw::FAN_SPEED_PREFIX.to_vec();
        payload.push(&byte);
        self.raw(&payload)
            .map_err(|e| FanControlError::actuator(format!("set fan speed {}%: {}", percent, e)))?;
        debug!("ACTION: fan speed set to {}% ({})", percent, byte);
        Ok(())
    }
}
