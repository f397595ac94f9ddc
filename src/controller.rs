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

//! Startup context shared by every CLI command.

use tracing::info;

use crate::config::Config;
use crate::control::{ControlLoop, LoopStats};
use crate::error::Result;
use crate::ipmi::{check_speed_percent, IpmiTool};
use crate::ports::{ActuatorPort, AmbientReading, FanSpeedReading, SensorPort, TemperatureReading};
use crate::sensors::HostSensors;
use crate::shutdown::Shutdown;

/// Configuration plus the two hardware ports, built once at startup.
pub struct FanController<S = HostSensors, A = IpmiTool> {
    config: Config,
    sensors: S,
    actuator: A,
}

impl FanController<HostSensors, IpmiTool> {
    /// Locate `ipmitool` and `sensors` and wire them to `config`.
    pub fn discover(config: Config) -> Result<Self> {
        let ipmi = IpmiTool::discover(config.connection())?;
        let sensors = HostSensors::discover(ipmi.clone())?;
        Ok(Self::new(config, sensors, ipmi))
    }
}

impl<S: SensorPort, A: ActuatorPort> FanController<S, A> {
    pub fn new(config: Config, sensors: S, actuator: A) -> Self {
        Self { config, sensors, actuator }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn get_fan_speed(&self) -> Result<FanSpeedReading> {
        self.sensors.read_fan_speed()
    }

    pub fn get_temperature(&self) -> Result<TemperatureReading> {
        self.sensors.read_temperature()
    }

    pub fn get_ambient(&self) -> Result<AmbientReading> {
        self.sensors.read_ambient()
    }

    /// A fresh loop over this controller's ports. Mode starts unknown.
    pub fn control_loop(&self) -> ControlLoop<&S, &A> {
        ControlLoop::from_config(&self.sensors, &self.actuator, &self.config)
    }

    /// Block until `shutdown` fires or a tick fails.
    pub fn run_loop(&self, shutdown: &Shutdown) -> Result<LoopStats> {
        self.control_loop().run(shutdown)
    }

    /// One-shot override: manual mode at a fixed percent.
    pub fn set_manual_speed(&self, percent: u8) -> Result<()> {
        check_speed_percent(percent)?;
        self.actuator.set_manual()?;
        self.actuator.set_speed(percent)?;
        info!("SPEED: fixed at {}% (manual override)", percent);
        Ok(())
    }

    pub fn reset_to_automatic(&self) -> Result<()> {
        self.actuator.set_automatic()?;
        info!("MODE: automatic fan control restored");
        Ok(())
    }
}
