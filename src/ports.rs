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

//! Hardware boundary of the control loop.
//!
//! The loop only ever sees typed readings and [`FanControlError`] values.
//! Adapters behind these traits may shell out and scrape text, but an empty
//! or unparseable result must surface as `SensorUnavailable`, never as a
//! zero reading that could look like a cold machine.
//!
//! [`FanControlError`]: crate::error::FanControlError

use serde::Serialize;

use crate::error::Result;

/// CPU core temperatures (°C) from one sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TemperatureReading {
    pub min: f64,
    pub max: f64,
}

/// Chassis inlet temperature as reported by the management controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmbientReading {
    pub current: i32,
    pub warn: Option<i32>,
    pub crit: Option<i32>,
    pub status: Option<String>,
}

/// Fan speeds (RPM) across all fan units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FanSpeedReading {
    pub min: u32,
    pub max: u32,
}

/// Read side: hardware to domain.
#[cfg_attr(test, mockall::automock)]
pub trait SensorPort {
    fn read_temperature(&self) -> Result<TemperatureReading>;

    fn read_ambient(&self) -> Result<AmbientReading>;

    fn read_fan_speed(&self) -> Result<FanSpeedReading>;
}

/// Write side: domain to hardware.
#[cfg_attr(test, mockall::automock)]
pub trait ActuatorPort {
    /// Hand fan control to this process.
    fn set_manual(&self) -> Result<()>;

    /// Hand fan control back to the controller firmware.
    fn set_automatic(&self) -> Result<()>;

    /// Command a fixed speed in percent of maximum. Fails with
    /// `OutOfRange` outside the accepted bounds.
    fn set_speed(&self, percent: u8) -> Result<()>;
}

impl<T: SensorPort + ?Sized> SensorPort for &T {
    fn read_temperature(&self) -> Result<TemperatureReading> {
        (**self).read_temperature()
    }

    fn read_ambient(&self) -> Result<AmbientReading> {
        (**self).read_ambient()
    }

    fn read_fan_speed(&self) -> Result<FanSpeedReading> {
        (**self).read_fan_speed()
    }
}

impl<T: ActuatorPort + ?Sized> ActuatorPort for &T {
    fn set_manual(&self) -> Result<()> {
        (**self).set_manual()
    }

    fn set_automatic(&self) -> Result<()> {
        (**self).set_automatic()
    }

    fn set_speed(&self, percent: u8) -> Result<()> {
        (**self).set_speed(percent)
    }
}
