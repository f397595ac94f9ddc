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

//! Rackfan - adaptive IPMI fan control for rack servers
//!
//! This library reads CPU and chassis temperatures, maps them onto a fan
//! speed step table, and drives the fans through the management controller.
//! Control is handed back to the controller firmware whenever manual control
//! would be unsafe.

pub mod cli;
pub mod config;
pub mod constants;
pub mod control;
pub mod controller;
pub mod error;
pub mod ipmi;
pub mod logger;
pub mod ports;
pub mod sensors;
pub mod shutdown;
pub mod speed_table;
pub mod state;
pub mod transport;

#[cfg(test)]
pub mod test_utils;

pub use config::{Config, SpeedStep};
pub use control::{ControlLoop, LoopSettings, LoopStats, TickOutcome};
pub use controller::FanController;
pub use error::{FanControlError, Result};
pub use ports::{ActuatorPort, AmbientReading, FanSpeedReading, SensorPort, TemperatureReading};
pub use shutdown::Shutdown;
pub use speed_table::SpeedTable;
