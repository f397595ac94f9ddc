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

//! The adaptive fan control loop.
//!
//! Each tick reads the hottest CPU core and either hands the fans back to
//! the controller firmware (above `max_manual_temp`) or drives them from
//! the step table in manual mode. Every way out of [`ControlLoop::run`]
//! goes through the same safety action, which commands automatic mode, so
//! the process never leaves the fans pinned at a manual speed.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{FanControlError, Result};
use crate::ports::{ActuatorPort, SensorPort};
use crate::shutdown::Shutdown;
use crate::speed_table::SpeedTable;
use crate::state::ControlState;

/// Timing and threshold parameters of the loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopSettings {
    pub max_manual_temp: f64,
    pub interval: Duration,
    pub cool_down: Duration,
}

impl From<&Config> for LoopSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            max_manual_temp: cfg.max_manual_temp,
            interval: cfg.interval(),
            cool_down: cfg.cool_down(),
        }
    }
}

/// What the caller should sleep for after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Manual mode, wait `interval`
    Normal,
    /// Over temperature, wait `cool_down`
    CoolDown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoopStats {
    pub ticks: u64,
    pub speed_changes: u64,
    pub cool_downs: u64,
}

/// Commands automatic mode when dropped while armed, so a panic inside a
/// tick or a sleep still hands the fans back to the firmware.
struct AutomaticOnDrop<'a, A: ActuatorPort> {
    actuator: &'a A,
    armed: bool,
}

impl<'a, A: ActuatorPort> AutomaticOnDrop<'a, A> {
    fn new(actuator: &'a A) -> Self {
        Self { actuator, armed: true }
    }

    fn actuator(&self) -> &'a A {
        self.actuator
    }

    /// Best effort, single attempt. Returns true if the controller accepted it.
    fn restore(mut self, cause: Option<&FanControlError>) -> bool {
        self.armed = false;
        match self.actuator.set_automatic() {
            Ok(()) => {
                match cause {
                    Some(e) => error!("SAFETY: {}; automatic fan control restored", e),
                    None => info!("SAFETY: automatic fan control restored"),
                }
                true
            }
            Err(restore_err) => {
                match cause {
                    Some(e) => error!(
                        "SAFETY: {}; restoring automatic fan control also failed: {}",
                        e, restore_err
                    ),
                    None => error!("SAFETY: failed to restore automatic fan control: {}", restore_err),
                }
                false
            }
        }
    }
}

impl<A: ActuatorPort> Drop for AutomaticOnDrop<'_, A> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match self.actuator.set_automatic() {
            Ok(()) => error!("SAFETY: control loop aborted; automatic fan control restored"),
            Err(e) => error!("SAFETY: control loop aborted; restoring automatic fan control failed: {}", e),
        }
    }
}

/// Decision state of the loop, kept apart from the ports so the drop guard
/// can borrow the actuator while ticks run.
struct LoopCore {
    table: SpeedTable,
    settings: LoopSettings,
    state: ControlState,
    stats: LoopStats,
}

impl LoopCore {
    fn tick<S: SensorPort, A: ActuatorPort>(&mut self, sensors: &S, actuator: &A) -> Result<TickOutcome> {
        self.stats.ticks += 1;
        let cur_temp = sensors.read_temperature()?.max;
        debug!("READ: cpu max {:.1}°C", cur_temp);

        if cur_temp > self.settings.max_manual_temp {
            if !self.state.is_automatic() {
                actuator.set_automatic()?;
                self.state.enter_automatic();
                warn!(
                    "MODE: {:.1}°C exceeds {:.1}°C, automatic fan control enabled",
                    cur_temp, self.settings.max_manual_temp
                );
            }
            self.stats.cool_downs += 1;
            info!("MODE: cooling down for {}s", self.settings.cool_down.as_secs());
            return Ok(TickOutcome::CoolDown);
        }

        if !self.state.is_manual() {
            actuator.set_manual()?;
            self.state.enter_manual();
            info!("MODE: manual fan control enabled at {:.1}°C", cur_temp);
        }

        let target = self.table.resolve(cur_temp)?;
        if self.state.needs_update(target) {
            actuator.set_speed(target)?;
            let previous = self.state.last_speed();
            self.state.set_manual_speed(target);
            self.stats.speed_changes += 1;
            match previous {
                Some(p) => info!("SPEED: {}% -> {}% at {:.1}°C", p, target, cur_temp),
                None => info!("SPEED: {}% at {:.1}°C", target, cur_temp),
            }
        }
        Ok(TickOutcome::Normal)
    }

    fn run_until_cancelled<S: SensorPort, A: ActuatorPort>(
        &mut self,
        sensors: &S,
        actuator: &A,
        shutdown: &Shutdown,
    ) -> Result<()> {
        loop {
            if shutdown.is_triggered() {
                info!("Cancellation requested");
                return Ok(());
            }
            let pause = match self.tick(sensors, actuator)? {
                TickOutcome::Normal => self.settings.interval,
                TickOutcome::CoolDown => self.settings.cool_down,
            };
            if shutdown.wait(pause) {
                info!("Cancellation requested");
                return Ok(());
            }
        }
    }
}

pub struct ControlLoop<S, A> {
    sensors: S,
    actuator: A,
    core: LoopCore,
}

impl<S: SensorPort, A: ActuatorPort> ControlLoop<S, A> {
    pub fn new(sensors: S, actuator: A, table: SpeedTable, settings: LoopSettings) -> Self {
        Self {
            sensors,
            actuator,
            core: LoopCore {
                table,
                settings,
                state: ControlState::new(),
                stats: LoopStats::default(),
            },
        }
    }

    pub fn from_config(sensors: S, actuator: A, cfg: &Config) -> Self {
        Self::new(sensors, actuator, SpeedTable::new(cfg.speed_steps.clone()), LoopSettings::from(cfg))
    }

    pub fn state(&self) -> &ControlState {
        &self.core.state
    }

    pub fn stats(&self) -> LoopStats {
        self.core.stats
    }

    /// One pass of the decision logic. Does not sleep and does not run the
    /// safety action; errors are returned as-is.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        self.core.tick(&self.sensors, &self.actuator)
    }

    /// Tick until `shutdown` fires or a tick fails. Automatic mode is
    /// commanded before returning in every case, and from the guard's
    /// `Drop` if a tick panics.
    pub fn run(&mut self, shutdown: &Shutdown) -> Result<LoopStats> {
        let settings = self.core.settings;
        info!(
            "Control loop started (interval {}s, cool-down {}s, manual ceiling {:.1}°C, {} steps)",
            settings.interval.as_secs(),
            settings.cool_down.as_secs(),
            settings.max_manual_temp,
            self.core.table.steps().len()
        );

        let guard = AutomaticOnDrop::new(&self.actuator);
        let result = self.core.run_until_cancelled(&self.sensors, guard.actuator(), shutdown);
        if guard.restore(result.as_ref().err()) {
            self.core.state.enter_automatic();
        }

        let stats = self.core.stats;
        info!(
            "Control loop stopped after {} ticks ({} speed changes, {} cool-downs)",
            stats.ticks, stats.speed_changes, stats.cool_downs
        );
        result.map(|()| stats)
    }
}
