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

//! In-memory view of what the fan controller was last told.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanMode {
    Manual,
    Automatic,
}

impl fmt::Display for FanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FanMode::Manual => write!(f, "manual"),
            FanMode::Automatic => write!(f, "automatic"),
        }
    }
}

/// Mode and last commanded speed. `mode` is `None` until the first
/// mode command, since the hardware state at startup is unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlState {
    mode: Option<FanMode>,
    last_speed: Option<u8>,
}

impl ControlState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Option<FanMode> {
        self.mode
    }

    /// Only meaningful in manual mode.
    pub fn last_speed(&self) -> Option<u8> {
        self.last_speed
    }

    pub fn is_manual(&self) -> bool {
        self.mode == Some(FanMode::Manual)
    }

    pub fn is_automatic(&self) -> bool {
        self.mode == Some(FanMode::Automatic)
    }

    /// Forgets the last speed so the next manual target is always sent.
    pub fn enter_automatic(&mut self) {
        self.mode = Some(FanMode::Automatic);
        self.last_speed = None;
    }

    pub fn enter_manual(&mut self) {
        if !self.is_manual() {
            self.last_speed = None;
        }
        self.mode = Some(FanMode::Manual);
    }

    pub fn set_manual_speed(&mut self, percent: u8) {
        debug_assert!(self.is_manual(), "speed recorded outside manual mode");
        self.last_speed = Some(percent);
    }

    pub fn needs_update(&self, percent: u8) -> bool {
        self.is_manual() && self.last_speed != Some(percent)
    }
}
