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

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Cancellation flag shared between the signal handler and the control loop.
/// Sleeps taken through [`Shutdown::wait`] end as soon as it is triggered.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    triggered: Mutex<bool>,
    cond: Condvar,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        let mut triggered = self.inner.triggered.lock();
        *triggered = true;
        self.inner.cond.notify_all();
    }

    pub fn is_triggered(&self) -> bool {
        *self.inner.triggered.lock()
    }

    /// Sleep up to `timeout`. Returns true if shutdown was requested.
    pub fn wait(&self, timeout: Duration) -> bool {
        let mut triggered = self.inner.triggered.lock();
        match Instant::now().checked_add(timeout) {
            Some(deadline) => {
                while !*triggered {
                    if self.inner.cond.wait_until(&mut triggered, deadline).timed_out() {
                        break;
                    }
                }
            }
            // Past the end of the clock: only a trigger ends the wait.
            None => {
                while !*triggered {
                    self.inner.cond.wait(&mut triggered);
                }
            }
        }
        *triggered
    }
}
