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

use std::path::Path;

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::constants::{logging, paths};

#[derive(Debug, Clone, Copy, Default)]
pub struct LogOptions {
    /// Force debug level regardless of RACKFAN_LOG
    pub verbose: bool,
    /// Send events to the systemd journal when it is reachable
    pub journald: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSink {
    Journald,
    Stderr,
}

pub fn log_level(opts: LogOptions) -> String {
    if opts.verbose {
        return "debug".to_string();
    }
    std::env::var(logging::LOG_ENV)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| logging::DEFAULT_LEVEL.to_string())
}

/// Install the global subscriber. Returns where events end up.
pub fn init_logging(opts: LogOptions) -> LogSink {
    let level = log_level(opts);

    if opts.journald && Path::new(paths::JOURNALD_SOCKET).exists() {
        match tracing_journald::layer() {
            Ok(journald_layer) => {
                let _ = tracing_subscriber::registry()
                    .with(journald_layer)
                    .with(EnvFilter::new(&level))
                    .try_init();
                return LogSink::Journald;
            }
            Err(e) => {
                eprintln!("Failed to create journald layer: {}, falling back to stderr", e);
            }
        }
    }

    let _ = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::new(&level))
        .try_init();
    LogSink::Stderr
}
