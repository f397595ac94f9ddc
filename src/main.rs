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

use anyhow::Context;
use clap::Parser;
use crossterm::style::Stylize;
use tracing::{info, warn};

use rackfan::cli::{self, Cli, Commands};
use rackfan::config::load_config;
use rackfan::logger::{init_logging, LogOptions};
use rackfan::{FanController, Shutdown};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(LogOptions { verbose: cli.verbose, journald: cli.journald });

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    let controller = FanController::discover(config).context("Required tools are not installed")?;

    match cli.command {
        Commands::Fanspeed => {
            let reading = controller.get_fan_speed()?;
            println!("{}", cli::format_fan_speed(&reading));
        }
        Commands::Temp => {
            let reading = controller.get_temperature()?;
            println!("{}", cli::format_temperature(&reading));
        }
        Commands::Ambient => {
            let reading = controller.get_ambient()?;
            let [current, warning, critical] = cli::format_ambient(&reading);
            println!("{}", current);
            println!("{}", warning.yellow());
            println!("{}", critical.red());
        }
        Commands::Setspeed { percent } => {
            controller.set_manual_speed(percent)?;
            println!("{}", format!("Fan speed set to {}%", percent).cyan());
        }
        Commands::Reset => {
            controller.reset_to_automatic()?;
            println!("{}", "Automatic fan control restored".green());
        }
        Commands::Start => run_loop(&controller)?,
    }
    Ok(())
}

fn run_loop(controller: &FanController) -> anyhow::Result<()> {
    let shutdown = Shutdown::new();
    let handler = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("SIGNAL: Received SIGINT/SIGTERM - initiating shutdown");
        handler.trigger();
    }) {
        warn!("Failed to set signal handler: {}. Shutdown via signals may not work cleanly.", e);
    }

    println!("{}", "Starting fan control loop".white().bold());
    let stats = controller.run_loop(&shutdown).context("Fan control loop stopped")?;
    println!(
        "{}",
        format!(
            "Automatic fan control restored after {} ticks ({} speed changes, {} cool-downs)",
            stats.ticks, stats.speed_changes, stats.cool_downs
        )
        .green()
    );
    Ok(())
}
