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

use std::env;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, trace};

use crate::error::{FanControlError, Result};

/// Runs an external program and returns its stdout.
pub trait CommandRunner {
    fn run(&self, program: &Path, args: &[String]) -> std::result::Result<String, String>;
}

/// Spawns real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[String]) -> std::result::Result<String, String> {
        trace!("EXEC: {} ({} args)", program.display(), args.len());
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| format!("failed to run {}: {}", program.display(), e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "{} exited with {}: {}",
                program.display(),
                output.status,
                stderr.trim()
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, program: &Path, args: &[String]) -> std::result::Result<String, String> {
        (**self).run(program, args)
    }
}

fn is_executable(path: &Path) -> bool {
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Find `name` on `$PATH`, like `which`.
pub fn locate_tool(name: &str) -> Result<PathBuf> {
    let search = env::var_os("PATH").unwrap_or_default();
    locate_tool_in(name, &search)
}

pub fn locate_tool_in(name: &str, search: &std::ffi::OsStr) -> Result<PathBuf> {
    for dir in env::split_paths(search) {
        let candidate = dir.join(name);
        if is_executable(&candidate) {
            debug!("Found {} at {}", name, candidate.display());
            return Ok(candidate);
        }
    }
    Err(FanControlError::ToolNotFound(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn make_tool(dir: &Path, name: &str, mode: u32) -> PathBuf {
        let p = dir.join(name);
        fs::write(&p, "#!/bin/sh\necho ok\n").unwrap();
        fs::set_permissions(&p, fs::Permissions::from_mode(mode)).unwrap();
        p
    }

    #[test]
    fn test_locate_tool_finds_executable() {
        let dir = TempDir::new().unwrap();
        let tool = make_tool(dir.path(), "ipmitool", 0o755);
        let found = locate_tool_in("ipmitool", dir.path().as_os_str()).unwrap();
        assert_eq!(found, tool);
    }

    #[test]
    fn test_locate_tool_skips_non_executable() {
        let dir = TempDir::new().unwrap();
        make_tool(dir.path(), "sensors", 0o644);
        let err = locate_tool_in("sensors", dir.path().as_os_str()).unwrap_err();
        assert!(matches!(err, FanControlError::ToolNotFound(ref n) if n == "sensors"));
    }

    #[test]
    fn test_locate_tool_search_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        make_tool(second.path(), "ipmitool", 0o755);
        let winner = make_tool(first.path(), "ipmitool", 0o755);
        let search = env::join_paths([first.path(), second.path()]).unwrap();
        assert_eq!(locate_tool_in("ipmitool", &search).unwrap(), winner);
    }

    #[test]
    fn test_locate_tool_empty_path() {
        assert!(locate_tool_in("ipmitool", std::ffi::OsStr::new("")).is_err());
    }

    #[test]
    fn test_system_runner_captures_stdout() {
        let out = SystemRunner
            .run(Path::new("/bin/sh"), &["-c".to_string(), "echo hello".to_string()])
            .unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[test]
    fn test_system_runner_reports_failure() {
        let err = SystemRunner
            .run(Path::new("/bin/sh"), &["-c".to_string(), "echo boom >&2; exit 3".to_string()])
            .unwrap_err();
        assert!(err.contains("boom"));
    }

    #[test]
    fn test_system_runner_missing_program() {
        let err = SystemRunner.run(Path::new("/nonexistent/tool"), &[]).unwrap_err();
        assert!(err.contains("failed to run"));
    }
}
