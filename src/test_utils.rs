/*
 * Test utilities and fakes for Rackfan
 *
 * This module provides scripted stand-ins for the hardware ports and the
 * process runner, plus builders for common test fixtures.
 */

#[cfg(test)]
pub mod test_utils {
    use crate::config::{Config, IpmiConnection, SpeedStep};
    use crate::error::{FanControlError, Result};
    use crate::ipmi::check_speed_percent;
    use crate::ports::{ActuatorPort, AmbientReading, FanSpeedReading, SensorPort, TemperatureReading};
    use crate::transport::CommandRunner;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use tempfile::NamedTempFile;

    /// Connection used by every adapter test
    pub fn create_test_connection() -> IpmiConnection {
        IpmiConnection {
            host: "10.0.0.20".to_string(),
            user: "root".to_string(),
            pass: "calvin".to_string(),
            interface: "lanplus".to_string(),
        }
    }

    /// Three-step table with a 70°C manual ceiling
    pub fn create_test_config() -> Config {
        let conn = create_test_connection();
        Config {
            host: conn.host,
            user: conn.user,
            pass: conn.pass,
            interface: conn.interface,
            max_manual_temp: 70.0,
            cool_down_time: 120,
            interval: 10,
            speed_steps: vec![
                SpeedStep::closed(0.0, 40.0, 20),
                SpeedStep::closed(40.0, 60.0, 40),
                SpeedStep::closed(60.0, 70.0, 70),
            ],
        }
    }

    /// Creates a temporary file with JSON content
    pub fn create_temp_json_file<T: serde::Serialize>(data: &T) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        let json = serde_json::to_string_pretty(data).unwrap();
        temp_file.write_all(json.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    /// Runner that replays queued stdout/error results and records each call.
    /// An unscripted call fails.
    #[derive(Default)]
    pub struct FakeRunner {
        responses: RefCell<VecDeque<std::result::Result<String, String>>>,
        calls: RefCell<Vec<(PathBuf, Vec<String>)>>,
    }

    impl FakeRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_ok(&self, stdout: &str) {
            self.responses.borrow_mut().push_back(Ok(stdout.to_string()));
        }

        pub fn push_err(&self, message: &str) {
            self.responses.borrow_mut().push_back(Err(message.to_string()));
        }

        pub fn calls(&self) -> Vec<(PathBuf, Vec<String>)> {
            self.calls.borrow().clone()
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, program: &Path, args: &[String]) -> std::result::Result<String, String> {
            self.calls.borrow_mut().push((program.to_path_buf(), args.to_vec()));
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(format!("unscripted call to {}", program.display())))
        }
    }

    /// Sensor fake fed from a list of CPU maxima. `None` entries and an
    /// exhausted script both read as `SensorUnavailable`.
    pub struct ScriptedSensors {
        temps: RefCell<VecDeque<Option<f64>>>,
        reads: Cell<usize>,
    }

    impl ScriptedSensors {
        pub fn new(temps: &[f64]) -> Self {
            Self::with_failures(&temps.iter().copied().map(Some).collect::<Vec<_>>())
        }

        pub fn with_failures(temps: &[Option<f64>]) -> Self {
            Self {
                temps: RefCell::new(temps.iter().copied().collect()),
                reads: Cell::new(0),
            }
        }

        pub fn reads(&self) -> usize {
            self.reads.get()
        }
    }

    impl SensorPort for ScriptedSensors {
        fn read_temperature(&self) -> Result<TemperatureReading> {
            self.reads.set(self.reads.get() + 1);
            match self.temps.borrow_mut().pop_front() {
                Some(Some(t)) => Ok(TemperatureReading { min: t - 5.0, max: t }),
                Some(None) => Err(FanControlError::sensor("cpu temperature: scripted failure")),
                None => Err(FanControlError::sensor("cpu temperature: script exhausted")),
            }
        }

        fn read_ambient(&self) -> Result<AmbientReading> {
            Ok(AmbientReading {
                current: 23,
                warn: Some(42),
                crit: Some(47),
                status: Some("ok".to_string()),
            })
        }

        fn read_fan_speed(&self) -> Result<FanSpeedReading> {
            Ok(FanSpeedReading { min: 3480, max: 3720 })
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum FanCommand {
        Manual,
        Automatic,
        Speed(u8),
    }

    /// Actuator that records every command it receives, including failed ones.
    #[derive(Default)]
    pub struct RecordingActuator {
        commands: RefCell<Vec<FanCommand>>,
        failing: bool,
    }

    impl RecordingActuator {
        pub fn new() -> Self {
            Self::default()
        }

        /// Every command is recorded and then fails with `ActuatorUnavailable`.
        pub fn failing() -> Self {
            Self { commands: RefCell::new(Vec::new()), failing: true }
        }

        pub fn commands(&self) -> Vec<FanCommand> {
            self.commands.borrow().clone()
        }

        pub fn count(&self, command: FanCommand) -> usize {
            self.commands.borrow().iter().filter(|c| **c == command).count()
        }

        fn record(&self, command: FanCommand) -> Result<()> {
            self.commands.borrow_mut().push(command);
            if self.failing {
                return Err(FanControlError::actuator(format!("{:?}: session refused", command)));
            }
            Ok(())
        }
    }

    impl ActuatorPort for RecordingActuator {
        fn set_manual(&self) -> Result<()> {
            self.record(FanCommand::Manual)
        }

        fn set_automatic(&self) -> Result<()> {
            self.record(FanCommand::Automatic)
        }

        fn set_speed(&self, percent: u8) -> Result<()> {
            check_speed_percent(percent)?;
            self.record(FanCommand::Speed(percent))
        }
    }

    /// Asserts that two floating point numbers are approximately equal
    pub fn assert_approx_eq(a: f64, b: f64, tolerance: f64) {
        assert!(
            (a - b).abs() < tolerance,
            "Values {} and {} are not approximately equal (tolerance: {})",
            a, b, tolerance
        );
    }
}

#[cfg(test)]
mod tests {
    use super::test_utils::*;
    use crate::config::{load_config_from, Config};
    use crate::ports::{ActuatorPort, SensorPort};

    #[test]
    fn test_scripted_sensors_replay_then_fail() {
        let sensors = ScriptedSensors::with_failures(&[Some(30.0), None]);
        assert_eq!(sensors.read_temperature().unwrap().max, 30.0);
        assert!(sensors.read_temperature().is_err());
        assert!(sensors.read_temperature().is_err());
        assert_eq!(sensors.reads(), 3);
    }

    #[test]
    fn test_recording_actuator_rejects_out_of_range() {
        let actuator = RecordingActuator::new();
        actuator.set_manual().unwrap();
        actuator.set_speed(40).unwrap();
        assert!(actuator.set_speed(101).is_err());
        assert_eq!(actuator.commands(), vec![FanCommand::Manual, FanCommand::Speed(40)]);
    }

    #[test]
    fn test_failing_actuator_still_records() {
        let actuator = RecordingActuator::failing();
        assert!(actuator.set_automatic().is_err());
        assert_eq!(actuator.count(FanCommand::Automatic), 1);
    }

    #[test]
    fn test_test_config_round_trips_through_file() {
        let cfg = create_test_config();
        let file = create_temp_json_file(&cfg);
        let loaded: Config = load_config_from(file.path()).unwrap();
        assert_eq!(loaded.speed_steps, cfg.speed_steps);
        assert_approx_eq(loaded.max_manual_temp, 70.0, 1e-9);
    }
}
