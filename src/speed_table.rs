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

use tracing::trace;

use crate::config::SpeedStep;
use crate::error::{FanControlError, Result};

/// Ordered temperature ranges mapped to fan percentages. First match wins.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedTable {
    steps: Vec<SpeedStep>,
}

impl SpeedTable {
    pub fn new(steps: Vec<SpeedStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[SpeedStep] {
        &self.steps
    }

    /// Percent for `temp`, or `NoMatchingRange` when no step covers it.
    pub fn resolve(&self, temp: f64) -> Result<u8> {
        let step = self
            .steps
            .iter()
            .find(|s| s.contains(temp))
            .ok_or(FanControlError::NoMatchingRange { temp })?;
        trace!("{:.1}°C -> {}% ({}..{})", temp, step.percent, step.from, step.to);
        Ok(step.percent)
    }
}

impl From<Vec<SpeedStep>> for SpeedTable {
    fn from(steps: Vec<SpeedStep>) -> Self {
        Self::new(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_table() -> SpeedTable {
        SpeedTable::new(vec![
            SpeedStep::closed(0.0, 40.0, 20),
            SpeedStep::closed(40.0, 60.0, 40),
            SpeedStep::closed(60.0, 70.0, 70),
        ])
    }

    #[test]
    fn test_resolve_inside_ranges() {
        let table = create_test_table();
        assert_eq!(table.resolve(30.0).unwrap(), 20);
        assert_eq!(table.resolve(45.0).unwrap(), 40);
        assert_eq!(table.resolve(65.0).unwrap(), 70);
        assert_eq!(table.resolve(70.0).unwrap(), 70);
    }

    #[test]
    fn test_shared_boundary_goes_to_first_step() {
        assert_eq!(create_test_table().resolve(40.0).unwrap(), 20);
        assert_eq!(create_test_table().resolve(60.0).unwrap(), 40);
    }

    #[test]
    fn test_half_open_upper_bound() {
        let table = SpeedTable::new(vec![
            SpeedStep::half_open(0.0, 40.0, 20),
            SpeedStep::half_open(40.0, 60.0, 40),
        ]);
        assert_eq!(table.resolve(40.0).unwrap(), 40);
        assert!(table.resolve(60.0).is_err());
    }

    #[test]
    fn test_outside_all_ranges() {
        let table = create_test_table();
        match table.resolve(75.0) {
            Err(FanControlError::NoMatchingRange { temp }) => assert_eq!(temp, 75.0),
            other => panic!("expected NoMatchingRange, got {other:?}"),
        }
        assert!(table.resolve(-1.0).is_err());
    }

    #[test]
    fn test_gap_surfaces_at_lookup() {
        let table = SpeedTable::new(vec![
            SpeedStep::closed(0.0, 40.0, 20),
            SpeedStep::closed(50.0, 60.0, 40),
        ]);
        assert!(matches!(table.resolve(45.0), Err(FanControlError::NoMatchingRange { .. })));
    }

    #[test]
    fn test_overlap_declaration_order_wins() {
        let table = SpeedTable::new(vec![
            SpeedStep::closed(30.0, 60.0, 50),
            SpeedStep::closed(0.0, 50.0, 20),
        ]);
        assert_eq!(table.resolve(45.0).unwrap(), 50);
        assert_eq!(table.resolve(10.0).unwrap(), 20);
    }

    #[test]
    fn test_nan_matches_nothing() {
        assert!(create_test_table().resolve(f64::NAN).is_err());
    }

    #[test]
    fn test_empty_table() {
        assert!(SpeedTable::from(Vec::new()).resolve(20.0).is_err());
    }
}
