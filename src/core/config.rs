//! Configuration for an elevator dispatch simulation
//!
//! Holds the building layout and the timing constants shared by every car.
use super::errors::{DispatchError, Result};
use super::types::{Floor, SimulationTime};
use serde::{Deserialize, Serialize};

pub const DEFAULT_NUM_ELEVATORS: usize = 5;
pub const DEFAULT_NUM_FLOORS: usize = 10;
pub const DEFAULT_TIME_PER_FLOOR: SimulationTime = 3;
pub const DEFAULT_DWELL_TIME: SimulationTime = 2;

/// Timing constants each elevator carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timing {
    /// Travel time for a single floor
    pub time_per_floor: SimulationTime,
    /// Door-open interval after an arrival
    pub dwell_time: SimulationTime,
}

impl Timing {
    /// Travel time between two floors: whole floors times `time_per_floor`
    pub fn travel_time(&self, from: Floor, to: Floor) -> SimulationTime {
        (from.abs_diff(to) as SimulationTime).saturating_mul(self.time_per_floor)
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            time_per_floor: DEFAULT_TIME_PER_FLOOR,
            dwell_time: DEFAULT_DWELL_TIME,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub num_elevators: usize,
    pub num_floors: usize,
    pub time_per_floor: SimulationTime,
    pub dwell_time: SimulationTime,
    /// Stop `run()` once the clock reaches this time
    pub max_time: Option<SimulationTime>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_elevators: DEFAULT_NUM_ELEVATORS,
            num_floors: DEFAULT_NUM_FLOORS,
            time_per_floor: DEFAULT_TIME_PER_FLOOR,
            dwell_time: DEFAULT_DWELL_TIME,
            max_time: None,
        }
    }
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_elevators(mut self, count: usize) -> Self {
        self.num_elevators = count;
        self
    }

    pub fn with_floors(mut self, count: usize) -> Self {
        self.num_floors = count;
        self
    }

    pub fn with_time_per_floor(mut self, units: SimulationTime) -> Self {
        self.time_per_floor = units;
        self
    }

    pub fn with_dwell_time(mut self, units: SimulationTime) -> Self {
        self.dwell_time = units;
        self
    }

    pub fn with_max_time(mut self, max_time: Option<SimulationTime>) -> Self {
        self.max_time = max_time;
        self
    }

    pub fn timing(&self) -> Timing {
        Timing {
            time_per_floor: self.time_per_floor,
            dwell_time: self.dwell_time,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_elevators == 0 {
            return Err(DispatchError::NoElevatorsConfigured);
        }
        if self.num_floors == 0 {
            return Err(DispatchError::InvalidConfiguration(
                "Building must have at least one floor".to_string(),
            ));
        }
        if self.time_per_floor == 0 {
            return Err(DispatchError::InvalidConfiguration(
                "Time per floor must be greater than 0".to_string(),
            ));
        }
        if self.dwell_time == 0 {
            return Err(DispatchError::InvalidConfiguration(
                "Dwell time must be greater than 0".to_string(),
            ));
        }
        // A full-height trip plus its dwell must fit on the clock
        let longest_trip = (self.num_floors as SimulationTime - 1)
            .checked_mul(self.time_per_floor)
            .and_then(|travel| travel.checked_add(self.dwell_time));
        if longest_trip.is_none() {
            return Err(DispatchError::InvalidConfiguration(
                "Travel time across the building does not fit in the clock".to_string(),
            ));
        }
        Ok(())
    }
}
