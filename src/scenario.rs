//! Call scripts for driving a simulation: hand-written or generated traffic.

use crate::core::errors::DispatchError;
use crate::core::simulation_engine::SimulationEngine;
use crate::core::types::{Floor, SimulationTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp};

#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioError {
    /// An entry of a call script could not be parsed
    Malformed(String),
    /// A generator parameter is out of range
    InvalidParameter(String),
}

impl std::fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioError::Malformed(entry) => {
                write!(f, "Malformed call entry '{}', expected <time>:<floor>", entry)
            }
            ScenarioError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
        }
    }
}

impl std::error::Error for ScenarioError {}

/// Calls to press, as `(time, floor)` pairs sorted by time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scenario {
    calls: Vec<(SimulationTime, Floor)>,
}

impl Scenario {
    pub fn new(mut calls: Vec<(SimulationTime, Floor)>) -> Self {
        // Stable sort keeps same-time calls in the order given
        calls.sort_by_key(|(time, _)| *time);
        Self { calls }
    }

    /// Parse a script like `"0:5,0:2,4:9"`. A bare floor means time 0.
    pub fn parse(input: &str) -> Result<Self, ScenarioError> {
        let mut calls = Vec::new();
        for entry in input.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let malformed = || ScenarioError::Malformed(entry.to_string());
            let (time, floor) = match entry.split_once(':') {
                Some((time, floor)) => (
                    time.trim()
                        .parse::<SimulationTime>()
                        .map_err(|_| malformed())?,
                    floor.trim().parse::<Floor>().map_err(|_| malformed())?,
                ),
                None => (0, entry.parse::<Floor>().map_err(|_| malformed())?),
            };
            calls.push((time, floor));
        }
        Ok(Self::new(calls))
    }

    /// Poisson call traffic: exponential gaps with the given mean, floors
    /// uniform over the building.
    pub fn random(
        seed: u64,
        count: usize,
        mean_interarrival: f64,
        num_floors: usize,
    ) -> Result<Self, ScenarioError> {
        if num_floors == 0 {
            return Err(ScenarioError::InvalidParameter(
                "Building must have at least one floor".to_string(),
            ));
        }
        if !(mean_interarrival > 0.0) {
            return Err(ScenarioError::InvalidParameter(format!(
                "Mean inter-arrival time must be positive, got {}",
                mean_interarrival
            )));
        }
        let gaps = Exp::new(1.0 / mean_interarrival)
            .map_err(|e| ScenarioError::InvalidParameter(e.to_string()))?;
        let mut rng = StdRng::seed_from_u64(seed);

        let mut clock = 0.0_f64;
        let calls = (0..count)
            .map(|_| {
                clock += gaps.sample(&mut rng);
                (clock.round() as SimulationTime, rng.gen_range(0..num_floors))
            })
            .collect();
        Ok(Self::new(calls))
    }

    pub fn calls(&self) -> &[(SimulationTime, Floor)] {
        &self.calls
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Schedule every call on `engine`, relative to time 0.
    ///
    /// Calls whose time has already passed are pressed at the current time.
    pub fn load_into(&self, engine: &mut SimulationEngine) -> Result<(), DispatchError> {
        let now = engine.current_time();
        for &(time, floor) in &self.calls {
            engine.schedule_call(floor, time.saturating_sub(now))?;
        }
        log::info!("Loaded scenario with {} calls", self.calls.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let scenario = Scenario::parse("4:9, 0:5,0:2,7").unwrap();
        assert_eq!(scenario.calls(), &[(0, 5), (0, 2), (0, 7), (4, 9)]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(
            Scenario::parse("1:x"),
            Err(ScenarioError::Malformed("1:x".to_string()))
        );
        assert!(Scenario::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_random_is_reproducible() {
        let a = Scenario::random(42, 20, 5.0, 10).unwrap();
        let b = Scenario::random(42, 20, 5.0, 10).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 20);
        assert!(a.calls().iter().all(|&(_, floor)| floor < 10));
        assert!(a.calls().windows(2).all(|w| w[0].0 <= w[1].0));
    }

    #[test]
    fn test_random_rejects_bad_parameters() {
        assert!(Scenario::random(1, 5, 0.0, 10).is_err());
        assert!(Scenario::random(1, 5, 2.0, 0).is_err());
    }
}
