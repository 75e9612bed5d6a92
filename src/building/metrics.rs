use crate::building::events::ElevatorEvent;
use crate::core::simulation_engine::SimulationObserver;
use crate::core::types::{ElevatorId, Floor, SimulationTime};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ElevatorStats {
    pub trips: u64,
    pub arrivals: u64,
    pub floors_travelled: u64,
    pub busy_time: SimulationTime,
    #[serde(skip)]
    last_floor: Floor,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSummary {
    pub total_trips: u64,
    pub total_arrivals: u64,
    pub total_floors_travelled: u64,
    pub last_event_time: SimulationTime,
    pub per_elevator: BTreeMap<ElevatorId, ElevatorStats>,
}

/// Accumulates fleet statistics from the event stream. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    summary: Arc<Mutex<MetricsSummary>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(&self) -> MetricsSummary {
        self.summary
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl SimulationObserver for MetricsCollector {
    fn on_elevator_event(&mut self, time: SimulationTime, event: &ElevatorEvent) {
        let mut summary = self
            .summary
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        summary.last_event_time = time;

        match *event {
            ElevatorEvent::MoveStarted {
                elevator_id,
                target_floor,
                duration,
            } => {
                let stats = summary.per_elevator.entry(elevator_id).or_default();
                let floors = stats.last_floor.abs_diff(target_floor) as u64;
                stats.trips += 1;
                stats.floors_travelled += floors;
                stats.busy_time += duration;
                stats.last_floor = target_floor;
                summary.total_trips += 1;
                summary.total_floors_travelled += floors;
            }
            ElevatorEvent::Arrived { elevator_id, .. } => {
                summary.per_elevator.entry(elevator_id).or_default().arrivals += 1;
                summary.total_arrivals += 1;
            }
            ElevatorEvent::BecameIdle { .. } => {}
        }
    }
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "trips={} arrivals={} floors={} last_event_at={}",
            self.total_trips, self.total_arrivals, self.total_floors_travelled, self.last_event_time
        )?;
        for (id, stats) in &self.per_elevator {
            writeln!(
                f,
                "  elevator {}: trips={} floors={} busy={}",
                id, stats.trips, stats.floors_travelled, stats.busy_time
            )?;
        }
        Ok(())
    }
}
