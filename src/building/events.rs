use crate::core::types::{ElevatorId, Floor, SimulationTime};
use serde::{Deserialize, Serialize};

pub const MOVE_STARTED_EVENT: &str = "move_started";
pub const ARRIVED_EVENT: &str = "arrived";
pub const BECAME_IDLE_EVENT: &str = "became_idle";

/// Notifications for the presentation layer (rendering, sound, countdowns).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ElevatorEvent {
    MoveStarted {
        elevator_id: ElevatorId,
        target_floor: Floor,
        duration: SimulationTime,
    },
    Arrived {
        elevator_id: ElevatorId,
        floor: Floor,
    },
    BecameIdle {
        elevator_id: ElevatorId,
    },
}

impl ElevatorEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            ElevatorEvent::MoveStarted { .. } => MOVE_STARTED_EVENT,
            ElevatorEvent::Arrived { .. } => ARRIVED_EVENT,
            ElevatorEvent::BecameIdle { .. } => BECAME_IDLE_EVENT,
        }
    }

    pub fn elevator_id(&self) -> ElevatorId {
        match self {
            ElevatorEvent::MoveStarted { elevator_id, .. }
            | ElevatorEvent::Arrived { elevator_id, .. }
            | ElevatorEvent::BecameIdle { elevator_id } => *elevator_id,
        }
    }
}

impl std::fmt::Display for ElevatorEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElevatorEvent::MoveStarted {
                elevator_id,
                target_floor,
                duration,
            } => write!(
                f,
                "elevator {} moving to floor {} (arrival in {})",
                elevator_id, target_floor, duration
            ),
            ElevatorEvent::Arrived { elevator_id, floor } => {
                write!(f, "elevator {} arrived at floor {}", elevator_id, floor)
            }
            ElevatorEvent::BecameIdle { elevator_id } => write!(f, "elevator {} idle", elevator_id),
        }
    }
}

/// An [`ElevatorEvent`] stamped with the virtual time it was emitted at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub time: SimulationTime,
    #[serde(flatten)]
    pub event: ElevatorEvent,
}
