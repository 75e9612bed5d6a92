use super::types::{ElevatorId, Floor};

/// Events placed on the virtual timeline.
///
/// These never leave the engine; the presentation layer only sees
/// [`ElevatorEvent`](crate::building::events::ElevatorEvent)s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    /// A call button was pressed at `floor`
    CallRequested { floor: Floor },
    /// The car finished travelling to `floor`
    MoveCompleted { elevator_id: ElevatorId, floor: Floor },
    /// The door-open interval after an arrival has elapsed
    DwellCompleted { elevator_id: ElevatorId },
}

impl SimEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            SimEvent::CallRequested { .. } => "call_requested",
            SimEvent::MoveCompleted { .. } => "move_completed",
            SimEvent::DwellCompleted { .. } => "dwell_completed",
        }
    }

    /// The elevator this event is addressed to, if any
    pub fn target_elevator(&self) -> Option<ElevatorId> {
        match self {
            SimEvent::CallRequested { .. } => None,
            SimEvent::MoveCompleted { elevator_id, .. } => Some(*elevator_id),
            SimEvent::DwellCompleted { elevator_id } => Some(*elevator_id),
        }
    }
}
