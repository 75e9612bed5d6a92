use super::types::{ElevatorId, Floor, SimulationTime};

/// Errors surfaced to callers of the dispatch core.
///
/// All of these are precondition violations; none are retried internally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Floor outside `[0, num_floors - 1]`
    InvalidFloor { floor: Floor, num_floors: usize },
    /// Operation invoked before the dispatcher was initialized
    NotInitialized,
    /// `initialize` called a second time
    AlreadyInitialized,
    /// Fleet of zero elevators requested
    NoElevatorsConfigured,
    /// Any other rejected configuration value
    InvalidConfiguration(String),
    /// Event addressed to a car that is not part of the fleet
    UnknownElevator(ElevatorId),
    /// The real-time driver thread is gone
    DriverStopped,
    /// A requested due time lies past the end of the virtual clock
    TimeOverflow { now: SimulationTime, delay: SimulationTime },
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchError::InvalidFloor { floor, num_floors } => write!(
                f,
                "Invalid floor {}: building has floors 0..={}",
                floor,
                num_floors.saturating_sub(1)
            ),
            DispatchError::NotInitialized => write!(f, "Dispatcher has not been initialized"),
            DispatchError::AlreadyInitialized => {
                write!(f, "Dispatcher has already been initialized")
            }
            DispatchError::NoElevatorsConfigured => {
                write!(f, "At least one elevator must be configured")
            }
            DispatchError::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {}", msg),
            DispatchError::UnknownElevator(id) => write!(f, "Unknown elevator: {}", id),
            DispatchError::DriverStopped => write!(f, "Real-time driver is not running"),
            DispatchError::TimeOverflow { now, delay } => write!(
                f,
                "Delay {} from time {} runs past the end of the clock",
                delay, now
            ),
        }
    }
}

impl std::error::Error for DispatchError {}

pub type Result<T> = std::result::Result<T, DispatchError>;
