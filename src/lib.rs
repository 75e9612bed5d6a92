pub mod building;
pub mod core;
pub mod realtime;
pub mod scenario;

// Re-export commonly used types
pub use crate::building::dispatcher::Dispatcher;
pub use crate::building::elevator::{Elevator, MovementState};
pub use crate::building::events::{ElevatorEvent, TimedEvent};
pub use crate::core::config::SimulationConfig;
pub use crate::core::errors::DispatchError;
pub use crate::core::simulation_engine::{EventLog, SimulationEngine, SimulationObserver};
pub use crate::core::types::{ElevatorId, Floor, SimulationTime};
