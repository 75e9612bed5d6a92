/// Identifier of an elevator car. Cars are numbered from 1 in fleet order.
pub type ElevatorId = usize;

/// Floor number, 0 being the ground floor.
pub type Floor = usize;

/// Virtual simulation time, in abstract time units
pub type SimulationTime = u64;
