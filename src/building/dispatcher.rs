use crate::building::elevator::{Elevator, ElevatorAction};
use crate::building::events::ElevatorEvent;
use crate::core::config::{SimulationConfig, Timing};
use crate::core::errors::{DispatchError, Result};
use crate::core::event::SimEvent;
use crate::core::types::{ElevatorId, Floor, SimulationTime};
use std::collections::VecDeque;

/// What the dispatcher needs from the surrounding engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    Notify(ElevatorEvent),
    Schedule { event: SimEvent, delay: SimulationTime },
}

/// Matches pending floor calls to the nearest idle elevator.
///
/// Calls wait in `pending_calls` in arrival order. Each trigger (a new call,
/// or a car reporting free) makes a single attempt at the head of the
/// queue, so the backlog drains one call per car that frees up.
#[derive(Debug, Default)]
pub struct Dispatcher {
    elevators: Vec<Elevator>,
    pending_calls: VecDeque<Floor>,
    num_floors: usize,
}

impl Dispatcher {
    /// Create an uninitialized dispatcher with no fleet
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and initialize a dispatcher from a validated configuration
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;
        let mut dispatcher = Self::new();
        dispatcher.initialize(config.num_elevators, config.num_floors, config.timing())?;
        Ok(dispatcher)
    }

    /// Create the fleet. All cars start idle at floor 0.
    pub fn initialize(&mut self, num_elevators: usize, num_floors: usize, timing: Timing) -> Result<()> {
        if self.is_initialized() {
            return Err(DispatchError::AlreadyInitialized);
        }
        if num_elevators == 0 {
            return Err(DispatchError::NoElevatorsConfigured);
        }
        if num_floors == 0 {
            return Err(DispatchError::InvalidConfiguration(
                "Building must have at least one floor".to_string(),
            ));
        }

        self.elevators = (1..=num_elevators)
            .map(|id| Elevator::new(id, num_floors, timing))
            .collect();
        self.pending_calls.clear();
        self.num_floors = num_floors;

        log::info!(
            "[Dispatcher] Initialized {} elevators over {} floors",
            num_elevators,
            num_floors
        );
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        !self.elevators.is_empty()
    }

    pub fn elevators(&self) -> &[Elevator] {
        &self.elevators
    }

    pub fn elevator(&self, id: ElevatorId) -> Option<&Elevator> {
        id.checked_sub(1).and_then(|index| self.elevators.get(index))
    }

    pub fn pending_calls(&self) -> &VecDeque<Floor> {
        &self.pending_calls
    }

    pub fn validate_floor(&self, floor: Floor) -> Result<()> {
        if !self.is_initialized() {
            return Err(DispatchError::NotInitialized);
        }
        if floor >= self.num_floors {
            return Err(DispatchError::InvalidFloor {
                floor,
                num_floors: self.num_floors,
            });
        }
        Ok(())
    }

    /// Queue a call for `floor` and try to assign it right away.
    ///
    /// Duplicate calls are kept as separate entries.
    pub fn handle_call(&mut self, floor: Floor) -> Result<Vec<Reaction>> {
        self.validate_floor(floor)?;
        self.pending_calls.push_back(floor);
        log::debug!(
            "[Dispatcher] Call at floor {} queued ({} pending)",
            floor,
            self.pending_calls.len()
        );
        self.assign_next()
    }

    /// Make one assignment attempt for the oldest pending call.
    pub fn assign_next(&mut self) -> Result<Vec<Reaction>> {
        if !self.is_initialized() {
            return Err(DispatchError::NotInitialized);
        }
        let actions = self.try_assign();
        Ok(self.settle(actions))
    }

    /// Route a timeline event to the car it belongs to.
    pub fn handle_event(&mut self, event: SimEvent) -> Result<Vec<Reaction>> {
        let elevator_id = match event.target_elevator() {
            Some(id) => id,
            None => {
                return match event {
                    SimEvent::CallRequested { floor } => self.handle_call(floor),
                    _ => Ok(Vec::new()),
                }
            }
        };

        let index = elevator_id
            .checked_sub(1)
            .filter(|index| *index < self.elevators.len())
            .ok_or(DispatchError::UnknownElevator(elevator_id))?;
        let actions = self.elevators[index].handle_event(event);
        Ok(self.settle(actions))
    }

    /// Index of the idle car closest to `target_floor`.
    ///
    /// Only a strictly smaller distance replaces the current best, so ties
    /// go to the lowest id.
    pub fn select_elevator(&self, target_floor: Floor) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for (index, elevator) in self.elevators.iter().enumerate() {
            if !elevator.is_idle() {
                continue;
            }
            let distance = elevator.current_floor().abs_diff(target_floor);
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((index, distance)),
            }
        }
        best.map(|(index, _)| index)
    }

    fn try_assign(&mut self) -> Vec<ElevatorAction> {
        let target_floor = match self.pending_calls.front() {
            Some(floor) => *floor,
            None => return Vec::new(),
        };

        let index = match self.select_elevator(target_floor) {
            Some(index) => index,
            None => {
                log::debug!(
                    "[Dispatcher] No idle elevator for floor {}; {} calls waiting",
                    target_floor,
                    self.pending_calls.len()
                );
                return Vec::new();
            }
        };

        self.pending_calls.pop_front();
        let elevator = &mut self.elevators[index];
        log::info!(
            "[Dispatcher] Assigned floor {} to elevator {} (at floor {})",
            target_floor,
            elevator.id(),
            elevator.current_floor()
        );
        elevator.enqueue_destination(target_floor)
    }

    /// Work through elevator actions until no car reports free.
    ///
    /// A free signal triggers another assignment attempt, whose actions are
    /// appended to the same worklist.
    fn settle(&mut self, actions: Vec<ElevatorAction>) -> Vec<Reaction> {
        let mut worklist: VecDeque<ElevatorAction> = actions.into();
        let mut reactions = Vec::new();

        while let Some(action) = worklist.pop_front() {
            match action {
                ElevatorAction::Notify(event) => reactions.push(Reaction::Notify(event)),
                ElevatorAction::Schedule { event, delay } => {
                    reactions.push(Reaction::Schedule { event, delay })
                }
                ElevatorAction::Free(elevator_id) => {
                    log::debug!("[Dispatcher] Elevator {} reported free", elevator_id);
                    worklist.extend(self.try_assign());
                }
            }
        }

        reactions
    }
}
