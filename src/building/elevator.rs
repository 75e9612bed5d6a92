use crate::building::events::ElevatorEvent;
use crate::core::config::Timing;
use crate::core::event::SimEvent;
use crate::core::types::{ElevatorId, Floor, SimulationTime};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementState {
    Idle,
    Moving { target_floor: Floor },
    /// Doors open at `floor` after an arrival
    Dwelling { floor: Floor },
}

/// Side effects requested by an elevator transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElevatorAction {
    /// Forward to the presentation layer
    Notify(ElevatorEvent),
    /// Place `event` on the timeline `delay` units from now
    Schedule { event: SimEvent, delay: SimulationTime },
    /// The car emptied its queue and can take a pending call
    Free(ElevatorId),
}

/// A single car with its private FIFO of destinations.
///
/// Transitions never block: a move or dwell returns a `Schedule` action and
/// the matching completion arrives later through [`Elevator::handle_event`].
#[derive(Debug, Clone)]
pub struct Elevator {
    id: ElevatorId,
    current_floor: Floor,
    state: MovementState,
    destination_queue: VecDeque<Floor>,
    num_floors: usize,
    timing: Timing,
}

impl Elevator {
    pub fn new(id: ElevatorId, num_floors: usize, timing: Timing) -> Self {
        Self {
            id,
            current_floor: 0,
            state: MovementState::Idle,
            destination_queue: VecDeque::new(),
            num_floors,
            timing,
        }
    }

    pub fn id(&self) -> ElevatorId {
        self.id
    }

    pub fn current_floor(&self) -> Floor {
        self.current_floor
    }

    pub fn state(&self) -> MovementState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == MovementState::Idle
    }

    pub fn destination_queue(&self) -> &VecDeque<Floor> {
        &self.destination_queue
    }

    /// Floor of the move currently in flight
    pub fn in_flight_target(&self) -> Option<Floor> {
        match self.state {
            MovementState::Moving { target_floor } => Some(target_floor),
            _ => None,
        }
    }

    /// Append a destination. An idle car starts travelling immediately.
    ///
    /// `floor` must already be validated against the building.
    pub fn enqueue_destination(&mut self, floor: Floor) -> Vec<ElevatorAction> {
        debug_assert!(floor < self.num_floors);
        self.destination_queue.push_back(floor);
        if self.is_idle() {
            self.process_next()
        } else {
            Vec::new()
        }
    }

    /// Start the next queued move, or go idle and ask for work.
    pub fn process_next(&mut self) -> Vec<ElevatorAction> {
        match self.destination_queue.pop_front() {
            Some(target_floor) => self.begin_move(target_floor),
            None => {
                self.state = MovementState::Idle;
                log::debug!("[Elevator {}] Idle at floor {}", self.id, self.current_floor);
                vec![
                    ElevatorAction::Notify(ElevatorEvent::BecameIdle { elevator_id: self.id }),
                    ElevatorAction::Free(self.id),
                ]
            }
        }
    }

    fn begin_move(&mut self, target_floor: Floor) -> Vec<ElevatorAction> {
        let duration = self.timing.travel_time(self.current_floor, target_floor);
        self.state = MovementState::Moving { target_floor };

        log::info!(
            "[Elevator {}] Moving {} -> {} ({} units)",
            self.id,
            self.current_floor,
            target_floor,
            duration
        );

        vec![
            ElevatorAction::Notify(ElevatorEvent::MoveStarted {
                elevator_id: self.id,
                target_floor,
                duration,
            }),
            ElevatorAction::Schedule {
                event: SimEvent::MoveCompleted {
                    elevator_id: self.id,
                    floor: target_floor,
                },
                delay: duration,
            },
        ]
    }

    fn on_arrival(&mut self, floor: Floor) -> Vec<ElevatorAction> {
        self.current_floor = floor;
        self.state = MovementState::Dwelling { floor };

        log::info!("[Elevator {}] Arrived at floor {}", self.id, floor);

        vec![
            ElevatorAction::Notify(ElevatorEvent::Arrived {
                elevator_id: self.id,
                floor,
            }),
            ElevatorAction::Schedule {
                event: SimEvent::DwellCompleted { elevator_id: self.id },
                delay: self.timing.dwell_time,
            },
        ]
    }

    /// React to a timeline event addressed to this car
    pub fn handle_event(&mut self, event: SimEvent) -> Vec<ElevatorAction> {
        match (event, self.state) {
            (SimEvent::MoveCompleted { floor, .. }, MovementState::Moving { target_floor })
                if floor == target_floor =>
            {
                self.on_arrival(floor)
            }
            (SimEvent::DwellCompleted { .. }, MovementState::Dwelling { .. }) => self.process_next(),
            (event, state) => {
                log::warn!(
                    "[Elevator {}] Ignoring {} while {:?}",
                    self.id,
                    event.event_type(),
                    state
                );
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elevator() -> Elevator {
        Elevator::new(1, 10, Timing::default())
    }

    fn scheduled(actions: &[ElevatorAction]) -> Vec<(SimEvent, SimulationTime)> {
        actions
            .iter()
            .filter_map(|action| match action {
                ElevatorAction::Schedule { event, delay } => Some((*event, *delay)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_starts_idle_at_ground_floor() {
        let car = elevator();
        assert!(car.is_idle());
        assert_eq!(car.current_floor(), 0);
        assert!(car.destination_queue().is_empty());
    }

    #[test]
    fn test_enqueue_on_idle_starts_move() {
        let mut car = elevator();
        let actions = car.enqueue_destination(4);

        assert_eq!(car.state(), MovementState::Moving { target_floor: 4 });
        assert!(car.destination_queue().is_empty());
        assert_eq!(
            actions[0],
            ElevatorAction::Notify(ElevatorEvent::MoveStarted {
                elevator_id: 1,
                target_floor: 4,
                duration: 12,
            })
        );
        assert_eq!(
            scheduled(&actions),
            vec![(SimEvent::MoveCompleted { elevator_id: 1, floor: 4 }, 12)]
        );
    }

    #[test]
    fn test_enqueue_while_moving_only_queues() {
        let mut car = elevator();
        car.enqueue_destination(2);
        let actions = car.enqueue_destination(5);

        assert!(actions.is_empty());
        assert_eq!(car.in_flight_target(), Some(2));
        assert_eq!(car.destination_queue().iter().copied().collect::<Vec<_>>(), vec![5]);
    }

    #[test]
    fn test_zero_distance_move_has_zero_duration() {
        let mut car = elevator();
        let actions = car.enqueue_destination(0);
        assert_eq!(
            scheduled(&actions),
            vec![(SimEvent::MoveCompleted { elevator_id: 1, floor: 0 }, 0)]
        );
    }

    #[test]
    fn test_arrival_then_dwell_then_idle() {
        let mut car = elevator();
        car.enqueue_destination(3);

        let arrival = car.handle_event(SimEvent::MoveCompleted { elevator_id: 1, floor: 3 });
        assert_eq!(car.current_floor(), 3);
        assert_eq!(car.state(), MovementState::Dwelling { floor: 3 });
        assert!(!car.is_idle());
        assert_eq!(
            arrival[0],
            ElevatorAction::Notify(ElevatorEvent::Arrived { elevator_id: 1, floor: 3 })
        );
        assert_eq!(
            scheduled(&arrival),
            vec![(SimEvent::DwellCompleted { elevator_id: 1 }, 2)]
        );

        let after_dwell = car.handle_event(SimEvent::DwellCompleted { elevator_id: 1 });
        assert!(car.is_idle());
        assert_eq!(
            after_dwell,
            vec![
                ElevatorAction::Notify(ElevatorEvent::BecameIdle { elevator_id: 1 }),
                ElevatorAction::Free(1),
            ]
        );
    }

    #[test]
    fn test_queue_served_in_insertion_order() {
        let mut car = elevator();
        car.enqueue_destination(2);
        car.enqueue_destination(5);

        car.handle_event(SimEvent::MoveCompleted { elevator_id: 1, floor: 2 });
        // Still dwelling at 2; the move to 5 waits for the dwell to finish
        assert_eq!(car.in_flight_target(), None);

        let actions = car.handle_event(SimEvent::DwellCompleted { elevator_id: 1 });
        assert_eq!(car.in_flight_target(), Some(5));
        assert_eq!(
            scheduled(&actions),
            vec![(SimEvent::MoveCompleted { elevator_id: 1, floor: 5 }, 9)]
        );
    }

    #[test]
    fn test_unexpected_event_is_ignored() {
        let mut car = elevator();
        let actions = car.handle_event(SimEvent::DwellCompleted { elevator_id: 1 });
        assert!(actions.is_empty());
        assert!(car.is_idle());
    }
}
