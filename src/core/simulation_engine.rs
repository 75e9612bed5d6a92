use super::config::SimulationConfig;
use super::errors::{DispatchError, Result};
use super::event::SimEvent;
use super::event_scheduler::EventScheduler;
use super::types::{Floor, SimulationTime};
use crate::building::dispatcher::{Dispatcher, Reaction};
use crate::building::events::{ElevatorEvent, TimedEvent};
use log::debug;
use std::sync::{Arc, Mutex};

/// Observer trait for the presentation layer
pub trait SimulationObserver: Send {
    /// Called for every event an elevator emits
    fn on_elevator_event(&mut self, time: SimulationTime, event: &ElevatorEvent);

    /// Called when the virtual clock advances
    fn on_time_advance(&mut self, _old_time: SimulationTime, _new_time: SimulationTime) {}
}

/// Observer that records every event; clones share the same log
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<TimedEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn events(&self) -> Vec<TimedEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl SimulationObserver for EventLog {
    fn on_elevator_event(&mut self, time: SimulationTime, event: &ElevatorEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(TimedEvent { time, event: *event });
    }
}

/// Single scheduling actor for the whole building.
///
/// Every dispatch-affecting operation goes through `&mut self`, so no two
/// assignment attempts can ever race for the same pending call.
pub struct SimulationEngine {
    dispatcher: Dispatcher,
    scheduler: EventScheduler,
    current_time: SimulationTime,
    max_time: Option<SimulationTime>,
    observers: Vec<Box<dyn SimulationObserver>>,
}

impl SimulationEngine {
    /// Validate `config` and build the fleet
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let dispatcher = Dispatcher::from_config(&config)?;
        Ok(Self {
            dispatcher,
            scheduler: EventScheduler::new(),
            current_time: 0,
            max_time: config.max_time,
            observers: Vec::new(),
        })
    }

    /// Add an observer to the simulation
    pub fn add_observer(&mut self, observer: Box<dyn SimulationObserver>) {
        self.observers.push(observer);
    }

    /// Press the call button at `floor` now
    pub fn request_floor(&mut self, floor: Floor) -> Result<()> {
        let reactions = self.dispatcher.handle_call(floor)?;
        self.apply(reactions);
        Ok(())
    }

    /// Press the call button at `floor` after `delay` units.
    ///
    /// The floor and the due time are checked immediately.
    pub fn schedule_call(&mut self, floor: Floor, delay: SimulationTime) -> Result<()> {
        self.dispatcher.validate_floor(floor)?;
        let due_at = self
            .current_time
            .checked_add(delay)
            .ok_or(DispatchError::TimeOverflow {
                now: self.current_time,
                delay,
            })?;
        self.scheduler
            .schedule_at(SimEvent::CallRequested { floor }, due_at);
        Ok(())
    }

    /// Process the next instant that has events due, returns true if events remain
    pub fn step(&mut self) -> Result<bool> {
        let next_time = match self.scheduler.peek_next_time() {
            Some(time) => time,
            None => return Ok(false),
        };

        if next_time > self.current_time {
            self.set_time(next_time);
        }

        debug!("=== Simulation Time {} ===", self.current_time);

        let mut events_processed = 0;
        while let Some(event) = self.scheduler.pop_due(self.current_time) {
            let reactions = self.dispatcher.handle_event(event)?;
            self.apply(reactions);
            events_processed += 1;
        }

        debug!(
            "Processed {} events at time {}",
            events_processed, self.current_time
        );
        Ok(self.has_pending_events())
    }

    /// Run the complete simulation, returns the final time
    pub fn run(&mut self) -> Result<SimulationTime> {
        while let Some(next_time) = self.scheduler.peek_next_time() {
            if let Some(max) = self.max_time {
                if next_time > max {
                    break;
                }
            }
            self.step()?;
        }
        Ok(self.current_time)
    }

    /// Process everything due up to `time`, then move the clock to `time`
    pub fn advance_to(&mut self, time: SimulationTime) -> Result<()> {
        while let Some(next_time) = self.scheduler.peek_next_time() {
            if next_time > time {
                break;
            }
            self.step()?;
        }
        if time > self.current_time {
            self.set_time(time);
        }
        Ok(())
    }

    pub fn current_time(&self) -> SimulationTime {
        self.current_time
    }

    pub fn next_event_time(&self) -> Option<SimulationTime> {
        self.scheduler.peek_next_time()
    }

    pub fn has_pending_events(&self) -> bool {
        self.scheduler.has_events()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    fn set_time(&mut self, new_time: SimulationTime) {
        let old_time = self.current_time;
        self.current_time = new_time;
        for observer in &mut self.observers {
            observer.on_time_advance(old_time, new_time);
        }
    }

    fn apply(&mut self, reactions: Vec<Reaction>) {
        for reaction in reactions {
            match reaction {
                Reaction::Notify(event) => {
                    debug!(
                        "Elevator {} reports {} at time {}",
                        event.elevator_id(),
                        event.event_type(),
                        self.current_time
                    );
                    for observer in &mut self.observers {
                        observer.on_elevator_event(self.current_time, &event);
                    }
                }
                Reaction::Schedule { event, delay } => {
                    self.scheduler
                        .schedule_at(event, self.current_time.saturating_add(delay));
                }
            }
        }
    }
}
