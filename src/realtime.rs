//! Wall-clock driver: runs an engine on its own thread, one virtual time
//! unit per `time_unit` of real time.

use crate::building::events::{ElevatorEvent, TimedEvent};
use crate::core::config::SimulationConfig;
use crate::core::errors::{DispatchError, Result};
use crate::core::simulation_engine::{SimulationEngine, SimulationObserver};
use crate::core::types::{Floor, SimulationTime};
use crossbeam_channel as cbc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    RequestFloor(Floor),
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverOutput {
    Event(TimedEvent),
    Rejected { floor: Floor, reason: DispatchError },
}

struct ChannelObserver {
    tx: cbc::Sender<DriverOutput>,
}

impl SimulationObserver for ChannelObserver {
    fn on_elevator_event(&mut self, time: SimulationTime, event: &ElevatorEvent) {
        // Nobody listening is not an error for the simulation
        let _ = self.tx.send(DriverOutput::Event(TimedEvent { time, event: *event }));
    }
}

pub struct RealtimeHandle {
    commands: cbc::Sender<Command>,
    outputs: cbc::Receiver<DriverOutput>,
    thread: JoinHandle<Result<SimulationTime>>,
}

impl RealtimeHandle {
    pub fn request_floor(&self, floor: Floor) -> Result<()> {
        self.commands
            .send(Command::RequestFloor(floor))
            .map_err(|_| DispatchError::DriverStopped)
    }

    /// Events and rejections, in emission order
    pub fn outputs(&self) -> &cbc::Receiver<DriverOutput> {
        &self.outputs
    }

    /// Stop the driver and return the virtual time it reached
    pub fn shutdown(self) -> Result<SimulationTime> {
        let _ = self.commands.send(Command::Shutdown);
        self.thread.join().map_err(|_| DispatchError::DriverStopped)?
    }
}

/// Start a driver thread for a fresh engine built from `config`.
pub fn spawn(config: SimulationConfig, time_unit: Duration) -> Result<RealtimeHandle> {
    if time_unit.is_zero() {
        return Err(DispatchError::InvalidConfiguration(
            "Real-time unit must be longer than zero".to_string(),
        ));
    }

    let (output_tx, output_rx) = cbc::unbounded::<DriverOutput>();
    let (command_tx, command_rx) = cbc::unbounded::<Command>();

    let mut engine = SimulationEngine::new(config)?;
    engine.add_observer(Box::new(ChannelObserver {
        tx: output_tx.clone(),
    }));

    let thread = thread::spawn(move || run(engine, time_unit, command_rx, output_tx));

    Ok(RealtimeHandle {
        commands: command_tx,
        outputs: output_rx,
        thread,
    })
}

fn virtual_now(start: Instant, time_unit: Duration) -> SimulationTime {
    (start.elapsed().as_nanos() / time_unit.as_nanos()) as SimulationTime
}

/// Wall-clock instant for virtual `time`, or `None` if it is beyond what `Instant` can hold
fn wall_deadline(start: Instant, time_unit: Duration, time: SimulationTime) -> Option<Instant> {
    let nanos = time_unit.as_nanos().saturating_mul(time as u128);
    let secs = u64::try_from(nanos / 1_000_000_000).ok()?;
    start.checked_add(Duration::new(secs, (nanos % 1_000_000_000) as u32))
}

fn run(
    mut engine: SimulationEngine,
    time_unit: Duration,
    command_rx: cbc::Receiver<Command>,
    output_tx: cbc::Sender<DriverOutput>,
) -> Result<SimulationTime> {
    let start = Instant::now();
    log::info!("Real-time driver started ({:?} per time unit)", time_unit);

    loop {
        engine.advance_to(virtual_now(start, time_unit))?;

        let timer = match engine
            .next_event_time()
            .and_then(|time| wall_deadline(start, time_unit, time))
        {
            Some(deadline) => cbc::after(deadline.saturating_duration_since(Instant::now())),
            None => cbc::never(),
        };

        cbc::select! {
            recv(command_rx) -> command => {
                match command {
                    Ok(Command::RequestFloor(floor)) => {
                        engine.advance_to(virtual_now(start, time_unit))?;
                        if let Err(reason) = engine.request_floor(floor) {
                            log::warn!("Rejected call at floor {}: {}", floor, reason);
                            let _ = output_tx.send(DriverOutput::Rejected { floor, reason });
                        }
                    }
                    Ok(Command::Shutdown) | Err(_) => break,
                }
            },
            recv(timer) -> _ => {},
        }
    }

    log::info!("Real-time driver stopped at time {}", engine.current_time());
    Ok(engine.current_time())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn next_event(handle: &RealtimeHandle) -> DriverOutput {
        handle
            .outputs()
            .recv_timeout(Duration::from_secs(5))
            .expect("driver produced no output")
    }

    #[test]
    fn test_zero_time_unit_rejected() {
        assert!(matches!(
            spawn(SimulationConfig::default(), Duration::ZERO),
            Err(DispatchError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_call_served_in_real_time() {
        let config = SimulationConfig::new().with_elevators(1).with_floors(4);
        let handle = spawn(config, Duration::from_millis(2)).unwrap();
        handle.request_floor(2).unwrap();

        let started = next_event(&handle);
        assert!(matches!(
            started,
            DriverOutput::Event(TimedEvent {
                event: ElevatorEvent::MoveStarted { elevator_id: 1, target_floor: 2, duration: 6 },
                ..
            })
        ));

        match next_event(&handle) {
            DriverOutput::Event(TimedEvent { time, event }) => {
                assert_eq!(event, ElevatorEvent::Arrived { elevator_id: 1, floor: 2 });
                assert!(time >= 6);
            }
            other => panic!("unexpected output: {:?}", other),
        }

        assert!(handle.shutdown().unwrap() >= 6);
    }

    #[test]
    fn test_invalid_floor_reported() {
        let config = SimulationConfig::new().with_elevators(1).with_floors(4);
        let handle = spawn(config, Duration::from_millis(2)).unwrap();
        handle.request_floor(9).unwrap();

        assert_eq!(
            next_event(&handle),
            DriverOutput::Rejected {
                floor: 9,
                reason: DispatchError::InvalidFloor { floor: 9, num_floors: 4 },
            }
        );
        handle.shutdown().unwrap();
    }

    #[test]
    fn test_wall_deadline_past_instant_range_is_none() {
        let start = Instant::now();
        let unit = Duration::from_millis(2);

        assert_eq!(wall_deadline(start, unit, 5), Some(start + Duration::from_millis(10)));
        assert_eq!(
            wall_deadline(start, Duration::from_secs(u64::MAX / 2), 4),
            None
        );
    }
}
