use liftsim::building::metrics::MetricsCollector;
use liftsim::scenario::Scenario;
use liftsim::{
    DispatchError, Dispatcher, ElevatorEvent, EventLog, MovementState, SimulationConfig,
    SimulationEngine,
};
use std::collections::HashMap;

fn arrived_floors(log: &EventLog) -> Vec<usize> {
    log.events()
        .iter()
        .filter_map(|timed| match timed.event {
            ElevatorEvent::Arrived { floor, .. } => Some(floor),
            _ => None,
        })
        .collect()
}

#[test]
fn test_every_call_arrives_exactly_once() {
    let config = SimulationConfig::new().with_elevators(3).with_floors(12);
    let mut engine = SimulationEngine::new(config).unwrap();
    let log = EventLog::new();
    engine.add_observer(Box::new(log.clone()));

    let scenario = Scenario::random(7, 60, 4.0, 12).unwrap();
    scenario.load_into(&mut engine).unwrap();
    engine.run().unwrap();

    let mut requested: Vec<usize> = scenario.calls().iter().map(|&(_, floor)| floor).collect();
    let mut served = arrived_floors(&log);
    requested.sort_unstable();
    served.sort_unstable();
    assert_eq!(served, requested);

    let dispatcher = engine.dispatcher();
    assert!(dispatcher.pending_calls().is_empty());
    assert!(dispatcher
        .elevators()
        .iter()
        .all(|car| car.state() == MovementState::Idle && car.destination_queue().is_empty()));
}

#[test]
fn test_one_move_in_flight_per_elevator() {
    let mut engine = SimulationEngine::new(SimulationConfig::new().with_elevators(2)).unwrap();
    let log = EventLog::new();
    engine.add_observer(Box::new(log.clone()));

    Scenario::random(99, 40, 2.0, 10)
        .unwrap()
        .load_into(&mut engine)
        .unwrap();
    engine.run().unwrap();

    // Per car the stream must alternate MoveStarted / Arrived to the same floor
    let mut in_flight: HashMap<usize, usize> = HashMap::new();
    for timed in log.events() {
        match timed.event {
            ElevatorEvent::MoveStarted { elevator_id, target_floor, .. } => {
                assert!(in_flight.insert(elevator_id, target_floor).is_none());
            }
            ElevatorEvent::Arrived { elevator_id, floor } => {
                assert_eq!(in_flight.remove(&elevator_id), Some(floor));
            }
            ElevatorEvent::BecameIdle { elevator_id } => {
                assert!(!in_flight.contains_key(&elevator_id));
            }
        }
    }
    assert!(in_flight.is_empty());
}

#[test]
fn test_scripted_duplicate_calls_are_not_coalesced() {
    let mut engine = SimulationEngine::new(SimulationConfig::new().with_elevators(2)).unwrap();
    let log = EventLog::new();
    engine.add_observer(Box::new(log.clone()));

    Scenario::parse("0:6,0:6").unwrap().load_into(&mut engine).unwrap();
    engine.run().unwrap();

    let movers: Vec<usize> = log
        .events()
        .iter()
        .filter_map(|timed| match timed.event {
            ElevatorEvent::MoveStarted { elevator_id, .. } => Some(elevator_id),
            _ => None,
        })
        .collect();
    assert_eq!(movers, vec![1, 2]);
    assert_eq!(arrived_floors(&log), vec![6, 6]);
}

#[test]
fn test_metrics_collector_tracks_run() {
    let mut engine = SimulationEngine::new(SimulationConfig::new().with_elevators(1)).unwrap();
    let metrics = MetricsCollector::new();
    engine.add_observer(Box::new(metrics.clone()));

    engine.request_floor(3).unwrap();
    engine.request_floor(1).unwrap();
    engine.run().unwrap();

    let summary = metrics.summary();
    assert_eq!(summary.total_trips, 2);
    assert_eq!(summary.total_arrivals, 2);
    assert_eq!(summary.total_floors_travelled, 5);
    assert_eq!(summary.per_elevator[&1].busy_time, 15);
}

#[test]
fn test_dispatcher_requires_initialization() {
    let mut dispatcher = Dispatcher::new();
    assert!(!dispatcher.is_initialized());
    assert_eq!(dispatcher.handle_call(0), Err(DispatchError::NotInitialized));
}

#[test]
fn test_config_round_trips_through_json() {
    let config = SimulationConfig::new().with_elevators(4).with_max_time(Some(500));
    let json = serde_json::to_string(&config).unwrap();
    let parsed: SimulationConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, config);
}
