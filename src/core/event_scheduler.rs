use super::event::SimEvent;
use super::types::SimulationTime;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

#[derive(Debug)]
pub struct ScheduledEvent {
    pub due_at: SimulationTime,
    pub sequence_num: u64,
    pub event: SimEvent,
}

impl ScheduledEvent {
    /// Heap key: earliest due time first, then scheduling order
    fn heap_key(&self) -> Reverse<(SimulationTime, u64)> {
        Reverse((self.due_at, self.sequence_num))
    }
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.heap_key() == other.heap_key()
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.heap_key().cmp(&other.heap_key())
    }
}

/// Timeline of future events keyed by absolute virtual time.
///
/// Events due at the same instant come out in the order they were scheduled.
#[derive(Debug, Default)]
pub struct EventScheduler {
    event_queue: BinaryHeap<ScheduledEvent>,
    sequence_counter: u64,
}

impl EventScheduler {
    /// Create a new EventScheduler
    pub fn new() -> Self {
        Self {
            event_queue: BinaryHeap::new(),
            sequence_counter: 0,
        }
    }

    /// Schedule an event to fire at `due_at`
    pub fn schedule_at(&mut self, event: SimEvent, due_at: SimulationTime) {
        self.event_queue.push(ScheduledEvent {
            due_at,
            sequence_num: self.sequence_counter,
            event,
        });
        self.sequence_counter += 1;
    }

    /// Pop the earliest event if it is due at or before `now`
    pub fn pop_due(&mut self, now: SimulationTime) -> Option<SimEvent> {
        match self.event_queue.peek() {
            Some(next) if next.due_at <= now => self.event_queue.pop().map(|s| s.event),
            _ => None,
        }
    }

    /// Time of the earliest pending event
    pub fn peek_next_time(&self) -> Option<SimulationTime> {
        self.event_queue.peek().map(|event| event.due_at)
    }

    /// Check if there are any events remaining in the queue
    pub fn has_events(&self) -> bool {
        !self.event_queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.event_queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.event_queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dwell(id: usize) -> SimEvent {
        SimEvent::DwellCompleted { elevator_id: id }
    }

    #[test]
    fn test_events_come_out_in_time_order() {
        let mut scheduler = EventScheduler::new();
        scheduler.schedule_at(dwell(1), 10);
        scheduler.schedule_at(dwell(2), 3);
        scheduler.schedule_at(dwell(3), 7);

        assert_eq!(scheduler.peek_next_time(), Some(3));
        assert_eq!(scheduler.pop_due(10), Some(dwell(2)));
        assert_eq!(scheduler.pop_due(10), Some(dwell(3)));
        assert_eq!(scheduler.pop_due(10), Some(dwell(1)));
        assert!(!scheduler.has_events());
    }

    #[test]
    fn test_same_instant_preserves_insertion_order() {
        let mut scheduler = EventScheduler::new();
        for id in 1..=4 {
            scheduler.schedule_at(dwell(id), 5);
        }

        let order: Vec<SimEvent> = std::iter::from_fn(|| scheduler.pop_due(5)).collect();
        assert_eq!(order, vec![dwell(1), dwell(2), dwell(3), dwell(4)]);
    }

    #[test]
    fn test_pop_due_respects_now() {
        let mut scheduler = EventScheduler::new();
        scheduler.schedule_at(dwell(1), 4);

        assert_eq!(scheduler.pop_due(3), None);
        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.pop_due(4), Some(dwell(1)));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_end_of_clock_sorts_after_earlier_events() {
        let mut scheduler = EventScheduler::new();
        scheduler.schedule_at(dwell(1), SimulationTime::MAX);
        scheduler.schedule_at(dwell(2), 0);
        scheduler.schedule_at(dwell(3), SimulationTime::MAX);

        let order: Vec<SimEvent> =
            std::iter::from_fn(|| scheduler.pop_due(SimulationTime::MAX)).collect();
        assert_eq!(order, vec![dwell(2), dwell(1), dwell(3)]);
    }
}
