pub mod dispatcher;
pub mod elevator;
pub mod events;
pub mod metrics;
