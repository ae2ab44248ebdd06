//! Reporting: invocation payloads, message text, metric batches, driver

pub mod driver;
pub mod event;
pub mod message;
pub mod metrics;

pub use driver::{Driver, Outcome};
pub use event::{BuildEvent, BuildPhase, Invocation};
pub use metrics::{MetricDatum, MetricDimension, MetricUnit, MetricsSink};
