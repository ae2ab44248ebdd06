//! stacknag library
//!
//! Hourly cost reporting for OpsWorks stacks: an offline price index built
//! from the AWS bulk pricing catalog, a per-stack cost model, and a driver
//! that posts status reports, publishes CloudWatch metrics and relays
//! CodeBuild events.

pub mod aws;
pub mod config;
pub mod cost;
pub mod error;
pub mod exit_codes;
pub mod fleet;
pub mod notify;
pub mod pricing;
pub mod report;
pub mod retry;
pub mod utils;

// Re-export commonly used types
pub use config::{PricingConfig, Settings};
pub use cost::{FleetSummary, StackCost, StackReport};
pub use error::{Result, StackNagError};
pub use pricing::PriceIndex;
pub use report::{Driver, Invocation, Outcome};
