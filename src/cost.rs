//! Stack cost model
//!
//! Hourly USD cost of a hydrated stack, per category. Every function here is
//! pure: the only inputs are the hydrated record and the price index.
//!
//! Storage categories use fixed per-GB-month list prices instead of index
//! lookups, converted to an hourly rate over a 30-day month.

use crate::error::Result;
use crate::fleet::model::HydratedStack;
use crate::pricing::index::{PriceIndex, COMPUTE_CATEGORY, DATABASE_CATEGORY};
use serde::Serialize;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// EBS general purpose storage, USD per GB-month
pub const BLOCK_STORAGE_GB_MONTH: f64 = 0.10;
/// S3 standard storage, USD per GB-month
pub const OBJECT_STORAGE_GB_MONTH: f64 = 0.03;
pub const HOURS_PER_MONTH: f64 = 30.0 * 24.0;
const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StackCost {
    pub compute: f64,
    pub database: f64,
    pub block_storage: f64,
    pub object_storage: f64,
}

impl StackCost {
    pub fn for_stack(stack: &HydratedStack, index: &PriceIndex) -> Result<Self> {
        Ok(Self {
            compute: compute_cost(stack, index)?,
            database: database_cost(stack, index)?,
            block_storage: block_storage_cost(stack),
            object_storage: object_storage_cost(stack),
        })
    }

    pub fn total(&self) -> f64 {
        self.compute + self.database + self.block_storage + self.object_storage
    }
}

impl Add for StackCost {
    type Output = StackCost;

    fn add(self, rhs: StackCost) -> StackCost {
        StackCost {
            compute: self.compute + rhs.compute,
            database: self.database + rhs.database,
            block_storage: self.block_storage + rhs.block_storage,
            object_storage: self.object_storage + rhs.object_storage,
        }
    }
}

impl AddAssign for StackCost {
    fn add_assign(&mut self, rhs: StackCost) {
        *self = *self + rhs;
    }
}

impl Sum for StackCost {
    fn sum<I: Iterator<Item = StackCost>>(iter: I) -> StackCost {
        iter.fold(StackCost::default(), Add::add)
    }
}

/// Sum of index prices over online instances. A missing type is an error.
pub fn compute_cost(stack: &HydratedStack, index: &PriceIndex) -> Result<f64> {
    stack
        .online_instances()
        .map(|instance| index.lookup(COMPUTE_CATEGORY, &instance.instance_type))
        .sum()
}

pub fn database_cost(stack: &HydratedStack, index: &PriceIndex) -> Result<f64> {
    match &stack.database {
        Some(db) => index.lookup(DATABASE_CATEGORY, &db.class),
        None => Ok(0.0),
    }
}

pub fn block_storage_cost(stack: &HydratedStack) -> f64 {
    stack.total_volume_gb() as f64 * BLOCK_STORAGE_GB_MONTH / HOURS_PER_MONTH
}

/// Buckets without a size sample contribute zero.
pub fn object_storage_cost(stack: &HydratedStack) -> f64 {
    stack.total_bucket_bytes() / BYTES_PER_GB * OBJECT_STORAGE_GB_MONTH / HOURS_PER_MONTH
}

/// One stack's line in a report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackReport {
    pub name: String,
    pub shortname: String,
    pub online_instances: usize,
    pub cost: StackCost,
}

impl StackReport {
    pub fn is_running(&self) -> bool {
        self.online_instances > 0
    }
}

/// Costs for the whole fleet, running and stopped stacks alike
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FleetSummary {
    pub stacks: Vec<StackReport>,
}

impl FleetSummary {
    pub fn from_stacks(stacks: &[HydratedStack], index: &PriceIndex) -> Result<Self> {
        let stacks = stacks
            .iter()
            .map(|stack| {
                Ok(StackReport {
                    name: stack.name().to_string(),
                    shortname: stack.stack.shortname(),
                    online_instances: stack.online_count(),
                    cost: StackCost::for_stack(stack, index)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { stacks })
    }

    pub fn running(&self) -> impl Iterator<Item = &StackReport> {
        self.stacks.iter().filter(|s| s.is_running())
    }

    pub fn running_count(&self) -> usize {
        self.running().count()
    }

    pub fn total_count(&self) -> usize {
        self.stacks.len()
    }

    /// Category sums over every stack
    pub fn totals(&self) -> StackCost {
        self.stacks.iter().map(|s| s.cost).sum()
    }
}
