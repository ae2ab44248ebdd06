//! Metric data points for the fleet and for each stack

use crate::cost::{FleetSummary, StackCost, StackReport};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Dimension name carrying `Stack::shortname`
pub const STACK_DIMENSION: &str = "Stack";

pub const RUNNING_CLUSTERS: &str = "running_clusters";
pub const TOTAL_CLUSTERS: &str = "total_clusters";
pub const EC2_HOURLY_COSTS: &str = "ec2_hourly_costs";
pub const RDS_HOURLY_COSTS: &str = "rds_hourly_costs";
pub const EBS_HOURLY_COSTS: &str = "ebs_hourly_costs";
pub const S3_HOURLY_COSTS: &str = "s3_hourly_costs";
pub const TOTAL_HOURLY_COSTS: &str = "total_hourly_costs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MetricUnit {
    Count,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricDimension {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricDatum {
    pub name: String,
    pub value: f64,
    pub unit: Option<MetricUnit>,
    pub dimension: Option<MetricDimension>,
    pub timestamp: DateTime<Utc>,
}

impl MetricDatum {
    pub fn new(name: &str, value: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            name: name.to_string(),
            value,
            unit: None,
            dimension: None,
            timestamp,
        }
    }

    pub fn count(name: &str, value: usize, timestamp: DateTime<Utc>) -> Self {
        Self {
            unit: Some(MetricUnit::Count),
            ..Self::new(name, value as f64, timestamp)
        }
    }

    pub fn with_dimension(mut self, name: &str, value: &str) -> Self {
        self.dimension = Some(MetricDimension {
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }
}

/// Destination for metric batches
#[async_trait]
pub trait MetricsSink: Send + Sync {
    async fn put_metrics(&self, namespace: &str, data: &[MetricDatum]) -> Result<()>;
}

fn cost_metrics(cost: &StackCost, timestamp: DateTime<Utc>) -> Vec<MetricDatum> {
    vec![
        MetricDatum::new(EC2_HOURLY_COSTS, cost.compute, timestamp),
        MetricDatum::new(RDS_HOURLY_COSTS, cost.database, timestamp),
        MetricDatum::new(EBS_HOURLY_COSTS, cost.block_storage, timestamp),
        MetricDatum::new(S3_HOURLY_COSTS, cost.object_storage, timestamp),
        MetricDatum::new(TOTAL_HOURLY_COSTS, cost.total(), timestamp),
    ]
}

/// Fleet-wide batch: stack counts plus category sums
pub fn fleet_metrics(summary: &FleetSummary, timestamp: DateTime<Utc>) -> Vec<MetricDatum> {
    let mut data = vec![
        MetricDatum::count(RUNNING_CLUSTERS, summary.running_count(), timestamp),
        MetricDatum::count(TOTAL_CLUSTERS, summary.total_count(), timestamp),
    ];
    data.extend(cost_metrics(&summary.totals(), timestamp));
    data
}

/// Per-stack batch, every datum tagged with the stack dimension
pub fn stack_metrics(report: &StackReport, timestamp: DateTime<Utc>) -> Vec<MetricDatum> {
    cost_metrics(&report.cost, timestamp)
        .into_iter()
        .map(|datum| datum.with_dimension(STACK_DIMENSION, &report.shortname))
        .collect()
}
