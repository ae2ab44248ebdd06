use super::sdk_error;
use crate::error::Result;
use crate::report::{MetricDatum, MetricUnit, MetricsSink};
use crate::retry::{ExponentialBackoffPolicy, RetryPolicy};
use async_trait::async_trait;
use aws_sdk_cloudwatch::primitives::DateTime;
use aws_sdk_cloudwatch::types::{self as cw, Dimension, StandardUnit};
use aws_sdk_cloudwatch::Client as CloudWatchClient;
use tracing::debug;

/// PutMetricData ceiling per request
const MAX_DATUMS_PER_REQUEST: usize = 1000;

pub struct CloudWatchSink {
    client: CloudWatchClient,
    retry: ExponentialBackoffPolicy,
}

impl CloudWatchSink {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: CloudWatchClient::new(config),
            retry: ExponentialBackoffPolicy::for_cloud_api(),
        }
    }
}

fn to_sdk_datum(datum: &MetricDatum) -> cw::MetricDatum {
    let mut builder = cw::MetricDatum::builder()
        .metric_name(&datum.name)
        .value(datum.value)
        .timestamp(DateTime::from_secs(datum.timestamp.timestamp()));
    if let Some(MetricUnit::Count) = datum.unit {
        builder = builder.unit(StandardUnit::Count);
    }
    if let Some(dim) = &datum.dimension {
        builder = builder.dimensions(Dimension::builder().name(&dim.name).value(&dim.value).build());
    }
    builder.build()
}

#[async_trait]
impl MetricsSink for CloudWatchSink {
    async fn put_metrics(&self, namespace: &str, data: &[MetricDatum]) -> Result<()> {
        for chunk in data.chunks(MAX_DATUMS_PER_REQUEST) {
            let datums: Vec<cw::MetricDatum> = chunk.iter().map(to_sdk_datum).collect();
            let client = &self.client;
            let datums = &datums;
            self.retry
                .execute_with_retry(|| async move {
                    client
                        .put_metric_data()
                        .namespace(namespace)
                        .set_metric_data(Some(datums.clone()))
                        .send()
                        .await
                        .map_err(|e| sdk_error("cloudwatch", "PutMetricData", e))
                })
                .await?;
            debug!("Put {} data points to {}", chunk.len(), namespace);
        }
        Ok(())
    }
}
