use super::{is_absent, sdk_error};
use crate::error::Result;
use crate::fleet::StorageApi;
use crate::retry::{ExponentialBackoffPolicy, RetryPolicy};
use async_trait::async_trait;
use aws_sdk_cloudwatch::primitives::DateTime;
use aws_sdk_cloudwatch::types::{Datapoint, Dimension, Statistic};
use aws_sdk_cloudwatch::Client as CloudWatchClient;
use aws_sdk_s3::Client as S3Client;
use chrono::{Duration, Utc};
use tracing::debug;

const S3_NAMESPACE: &str = "AWS/S3";
const BUCKET_SIZE_METRIC: &str = "BucketSizeBytes";
const SAMPLE_PERIOD_SECS: i32 = 86_400;

/// S3 buckets with sizes from the daily CloudWatch storage metric
pub struct AwsStorageApi {
    s3: S3Client,
    cloudwatch: CloudWatchClient,
    retry: ExponentialBackoffPolicy,
}

impl AwsStorageApi {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            s3: S3Client::new(config),
            cloudwatch: CloudWatchClient::new(config),
            retry: ExponentialBackoffPolicy::for_cloud_api(),
        }
    }
}

#[async_trait]
impl StorageApi for AwsStorageApi {
    async fn list_buckets(&self) -> Result<Vec<String>> {
        let client = &self.s3;
        let output = self
            .retry
            .execute_with_retry(|| async move {
                client
                    .list_buckets()
                    .send()
                    .await
                    .map_err(|e| sdk_error("s3", "ListBuckets", e))
            })
            .await?;

        Ok(output
            .buckets()
            .iter()
            .filter_map(|b| b.name().map(str::to_string))
            .collect())
    }

    async fn bucket_tags(&self, bucket: &str) -> Result<Option<Vec<(String, String)>>> {
        let client = &self.s3;
        self.retry
            .execute_with_retry(|| async move {
                match client.get_bucket_tagging().bucket(bucket).send().await {
                    Ok(output) => Ok(Some(
                        output
                            .tag_set()
                            .iter()
                            .map(|t| (t.key().to_string(), t.value().to_string()))
                            .collect(),
                    )),
                    // No tag set, access denied, or the bucket lives elsewhere
                    Err(e) if is_absent(&e) => {
                        debug!("Tags unreadable for bucket {}", bucket);
                        Ok(None)
                    }
                    Err(e) => Err(sdk_error("s3", "GetBucketTagging", e)),
                }
            })
            .await
    }

    async fn bucket_size_bytes(&self, bucket: &str) -> Result<Option<f64>> {
        let client = &self.cloudwatch;
        let now = Utc::now();
        let start = DateTime::from_secs((now - Duration::days(1)).timestamp());
        let end = DateTime::from_secs(now.timestamp());
        let (start, end) = (&start, &end);

        let output = self
            .retry
            .execute_with_retry(|| async move {
                client
                    .get_metric_statistics()
                    .namespace(S3_NAMESPACE)
                    .metric_name(BUCKET_SIZE_METRIC)
                    .dimensions(Dimension::builder().name("BucketName").value(bucket).build())
                    .dimensions(
                        Dimension::builder()
                            .name("StorageType")
                            .value("StandardStorage")
                            .build(),
                    )
                    .start_time(start.clone())
                    .end_time(end.clone())
                    .period(SAMPLE_PERIOD_SECS)
                    .statistics(Statistic::Average)
                    .send()
                    .await
                    .map_err(|e| sdk_error("cloudwatch", "GetMetricStatistics", e))
            })
            .await?;

        Ok(latest_average(output.datapoints()))
    }
}

/// Average of the newest datapoint. CloudWatch does not order them.
fn latest_average(datapoints: &[Datapoint]) -> Option<f64> {
    datapoints
        .iter()
        .filter_map(|p| Some((p.timestamp()?.secs(), p.average()?)))
        .max_by_key(|(secs, _)| *secs)
        .map(|(_, average)| average)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(secs: i64, average: Option<f64>) -> Datapoint {
        Datapoint::builder()
            .timestamp(DateTime::from_secs(secs))
            .set_average(average)
            .build()
    }

    #[test]
    fn test_latest_average_prefers_newest_datapoint() {
        let points = [
            point(1_700_000_000, Some(10.0)),
            point(1_700_172_800, Some(30.0)),
            point(1_700_086_400, Some(20.0)),
        ];
        assert_eq!(latest_average(&points), Some(30.0));
    }

    #[test]
    fn test_latest_average_skips_points_without_average() {
        let points = [point(1_700_000_000, Some(10.0)), point(1_700_086_400, None)];
        assert_eq!(latest_average(&points), Some(10.0));
        assert_eq!(latest_average(&[]), None);
    }
}
