//! AWS SDK implementations of the collaborator seams
//!
//! - `opsworks`: `StackApi` over OpsWorks (stacks, instances, volumes) and
//!   RDS (database class)
//! - `storage`: `StorageApi` over S3 (buckets, tags) and CloudWatch (size
//!   samples)
//! - `cloudwatch`: `MetricsSink` over CloudWatch `PutMetricData`
//!
//! Every SDK call goes through a retry policy. Throttling, timeouts and
//! dispatch failures come back as retryable `CloudProvider` errors; other
//! service errors are final. Lookups that tolerate a missing resource only
//! treat the codes in `ABSENT_CODES` as absence.

mod cloudwatch;
mod opsworks;
mod storage;

pub use cloudwatch::CloudWatchSink;
pub use opsworks::OpsWorksStackApi;
pub use storage::AwsStorageApi;

use crate::config::Settings;
use crate::error::StackNagError;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use tracing::debug;

const THROTTLING_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "RequestLimitExceeded",
    "TooManyRequestsException",
    "SlowDown",
];

/// Service error codes meaning the resource is gone or hidden from us
const ABSENT_CODES: &[&str] = &[
    "DBInstanceNotFound",
    "DBInstanceNotFoundFault",
    "ResourceNotFoundException",
    "NoSuchTagSet",
    "NoSuchBucket",
    "PermanentRedirect",
    "AuthorizationHeaderMalformed",
    "AccessDenied",
    "AccessDeniedException",
];

/// Shared SDK config honouring the profile and region overrides
pub async fn load_sdk_config(settings: &Settings) -> aws_config::SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(profile) = &settings.aws_profile {
        debug!("Using AWS profile {}", profile);
        loader = loader.profile_name(profile);
    }
    if let Some(region) = &settings.aws_region {
        loader = loader.region(Region::new(region.clone()));
    }
    loader.load().await
}

fn is_absent_code(code: Option<&str>) -> bool {
    code.is_some_and(|code| ABSENT_CODES.contains(&code))
}

fn is_throttling_code(code: Option<&str>) -> bool {
    code.is_some_and(|code| THROTTLING_CODES.contains(&code))
}

/// True when the service answered that the resource does not exist or may
/// not be read. Throttling and unknown codes are not absence.
pub(crate) fn is_absent<E, R>(err: &SdkError<E, R>) -> bool
where
    E: ProvideErrorMetadata,
{
    is_absent_code(err.as_service_error().and_then(|e| e.code()))
}

/// Map an SDK failure onto the crate error, marking transient ones retryable.
pub(crate) fn sdk_error<E, R>(service: &str, operation: &str, err: SdkError<E, R>) -> StackNagError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let message = format!("{} {} failed: {}", service, operation, DisplayErrorContext(&err));
    let throttled = is_throttling_code(err.as_service_error().and_then(|e| e.code()));
    let transient = matches!(
        err,
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_)
    );

    if throttled || transient {
        StackNagError::CloudProvider {
            provider: "aws".to_string(),
            message,
            source: Some(Box::new(err)),
        }
    } else {
        StackNagError::Aws(message)
    }
}
