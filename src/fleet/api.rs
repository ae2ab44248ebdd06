//! Collaborator seams for stack inventory
//!
//! `crate::aws` implements these against OpsWorks, RDS, S3 and CloudWatch.
//! Tests implement them in memory.

use crate::error::Result;
use crate::fleet::model::{DatabaseInstance, Instance, Stack, Volume};
use async_trait::async_trait;

/// Stack, instance, volume and database descriptions
#[async_trait]
pub trait StackApi: Send + Sync {
    async fn list_stacks(&self) -> Result<Vec<Stack>>;

    async fn stack_instances(&self, stack: &Stack) -> Result<Vec<Instance>>;

    /// Every database registered with the stack; empty when there is none
    async fn stack_databases(&self, stack: &Stack) -> Result<Vec<DatabaseInstance>>;

    async fn stack_volumes(&self, stack: &Stack) -> Result<Vec<Volume>>;
}

/// Bucket listing, tags and size samples
#[async_trait]
pub trait StorageApi: Send + Sync {
    async fn list_buckets(&self) -> Result<Vec<String>>;

    /// `Ok(None)` when the bucket's tag set cannot be read
    async fn bucket_tags(&self, bucket: &str) -> Result<Option<Vec<(String, String)>>>;

    /// Latest daily-average size in bytes over the previous 24 hours
    async fn bucket_size_bytes(&self, bucket: &str) -> Result<Option<f64>>;
}
