//! Bucket Tag Index and the stack hydrate step

use crate::error::{Result, StackNagError};
use crate::fleet::api::{StackApi, StorageApi};
use crate::fleet::model::{BucketUsage, HydratedStack, Stack};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Tag key linking a bucket to an OpsWorks stack by name
pub const STACK_TAG_KEY: &str = "opsworks:stack";

/// Stack name -> buckets tagged with that stack. Built once per invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BucketTagIndex {
    by_stack: HashMap<String, Vec<String>>,
}

impl BucketTagIndex {
    /// One pass over every bucket; buckets with unreadable tags are skipped.
    pub async fn build(storage: &dyn StorageApi) -> Result<Self> {
        let mut index = Self::default();
        let buckets = storage.list_buckets().await?;
        debug!(buckets = buckets.len(), "Generating bucket tag index");

        for bucket in buckets {
            let Some(tags) = storage.bucket_tags(&bucket).await? else {
                debug!(bucket = %bucket, "Bucket tags not accessible, skipping");
                continue;
            };
            for (key, value) in tags {
                if key == STACK_TAG_KEY {
                    index.add(&value, &bucket);
                }
            }
        }
        Ok(index)
    }

    pub fn add(&mut self, stack_name: &str, bucket: &str) {
        self.by_stack
            .entry(stack_name.to_string())
            .or_default()
            .push(bucket.to_string());
    }

    pub fn buckets_for(&self, stack_name: &str) -> &[String] {
        self.by_stack
            .get(stack_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.by_stack.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fetch every sub-resource of `stack` once.
///
/// More than one registered database is rejected instead of picking one.
pub async fn hydrate_stack(
    stack: Stack,
    stacks: &dyn StackApi,
    storage: &dyn StorageApi,
    tags: &BucketTagIndex,
) -> Result<HydratedStack> {
    let instances = stacks.stack_instances(&stack).await?;

    let mut databases = stacks.stack_databases(&stack).await?;
    if databases.len() > 1 {
        return Err(StackNagError::MultipleDatabases {
            stack: stack.name.clone(),
            count: databases.len(),
        });
    }
    let database = databases.pop();
    if database.is_none() {
        debug!(stack = %stack.name, "No database instance found");
    }

    let volumes = stacks.stack_volumes(&stack).await?;

    let mut buckets = Vec::new();
    for name in tags.buckets_for(&stack.name) {
        let size_bytes = storage.bucket_size_bytes(name).await?;
        if size_bytes.is_none() {
            warn!(bucket = %name, stack = %stack.name, "No size sample for bucket");
        }
        buckets.push(BucketUsage {
            name: name.clone(),
            size_bytes,
        });
    }

    Ok(HydratedStack {
        stack,
        instances,
        database,
        volumes,
        buckets,
    })
}

/// Build the tag index, then hydrate every stack, one after another.
pub async fn hydrate_fleet(
    stacks: &dyn StackApi,
    storage: &dyn StorageApi,
) -> Result<Vec<HydratedStack>> {
    let tags = BucketTagIndex::build(storage).await?;
    let mut hydrated = Vec::new();

    for stack in stacks.list_stacks().await? {
        info!(stack = %stack.name, "Checking stack");
        hydrated.push(hydrate_stack(stack, stacks, storage, &tags).await?);
    }
    Ok(hydrated)
}
