//! In-memory collaborators for driver and hydration tests

#![allow(dead_code)]

use async_trait::async_trait;
use stacknag::error::{Result, StackNagError};
use stacknag::fleet::{DatabaseInstance, Instance, Stack, StackApi, StorageApi, Volume};
use stacknag::notify::Notifier;
use stacknag::pricing::{PriceIndex, COMPUTE_CATEGORY, DATABASE_CATEGORY};
use stacknag::report::{MetricDatum, MetricsSink};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub struct FakeStack {
    pub stack: Stack,
    pub instances: Vec<Instance>,
    pub databases: Vec<DatabaseInstance>,
    pub volumes: Vec<Volume>,
}

impl FakeStack {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            stack: Stack::new(id, name),
            instances: Vec::new(),
            databases: Vec::new(),
            volumes: Vec::new(),
        }
    }

    pub fn instance(mut self, id: &str, instance_type: &str, status: &str) -> Self {
        self.instances.push(Instance::new(id, instance_type, status));
        self
    }

    pub fn database(mut self, identifier: &str, class: &str) -> Self {
        self.databases.push(DatabaseInstance {
            identifier: identifier.to_string(),
            class: class.to_string(),
        });
        self
    }

    pub fn volume(mut self, id: &str, size_gb: u64) -> Self {
        self.volumes.push(Volume {
            volume_id: id.to_string(),
            size_gb,
        });
        self
    }
}

/// Serves a fixed set of stacks; counts every call.
#[derive(Default)]
pub struct FakeStackApi {
    pub stacks: Vec<FakeStack>,
    pub calls: AtomicUsize,
}

impl FakeStackApi {
    pub fn new(stacks: Vec<FakeStack>) -> Self {
        Self {
            stacks,
            calls: AtomicUsize::new(0),
        }
    }

    fn find(&self, stack: &Stack) -> Result<&FakeStack> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.stacks
            .iter()
            .find(|s| s.stack.stack_id == stack.stack_id)
            .ok_or_else(|| StackNagError::Aws(format!("unknown stack {}", stack.stack_id)))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StackApi for FakeStackApi {
    async fn list_stacks(&self) -> Result<Vec<Stack>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.stacks.iter().map(|s| s.stack.clone()).collect())
    }

    async fn stack_instances(&self, stack: &Stack) -> Result<Vec<Instance>> {
        Ok(self.find(stack)?.instances.clone())
    }

    async fn stack_databases(&self, stack: &Stack) -> Result<Vec<DatabaseInstance>> {
        Ok(self.find(stack)?.databases.clone())
    }

    async fn stack_volumes(&self, stack: &Stack) -> Result<Vec<Volume>> {
        Ok(self.find(stack)?.volumes.clone())
    }
}

/// Buckets with optional (unreadable) tag sets and optional size samples
#[derive(Default)]
pub struct FakeStorage {
    pub buckets: Vec<String>,
    pub tags: HashMap<String, Option<Vec<(String, String)>>>,
    pub sizes: HashMap<String, f64>,
    pub size_requests: Mutex<Vec<String>>,
}

impl FakeStorage {
    pub fn bucket(mut self, name: &str, tags: &[(&str, &str)], size_bytes: Option<f64>) -> Self {
        self.buckets.push(name.to_string());
        self.tags.insert(
            name.to_string(),
            Some(
                tags.iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
        );
        if let Some(size) = size_bytes {
            self.sizes.insert(name.to_string(), size);
        }
        self
    }

    pub fn untaggable_bucket(mut self, name: &str) -> Self {
        self.buckets.push(name.to_string());
        self.tags.insert(name.to_string(), None);
        self
    }

    pub fn size_requests(&self) -> Vec<String> {
        self.size_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl StorageApi for FakeStorage {
    async fn list_buckets(&self) -> Result<Vec<String>> {
        Ok(self.buckets.clone())
    }

    async fn bucket_tags(&self, bucket: &str) -> Result<Option<Vec<(String, String)>>> {
        Ok(self.tags.get(bucket).cloned().flatten())
    }

    async fn bucket_size_bytes(&self, bucket: &str) -> Result<Option<f64>> {
        self.size_requests.lock().unwrap().push(bucket.to_string());
        Ok(self.sizes.get(bucket).copied())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub batches: Mutex<Vec<(String, Vec<MetricDatum>)>>,
}

impl RecordingSink {
    pub fn batches(&self) -> Vec<(String, Vec<MetricDatum>)> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetricsSink for RecordingSink {
    async fn put_metrics(&self, namespace: &str, data: &[MetricDatum]) -> Result<()> {
        self.batches
            .lock()
            .unwrap()
            .push((namespace.to_string(), data.to_vec()));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Posted {
    pub url: String,
    pub text: String,
    pub color: String,
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub posted: Mutex<Vec<Posted>>,
}

impl RecordingNotifier {
    pub fn posted(&self) -> Vec<Posted> {
        self.posted.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn post(&self, url: &str, text: &str, color: &str) -> Result<()> {
        self.posted.lock().unwrap().push(Posted {
            url: url.to_string(),
            text: text.to_string(),
            color: color.to_string(),
        });
        Ok(())
    }
}

/// ec2 m5.large 0.10, t3.micro 0.0104; rds db.t3.medium 0.068
pub fn price_index() -> PriceIndex {
    let mut index = PriceIndex::new();
    index.insert(COMPUTE_CATEGORY, "m5.large", 0.10);
    index.insert(COMPUTE_CATEGORY, "t3.micro", 0.0104);
    index.insert(DATABASE_CATEGORY, "db.t3.medium", 0.068);
    index
}
