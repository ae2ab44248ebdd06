//! Typed records for a stack's live inventory

use serde::{Deserialize, Serialize};

/// Instance status meaning "running and billed"
pub const ONLINE_STATUS: &str = "online";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stack {
    pub stack_id: String,
    pub name: String,
}

impl Stack {
    pub fn new(stack_id: &str, name: &str) -> Self {
        Self {
            stack_id: stack_id.to_string(),
            name: name.to_string(),
        }
    }

    /// Metric-dimension-safe name: anything outside `[a-z0-9-]` becomes `-`
    pub fn shortname(&self) -> String {
        self.name
            .chars()
            .map(|c| {
                if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
                    c
                } else {
                    '-'
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub instance_id: String,
    pub instance_type: String,
    pub status: String,
}

impl Instance {
    pub fn new(instance_id: &str, instance_type: &str, status: &str) -> Self {
        Self {
            instance_id: instance_id.to_string(),
            instance_type: instance_type.to_string(),
            status: status.to_string(),
        }
    }

    /// Exact match on `online`; every other status counts as not running.
    pub fn is_online(&self) -> bool {
        self.status == ONLINE_STATUS
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseInstance {
    pub identifier: String,
    pub class: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    pub volume_id: String,
    pub size_gb: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketUsage {
    pub name: String,
    /// Most recent daily average of `BucketSizeBytes`, if any
    pub size_bytes: Option<f64>,
}

/// A stack with every sub-resource fetched; immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydratedStack {
    pub stack: Stack,
    pub instances: Vec<Instance>,
    pub database: Option<DatabaseInstance>,
    pub volumes: Vec<Volume>,
    pub buckets: Vec<BucketUsage>,
}

impl HydratedStack {
    /// A stack with no sub-resources at all
    pub fn empty(stack: Stack) -> Self {
        Self {
            stack,
            instances: Vec::new(),
            database: None,
            volumes: Vec::new(),
            buckets: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.stack.name
    }

    pub fn online_instances(&self) -> impl Iterator<Item = &Instance> {
        self.instances.iter().filter(|i| i.is_online())
    }

    pub fn online_count(&self) -> usize {
        self.online_instances().count()
    }

    pub fn is_running(&self) -> bool {
        self.online_instances().next().is_some()
    }

    pub fn total_volume_gb(&self) -> u64 {
        self.volumes.iter().map(|v| v.size_gb).sum()
    }

    pub fn total_bucket_bytes(&self) -> f64 {
        self.buckets.iter().filter_map(|b| b.size_bytes).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortname() {
        assert_eq!(Stack::new("1", "web-prod").shortname(), "web-prod");
        assert_eq!(Stack::new("1", "Web Prod_2").shortname(), "-eb--rod-2");
        assert_eq!(Stack::new("1", "dev.stack").shortname(), "dev-stack");
    }

    #[test]
    fn test_online_is_exact() {
        assert!(Instance::new("i-1", "m5.large", "online").is_online());
        assert!(!Instance::new("i-1", "m5.large", "Online").is_online());
        assert!(!Instance::new("i-1", "m5.large", "booting").is_online());
        assert!(!Instance::new("i-1", "m5.large", "stopped").is_online());
    }

    #[test]
    fn test_hydrated_counts() {
        let mut stack = HydratedStack::empty(Stack::new("s-1", "dev"));
        assert!(!stack.is_running());
        assert_eq!(stack.total_volume_gb(), 0);
        assert_eq!(stack.total_bucket_bytes(), 0.0);

        stack.instances = vec![
            Instance::new("i-1", "m5.large", "online"),
            Instance::new("i-2", "m5.large", "stopped"),
        ];
        stack.volumes = vec![
            Volume { volume_id: "v-1".into(), size_gb: 100 },
            Volume { volume_id: "v-2".into(), size_gb: 200 },
        ];
        stack.buckets = vec![
            BucketUsage { name: "a".into(), size_bytes: Some(10.0) },
            BucketUsage { name: "b".into(), size_bytes: None },
        ];

        assert!(stack.is_running());
        assert_eq!(stack.online_count(), 1);
        assert_eq!(stack.total_volume_gb(), 300);
        assert_eq!(stack.total_bucket_bytes(), 10.0);
    }
}
