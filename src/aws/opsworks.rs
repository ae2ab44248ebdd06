use super::{is_absent, sdk_error};
use crate::error::Result;
use crate::fleet::{DatabaseInstance, Instance, Stack, StackApi, Volume};
use crate::retry::{ExponentialBackoffPolicy, RetryPolicy};
use async_trait::async_trait;
use aws_sdk_opsworks::Client as OpsWorksClient;
use aws_sdk_rds::Client as RdsClient;
use tracing::{debug, info};

/// OpsWorks stacks, with database classes resolved through RDS
pub struct OpsWorksStackApi {
    opsworks: OpsWorksClient,
    rds: RdsClient,
    retry: ExponentialBackoffPolicy,
}

impl OpsWorksStackApi {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            opsworks: OpsWorksClient::new(config),
            rds: RdsClient::new(config),
            retry: ExponentialBackoffPolicy::for_cloud_api(),
        }
    }

    /// `None` when RDS no longer knows the identifier or refuses to say.
    async fn db_instance_class(&self, identifier: &str) -> Result<Option<String>> {
        let rds = &self.rds;
        self.retry
            .execute_with_retry(|| async move {
                match rds
                    .describe_db_instances()
                    .db_instance_identifier(identifier)
                    .send()
                    .await
                {
                    Ok(output) => Ok(output
                        .db_instances()
                        .first()
                        .and_then(|db| db.db_instance_class())
                        .map(str::to_string)),
                    Err(e) if is_absent(&e) => {
                        info!("No RDS database {} found", identifier);
                        Ok(None)
                    }
                    Err(e) => Err(sdk_error("rds", "DescribeDBInstances", e)),
                }
            })
            .await
    }
}

#[async_trait]
impl StackApi for OpsWorksStackApi {
    async fn list_stacks(&self) -> Result<Vec<Stack>> {
        let client = &self.opsworks;
        let output = self
            .retry
            .execute_with_retry(|| async move {
                client
                    .describe_stacks()
                    .send()
                    .await
                    .map_err(|e| sdk_error("opsworks", "DescribeStacks", e))
            })
            .await?;

        Ok(output
            .stacks()
            .iter()
            .filter_map(|s| match (s.stack_id(), s.name()) {
                (Some(id), Some(name)) => Some(Stack::new(id, name)),
                _ => None,
            })
            .collect())
    }

    async fn stack_instances(&self, stack: &Stack) -> Result<Vec<Instance>> {
        let client = &self.opsworks;
        let stack_id = stack.stack_id.as_str();
        let output = self
            .retry
            .execute_with_retry(|| async move {
                client
                    .describe_instances()
                    .stack_id(stack_id)
                    .send()
                    .await
                    .map_err(|e| sdk_error("opsworks", "DescribeInstances", e))
            })
            .await?;

        Ok(output
            .instances()
            .iter()
            .map(|i| {
                Instance::new(
                    i.instance_id().unwrap_or_default(),
                    i.instance_type().unwrap_or_default(),
                    i.status().unwrap_or_default(),
                )
            })
            .collect())
    }

    async fn stack_databases(&self, stack: &Stack) -> Result<Vec<DatabaseInstance>> {
        let client = &self.opsworks;
        let stack_id = stack.stack_id.as_str();
        let registered = self
            .retry
            .execute_with_retry(|| async move {
                match client.describe_rds_db_instances().stack_id(stack_id).send().await {
                    Ok(output) => Ok(output
                        .rds_db_instances()
                        .iter()
                        .filter_map(|db| db.db_instance_identifier().map(str::to_string))
                        .collect::<Vec<_>>()),
                    Err(e) if is_absent(&e) => {
                        debug!("No RDS databases registered with stack {}", stack_id);
                        Ok(Vec::new())
                    }
                    Err(e) => Err(sdk_error("opsworks", "DescribeRdsDbInstances", e)),
                }
            })
            .await?;

        let mut databases = Vec::with_capacity(registered.len());
        for identifier in registered {
            if let Some(class) = self.db_instance_class(&identifier).await? {
                databases.push(DatabaseInstance { identifier, class });
            }
        }
        Ok(databases)
    }

    async fn stack_volumes(&self, stack: &Stack) -> Result<Vec<Volume>> {
        let client = &self.opsworks;
        let stack_id = stack.stack_id.as_str();
        let output = self
            .retry
            .execute_with_retry(|| async move {
                client
                    .describe_volumes()
                    .stack_id(stack_id)
                    .send()
                    .await
                    .map_err(|e| sdk_error("opsworks", "DescribeVolumes", e))
            })
            .await?;

        Ok(output
            .volumes()
            .iter()
            .map(|v| Volume {
                volume_id: v.volume_id().unwrap_or_default().to_string(),
                size_gb: v.size().unwrap_or(0).max(0) as u64,
            })
            .collect())
    }
}
