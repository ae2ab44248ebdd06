//! Reporting driver: one stateless invocation per call
//!
//! Required settings are checked and the payload is parsed before any
//! collaborator is touched, so a rejected invocation sends nothing.

use crate::config::Settings;
use crate::cost::FleetSummary;
use crate::error::Result;
use crate::fleet::{hydrate_fleet, StackApi, StorageApi};
use crate::notify::{Notifier, GREEN, YELLOW};
use crate::pricing::PriceIndex;
use crate::report::event::{BuildEvent, Invocation};
use crate::report::message::{build_event_message, status_message};
use crate::report::metrics::{fleet_metrics, stack_metrics, MetricsSink};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// What an invocation did
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    StatusPosted { message: String },
    MetricsPublished { batches: usize, data_points: usize },
    BuildEventRelayed { message: String },
}

pub struct Driver {
    settings: Settings,
    index: Arc<PriceIndex>,
    stacks: Arc<dyn StackApi>,
    storage: Arc<dyn StorageApi>,
    metrics: Arc<dyn MetricsSink>,
    notifier: Arc<dyn Notifier>,
}

impl Driver {
    pub fn new(
        settings: Settings,
        index: Arc<PriceIndex>,
        stacks: Arc<dyn StackApi>,
        storage: Arc<dyn StorageApi>,
        metrics: Arc<dyn MetricsSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            settings,
            index,
            stacks,
            storage,
            metrics,
            notifier,
        }
    }

    pub async fn handle_event(&self, payload: &Value) -> Result<Outcome> {
        info!("Event received: {}", payload);
        let invocation = Invocation::from_value(payload)?;
        self.handle(&invocation).await
    }

    pub async fn handle(&self, invocation: &Invocation) -> Result<Outcome> {
        if let Some(topic) = &self.settings.alert_topic_arn {
            info!(topic = %topic, invocation = invocation.name(), "Handling invocation");
        }
        match invocation {
            Invocation::StatusReport => self.post_status().await,
            Invocation::Metrics => self.publish_metrics().await,
            Invocation::BuildEvent(event) => self.relay_build_event(event).await,
        }
    }

    /// Hydrate every stack and cost it. Used by every cost-bearing mode.
    pub async fn fleet_summary(&self) -> Result<FleetSummary> {
        let stacks = hydrate_fleet(self.stacks.as_ref(), self.storage.as_ref()).await?;
        FleetSummary::from_stacks(&stacks, &self.index)
    }

    async fn post_status(&self) -> Result<Outcome> {
        let url = self.settings.require_price_notify_url()?;
        let summary = self.fleet_summary().await?;
        let message = status_message(&summary);
        self.notifier.post(url, &message, YELLOW).await?;
        Ok(Outcome::StatusPosted { message })
    }

    async fn publish_metrics(&self) -> Result<Outcome> {
        let namespace = self.settings.require_namespace()?;
        let summary = self.fleet_summary().await?;
        info!("Logging metrics to namespace: {}", namespace);

        let timestamp = Utc::now();
        let mut batches = vec![fleet_metrics(&summary, timestamp)];
        batches.extend(summary.stacks.iter().map(|s| stack_metrics(s, timestamp)));

        let mut data_points = 0;
        for batch in &batches {
            self.metrics.put_metrics(namespace, batch).await?;
            data_points += batch.len();
        }

        Ok(Outcome::MetricsPublished {
            batches: batches.len(),
            data_points,
        })
    }

    async fn relay_build_event(&self, event: &BuildEvent) -> Result<Outcome> {
        let url = self.settings.require_codebuild_notify_url()?;
        let message = build_event_message(event);
        self.notifier.post(url, &message, GREEN).await?;
        Ok(Outcome::BuildEventRelayed { message })
    }
}
