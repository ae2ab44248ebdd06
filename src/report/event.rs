//! Invocation payloads
//!
//! Accepted shapes:
//! - `{"action": "post stack status"}`
//! - `{"action": "metrics"}`
//! - `{"source": "aws.codebuild", "detail": {"project-name": ..., "current-phase": ..., "build-status"?: ...}}`
//!
//! Anything else is rejected before any collaborator is called.

use crate::error::{Result, StackNagError};
use serde::Deserialize;
use serde_json::Value;

pub const STATUS_ACTION: &str = "post stack status";
pub const METRICS_ACTION: &str = "metrics";
pub const CODEBUILD_SOURCE: &str = "aws.codebuild";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    StatusReport,
    Metrics,
    BuildEvent(BuildEvent),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildEvent {
    pub project: String,
    pub phase: BuildPhase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildPhase {
    Submitted,
    Completed { status: String },
}

#[derive(Deserialize)]
struct CodeBuildDetail {
    #[serde(rename = "project-name")]
    project_name: String,
    #[serde(rename = "current-phase")]
    current_phase: String,
    #[serde(rename = "build-status", default)]
    build_status: Option<String>,
}

fn invalid(payload: &Value) -> StackNagError {
    StackNagError::InvalidEvent(payload.to_string())
}

impl Invocation {
    pub fn from_json_str(payload: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(payload)
            .map_err(|e| StackNagError::InvalidEvent(format!("not JSON ({}): {}", e, payload.trim())))?;
        Self::from_value(&value)
    }

    pub fn from_value(payload: &Value) -> Result<Self> {
        if let Some(action) = payload.get("action") {
            return match action.as_str() {
                Some(STATUS_ACTION) => Ok(Invocation::StatusReport),
                Some(METRICS_ACTION) => Ok(Invocation::Metrics),
                _ => Err(invalid(payload)),
            };
        }

        if payload.get("source").and_then(Value::as_str) == Some(CODEBUILD_SOURCE) {
            let detail = payload.get("detail").ok_or_else(|| invalid(payload))?;
            let detail = CodeBuildDetail::deserialize(detail).map_err(|_| invalid(payload))?;
            return BuildEvent::from_detail(detail, payload).map(Invocation::BuildEvent);
        }

        Err(invalid(payload))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Invocation::StatusReport => "status report",
            Invocation::Metrics => "metrics",
            Invocation::BuildEvent(_) => "build event",
        }
    }
}

impl BuildEvent {
    fn from_detail(detail: CodeBuildDetail, payload: &Value) -> Result<Self> {
        let phase = match detail.current_phase.as_str() {
            "SUBMITTED" => BuildPhase::Submitted,
            "COMPLETED" => BuildPhase::Completed {
                status: detail.build_status.ok_or_else(|| invalid(payload))?,
            },
            other => {
                return Err(StackNagError::UnsupportedBuildPhase {
                    project: detail.project_name,
                    phase: other.to_string(),
                })
            }
        };
        Ok(BuildEvent {
            project: detail.project_name,
            phase,
        })
    }
}
