//! Human-readable notification text

use crate::cost::FleetSummary;
use crate::report::event::{BuildEvent, BuildPhase};
use crate::utils::{format_hourly, plural_suffix};
use std::fmt::Write;

/// Running stacks with their hourly cost, then the fleet-wide total.
///
/// The total includes stopped stacks: their storage and databases still bill.
pub fn status_message(summary: &FleetSummary) -> String {
    let mut msg = String::new();
    let running = summary.running_count();

    if running > 0 {
        let _ = writeln!(msg, "{} currently running stacks:", running);
        for stack in summary.running() {
            let _ = writeln!(
                msg,
                "{}: {} instance{}, {}",
                stack.name,
                stack.online_instances,
                plural_suffix(stack.online_instances),
                format_hourly(stack.cost.total())
            );
        }
    } else {
        msg.push_str("No running stacks\n");
    }

    let _ = write!(
        msg,
        "Total usage cost (including non-running stacks): {}",
        format_hourly(summary.totals().total())
    );
    msg
}

pub fn build_event_message(event: &BuildEvent) -> String {
    match &event.phase {
        BuildPhase::Submitted => format!("CodeBuild submitted for {}", event.project),
        BuildPhase::Completed { status } => {
            format!("CodeBuild for {} status: {}", event.project, status)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::{StackCost, StackReport};

    fn report(name: &str, online: usize, compute: f64, storage: f64) -> StackReport {
        StackReport {
            name: name.to_string(),
            shortname: name.to_string(),
            online_instances: online,
            cost: StackCost {
                compute,
                block_storage: storage,
                ..StackCost::default()
            },
        }
    }

    #[test]
    fn test_no_running_stacks() {
        let summary = FleetSummary {
            stacks: vec![report("idle", 0, 0.0, 0.5)],
        };
        assert_eq!(
            status_message(&summary),
            "No running stacks\nTotal usage cost (including non-running stacks): $0.50/hr"
        );
    }

    #[test]
    fn test_running_stacks() {
        let summary = FleetSummary {
            stacks: vec![
                report("web", 2, 0.20, 0.01),
                report("idle", 0, 0.0, 1.0),
                report("api", 1, 0.10, 0.0),
            ],
        };
        assert_eq!(
            status_message(&summary),
            "2 currently running stacks:\n\
             web: 2 instances, $0.21/hr\n\
             api: 1 instance, $0.10/hr\n\
             Total usage cost (including non-running stacks): $1.31/hr"
        );
    }

    #[test]
    fn test_build_messages() {
        let submitted = BuildEvent {
            project: "foo".into(),
            phase: BuildPhase::Submitted,
        };
        assert_eq!(build_event_message(&submitted), "CodeBuild submitted for foo");

        let completed = BuildEvent {
            project: "foo".into(),
            phase: BuildPhase::Completed {
                status: "SUCCEEDED".into(),
            },
        };
        let msg = build_event_message(&completed);
        assert!(msg.contains("foo") && msg.contains("SUCCEEDED"));
    }
}
