//! End-to-end checks against a real AWS account
//!
//! These tests require AWS credentials and only read resources.
//! Run with: STACKNAG_E2E=1 cargo test --test aws_e2e_test --features e2e -- --ignored

#![cfg(feature = "e2e")]

use stacknag::aws::{load_sdk_config, AwsStorageApi, OpsWorksStackApi};
use stacknag::config::Settings;
use stacknag::fleet::{hydrate_fleet, StackApi};
use std::env;

fn should_run_e2e() -> bool {
    env::var("STACKNAG_E2E").is_ok()
}

#[tokio::test]
#[ignore] // Requires AWS credentials and explicit opt-in
async fn test_list_and_hydrate_stacks() {
    if !should_run_e2e() {
        eprintln!("Skipping E2E test. Set STACKNAG_E2E=1 to run");
        return;
    }

    let settings = Settings {
        aws_profile: env::var("AWS_PROFILE").ok(),
        aws_region: env::var("AWS_REGION").ok(),
        ..Settings::default()
    };
    let sdk_config = load_sdk_config(&settings).await;
    let stacks = OpsWorksStackApi::new(&sdk_config);
    let storage = AwsStorageApi::new(&sdk_config);

    let listed = stacks.list_stacks().await.expect("DescribeStacks failed");
    let hydrated = hydrate_fleet(&stacks, &storage)
        .await
        .expect("Failed to hydrate stacks");

    assert_eq!(listed.len(), hydrated.len());
    for stack in &hydrated {
        eprintln!(
            "{}: {} online, {} GB of volumes, {} buckets",
            stack.name(),
            stack.online_count(),
            stack.total_volume_gb(),
            stack.buckets.len()
        );
    }
}
