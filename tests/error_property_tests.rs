//! Property-based tests for error handling
//!
//! Tests that verify error display, retryability and exit code mapping.

use proptest::prelude::*;
use stacknag::error::{ConfigError, IsRetryable, StackNagError};
use stacknag::exit_codes::{codes, exit_code_for_anyhow, exit_code_for_error};

proptest! {
    #[test]
    fn test_error_display_formatting(
        provider in r"[a-zA-Z0-9]+",
        message in r".+"
    ) {
        let err = StackNagError::CloudProvider {
            provider: provider.clone(),
            message: message.clone(),
            source: None,
        };

        let display = format!("{}", err);

        // Properties:
        // 1. Should contain provider name
        prop_assert!(display.contains(&provider));

        // 2. Should contain message
        prop_assert!(display.contains(&message));
    }

    #[test]
    fn test_price_not_found_names_category_and_class(
        category in r"[a-z0-9]{2,6}",
        class in r"[a-z0-9]{1,4}\.[a-z0-9]{2,8}"
    ) {
        let err = StackNagError::PriceNotFound {
            category: category.clone(),
            class: class.clone(),
        };
        let display = err.to_string();
        prop_assert!(display.contains(&category));
        prop_assert!(display.contains(&class));
        prop_assert!(!err.is_retryable());
        prop_assert_eq!(exit_code_for_error(&err), codes::SYSTEM_ERROR);
    }

    #[test]
    fn test_error_retryability_properties(
        error_type in prop_oneof![
            Just("retryable"),
            Just("cloud_provider"),
            Just("io"),
            Just("aws"),
            Just("invalid_event"),
            Just("multiple_databases"),
        ]
    ) {
        let err: StackNagError = match error_type {
            "retryable" => StackNagError::Retryable {
                attempt: 1,
                max_attempts: 5,
                reason: "test".to_string(),
                source: None,
            },
            "cloud_provider" => StackNagError::CloudProvider {
                provider: "aws".to_string(),
                message: "test".to_string(),
                source: None,
            },
            "io" => StackNagError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "test"
            )),
            "aws" => StackNagError::Aws("AccessDenied".to_string()),
            "invalid_event" => StackNagError::InvalidEvent("{}".to_string()),
            _ => StackNagError::MultipleDatabases {
                stack: "web".to_string(),
                count: 2,
            },
        };

        let is_retryable = err.is_retryable();

        if matches!(error_type, "retryable" | "cloud_provider" | "io") {
            prop_assert!(is_retryable, "Error type {} should be retryable", error_type);
        } else {
            prop_assert!(!is_retryable, "Error type {} should not be retryable", error_type);
        }
    }

    #[test]
    fn test_config_errors_exit_with_config_code(field in r"[A-Z_]{3,20}") {
        let err: StackNagError = ConfigError::MissingField(field.clone()).into();

        prop_assert!(matches!(err, StackNagError::Config(_)));
        prop_assert!(err.to_string().contains(&field));
        prop_assert_eq!(exit_code_for_error(&err), codes::CONFIG_ERROR);

        // Context added at the CLI boundary does not change the code
        let wrapped = anyhow::Error::new(err).context("while handling status report");
        prop_assert_eq!(exit_code_for_anyhow(&wrapped), codes::CONFIG_ERROR);
    }
}

#[test]
fn test_request_errors_are_user_errors() {
    let err = StackNagError::UnsupportedBuildPhase {
        project: "foo".to_string(),
        phase: "BUILD".to_string(),
    };
    assert_eq!(exit_code_for_error(&err), codes::USER_ERROR);
    assert_eq!(
        exit_code_for_anyhow(&anyhow::anyhow!("not ours")),
        codes::SYSTEM_ERROR
    );
}
