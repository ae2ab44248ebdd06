//! Exit code standardization for stacknag
//!
//! ## Exit Code Convention
//!
//! - `0` = Success
//! - `1` = Request error (invalid event payload, unsupported build phase)
//! - `2` = System error (AWS API failure, webhook failure, stale price index)
//! - `3` = Configuration or startup error (missing setting, missing price index)

use crate::error::StackNagError;

/// Standard exit codes for stacknag
pub mod codes {
    /// Success
    pub const SUCCESS: i32 = 0;
    /// Request error (payload rejected)
    pub const USER_ERROR: i32 = 1;
    /// System error (collaborator failure)
    pub const SYSTEM_ERROR: i32 = 2;
    /// Configuration or startup error
    pub const CONFIG_ERROR: i32 = 3;
}

/// Map a StackNagError to an appropriate exit code
pub fn exit_code_for_error(error: &StackNagError) -> i32 {
    use StackNagError::*;
    match error {
        Config(_) => codes::CONFIG_ERROR,
        PriceIndexMissing { .. } => codes::CONFIG_ERROR,
        PriceIndexInvalid { .. } => codes::CONFIG_ERROR,

        InvalidEvent(_) => codes::USER_ERROR,
        UnsupportedBuildPhase { .. } => codes::USER_ERROR,

        // A lookup miss means the index no longer matches the fleet
        PriceNotFound { .. } => codes::SYSTEM_ERROR,
        DuplicateClass { .. } => codes::SYSTEM_ERROR,
        PriceParse { .. } => codes::SYSTEM_ERROR,
        Catalog(_) => codes::SYSTEM_ERROR,
        MultipleDatabases { .. } => codes::SYSTEM_ERROR,

        CloudProvider { .. } => codes::SYSTEM_ERROR,
        Aws(_) => codes::SYSTEM_ERROR,
        Notification(_) => codes::SYSTEM_ERROR,
        Retryable { .. } => codes::SYSTEM_ERROR,
        Http(_) => codes::SYSTEM_ERROR,
        Io(_) => codes::SYSTEM_ERROR,
        Json(_) => codes::SYSTEM_ERROR,
    }
}

/// Exit code for an error that reached the CLI boundary
///
/// Errors that did not originate as `StackNagError` count as system errors.
pub fn exit_code_for_anyhow(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<StackNagError>()
        .map(exit_code_for_error)
        .unwrap_or(codes::SYSTEM_ERROR)
}
