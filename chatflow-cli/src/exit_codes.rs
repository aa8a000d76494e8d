//! Exit codes returned by `chatflow` commands
//!
//! - 0: Success
//! - 1: Warnings (e.g. unreachable nodes) or a command that could not finish
//! - 2: Structural violations or unreadable input

/// Successful execution
pub const EXIT_SUCCESS: i32 = 0;

/// Warnings found, or the command stopped early
pub const EXIT_WARNING: i32 = 1;

/// Invalid diagram or fatal failure
pub const EXIT_ERROR: i32 = 2;
