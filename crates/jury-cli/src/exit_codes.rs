//! Unified exit codes for the jury binary.
//! These codes are part of the public contract; CI pipelines key off them.

pub const SUCCESS: i32 = 0;
pub const TASK_FAILURES: i32 = 1; // Run finished but at least one task failed
pub const INTERNAL_ERROR: i32 = 2; // Config/registry error or engine breakage
