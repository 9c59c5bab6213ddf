//! Maintenance protocols over user state.
//!
//! Each protocol is a short sequential chain of store calls. Report
//! rendering lives next to the protocol so the binaries only print.

pub mod inspector;
pub mod migration;
pub mod reset;

pub use inspector::{LATEST_FIELDS, Lookup, SCAN_LIMIT};
pub use migration::{DEFAULT_EXEC_FUNCTION, ManualReason, MigrationError, MigrationOutcome};
pub use reset::{
    CascadeReport, HardResetReport, ResetError, SoftResetReport, StreakOutcome,
};
