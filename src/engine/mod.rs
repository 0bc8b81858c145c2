//! Execution engine for authstack
//!
//! - [`local`] records provisioned resources in a state file
//! - [`differ`] renders plans
//! - [`executor`] reports progress and results on the terminal

pub mod differ;
pub mod executor;
pub mod local;

pub use differ::{display_plan, display_teardown};
pub use executor::{TerminalProgress, confirm_proceed, print_failures, print_summary};
pub use local::LocalEngine;
