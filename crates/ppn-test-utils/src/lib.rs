#![deny(unsafe_code)]

//! Shared test utilities for the PPN workspace.
//!
//! Provides reusable option fixtures, temporary options files, and tracing
//! helpers so that individual crate tests stay concise and consistent.
//!
//! Add this crate as a `[dev-dependency]` in any workspace member:
//!
//! ```toml
//! [dev-dependencies]
//! ppn-test-utils = { workspace = true }
//! ```

pub mod fixtures;
pub mod options_file;
pub mod tracing_setup;
