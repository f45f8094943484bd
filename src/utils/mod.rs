//! The `utils` module provides a collection of utility functions and common
//! definitions used across the `expense_outbox` crate.
//!
//! It holds the crate-wide error types and the tracing setup shared by the
//! library and the command-line front end.

pub mod error;
pub mod logging;
