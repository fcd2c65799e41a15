//! Structured logging facility for catdiff
//!
//! This module provides:
//! - Single initialization point via `init(profile)`
//! - Structured logging macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Test capture mode for asserting on audit events
//!
//! # Usage
//!
//! ```rust
//! use catdiff_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```
//!
//! Suppression audit events (`ignore_match`, `filter_match`, `tag_expand`) are
//! emitted at `info` level by the ignore engine, filter pipeline and tag
//! expander; they go through the same subscriber.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
