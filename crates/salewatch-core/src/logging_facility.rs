//! Structured logging for salewatch.
//!
//! Binaries call [`init`] once with the configured [`Profile`]. Library code
//! logs operation boundaries with `log_op_start!`, `log_op_end!` and
//! `log_op_error!`; per-run domain events go through
//! [`RunContext`](crate::context::RunContext) instead. Tests install
//! [`init_test_capture`] and assert on what was emitted.
//!
//! ```rust
//! use salewatch_core::logging_facility::{init, Profile};
//!
//! init(Profile::Production);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
