//! Operation boundary macros.
//!
//! Each pipeline operation logs one `start` and exactly one of `end` or
//! `end_error`, all carrying `component` and `op`. Extra `key = value` fields
//! are passed through to `tracing` unchanged.

/// Log the start of an operation
///
/// ```
/// # use salewatch_core::log_op_start;
/// log_op_start!("execute_run");
/// log_op_start!("execute_run", source_count = 3);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_START
            $(, $($field)*)?
        )
    };
}

/// Log the successful end of an operation
///
/// ```
/// # use salewatch_core::log_op_end;
/// log_op_end!("execute_run", duration_ms = 4, change_count = 2);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END,
            duration_ms = $duration
            $(, $($field)*)?
        )
    };
}

/// Log a failed operation
///
/// `$err` is anything convertible into `WatchError`. It is cloned, so the
/// caller keeps ownership and can still propagate it.
///
/// ```
/// # use salewatch_core::log_op_error;
/// # use salewatch_core::errors::{WatchError, WatchErrorKind};
/// let err = WatchError::new(WatchErrorKind::LockHeld);
/// log_op_error!("execute_run", err, duration_ms = 1);
/// assert_eq!(err.kind(), WatchErrorKind::LockHeld);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let watch_err: $crate::errors::WatchError = ::std::clone::Clone::clone(&$err).into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?watch_err.kind(),
            err.code = watch_err.code(),
            err.message = watch_err.message()
            $(, $($field)*)?
        );
    }};
}
