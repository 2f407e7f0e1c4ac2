//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_RUN_ID: &str = "run_id";

// Domain identifiers
pub const FIELD_SOURCE: &str = "source";
pub const FIELD_IDENTITY: &str = "identity";
pub const FIELD_PATH: &str = "path";

// Collection sizes
pub const FIELD_RECORD_COUNT: &str = "record_count";
pub const FIELD_SOURCE_COUNT: &str = "source_count";
pub const FIELD_CHANGE_COUNT: &str = "change_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

// Run events
pub const EVENT_SOURCE_COLLECTED: &str = "source_collected";
pub const EVENT_SOURCE_FAILED: &str = "source_failed";
pub const EVENT_STALE_SOURCE_CARRIED: &str = "stale_source_carried";
pub const EVENT_STALE_SOURCE_DROPPED: &str = "stale_source_dropped";
pub const EVENT_STORE_MISSING: &str = "store_missing";
pub const EVENT_STORE_LOADED: &str = "store_loaded";
pub const EVENT_STORE_CORRUPT: &str = "store_corrupt";
pub const EVENT_STORE_UNREADABLE: &str = "store_unreadable";
pub const EVENT_STORE_SAVED: &str = "store_saved";
pub const EVENT_STORE_WRITE_FAILED: &str = "store_write_failed";
pub const EVENT_RECONCILED: &str = "reconciled";
