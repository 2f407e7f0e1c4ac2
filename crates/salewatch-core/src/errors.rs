use salewatch_core_types::RunId;
use thiserror::Error;

/// Result type alias using the canonical WatchError
pub type Result<T> = std::result::Result<T, WatchError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and log assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchErrorKind {
    // Validation
    InvalidInput,
    InvalidPrice,
    InvalidConfig,

    // Extraction
    /// A snapshot source failed to produce its records this run
    SourceFailed,

    // Persistence
    NotFound,
    /// Persisted snapshot could not be parsed or failed its digest check
    StoreCorrupt,
    /// Another run holds the run lock
    LockHeld,
    Io,
    Serialization,
    Persistence,
}

impl WatchErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            WatchErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            WatchErrorKind::InvalidPrice => "ERR_INVALID_PRICE",
            WatchErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            WatchErrorKind::SourceFailed => "ERR_SOURCE_FAILED",
            WatchErrorKind::NotFound => "ERR_NOT_FOUND",
            WatchErrorKind::StoreCorrupt => "ERR_STORE_CORRUPT",
            WatchErrorKind::LockHeld => "ERR_LOCK_HELD",
            WatchErrorKind::Io => "ERR_IO",
            WatchErrorKind::Serialization => "ERR_SERIALIZATION",
            WatchErrorKind::Persistence => "ERR_PERSISTENCE",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind for programmatic handling plus optional
/// context (operation, source, record identity, run) for debugging.
#[derive(Debug, Clone)]
pub struct WatchError {
    kind: WatchErrorKind,
    op: Option<String>,
    source_name: Option<String>,
    identity: Option<String>,
    run_id: Option<RunId>,
    message: String,
    source: Option<Box<WatchError>>,
}

impl WatchError {
    /// Create a new error with the specified kind
    pub fn new(kind: WatchErrorKind) -> Self {
        Self {
            kind,
            op: None,
            source_name: None,
            identity: None,
            run_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add snapshot source context
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    /// Add record identity context
    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    /// Add run ID context
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: WatchError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> WatchErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the snapshot source context, if any
    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    /// Get the record identity context, if any
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Get the run ID context, if any
    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&WatchError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for WatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {:?}", self.code(), self.kind)?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(source_name) = &self.source_name {
            write!(f, " (source: {})", source_name)?;
        }
        if let Some(identity) = &self.identity {
            write!(f, " (identity: {})", identity)?;
        }
        if let Some(source) = &self.source {
            write!(f, "; caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for WatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain validation errors raised while building records and configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SaleWatchError {
    /// Price text could not be parsed as an exact decimal amount
    #[error("Invalid price text: {text:?}")]
    InvalidPrice { text: String },

    /// Record identity is empty or whitespace-only
    #[error("Record in source {source_name} has an empty identity")]
    EmptyIdentity { source_name: String },

    /// Source name is empty or whitespace-only
    #[error("Source name cannot be empty")]
    EmptySourceName,

    /// Two configured sources resolve to the same name
    #[error("Duplicate source name: {source_name}")]
    DuplicateSource { source_name: String },

    /// Configuration failed validation
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// JSON (de)serialization failure
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

/// Conversion from SaleWatchError to the canonical WatchError
impl From<SaleWatchError> for WatchError {
    fn from(err: SaleWatchError) -> Self {
        match err {
            SaleWatchError::InvalidPrice { text } => WatchError::new(WatchErrorKind::InvalidPrice)
                .with_op("parse_money")
                .with_message(format!("cannot parse price from {:?}", text)),

            SaleWatchError::EmptyIdentity { source_name } => {
                WatchError::new(WatchErrorKind::InvalidInput)
                    .with_source_name(source_name)
                    .with_message("record identity is empty")
            }

            SaleWatchError::EmptySourceName => WatchError::new(WatchErrorKind::InvalidInput)
                .with_message("source name is empty"),

            SaleWatchError::DuplicateSource { source_name } => {
                WatchError::new(WatchErrorKind::InvalidConfig)
                    .with_source_name(source_name)
                    .with_message("source name is configured more than once")
            }

            SaleWatchError::InvalidConfig { reason } => {
                WatchError::new(WatchErrorKind::InvalidConfig).with_message(reason)
            }

            SaleWatchError::Serialization { message } => {
                WatchError::new(WatchErrorKind::Serialization).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to SaleWatchError
impl From<serde_json::Error> for SaleWatchError {
    fn from(err: serde_json::Error) -> Self {
        SaleWatchError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_codes() {
        let cases = [
            (WatchErrorKind::InvalidPrice, "ERR_INVALID_PRICE"),
            (WatchErrorKind::SourceFailed, "ERR_SOURCE_FAILED"),
            (WatchErrorKind::StoreCorrupt, "ERR_STORE_CORRUPT"),
            (WatchErrorKind::LockHeld, "ERR_LOCK_HELD"),
            (WatchErrorKind::Persistence, "ERR_PERSISTENCE"),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
        }
    }

    #[test]
    fn test_display_includes_context() {
        let err = WatchError::new(WatchErrorKind::SourceFailed)
            .with_op("produce")
            .with_source_name("CCS_Wheels")
            .with_message("feed missing");
        let text = err.to_string();
        assert!(text.starts_with("[ERR_SOURCE_FAILED]"));
        assert!(text.contains("'produce'"));
        assert!(text.contains("feed missing"));
        assert!(text.contains("CCS_Wheels"));
    }

    #[test]
    fn test_std_error_source_chain() {
        use std::error::Error as _;

        let inner = WatchError::new(WatchErrorKind::Io).with_message("disk full");
        let outer = WatchError::new(WatchErrorKind::Persistence).with_source(inner);
        let source = outer.source().expect("source should be set");
        assert!(source.to_string().contains("disk full"));
    }

    #[test]
    fn test_invalid_price_converts_to_invalid_price_kind() {
        let err: WatchError = SaleWatchError::InvalidPrice {
            text: "call us".to_string(),
        }
        .into();
        assert_eq!(err.kind(), WatchErrorKind::InvalidPrice);
        assert_eq!(err.op(), Some("parse_money"));
    }
}
