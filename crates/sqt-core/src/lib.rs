// SPDX-License-Identifier: MIT OR Apache-2.0
//! Portable error taxonomy and driver error model for sqltriage.
//!
//! A failed database operation surfaces as a [`DriverError`] — the raw,
//! vendor-specific failure raised by the driver.  Translation classifies it
//! into an [`ErrorKind`] (a closed, vendor-agnostic taxonomy with stable
//! string tags) and wraps the result in a [`TranslatedError`] that always
//! retains the original driver error as its cause.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ErrorKind
// ---------------------------------------------------------------------------

/// Portable, vendor-agnostic classification of a database failure.
///
/// This is the only classification application code should branch on.
/// Each variant serialises to a `SCREAMING_SNAKE_CASE` string that is
/// guaranteed not to change across patch releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// The SQL statement itself is invalid (syntax error, unknown column,
    /// wrong cardinality).
    BadGrammar,
    /// A unique or primary key constraint was violated.
    DuplicateKey,
    /// A non-key integrity constraint was violated (check, foreign key,
    /// not-null, bad data value).
    DataIntegrityViolation,
    /// The current credentials lack permission for the operation.
    PermissionDenied,
    /// The connection to the database failed or a server-side resource was
    /// exhausted; retrying on the same connection will not help.
    ConnectionFailure,
    /// A transient connection problem; the operation may succeed if retried
    /// on a fresh connection.
    TransientConnectionFailure,
    /// The operation lost a lock race: deadlock victim, lock wait timeout,
    /// or serialization failure.
    Deadlock,
    /// The statement exceeded its execution time budget.
    QueryTimeout,
    /// No finer classification applies.
    Uncategorized,
}

impl ErrorKind {
    /// Stable `&'static str` representation of the kind
    /// (e.g. `"DUPLICATE_KEY"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadGrammar => "BAD_GRAMMAR",
            Self::DuplicateKey => "DUPLICATE_KEY",
            Self::DataIntegrityViolation => "DATA_INTEGRITY_VIOLATION",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::ConnectionFailure => "CONNECTION_FAILURE",
            Self::TransientConnectionFailure => "TRANSIENT_CONNECTION_FAILURE",
            Self::Deadlock => "DEADLOCK",
            Self::QueryTimeout => "QUERY_TIMEOUT",
            Self::Uncategorized => "UNCATEGORIZED",
        }
    }

    /// Returns `true` for kinds where retrying the operation is reasonable.
    ///
    /// Deadlock victims, query timeouts, and transient connection failures
    /// are safe to retry; everything else either cannot succeed on retry or
    /// needs a decision from the caller.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::TransientConnectionFailure | Self::Deadlock | Self::QueryTimeout
        )
    }

    /// All kinds, for exhaustive iteration.
    pub fn all() -> &'static [ErrorKind] {
        &[
            Self::BadGrammar,
            Self::DuplicateKey,
            Self::DataIntegrityViolation,
            Self::PermissionDenied,
            Self::ConnectionFailure,
            Self::TransientConnectionFailure,
            Self::Deadlock,
            Self::QueryTimeout,
            Self::Uncategorized,
        ]
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DriverCategory
// ---------------------------------------------------------------------------

/// Coarse classification attached by the driver itself, when its exception
/// hierarchy already distinguishes failure families.
///
/// Only the first four variants are unambiguous enough to map directly to an
/// [`ErrorKind`]; `NonTransient` and `General` carry too little information
/// and translation falls through to code- and state-based rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverCategory {
    /// The driver flagged an integrity-constraint violation.
    DataIntegrity,
    /// The driver flagged the operation as a deadlock victim.
    Deadlock,
    /// The driver flagged a statement timeout.
    Timeout,
    /// The driver flagged a transient connection problem.
    TransientConnection,
    /// The driver only knows the failure is non-transient.
    NonTransient,
    /// The driver attached no meaningful classification.
    General,
}

impl fmt::Display for DriverCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::DataIntegrity => "data_integrity",
            Self::Deadlock => "deadlock",
            Self::Timeout => "timeout",
            Self::TransientConnection => "transient_connection",
            Self::NonTransient => "non_transient",
            Self::General => "general",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// DatabaseProduct
// ---------------------------------------------------------------------------

/// The product name of the connected database, as reported by connection
/// metadata (e.g. `"H2"`, `"PostgreSQL"`).
///
/// Used purely as a catalog lookup key; matching is exact and
/// case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatabaseProduct(String);

impl DatabaseProduct {
    /// Wraps a product name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The exact product name string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DatabaseProduct {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl From<String> for DatabaseProduct {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for DatabaseProduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// DriverError
// ---------------------------------------------------------------------------

/// The raw error raised by the underlying database driver.
///
/// Immutable once raised.  Construct fluently:
///
/// ```
/// use sqt_core::{DriverCategory, DriverError};
///
/// let err = DriverError::new(1213, "Deadlock found when trying to get lock")
///     .with_state("40001")
///     .with_category(DriverCategory::Deadlock);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverError {
    /// Vendor-defined error code.
    pub vendor_code: i32,
    /// Standardized SQLSTATE value, if the driver reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Human-readable message from the driver.
    pub message: String,
    /// Coarse classification from the driver's own hierarchy, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<DriverCategory>,
}

impl DriverError {
    /// Create a new driver error with the given vendor code and message.
    pub fn new(vendor_code: i32, message: impl Into<String>) -> Self {
        Self {
            vendor_code,
            state: None,
            message: message.into(),
            category: None,
        }
    }

    /// Attach a SQLSTATE value.
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Attach the driver's own coarse category.
    pub fn with_category(mut self, category: DriverCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// The two-character SQLSTATE class, when a state of at least two
    /// characters is present.
    pub fn state_class(&self) -> Option<&str> {
        // `get` also rejects states whose second byte is mid-codepoint.
        self.state.as_deref().and_then(|s| s.get(..2))
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "driver error {}", self.vendor_code)?;
        if let Some(ref state) = self.state {
            write!(f, " [{state}]")?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for DriverError {}

// ---------------------------------------------------------------------------
// TranslatedError
// ---------------------------------------------------------------------------

/// The output of translation: a portable [`ErrorKind`] plus diagnostics.
///
/// The original [`DriverError`] is always retained as the underlying cause
/// and is reachable via [`std::error::Error::source`]; vendor codes and
/// SQLSTATE values stay available for diagnostics without leaking into the
/// kind application code branches on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedError {
    /// Portable classification.
    pub kind: ErrorKind,
    /// Descriptive label of the failing operation.
    pub operation: String,
    /// SQL text of the failing statement, if applicable.
    pub sql: Option<String>,
    /// The original driver error, never discarded.
    pub source: DriverError,
}

impl TranslatedError {
    /// Wrap a driver error with its classification and operation context.
    pub fn new(
        kind: ErrorKind,
        operation: impl Into<String>,
        sql: Option<&str>,
        source: DriverError,
    ) -> Self {
        Self {
            kind,
            operation: operation.into(),
            sql: sql.map(str::to_owned),
            source,
        }
    }

    /// The original driver error.
    pub fn driver_error(&self) -> &DriverError {
        &self.source
    }
}

impl fmt::Display for TranslatedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.as_str(), self.operation)?;
        if let Some(ref sql) = self.sql {
            write!(f, "; SQL [{sql}]")?;
        }
        write!(f, ": {}", self.source.message)
    }
}

impl std::error::Error for TranslatedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

// ---------------------------------------------------------------------------
// Serialization support
// ---------------------------------------------------------------------------

/// Serialisable snapshot of a [`TranslatedError`] for logs and wire
/// diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranslatedErrorDto {
    /// Portable classification.
    pub kind: ErrorKind,
    /// Failing operation label.
    pub operation: String,
    /// SQL text, if applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    /// Vendor code of the underlying driver error.
    pub vendor_code: i32,
    /// SQLSTATE of the underlying driver error, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Message of the underlying driver error.
    pub driver_message: String,
}

impl From<&TranslatedError> for TranslatedErrorDto {
    fn from(err: &TranslatedError) -> Self {
        Self {
            kind: err.kind,
            operation: err.operation.clone(),
            sql: err.sql.clone(),
            vendor_code: err.source.vendor_code,
            state: err.source.state.clone(),
            driver_message: err.source.message.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
