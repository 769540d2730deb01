// SPDX-License-Identifier: MIT OR Apache-2.0
//! SQLSTATE-based classification — the translator of last resort.

use sqt_core::{DriverError, ErrorKind};

use crate::ErrorTranslator;

/// SQLSTATE classes (first two characters) describing invalid SQL.
const BAD_GRAMMAR_CLASSES: &[&str] = &["07", "21", "2A", "37", "42", "65"];

/// Classes describing data and integrity-constraint violations.
const INTEGRITY_CLASSES: &[&str] = &["22", "23", "27", "44"];

/// Classes describing connection and server-resource failures.
const CONNECTION_CLASSES: &[&str] = &["08", "53", "54", "57", "58"];

/// Classes describing transient, retry-worthy resource failures.
const TRANSIENT_CLASSES: &[&str] = &["JW", "JZ", "S1"];

/// Classes describing concurrency failures (deadlock, serialization).
const DEADLOCK_CLASSES: &[&str] = &["40", "61"];

/// Classes describing authorization failures.
const PERMISSION_CLASSES: &[&str] = &["28"];

/// Classifies errors by the standardized SQLSTATE taxonomy alone.
///
/// Coarser than vendor codes but vendor-agnostic, and total: every input —
/// including one with no state at all — resolves to a kind, with
/// [`ErrorKind::Uncategorized`] as the terminal answer.  The facade relies
/// on this totality when using it as the unconditional fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlStateTranslator;

impl SqlStateTranslator {
    /// Create a new translator.
    pub fn new() -> Self {
        Self
    }

    /// Classify a driver error by its SQLSTATE.  Never declines.
    pub fn classify(&self, error: &DriverError) -> ErrorKind {
        // Exact-state refinements take precedence over the class.
        match error.state.as_deref() {
            // Unique-constraint violation within the integrity class.
            Some("23505") => return ErrorKind::DuplicateKey,
            // Statement cancelled / ODBC timeout states.
            Some("57014" | "HYT00" | "HYT01") => return ErrorKind::QueryTimeout,
            _ => {}
        }

        let Some(class) = error.state_class() else {
            return ErrorKind::Uncategorized;
        };

        if BAD_GRAMMAR_CLASSES.contains(&class) {
            ErrorKind::BadGrammar
        } else if INTEGRITY_CLASSES.contains(&class) {
            ErrorKind::DataIntegrityViolation
        } else if CONNECTION_CLASSES.contains(&class) {
            ErrorKind::ConnectionFailure
        } else if TRANSIENT_CLASSES.contains(&class) {
            ErrorKind::TransientConnectionFailure
        } else if DEADLOCK_CLASSES.contains(&class) {
            ErrorKind::Deadlock
        } else if PERMISSION_CLASSES.contains(&class) {
            ErrorKind::PermissionDenied
        } else {
            ErrorKind::Uncategorized
        }
    }
}

impl ErrorTranslator for SqlStateTranslator {
    fn try_translate(
        &self,
        _operation: &str,
        _sql: Option<&str>,
        error: &DriverError,
    ) -> Option<ErrorKind> {
        Some(self.classify(error))
    }
}
