// SPDX-License-Identifier: MIT OR Apache-2.0
//! Classification from the driver's own coarse categorization.

use sqt_core::{DriverCategory, DriverError, ErrorKind};

use crate::ErrorTranslator;

/// Maps the driver's own category tag directly, when it is unambiguous.
///
/// Cheaper than a catalog lookup but coarser: only the four categories with
/// an exact [`ErrorKind`] counterpart are claimed.  `NonTransient` and
/// `General` say too little, and those errors fall through to the code- and
/// state-based links of the chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryTranslator;

impl CategoryTranslator {
    /// Create a new translator.
    pub fn new() -> Self {
        Self
    }
}

impl ErrorTranslator for CategoryTranslator {
    fn try_translate(
        &self,
        _operation: &str,
        _sql: Option<&str>,
        error: &DriverError,
    ) -> Option<ErrorKind> {
        match error.category? {
            DriverCategory::DataIntegrity => Some(ErrorKind::DataIntegrityViolation),
            DriverCategory::Deadlock => Some(ErrorKind::Deadlock),
            DriverCategory::Timeout => Some(ErrorKind::QueryTimeout),
            DriverCategory::TransientConnection => Some(ErrorKind::TransientConnectionFailure),
            DriverCategory::NonTransient | DriverCategory::General => None,
        }
    }
}
