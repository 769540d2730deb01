// SPDX-License-Identifier: MIT OR Apache-2.0
//! sqltriage — portable classification of database driver errors.
//!
//! A failed operation surfaces as a vendor-specific [`DriverError`].  The
//! [`Translator`] runs it through a fixed chain — custom hook, pluggable
//! custom translator, driver category, vendor-code catalog, SQLSTATE
//! fallback — and produces a [`TranslatedError`] carrying one portable
//! [`ErrorKind`] plus the untouched original as its cause.
//!
//! ```
//! use sqltriage::{DriverError, Translator};
//!
//! let translator = Translator::builder("MySQL").build();
//! let err = DriverError::new(1213, "Deadlock found when trying to get lock");
//! let translated = translator
//!     .translate("update-stock", Some("UPDATE stock SET qty = qty - 1"), err)
//!     .into_translated()
//!     .expect("fallback enabled");
//! assert_eq!(translated.kind.as_str(), "DEADLOCK");
//! assert!(translated.kind.is_transient());
//! ```
//!
//! The member crates are re-exported wholesale; depend on them directly when
//! only one layer is needed.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub use sqt_core::{
    DatabaseProduct, DriverCategory, DriverError, ErrorKind, TranslatedError, TranslatedErrorDto,
};

pub use sqt_catalog::{
    CatalogEntry, CatalogError, CatalogRegistry, CatalogSource, ErrorCatalog,
};

pub use sqt_translate::{
    CategoryTranslator, ErrorTranslator, FnTranslator, SqlStateTranslator, Translation, Translator,
    TranslatorBuilder, VendorCodeTranslator, from_fn,
};
