// SPDX-License-Identifier: MIT OR Apache-2.0
//! Vendor-code classification backed by the error catalog.

use std::sync::Arc;

use sqt_catalog::CatalogRegistry;
use sqt_core::{DatabaseProduct, DriverError, ErrorKind};

use crate::ErrorTranslator;

/// Classifies by exact vendor error code, using the catalog entry for the
/// connected database product.
///
/// Finer-grained than SQLSTATE classes: vendor codes disambiguate cases the
/// standardized taxonomy conflates.  Declines when the product's entry does
/// not cover the code, so the facade falls through to the SQLSTATE
/// translator.  Catalog load failures never surface here — the registry
/// degrades to an empty entry and this translator simply declines.
#[derive(Debug, Clone)]
pub struct VendorCodeTranslator {
    registry: Arc<CatalogRegistry>,
    product: DatabaseProduct,
}

impl VendorCodeTranslator {
    /// Create a translator for one connected product.
    pub fn new(registry: Arc<CatalogRegistry>, product: DatabaseProduct) -> Self {
        Self { registry, product }
    }

    /// The product this translator looks up.
    pub fn product(&self) -> &DatabaseProduct {
        &self.product
    }
}

impl ErrorTranslator for VendorCodeTranslator {
    fn try_translate(
        &self,
        _operation: &str,
        _sql: Option<&str>,
        error: &DriverError,
    ) -> Option<ErrorKind> {
        self.registry.lookup(&self.product).kind_for(error.vendor_code)
    }
}
