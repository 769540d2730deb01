// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use sqt_catalog::CatalogRegistry;
use sqt_core::{DatabaseProduct, DriverError, ErrorKind, TranslatedError};
use tracing::{debug, warn};

mod category;
mod state;
mod vendor;

pub use category::CategoryTranslator;
pub use state::SqlStateTranslator;
pub use vendor::VendorCodeTranslator;

// ── ErrorTranslator ─────────────────────────────────────────────────────

/// A single link in the translation chain.
///
/// Returning `None` declines the error and passes control to the next link;
/// returning `Some(kind)` claims it and short-circuits the chain.  The
/// operation label and SQL text are available so deployment-specific hooks
/// can classify on context the built-in translators ignore.
pub trait ErrorTranslator: Send + Sync {
    /// Attempt to classify `error`, declining with `None`.
    fn try_translate(
        &self,
        operation: &str,
        sql: Option<&str>,
        error: &DriverError,
    ) -> Option<ErrorKind>;
}

/// Adapter turning a closure into an [`ErrorTranslator`].
///
/// Built via [`from_fn`]; handy for deployment hooks that only need a few
/// lines of logic.
pub struct FnTranslator<F>(F);

impl<F> std::fmt::Debug for FnTranslator<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FnTranslator")
    }
}

impl<F> ErrorTranslator for FnTranslator<F>
where
    F: Fn(&str, Option<&str>, &DriverError) -> Option<ErrorKind> + Send + Sync,
{
    fn try_translate(
        &self,
        operation: &str,
        sql: Option<&str>,
        error: &DriverError,
    ) -> Option<ErrorKind> {
        (self.0)(operation, sql, error)
    }
}

/// Wrap a closure as an [`ErrorTranslator`].
pub fn from_fn<F>(f: F) -> FnTranslator<F>
where
    F: Fn(&str, Option<&str>, &DriverError) -> Option<ErrorKind> + Send + Sync,
{
    FnTranslator(f)
}

// ── Translation ─────────────────────────────────────────────────────────

/// Terminal state of one pass through the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    /// Some link claimed the error.
    Translated(TranslatedError),
    /// Every link declined; the original driver error is handed back
    /// unmodified.  Only reachable when the SQLSTATE fallback is disabled —
    /// designed behavior, not a failure of the facade.
    Passthrough(DriverError),
}

impl Translation {
    /// Returns `true` if a link claimed the error.
    pub fn is_translated(&self) -> bool {
        matches!(self, Self::Translated(_))
    }

    /// The classified kind, if any link claimed the error.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Translated(err) => Some(err.kind),
            Self::Passthrough(_) => None,
        }
    }

    /// Unwraps into the translated error, if there is one.
    pub fn into_translated(self) -> Option<TranslatedError> {
        match self {
            Self::Translated(err) => Some(err),
            Self::Passthrough(_) => None,
        }
    }

    /// View as a result, with passthrough as the error arm.
    pub fn into_result(self) -> Result<TranslatedError, DriverError> {
        match self {
            Self::Translated(err) => Ok(err),
            Self::Passthrough(err) => Err(err),
        }
    }
}

// ── Translator ──────────────────────────────────────────────────────────

/// The facade the access layer calls on every failed operation.
///
/// Evaluates the fixed chain — custom hook, custom pluggable translator,
/// driver category, vendor code, SQLSTATE fallback — and short-circuits on
/// the first claim.  Stateless after construction and safe for concurrent
/// use from many operations in parallel.
///
/// ```
/// use sqt_core::DriverError;
/// use sqt_translate::Translator;
///
/// let translator = Translator::builder("H2").build();
/// let err = DriverError::new(23505, "unique index violated").with_state("23000");
/// let translated = translator
///     .translate("insert-user", Some("INSERT INTO users VALUES (1)"), err)
///     .into_translated()
///     .expect("fallback enabled");
/// assert_eq!(translated.kind.as_str(), "DUPLICATE_KEY");
/// ```
pub struct Translator {
    primary: Option<Box<dyn ErrorTranslator>>,
    custom: Option<Box<dyn ErrorTranslator>>,
    category: CategoryTranslator,
    vendor: VendorCodeTranslator,
    state: SqlStateTranslator,
    fallback: bool,
}

impl std::fmt::Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator")
            .field("product", self.vendor.product())
            .field("primary", &self.primary.is_some())
            .field("custom", &self.custom.is_some())
            .field("fallback", &self.fallback)
            .finish()
    }
}

impl Translator {
    /// Start building a translator for the given database product.
    pub fn builder(product: impl Into<DatabaseProduct>) -> TranslatorBuilder {
        TranslatorBuilder {
            product: product.into(),
            registry: None,
            primary: None,
            custom: None,
            fallback: true,
        }
    }

    /// Translate one failed operation.
    ///
    /// Never fails and never panics: custom translators that panic are
    /// treated as declining, and catalog problems have already degraded to
    /// empty entries inside the registry.  With the fallback enabled the
    /// result is always [`Translation::Translated`].
    pub fn translate(&self, operation: &str, sql: Option<&str>, error: DriverError) -> Translation {
        if let Some(hook) = self.primary.as_deref()
            && let Some(kind) = guarded(hook, operation, sql, &error)
        {
            return claimed("custom-hook", kind, operation, sql, error);
        }

        if let Some(custom) = self.custom.as_deref()
            && let Some(kind) = guarded(custom, operation, sql, &error)
        {
            return claimed("custom-translator", kind, operation, sql, error);
        }

        if let Some(kind) = self.category.try_translate(operation, sql, &error) {
            return claimed("driver-category", kind, operation, sql, error);
        }

        if let Some(kind) = self.vendor.try_translate(operation, sql, &error) {
            return claimed("vendor-code", kind, operation, sql, error);
        }

        if self.fallback {
            let kind = self.state.classify(&error);
            return claimed("sqlstate", kind, operation, sql, error);
        }

        debug!(operation, "no translator claimed the error; passing it through");
        Translation::Passthrough(error)
    }
}

fn claimed(
    link: &'static str,
    kind: ErrorKind,
    operation: &str,
    sql: Option<&str>,
    error: DriverError,
) -> Translation {
    debug!(link, kind = %kind, operation, "driver error classified");
    Translation::Translated(TranslatedError::new(kind, operation, sql, error))
}

/// Invoke a custom translator, treating a panic as a decline so the chain
/// keeps its always-classify guarantee.
fn guarded(
    translator: &dyn ErrorTranslator,
    operation: &str,
    sql: Option<&str>,
    error: &DriverError,
) -> Option<ErrorKind> {
    match catch_unwind(AssertUnwindSafe(|| {
        translator.try_translate(operation, sql, error)
    })) {
        Ok(result) => result,
        Err(_) => {
            warn!(operation, "custom translator panicked; falling through");
            None
        }
    }
}

// ── TranslatorBuilder ───────────────────────────────────────────────────

/// Builder for [`Translator`].
pub struct TranslatorBuilder {
    product: DatabaseProduct,
    registry: Option<Arc<CatalogRegistry>>,
    primary: Option<Box<dyn ErrorTranslator>>,
    custom: Option<Box<dyn ErrorTranslator>>,
    fallback: bool,
}

impl std::fmt::Debug for TranslatorBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslatorBuilder")
            .field("product", &self.product)
            .field("fallback", &self.fallback)
            .finish()
    }
}

impl TranslatorBuilder {
    /// Use a specific catalog registry instead of the compiled-in defaults.
    ///
    /// Share one registry across translators to share its memoized catalog.
    pub fn registry(mut self, registry: Arc<CatalogRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Install the primary custom hook, evaluated before everything else.
    pub fn primary_hook(mut self, hook: impl ErrorTranslator + 'static) -> Self {
        self.primary = Some(Box::new(hook));
        self
    }

    /// Install the pluggable custom translator, evaluated after the primary
    /// hook and before the built-in links.
    pub fn custom_translator(mut self, translator: impl ErrorTranslator + 'static) -> Self {
        self.custom = Some(Box::new(translator));
        self
    }

    /// Disable the terminal SQLSTATE fallback, making
    /// [`Translation::Passthrough`] reachable.
    pub fn without_fallback(mut self) -> Self {
        self.fallback = false;
        self
    }

    /// Finish building.
    pub fn build(self) -> Translator {
        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(CatalogRegistry::builtin()));
        Translator {
            primary: self.primary,
            custom: self.custom,
            category: CategoryTranslator::new(),
            vendor: VendorCodeTranslator::new(registry, self.product),
            state: SqlStateTranslator::new(),
            fallback: self.fallback,
        }
    }
}
