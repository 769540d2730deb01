// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, RwLock};

use serde::Deserialize;
use sqt_core::{DatabaseProduct, ErrorKind};
use tracing::warn;

// ── Errors ──────────────────────────────────────────────────────────────

/// Errors that can occur while loading or validating a catalog.
///
/// These never reach translation callers: the [`CatalogRegistry`] recovers
/// from every load failure by degrading to an empty catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("catalog file not found: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },

    /// The file content is not valid TOML for the catalog schema.
    #[error("failed to parse catalog: {reason}")]
    Parse {
        /// Human-readable parse error detail.
        reason: String,
    },

    /// A catalog entry used a key that is not a known error kind.
    #[error("unknown error kind `{key}` in catalog entry for {product}")]
    UnknownKind {
        /// Product whose entry is invalid.
        product: String,
        /// The unrecognised key.
        key: String,
    },

    /// A vendor code does not fit the 32-bit code space.
    #[error("vendor code {code} for {product} is out of range")]
    CodeOutOfRange {
        /// Product whose entry is invalid.
        product: String,
        /// The offending code as written.
        code: i64,
    },

    /// One vendor code was mapped to two different kinds within a product.
    #[error("vendor code {code} for {product} maps to both {first} and {second}")]
    AmbiguousCode {
        /// Product whose entry is ambiguous.
        product: String,
        /// The doubly-mapped code.
        code: i32,
        /// Kind the code was first mapped to.
        first: ErrorKind,
        /// Kind the conflicting mapping requested.
        second: ErrorKind,
    },
}

// ── CatalogEntry ────────────────────────────────────────────────────────

/// Read-only `vendor code → kind` table scoped to one database product.
///
/// Within one entry the mapping is a pure function: a code maps to at most
/// one kind, enforced at construction.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    product: DatabaseProduct,
    codes: HashMap<i32, ErrorKind>,
}

impl CatalogEntry {
    /// An entry with no mappings, as served for unknown products.
    pub fn empty(product: DatabaseProduct) -> Self {
        Self {
            product,
            codes: HashMap::new(),
        }
    }

    /// The product this entry is scoped to.
    pub fn product(&self) -> &DatabaseProduct {
        &self.product
    }

    /// The kind a vendor code maps to, if the entry covers it.
    pub fn kind_for(&self, vendor_code: i32) -> Option<ErrorKind> {
        self.codes.get(&vendor_code).copied()
    }

    /// Number of mapped vendor codes.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Returns `true` if the entry maps no codes.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Map a vendor code to a kind.
    ///
    /// Mapping the same code to the same kind twice is a no-op; mapping it
    /// to a different kind is [`CatalogError::AmbiguousCode`].
    pub fn try_insert(&mut self, vendor_code: i32, kind: ErrorKind) -> Result<(), CatalogError> {
        match self.codes.get(&vendor_code) {
            Some(existing) if *existing != kind => Err(CatalogError::AmbiguousCode {
                product: self.product.as_str().to_owned(),
                code: vendor_code,
                first: *existing,
                second: kind,
            }),
            _ => {
                self.codes.insert(vendor_code, kind);
                Ok(())
            }
        }
    }
}

// ── ErrorCatalog ────────────────────────────────────────────────────────

/// Immutable table of per-product [`CatalogEntry`]s, keyed by the exact
/// product name reported by connection metadata.
#[derive(Debug, Clone, Default)]
pub struct ErrorCatalog {
    entries: BTreeMap<String, Arc<CatalogEntry>>,
}

impl ErrorCatalog {
    /// A catalog with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of products with an entry.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no product has an entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry for a product, if one is present.
    pub fn get(&self, product: &DatabaseProduct) -> Option<Arc<CatalogEntry>> {
        self.entries.get(product.as_str()).map(Arc::clone)
    }

    /// Insert an entry, replacing any existing entry for the same product.
    pub fn insert(&mut self, entry: CatalogEntry) {
        self.entries
            .insert(entry.product.as_str().to_owned(), Arc::new(entry));
    }

    /// Product names with an entry, in deterministic order.
    pub fn products(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Overlay `overrides` on top of `self`.
    ///
    /// An override entry replaces the base entry for the same product
    /// wholesale; products absent from the overlay keep their base entry.
    #[must_use]
    pub fn merge(mut self, overrides: ErrorCatalog) -> Self {
        for (product, entry) in overrides.entries {
            self.entries.insert(product, entry);
        }
        self
    }

    /// Parse a catalog from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        let raw: RawCatalog = toml::from_str(content).map_err(|e| CatalogError::Parse {
            reason: e.to_string(),
        })?;

        let mut catalog = Self::empty();
        for (product, kinds) in raw.products {
            let mut entry = CatalogEntry::empty(DatabaseProduct::new(product.clone()));
            for (key, codes) in kinds {
                let kind = kind_from_key(&key).ok_or_else(|| CatalogError::UnknownKind {
                    product: product.clone(),
                    key: key.clone(),
                })?;
                for code in codes {
                    let code =
                        i32::try_from(code).map_err(|_| CatalogError::CodeOutOfRange {
                            product: product.clone(),
                            code,
                        })?;
                    entry.try_insert(code, kind)?;
                }
            }
            catalog.insert(entry);
        }
        Ok(catalog)
    }

    /// Read and parse a catalog from a TOML file.
    pub fn from_toml_path(path: &Path) -> Result<Self, CatalogError> {
        let content =
            std::fs::read_to_string(path).map_err(|_| CatalogError::FileNotFound {
                path: path.display().to_string(),
            })?;
        Self::from_toml_str(&content)
    }

    /// The compiled-in default catalog covering the major database products.
    ///
    /// Code sets follow the vendors' documented error codes.  Products whose
    /// native codes are alphanumeric SQLSTATE values (e.g. PostgreSQL) carry
    /// no entry here; the SQLSTATE translator already covers them.
    pub fn builtin() -> Self {
        use ErrorKind::{
            BadGrammar, ConnectionFailure, DataIntegrityViolation, Deadlock, DuplicateKey,
            PermissionDenied, QueryTimeout,
        };

        let mut catalog = Self::empty();

        catalog.insert(entry(
            "H2",
            &[
                (
                    BadGrammar,
                    &[42000, 42001, 42101, 42102, 42111, 42112, 42121, 42122, 42132],
                ),
                (DuplicateKey, &[23001, 23505]),
                (
                    DataIntegrityViolation,
                    &[
                        22001, 22003, 22012, 22018, 22025, 23000, 23002, 23003, 23502, 23503,
                        23506, 23507, 23513,
                    ],
                ),
                (ConnectionFailure, &[90046, 90100, 90117, 90121, 90126]),
                (Deadlock, &[40001, 50200]),
                (QueryTimeout, &[57014]),
            ],
        ));

        catalog.insert(entry(
            "MySQL",
            &[
                (BadGrammar, &[1054, 1064, 1146]),
                (DuplicateKey, &[1062]),
                (
                    DataIntegrityViolation,
                    &[630, 839, 840, 893, 1169, 1215, 1216, 1217, 1364, 1451, 1452, 1557],
                ),
                (ConnectionFailure, &[1, 1040, 1042]),
                (PermissionDenied, &[1044, 1045, 1142]),
                (Deadlock, &[1205, 1213, 3572]),
                (QueryTimeout, &[3024]),
            ],
        ));

        // MariaDB shares the MySQL code space but reports its own product name.
        catalog.insert(entry(
            "MariaDB",
            &[
                (BadGrammar, &[1054, 1064, 1146]),
                (DuplicateKey, &[1062]),
                (
                    DataIntegrityViolation,
                    &[630, 839, 840, 893, 1169, 1215, 1216, 1217, 1364, 1451, 1452, 1557],
                ),
                (ConnectionFailure, &[1, 1040, 1042]),
                (PermissionDenied, &[1044, 1045, 1142]),
                (Deadlock, &[1205, 1213, 3572]),
                (QueryTimeout, &[3024]),
            ],
        ));

        catalog.insert(entry(
            "Oracle",
            &[
                (BadGrammar, &[900, 903, 904, 917, 936, 942, 17006]),
                (DuplicateKey, &[1]),
                (DataIntegrityViolation, &[1400, 1722, 2291, 2292]),
                (ConnectionFailure, &[17002, 17447]),
                (PermissionDenied, &[1031]),
                (Deadlock, &[54, 60, 30006]),
                (QueryTimeout, &[1013]),
            ],
        ));

        catalog.insert(entry(
            "Microsoft SQL Server",
            &[
                (BadGrammar, &[156, 170, 207, 208, 209]),
                (DuplicateKey, &[2601, 2627]),
                (DataIntegrityViolation, &[544, 547, 8114, 8115]),
                (ConnectionFailure, &[4060]),
                (PermissionDenied, &[229]),
                (Deadlock, &[1205, 1222]),
            ],
        ));

        catalog.insert(entry(
            "DB2",
            &[
                (BadGrammar, &[-104, -204, -206, -301, -408]),
                (DuplicateKey, &[-803]),
                (
                    DataIntegrityViolation,
                    &[-407, -530, -531, -532, -543, -544, -545, -603, -667],
                ),
                (ConnectionFailure, &[-904, -971]),
                (Deadlock, &[-911, -913]),
                (QueryTimeout, &[-952]),
            ],
        ));

        catalog.insert(entry(
            "SQLite",
            &[
                (DuplicateKey, &[1555, 2067]),
                (DataIntegrityViolation, &[19, 787, 1299]),
                (Deadlock, &[5, 6]),
            ],
        ));

        catalog.insert(entry(
            "HSQL Database Engine",
            &[
                (BadGrammar, &[-22, -28]),
                (DuplicateKey, &[-104]),
                (DataIntegrityViolation, &[-9]),
                (ConnectionFailure, &[-80]),
            ],
        ));

        catalog
    }
}

/// Build a hand-maintained entry.  The compiled-in tables never map one code
/// twice, so plain insertion is enough here.
fn entry(product: &str, mappings: &[(ErrorKind, &[i32])]) -> CatalogEntry {
    let mut entry = CatalogEntry::empty(DatabaseProduct::from(product));
    for (kind, codes) in mappings {
        for code in *codes {
            entry.codes.insert(*code, *kind);
        }
    }
    entry
}

// ── TOML schema ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawCatalog {
    #[serde(default)]
    products: BTreeMap<String, BTreeMap<String, Vec<i64>>>,
}

/// Resolve a snake_case override-file key to its [`ErrorKind`].
fn kind_from_key(key: &str) -> Option<ErrorKind> {
    match key {
        "bad_grammar" => Some(ErrorKind::BadGrammar),
        "duplicate_key" => Some(ErrorKind::DuplicateKey),
        "data_integrity_violation" => Some(ErrorKind::DataIntegrityViolation),
        "permission_denied" => Some(ErrorKind::PermissionDenied),
        "connection_failure" => Some(ErrorKind::ConnectionFailure),
        "transient_connection_failure" => Some(ErrorKind::TransientConnectionFailure),
        "deadlock" => Some(ErrorKind::Deadlock),
        "query_timeout" => Some(ErrorKind::QueryTimeout),
        "uncategorized" => Some(ErrorKind::Uncategorized),
        _ => None,
    }
}

// ── CatalogSource ───────────────────────────────────────────────────────

/// Where a [`CatalogRegistry`] obtains its catalog.
///
/// The source is an explicit constructor input; there is no ambient
/// resource-by-convention lookup.
#[derive(Debug, Clone)]
pub enum CatalogSource {
    /// The compiled-in defaults only.
    Builtin,
    /// Compiled-in defaults with a TOML override file layered on top.
    TomlFile(PathBuf),
    /// Compiled-in defaults with inline TOML overrides layered on top.
    TomlStr(String),
    /// No catalog at all; every lookup yields an empty entry.
    Empty,
}

impl CatalogSource {
    fn load(&self) -> Result<ErrorCatalog, CatalogError> {
        match self {
            Self::Builtin => Ok(ErrorCatalog::builtin()),
            Self::TomlFile(path) => {
                Ok(ErrorCatalog::builtin().merge(ErrorCatalog::from_toml_path(path)?))
            }
            Self::TomlStr(content) => {
                Ok(ErrorCatalog::builtin().merge(ErrorCatalog::from_toml_str(content)?))
            }
            Self::Empty => Ok(ErrorCatalog::empty()),
        }
    }
}

// ── CatalogRegistry ─────────────────────────────────────────────────────

/// Memoizing front door for catalog lookups.
///
/// The catalog source is parsed at most once per registry; per-product
/// entries are cached on first lookup.  Lookups never fail: a load failure
/// is logged and degrades to an empty catalog, and an unknown product is
/// served an empty entry, so classification falls through to SQLSTATE
/// rules either way.
///
/// Safe for concurrent use.  Racing first lookups for the same product may
/// both compute an entry, but only one result is ever cached.
#[derive(Debug)]
pub struct CatalogRegistry {
    source: CatalogSource,
    catalog: OnceLock<ErrorCatalog>,
    cache: RwLock<HashMap<String, Arc<CatalogEntry>>>,
}

impl CatalogRegistry {
    /// Create a registry over the given source.
    pub fn new(source: CatalogSource) -> Self {
        Self {
            source,
            catalog: OnceLock::new(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Registry over the compiled-in default catalog.
    pub fn builtin() -> Self {
        Self::new(CatalogSource::Builtin)
    }

    /// Registry with no catalog; every lookup yields an empty entry.
    pub fn empty() -> Self {
        Self::new(CatalogSource::Empty)
    }

    fn catalog(&self) -> &ErrorCatalog {
        self.catalog.get_or_init(|| match self.source.load() {
            Ok(catalog) => catalog,
            Err(error) => {
                warn!(%error, "catalog load failed; classification falls back to SQLSTATE rules");
                ErrorCatalog::empty()
            }
        })
    }

    /// The entry for a product, loading and caching on first access.
    ///
    /// Unknown products receive a cached empty entry.
    pub fn lookup(&self, product: &DatabaseProduct) -> Arc<CatalogEntry> {
        if let Some(entry) = self
            .cache
            .read()
            .expect("catalog cache lock poisoned")
            .get(product.as_str())
        {
            return Arc::clone(entry);
        }

        let loaded = self
            .catalog()
            .get(product)
            .unwrap_or_else(|| Arc::new(CatalogEntry::empty(product.clone())));

        let mut cache = self.cache.write().expect("catalog cache lock poisoned");
        // First writer wins; a concurrent loser drops its duplicate.
        Arc::clone(cache.entry(product.as_str().to_owned()).or_insert(loaded))
    }

    /// Number of products with a cached entry (loaded or empty).
    pub fn cached_len(&self) -> usize {
        self.cache
            .read()
            .expect("catalog cache lock poisoned")
            .len()
    }
}
