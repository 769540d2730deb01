// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error taxonomy tests for every error type in the workspace.
//!
//! Verifies Display, Debug, Error trait, Send + Sync + 'static bounds,
//! source chains, and anyhow interop.

use std::error::Error;

use sqltriage::{
    CatalogError, DatabaseProduct, DriverCategory, DriverError, ErrorKind, TranslatedError,
};

// ── Helpers ──────────────────────────────────────────────────────────────

fn assert_send_sync_static<T: Send + Sync + 'static>() {}

fn assert_std_error<T: std::error::Error>() {}

/// Verify Display is non-empty and Debug is non-empty for a given error value.
fn check_display_debug(err: &dyn Error) {
    let display = err.to_string();
    assert!(!display.is_empty(), "Display must be non-empty");
    let debug = format!("{err:?}");
    assert!(!debug.is_empty(), "Debug must be non-empty");
}

/// Round-trip through anyhow::Error and back via downcast.
fn check_anyhow_roundtrip<E: Error + Send + Sync + 'static + Clone>(err: E) {
    let anyhow_err: anyhow::Error = anyhow::Error::new(err.clone());
    let display_before = err.to_string();
    let display_after = anyhow_err.to_string();
    assert_eq!(display_before, display_after);
    let downcasted = anyhow_err
        .downcast_ref::<E>()
        .expect("downcast should succeed");
    assert_eq!(downcasted.to_string(), display_before);
}

// =========================================================================
// 1. DriverError (sqt-core)
// =========================================================================
mod driver_error {
    use super::*;

    #[test]
    fn trait_bounds() {
        assert_send_sync_static::<DriverError>();
        assert_std_error::<DriverError>();
    }

    #[test]
    fn display_contains_code_state_and_message() {
        let err = DriverError::new(1205, "lock wait timeout exceeded").with_state("40001");
        let msg = err.to_string();
        assert!(msg.contains("1205"), "should include vendor code: {msg}");
        assert!(msg.contains("40001"), "should include SQLSTATE: {msg}");
        assert!(
            msg.contains("lock wait timeout exceeded"),
            "should include driver message: {msg}"
        );
        check_display_debug(&err);
    }

    #[test]
    fn display_without_state() {
        let err = DriverError::new(-803, "duplicate row");
        let msg = err.to_string();
        assert!(msg.contains("-803"), "should include negative code: {msg}");
        assert!(!msg.contains('['), "no state bracket without a state: {msg}");
        check_display_debug(&err);
    }

    #[test]
    fn is_a_leaf_error() {
        let err = DriverError::new(0, "leaf").with_category(DriverCategory::General);
        assert!(err.source().is_none());
    }

    #[test]
    fn anyhow_roundtrip() {
        check_anyhow_roundtrip(DriverError::new(1062, "Duplicate entry 'a' for key 1"));
        check_anyhow_roundtrip(
            DriverError::new(0, "connection reset")
                .with_state("08S01")
                .with_category(DriverCategory::TransientConnection),
        );
    }
}

// =========================================================================
// 2. TranslatedError (sqt-core)
// =========================================================================
mod translated_error {
    use super::*;

    fn sample() -> TranslatedError {
        let driver = DriverError::new(23505, "unique index violated").with_state("23505");
        TranslatedError::new(
            ErrorKind::DuplicateKey,
            "insert-user",
            Some("INSERT INTO users VALUES (1)"),
            driver,
        )
    }

    #[test]
    fn trait_bounds() {
        assert_send_sync_static::<TranslatedError>();
        assert_std_error::<TranslatedError>();
    }

    #[test]
    fn display_leads_with_the_kind_tag() {
        let msg = sample().to_string();
        assert!(
            msg.starts_with("[DUPLICATE_KEY]"),
            "Display should lead with the stable tag: {msg}"
        );
        assert!(msg.contains("insert-user"), "should name the operation: {msg}");
        assert!(
            msg.contains("INSERT INTO users"),
            "should include the SQL text: {msg}"
        );
    }

    #[test]
    fn source_chain_reaches_the_driver_error() {
        let err = sample();
        let src = err.source().expect("must retain the driver error");
        let driver = src
            .downcast_ref::<DriverError>()
            .expect("source must be the DriverError");
        assert_eq!(driver.vendor_code, 23505);
        assert!(src.source().is_none(), "DriverError is the chain's leaf");
    }

    #[test]
    fn anyhow_chain_walk() {
        let anyhow_err: anyhow::Error = sample().into();
        assert!(anyhow_err.downcast_ref::<TranslatedError>().is_some());
        let chain: Vec<String> = anyhow_err.chain().map(ToString::to_string).collect();
        assert_eq!(chain.len(), 2, "translated error plus its cause: {chain:?}");
        assert!(chain[1].contains("unique index violated"));
    }

    #[test]
    fn anyhow_roundtrip() {
        check_anyhow_roundtrip(sample());
    }
}

// =========================================================================
// 3. CatalogError (sqt-catalog)
// =========================================================================
mod catalog_error {
    use super::*;
    use sqltriage::ErrorCatalog;

    #[test]
    fn trait_bounds() {
        assert_send_sync_static::<CatalogError>();
        assert_std_error::<CatalogError>();
    }

    #[test]
    fn file_not_found_names_the_path() {
        let err = ErrorCatalog::from_toml_path(std::path::Path::new("/nonexistent/codes.toml"))
            .unwrap_err();
        let msg = err.to_string();
        assert!(
            msg.contains("/nonexistent/codes.toml"),
            "should name the missing path: {msg}"
        );
        check_display_debug(&err);
    }

    #[test]
    fn parse_error_carries_detail() {
        let err = ErrorCatalog::from_toml_str("not [ valid toml").unwrap_err();
        assert!(matches!(err, CatalogError::Parse { .. }));
        check_display_debug(&err);
    }

    #[test]
    fn unknown_kind_names_product_and_key() {
        let err = ErrorCatalog::from_toml_str(
            r#"
            [products."AcmeDB"]
            mystery_kind = [7]
            "#,
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("AcmeDB"), "should name the product: {msg}");
        assert!(msg.contains("mystery_kind"), "should name the key: {msg}");
        check_display_debug(&err);
    }

    #[test]
    fn ambiguous_code_names_both_kinds() {
        let err = ErrorCatalog::from_toml_str(
            r#"
            [products."AcmeDB"]
            deadlock = [7]
            query_timeout = [7]
            "#,
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("DEADLOCK"), "should show the first kind: {msg}");
        assert!(
            msg.contains("QUERY_TIMEOUT"),
            "should show the conflicting kind: {msg}"
        );
        check_display_debug(&err);
    }

    #[test]
    fn exhaustive_variants() {
        let variants: Vec<CatalogError> = vec![
            CatalogError::FileNotFound { path: "p".into() },
            CatalogError::Parse { reason: "r".into() },
            CatalogError::UnknownKind {
                product: "P".into(),
                key: "k".into(),
            },
            CatalogError::CodeOutOfRange {
                product: "P".into(),
                code: i64::MAX,
            },
            CatalogError::AmbiguousCode {
                product: "P".into(),
                code: 7,
                first: ErrorKind::Deadlock,
                second: ErrorKind::QueryTimeout,
            },
        ];
        for v in &variants {
            match v {
                CatalogError::FileNotFound { .. } => {}
                CatalogError::Parse { .. } => {}
                CatalogError::UnknownKind { .. } => {}
                CatalogError::CodeOutOfRange { .. } => {}
                CatalogError::AmbiguousCode { .. } => {}
            }
            assert!(v.source().is_none(), "catalog errors are leaves: {v}");
            check_display_debug(v);
        }
    }

    #[test]
    fn anyhow_interop() {
        let err = CatalogError::Parse {
            reason: "bad toml".into(),
        };
        let anyhow_err: anyhow::Error = err.into();
        assert!(anyhow_err.to_string().contains("bad toml"));
        assert!(anyhow_err.downcast_ref::<CatalogError>().is_some());
    }
}

// =========================================================================
// 4. Stable kind tags
// =========================================================================
mod kind_tags {
    use super::*;

    #[test]
    fn tags_are_screaming_snake_case() {
        for kind in ErrorKind::all() {
            let tag = kind.as_str();
            assert!(
                tag.chars().all(|c| c.is_ascii_uppercase() || c == '_'),
                "tag must be SCREAMING_SNAKE_CASE: {tag}"
            );
        }
    }

    #[test]
    fn serde_tag_matches_as_str() {
        for kind in ErrorKind::all() {
            let json = serde_json::to_string(kind).unwrap();
            assert_eq!(json, format!(r#""{}""#, kind.as_str()));
        }
    }

    #[test]
    fn product_key_is_plain_text_in_json() {
        let product = DatabaseProduct::from("Microsoft SQL Server");
        assert_eq!(
            serde_json::to_string(&product).unwrap(),
            r#""Microsoft SQL Server""#
        );
    }
}
