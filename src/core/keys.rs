//! Shared-store access and ordered key resolution.
//!
//! The host application has written the same logical field under different
//! key names across releases and integration layers. Each field therefore
//! carries an ordered list of concrete keys; the first one present wins.

use async_trait::async_trait;

use crate::core::RelayError;

/// Read-only view of the cross-process key/value store written by the host.
#[async_trait]
pub trait SharedStore: Send + Sync {
    /// Read the raw value stored under `key`, if any.
    ///
    /// A missing key is `Ok(None)`; `Err` is reserved for a store that could
    /// not be read at all.
    async fn read(&self, key: &str) -> Result<Option<String>, RelayError>;
}

/// A logical field and its concrete storage-key variants, in lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldKeys {
    /// Logical field name used in logs.
    pub field: &'static str,
    /// Concrete keys, canonical first.
    pub variants: &'static [&'static str],
}

/// Per-category allocated amounts.
pub const BUDGETS_FIELD: FieldKeys = FieldKeys {
    field: "budgets",
    variants: &[
        "categoryBudgets",
        "widget.categoryBudgets",
        "flutter.categoryBudgets",
    ],
};

/// Per-category consumed amounts.
pub const SPENT_FIELD: FieldKeys = FieldKeys {
    field: "spent",
    variants: &[
        "categorySpent",
        "widget.categorySpent",
        "flutter.categorySpent",
    ],
};

/// Resolves logical fields against a [`SharedStore`].
pub struct KeyResolver;

impl KeyResolver {
    /// Return the value of the first variant present in `store`.
    ///
    /// A variant whose read fails is skipped like an absent one, so a single
    /// bad key never hides a later valid variant.
    pub async fn resolve<S>(store: &S, keys: &FieldKeys) -> Option<String>
    where
        S: SharedStore + ?Sized,
    {
        for key in keys.variants {
            match store.read(key).await {
                Ok(Some(value)) => {
                    tracing::debug!(field = keys.field, key = *key, "resolved shared-store key");
                    return Some(value);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(field = keys.field, key = *key, "shared-store read failed: {e}");
                }
            }
        }
        tracing::debug!(field = keys.field, "no shared-store key present");
        None
    }
}
