pub mod memory;

use async_trait::async_trait;

use crate::errors::FlagResult;
use crate::model::{Feature, TenantFeatureState};

pub use memory::MemoryFeatureStore;

/// Persistence boundary for features and tenant overrides.
///
/// Implementations own identifier uniqueness: `insert_feature_if_absent`
/// and `upsert_override` must each be atomic, so concurrent callers never
/// create duplicates and an abandoned call never leaves a partial write.
/// Persistence faults are reported as `ErrorKind::Storage`.
#[async_trait]
pub trait FeatureStore: Send + Sync {
    /// All features, in a stable order for a single read.
    async fn list_features(&self) -> FlagResult<Vec<Feature>>;

    async fn get_feature(&self, feature_id: &str) -> FlagResult<Option<Feature>>;

    /// Insert unless a feature with the same id exists.
    /// Returns `true` when the record was written.
    async fn insert_feature_if_absent(&self, feature: Feature) -> FlagResult<bool>;

    /// Set the global default. `None` when the feature does not exist.
    async fn set_feature_enabled(&self, feature_id: &str, enabled: bool) -> FlagResult<Option<Feature>>;

    /// Overrides recorded for one feature.
    async fn list_overrides(&self, feature_id: &str) -> FlagResult<Vec<TenantFeatureState>>;

    async fn get_override(&self, tenant_id: &str, feature_id: &str) -> FlagResult<Option<TenantFeatureState>>;

    /// Insert or replace the override for `(tenant_id, feature_id)`.
    ///
    /// Returns `None` without writing when the feature does not exist; the
    /// existence check and the write happen together.
    async fn upsert_override(&self, state: TenantFeatureState) -> FlagResult<Option<TenantFeatureState>>;

    /// Delete the override, returning it if there was one.
    async fn remove_override(&self, tenant_id: &str, feature_id: &str) -> FlagResult<Option<TenantFeatureState>>;
}
