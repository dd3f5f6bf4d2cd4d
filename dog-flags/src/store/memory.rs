use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::errors::FlagResult;
use crate::model::{Feature, TenantFeatureState};
use crate::store::FeatureStore;

// (feature_id, tenant_id) so one feature's overrides sit next to each other
type OverrideKey = (String, String);

#[derive(Debug, Default)]
struct MemoryState {
    features: BTreeMap<String, Feature>,
    overrides: BTreeMap<OverrideKey, TenantFeatureState>,
}

/// In-memory feature store for development and testing.
///
/// Every operation runs under a single lock acquisition and never awaits
/// while holding it.
#[derive(Debug, Default)]
pub struct MemoryFeatureStore {
    state: RwLock<MemoryState>,
}

impl MemoryFeatureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with features, replacing any with the same id.
    pub fn with_features<I>(features: I) -> Self
    where
        I: IntoIterator<Item = Feature>,
    {
        let store = Self::new();
        {
            let mut state = store.state.write();
            for feature in features {
                state.features.insert(feature.id.clone(), feature);
            }
        }
        store
    }

    fn key(tenant_id: &str, feature_id: &str) -> OverrideKey {
        (feature_id.to_string(), tenant_id.to_string())
    }
}

#[async_trait]
impl FeatureStore for MemoryFeatureStore {
    async fn list_features(&self) -> FlagResult<Vec<Feature>> {
        Ok(self.state.read().features.values().cloned().collect())
    }

    async fn get_feature(&self, feature_id: &str) -> FlagResult<Option<Feature>> {
        Ok(self.state.read().features.get(feature_id).cloned())
    }

    async fn insert_feature_if_absent(&self, feature: Feature) -> FlagResult<bool> {
        let mut state = self.state.write();
        if state.features.contains_key(&feature.id) {
            return Ok(false);
        }
        state.features.insert(feature.id.clone(), feature);
        Ok(true)
    }

    async fn set_feature_enabled(&self, feature_id: &str, enabled: bool) -> FlagResult<Option<Feature>> {
        let mut state = self.state.write();
        Ok(state.features.get_mut(feature_id).map(|f| {
            f.enabled = enabled;
            f.clone()
        }))
    }

    async fn list_overrides(&self, feature_id: &str) -> FlagResult<Vec<TenantFeatureState>> {
        let state = self.state.read();
        Ok(state
            .overrides
            .iter()
            .filter(|((fid, _), _)| fid == feature_id)
            .map(|(_, s)| s.clone())
            .collect())
    }

    async fn get_override(&self, tenant_id: &str, feature_id: &str) -> FlagResult<Option<TenantFeatureState>> {
        Ok(self.state.read().overrides.get(&Self::key(tenant_id, feature_id)).cloned())
    }

    async fn upsert_override(&self, state: TenantFeatureState) -> FlagResult<Option<TenantFeatureState>> {
        let mut guard = self.state.write();
        if !guard.features.contains_key(&state.feature_id) {
            return Ok(None);
        }
        let key = Self::key(&state.tenant_id, &state.feature_id);
        guard.overrides.insert(key, state.clone());
        Ok(Some(state))
    }

    async fn remove_override(&self, tenant_id: &str, feature_id: &str) -> FlagResult<Option<TenantFeatureState>> {
        Ok(self.state.write().overrides.remove(&Self::key(tenant_id, feature_id)))
    }
}
