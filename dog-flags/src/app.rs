use std::sync::Arc;

use tracing::{error, info};

use crate::config::{FlagsConfigSnapshot, FlagsOptions};
use crate::model::Feature;
use crate::provider::{DefaultFeatureIdProvider, FeatureIdProvider};
use crate::service::{FeatureToggleService, ToggleService};
use crate::store::{FeatureStore, MemoryFeatureStore};
use crate::tenant::{DefaultTenantStore, TenantStore};

/// FlagsApp is the composition root for the feature-flag layer.
///
/// Framework-agnostic. Holds:
/// - the resolved options
/// - the toggle service wired to its store, tenant source and id provider
///
/// Cloning is cheap; clones share the same service.
#[derive(Clone)]
pub struct FlagsApp {
    options: Arc<FlagsOptions>,
    service: Arc<dyn ToggleService>,
}

impl FlagsApp {
    pub fn builder() -> FlagsBuilder {
        FlagsBuilder::new()
    }

    /// Wrap an already-built service, e.g. a custom `ToggleService`.
    pub fn from_parts(options: FlagsOptions, service: Arc<dyn ToggleService>) -> Self {
        Self {
            options: Arc::new(options),
            service,
        }
    }

    pub fn options(&self) -> &FlagsOptions {
        &self.options
    }

    pub fn service(&self) -> Arc<dyn ToggleService> {
        Arc::clone(&self.service)
    }

    /// Startup pass. When `create_missing_features_on_start` is set, runs
    /// reconciliation once. A failure is logged and does not stop the host.
    pub async fn start(&self) -> Option<Vec<Feature>> {
        if !self.options.create_missing_features_on_start {
            return None;
        }

        match self.service.bulk_create_missing().await {
            Ok(created) => {
                info!(created = created.len(), "created missing features on start");
                Some(created)
            }
            Err(err) => {
                error!(error = %err, "failed to create missing features on start");
                None
            }
        }
    }
}

/// Collects options and capability implementations, then builds a
/// [`FlagsApp`]. Anything not registered falls back to its default.
#[derive(Default)]
pub struct FlagsBuilder {
    options: FlagsOptions,
    store: Option<Arc<dyn FeatureStore>>,
    tenant_store: Option<Arc<dyn TenantStore>>,
    id_provider: Option<Arc<dyn FeatureIdProvider>>,
}

impl FlagsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options(mut self, options: FlagsOptions) -> Self {
        self.options = options;
        self
    }

    /// Read `flags.*` keys from a config snapshot.
    pub fn config(self, config: &FlagsConfigSnapshot) -> Self {
        self.options(FlagsOptions::from_config(config))
    }

    /// Tweak options in place.
    pub fn configure<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut FlagsOptions),
    {
        f(&mut self.options);
        self
    }

    pub fn feature_store(mut self, store: Arc<dyn FeatureStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn register_feature_id_provider(mut self, provider: Arc<dyn FeatureIdProvider>) -> Self {
        self.id_provider = Some(provider);
        self
    }

    pub fn register_tenant_store(mut self, store: Arc<dyn TenantStore>) -> Self {
        self.tenant_store = Some(store);
        self
    }

    pub fn feature_id_provider_configured(&self) -> bool {
        self.id_provider.is_some()
    }

    pub fn has_custom_tenant_store(&self) -> bool {
        self.tenant_store.is_some()
    }

    pub fn build(self) -> FlagsApp {
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryFeatureStore::new()));
        let tenants = self
            .tenant_store
            .unwrap_or_else(|| Arc::new(DefaultTenantStore));
        let ids = self
            .id_provider
            .unwrap_or_else(|| Arc::new(DefaultFeatureIdProvider));

        let service = FeatureToggleService::new(store, tenants, ids);
        FlagsApp::from_parts(self.options, Arc::new(service))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StaticFeatureIdProvider;

    #[tokio::test]
    async fn defaults_declare_nothing() {
        let app = FlagsApp::builder().build();

        assert!(app.service().get_available_feature_ids().await.unwrap().is_empty());
        assert!(app.service().get_all_tenants().await.unwrap().is_empty());
        assert_eq!(app.options(), &FlagsOptions::default());
    }

    #[tokio::test]
    async fn start_is_a_no_op_unless_enabled() {
        let app = FlagsApp::builder()
            .register_feature_id_provider(Arc::new(StaticFeatureIdProvider::new(["dark-mode"])))
            .build();

        assert!(app.start().await.is_none());
        assert!(app.service().get_all_features().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn start_reconciles_when_enabled() {
        let app = FlagsApp::builder()
            .configure(|o| o.create_missing_features_on_start = true)
            .register_feature_id_provider(Arc::new(StaticFeatureIdProvider::new(["dark-mode"])))
            .build();

        let created = app.start().await.unwrap();
        assert_eq!(created, vec![Feature::disabled("dark-mode")]);
    }

    #[test]
    fn builder_tracks_registered_capabilities() {
        let b = FlagsBuilder::new();
        assert!(!b.feature_id_provider_configured());
        assert!(!b.has_custom_tenant_store());

        let b = b
            .register_feature_id_provider(Arc::new(DefaultFeatureIdProvider))
            .register_tenant_store(Arc::new(DefaultTenantStore));
        assert!(b.feature_id_provider_configured());
        assert!(b.has_custom_tenant_store());
    }
}
