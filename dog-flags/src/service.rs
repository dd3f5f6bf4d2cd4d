use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::errors::{require_id, FlagError, FlagResult};
use crate::model::{Feature, FeatureWithTenants, Tenant, TenantFeatureState};
use crate::provider::FeatureIdProvider;
use crate::store::FeatureStore;
use crate::tenant::TenantStore;

/// Operations the administrative surface (HTTP, CLI, jobs) calls.
///
/// Every method is async and hands persistence faults back as
/// `ErrorKind::Storage`. Lookup misses are `ErrorKind::NotFound`; blank ids
/// are rejected with `ErrorKind::Validation` before storage is touched.
#[async_trait]
pub trait ToggleService: Send + Sync {
    async fn get_all_features(&self) -> FlagResult<Vec<Feature>>;

    async fn get_feature(&self, feature_id: &str) -> FlagResult<Feature>;

    /// Overrides recorded for a feature. Tenants without one are not listed.
    async fn get_tenant_state_by_feature(&self, feature_id: &str) -> FlagResult<Vec<TenantFeatureState>>;

    async fn get_all_tenants(&self) -> FlagResult<Vec<Tenant>>;

    /// Declared ids that have no stored feature yet.
    async fn get_available_feature_ids(&self) -> FlagResult<Vec<String>>;

    /// With no tenant, set the global default. With a tenant, upsert that
    /// tenant's override.
    async fn update_feature(&self, feature_id: &str, enabled: bool, tenant_id: Option<&str>) -> FlagResult<()>;

    /// Remove a tenant's override so it inherits the global default again.
    /// A missing override is not an error.
    async fn toggle_override(&self, feature_id: &str, tenant_id: &str) -> FlagResult<()>;

    /// Create a disabled feature for every available id. Returns the
    /// features this call created.
    async fn bulk_create_missing(&self) -> FlagResult<Vec<Feature>>;

    /// Effective enablement: the tenant's override when it has one, the
    /// global default otherwise.
    async fn is_enabled(&self, feature_id: &str, tenant_id: Option<&str>) -> FlagResult<bool>;

    async fn get_feature_with_tenants(&self, feature_id: &str) -> FlagResult<FeatureWithTenants> {
        let feature = self.get_feature(feature_id).await?;
        let tenant_states = self.get_tenant_state_by_feature(&feature.id).await?;
        Ok(FeatureWithTenants { feature, tenant_states })
    }

    async fn get_all_features_with_tenants(&self) -> FlagResult<Vec<FeatureWithTenants>> {
        let features = self.get_all_features().await?;
        let mut out = Vec::with_capacity(features.len());
        for feature in features {
            let tenant_states = self.get_tenant_state_by_feature(&feature.id).await?;
            out.push(FeatureWithTenants { feature, tenant_states });
        }
        Ok(out)
    }
}

/// Stateless orchestrator over the three capabilities.
pub struct FeatureToggleService {
    store: Arc<dyn FeatureStore>,
    tenants: Arc<dyn TenantStore>,
    ids: Arc<dyn FeatureIdProvider>,
}

impl FeatureToggleService {
    pub fn new(
        store: Arc<dyn FeatureStore>,
        tenants: Arc<dyn TenantStore>,
        ids: Arc<dyn FeatureIdProvider>,
    ) -> Self {
        Self { store, tenants, ids }
    }

    fn feature_not_found(feature_id: &str) -> FlagError {
        FlagError::not_found(format!("Feature not found: {feature_id}"))
    }

    async fn require_tenant(&self, tenant_id: &str) -> FlagResult<()> {
        match self.tenants.get_tenant(tenant_id).await? {
            Some(_) => Ok(()),
            None => Err(FlagError::not_found(format!("Tenant not found: {tenant_id}"))),
        }
    }
}

#[async_trait]
impl ToggleService for FeatureToggleService {
    async fn get_all_features(&self) -> FlagResult<Vec<Feature>> {
        self.store.list_features().await
    }

    async fn get_feature(&self, feature_id: &str) -> FlagResult<Feature> {
        let feature_id = require_id("featureId", feature_id)?;
        self.store
            .get_feature(feature_id)
            .await?
            .ok_or_else(|| Self::feature_not_found(feature_id))
    }

    async fn get_tenant_state_by_feature(&self, feature_id: &str) -> FlagResult<Vec<TenantFeatureState>> {
        let feature_id = require_id("featureId", feature_id)?;
        self.store.list_overrides(feature_id).await
    }

    async fn get_all_tenants(&self) -> FlagResult<Vec<Tenant>> {
        self.tenants.get_all_tenants().await
    }

    async fn get_available_feature_ids(&self) -> FlagResult<Vec<String>> {
        let stored: HashSet<String> = self
            .store
            .list_features()
            .await?
            .into_iter()
            .map(|f| f.id)
            .collect();

        let mut seen = HashSet::new();
        let available = self
            .ids
            .feature_ids()
            .into_iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty() && !stored.contains(id) && seen.insert(id.clone()))
            .collect::<Vec<_>>();

        debug!(count = available.len(), "computed available feature ids");
        Ok(available)
    }

    async fn update_feature(&self, feature_id: &str, enabled: bool, tenant_id: Option<&str>) -> FlagResult<()> {
        let feature_id = require_id("featureId", feature_id)?;

        let Some(tenant_id) = tenant_id else {
            self.store
                .set_feature_enabled(feature_id, enabled)
                .await?
                .ok_or_else(|| Self::feature_not_found(feature_id))?;
            info!(feature = feature_id, enabled, "updated global default");
            return Ok(());
        };

        let tenant_id = require_id("tenantId", tenant_id)?;
        self.require_tenant(tenant_id).await?;

        let state = TenantFeatureState::new(tenant_id, feature_id, Some(enabled));
        self.store
            .upsert_override(state)
            .await?
            .ok_or_else(|| Self::feature_not_found(feature_id))?;

        info!(feature = feature_id, tenant = tenant_id, enabled, "set tenant override");
        Ok(())
    }

    async fn toggle_override(&self, feature_id: &str, tenant_id: &str) -> FlagResult<()> {
        let feature_id = require_id("featureId", feature_id)?;
        let tenant_id = require_id("tenantId", tenant_id)?;

        if self.store.remove_override(tenant_id, feature_id).await?.is_some() {
            info!(feature = feature_id, tenant = tenant_id, "removed tenant override");
        } else {
            debug!(feature = feature_id, tenant = tenant_id, "no override to remove");
        }
        Ok(())
    }

    async fn bulk_create_missing(&self) -> FlagResult<Vec<Feature>> {
        let missing = self.get_available_feature_ids().await?;

        let mut created = Vec::with_capacity(missing.len());
        for id in missing {
            let feature = Feature::disabled(id);
            // a concurrent caller may have won the race for this id
            if self.store.insert_feature_if_absent(feature.clone()).await? {
                created.push(feature);
            }
        }

        info!(created = created.len(), "reconciled declared feature ids");
        Ok(created)
    }

    async fn is_enabled(&self, feature_id: &str, tenant_id: Option<&str>) -> FlagResult<bool> {
        let feature = self.get_feature(feature_id).await?;

        let Some(tenant_id) = tenant_id else {
            return Ok(feature.enabled);
        };
        let tenant_id = require_id("tenantId", tenant_id)?;

        Ok(self
            .store
            .get_override(tenant_id, &feature.id)
            .await?
            .map(|s| s.resolve(feature.enabled))
            .unwrap_or(feature.enabled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::provider::StaticFeatureIdProvider;
    use crate::store::MemoryFeatureStore;
    use crate::tenant::MemoryTenantStore;

    fn service(ids: &[&str], features: Vec<Feature>) -> FeatureToggleService {
        FeatureToggleService::new(
            Arc::new(MemoryFeatureStore::with_features(features)),
            Arc::new(MemoryTenantStore::with_tenants([Tenant::new("acme"), Tenant::new("globex")])),
            Arc::new(StaticFeatureIdProvider::new(ids.iter().copied())),
        )
    }

    #[tokio::test]
    async fn available_ids_skip_stored_blank_and_duplicate_ids() {
        let svc = service(
            &["dark-mode", "checkout-v2", " ", "checkout-v2", "beta"],
            vec![Feature::new("beta", true)],
        );

        let ids = svc.get_available_feature_ids().await.unwrap();
        assert_eq!(ids, vec!["dark-mode", "checkout-v2"]);
    }

    #[tokio::test]
    async fn override_for_unknown_tenant_is_not_found() {
        let svc = service(&[], vec![Feature::new("dark-mode", false)]);

        let err = svc.update_feature("dark-mode", true, Some("initech")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert!(err.message.contains("initech"));
        assert!(svc.get_tenant_state_by_feature("dark-mode").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_ids_are_validation_errors() {
        let svc = service(&[], vec![]);

        let err = svc.get_feature("").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = svc.update_feature("dark-mode", true, Some("  ")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = svc.toggle_override("dark-mode", "").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn is_enabled_for_unknown_feature_is_not_found() {
        let svc = service(&[], vec![]);
        let err = svc.is_enabled("ghost", Some("acme")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn combined_view_carries_overrides() {
        let svc = service(&[], vec![Feature::new("dark-mode", false), Feature::new("beta", true)]);
        svc.update_feature("dark-mode", true, Some("acme")).await.unwrap();

        let all = svc.get_all_features_with_tenants().await.unwrap();
        assert_eq!(all.len(), 2);

        let dark = svc.get_feature_with_tenants("dark-mode").await.unwrap();
        assert!(dark.is_enabled_for("acme"));
        assert!(!dark.is_enabled_for("globex"));
    }
}
