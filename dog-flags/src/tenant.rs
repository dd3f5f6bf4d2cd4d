//! Tenant directory consumed by dog-flags.
//!
//! dog-flags never creates or deletes tenants. Hosts plug in whatever owns
//! their tenant list (a multi-tenancy directory, a database table, ...).

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::errors::FlagResult;
use crate::model::Tenant;

#[async_trait]
pub trait TenantStore: Send + Sync {
    /// Every tenant known to the host.
    async fn get_all_tenants(&self) -> FlagResult<Vec<Tenant>>;

    /// Look up a single tenant.
    ///
    /// The default scans `get_all_tenants`; stores with an index should
    /// override it.
    async fn get_tenant(&self, tenant_id: &str) -> FlagResult<Option<Tenant>> {
        let tenants = self.get_all_tenants().await?;
        Ok(tenants.into_iter().find(|t| t.id == tenant_id))
    }
}

/// Knows no tenants. Used when the host does not register a store.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTenantStore;

#[async_trait]
impl TenantStore for DefaultTenantStore {
    async fn get_all_tenants(&self) -> FlagResult<Vec<Tenant>> {
        Ok(Vec::new())
    }
}

/// In-process tenant list for development and tests.
#[derive(Debug, Default)]
pub struct MemoryTenantStore {
    tenants: RwLock<BTreeMap<String, Tenant>>,
}

impl MemoryTenantStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tenants<I>(tenants: I) -> Self
    where
        I: IntoIterator<Item = Tenant>,
    {
        let store = Self::new();
        for tenant in tenants {
            store.insert(tenant);
        }
        store
    }

    /// Add or replace a tenant.
    pub fn insert(&self, tenant: Tenant) {
        self.tenants.write().insert(tenant.id.clone(), tenant);
    }

    pub fn remove(&self, tenant_id: &str) -> Option<Tenant> {
        self.tenants.write().remove(tenant_id)
    }
}

#[async_trait]
impl TenantStore for MemoryTenantStore {
    async fn get_all_tenants(&self) -> FlagResult<Vec<Tenant>> {
        Ok(self.tenants.read().values().cloned().collect())
    }

    async fn get_tenant(&self, tenant_id: &str) -> FlagResult<Option<Tenant>> {
        Ok(self.tenants.read().get(tenant_id).cloned())
    }
}
