mod features;

use std::sync::Arc;

use anyhow::Result;
use dog_flags::{FlagsApp, FlagsConfig, FlagsConfigSnapshot, MemoryFeatureStore, MemoryTenantStore, Tenant};
use dog_flags_axum::{flags_axum, AxumApp};

pub use features::{CHECKOUT_V2, DARK_MODE, NEW_SEARCH};

pub const ENV_PREFIX: &str = "DOGFLAGS__";

/// Defaults, then `DOGFLAGS__*` environment overrides.
pub fn load_config() -> FlagsConfig {
    let mut config = defaults();
    config.load_env_config(ENV_PREFIX);
    config
}

pub fn defaults() -> FlagsConfig {
    let mut config = FlagsConfig::new();
    config.set("http.host", "127.0.0.1");
    config.set("http.port", "3030");
    config.set("host.tenants", "acme,globex");
    config.set("flags.create_missing_features_on_start", "true");
    config
}

pub fn build(config: &FlagsConfigSnapshot) -> Result<AxumApp> {
    let tenants = config
        .get_list("host.tenants")
        .unwrap_or_default()
        .into_iter()
        .map(Tenant::new);
    let tenant_store = MemoryTenantStore::with_tenants(tenants);

    let app = FlagsApp::builder()
        .config(config)
        .feature_store(Arc::new(MemoryFeatureStore::new()))
        .register_feature_id_provider(Arc::new(features::provider()))
        .register_tenant_store(Arc::new(tenant_store))
        .build();

    tracing::info!(
        api = %app.options().api_path(),
        require_authentication = app.options().require_authentication,
        "configured feature flags"
    );

    let ax = flags_axum(app).use_get("/health", || async { "ok" });

    Ok(ax)
}
