//! dog-flags: feature toggles for DogRS.
//!
//! Features carry a global default; tenants may override it. The host
//! declares the feature ids it knows about and dog-flags reconciles them
//! against the store. Transports (see `dog-flags-axum`) call into
//! [`ToggleService`].
//!
//! ```rust
//! use std::sync::Arc;
//! use dog_flags::{FlagsApp, MemoryTenantStore, StaticFeatureIdProvider, Tenant};
//!
//! # futures::executor::block_on(async {
//! let app = FlagsApp::builder()
//!     .register_feature_id_provider(Arc::new(StaticFeatureIdProvider::new(["dark-mode"])))
//!     .register_tenant_store(Arc::new(MemoryTenantStore::with_tenants([Tenant::new("acme")])))
//!     .build();
//!
//! let flags = app.service();
//! flags.bulk_create_missing().await.unwrap();
//! flags.update_feature("dark-mode", true, Some("acme")).await.unwrap();
//!
//! assert!(flags.is_enabled("dark-mode", Some("acme")).await.unwrap());
//! assert!(!flags.is_enabled("dark-mode", None).await.unwrap());
//! # });
//! ```

pub mod app;
pub mod config;
pub mod errors;
pub mod model;
pub mod provider;
pub mod service;
pub mod store;
pub mod tenant;

pub use app::{FlagsApp, FlagsBuilder};
pub use config::{FlagsConfig, FlagsConfigSnapshot, FlagsOptions};
pub use errors::{ErrorKind, FlagError, FlagResult};
pub use model::{Feature, FeatureWithTenants, Tenant, TenantFeatureState};
pub use provider::{DefaultFeatureIdProvider, FeatureIdProvider, StaticFeatureIdProvider};
pub use service::{FeatureToggleService, ToggleService};
pub use store::{FeatureStore, MemoryFeatureStore};
pub use tenant::{DefaultTenantStore, MemoryTenantStore, TenantStore};
