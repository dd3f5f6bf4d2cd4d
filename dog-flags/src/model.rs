//! Records owned by a [`FeatureStore`](crate::store::FeatureStore).

use serde::{Deserialize, Serialize};

/// A named capability whose enablement can be toggled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub id: String,
    /// Global default, used for every tenant without an override.
    pub enabled: bool,
}

impl Feature {
    pub fn new(id: impl Into<String>, enabled: bool) -> Self {
        Self {
            id: id.into(),
            enabled,
        }
    }

    /// Newly reconciled features start disabled.
    pub fn disabled(id: impl Into<String>) -> Self {
        Self::new(id, false)
    }
}

/// Tenant-scoped state for one feature.
///
/// `enabled == None` inherits the feature's global default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantFeatureState {
    pub tenant_id: String,
    pub feature_id: String,
    pub enabled: Option<bool>,
}

impl TenantFeatureState {
    pub fn new(tenant_id: impl Into<String>, feature_id: impl Into<String>, enabled: Option<bool>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            feature_id: feature_id.into(),
            enabled,
        }
    }

    /// Resolve against the feature's global default.
    pub fn resolve(&self, global: bool) -> bool {
        self.enabled.unwrap_or(global)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Tenant {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A feature together with every override recorded for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureWithTenants {
    pub feature: Feature,
    pub tenant_states: Vec<TenantFeatureState>,
}

impl FeatureWithTenants {
    /// Effective enablement for `tenant_id`.
    pub fn is_enabled_for(&self, tenant_id: &str) -> bool {
        self.tenant_states
            .iter()
            .find(|s| s.tenant_id == tenant_id)
            .map(|s| s.resolve(self.feature.enabled))
            .unwrap_or(self.feature.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_shape_is_camel_case() {
        let view = FeatureWithTenants {
            feature: Feature::new("dark-mode", false),
            tenant_states: vec![TenantFeatureState::new("acme", "dark-mode", Some(true))],
        };

        assert_eq!(
            serde_json::to_value(&view).unwrap(),
            json!({
                "feature": { "id": "dark-mode", "enabled": false },
                "tenantStates": [
                    { "tenantId": "acme", "featureId": "dark-mode", "enabled": true }
                ]
            })
        );
    }

    #[test]
    fn inheriting_state_falls_back_to_global() {
        let view = FeatureWithTenants {
            feature: Feature::new("dark-mode", true),
            tenant_states: vec![
                TenantFeatureState::new("acme", "dark-mode", None),
                TenantFeatureState::new("globex", "dark-mode", Some(false)),
            ],
        };

        assert!(view.is_enabled_for("acme"));
        assert!(!view.is_enabled_for("globex"));
        assert!(view.is_enabled_for("initech"));
    }
}
