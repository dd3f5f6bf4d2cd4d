use std::collections::HashMap;

use dog_flags::{FlagError, FlagResult};
use serde_json::json;

/// Query of `PATCH /feature-flags/{featureId}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateParams {
    /// Absent or empty targets the global default.
    pub tenant_id: Option<String>,
    pub enabled: bool,
}

impl UpdateParams {
    pub fn from_query(query: &HashMap<String, String>) -> FlagResult<Self> {
        let tenant_id = query
            .get("tenantId")
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        let Some(raw) = query.get("enabled") else {
            return Err(FlagError::validation("Query parameter `enabled` is required")
                .with_errors(json!({"enabled": ["required"]})));
        };

        let enabled = parse_bool(raw).ok_or_else(|| {
            FlagError::validation(format!("`enabled` must be true or false, got `{raw}`"))
                .with_errors(json!({"enabled": ["must be a boolean"]}))
        })?;

        Ok(Self { tenant_id, enabled })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dog_flags::ErrorKind;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn empty_tenant_targets_the_global_default() {
        let p = UpdateParams::from_query(&query(&[("tenantId", ""), ("enabled", "True")])).unwrap();
        assert_eq!(p, UpdateParams { tenant_id: None, enabled: true });
    }

    #[test]
    fn tenant_and_flag_are_read() {
        let p = UpdateParams::from_query(&query(&[("tenantId", "acme"), ("enabled", "false")])).unwrap();
        assert_eq!(p.tenant_id.as_deref(), Some("acme"));
        assert!(!p.enabled);
    }

    #[test]
    fn enabled_is_required_and_must_be_boolean() {
        let err = UpdateParams::from_query(&query(&[("tenantId", "acme")])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = UpdateParams::from_query(&query(&[("enabled", "yes")])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.to_json()["errors"]["enabled"][0], "must be a boolean");
    }
}
