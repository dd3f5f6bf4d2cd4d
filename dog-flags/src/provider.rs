//! Feature ids declared by the hosting application.

/// Source of the canonical feature ids a host knows about.
///
/// Implementations are synchronous and pure. One that needs I/O must handle
/// its own failures and return a best-effort list.
pub trait FeatureIdProvider: Send + Sync {
    fn feature_ids(&self) -> Vec<String>;
}

/// Declares nothing. Used when the host does not register a provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFeatureIdProvider;

impl FeatureIdProvider for DefaultFeatureIdProvider {
    fn feature_ids(&self) -> Vec<String> {
        Vec::new()
    }
}

/// A fixed list of ids, usually the host's feature constants.
#[derive(Debug, Clone, Default)]
pub struct StaticFeatureIdProvider {
    ids: Vec<String>,
}

impl StaticFeatureIdProvider {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }
}

impl FeatureIdProvider for StaticFeatureIdProvider {
    fn feature_ids(&self) -> Vec<String> {
        self.ids.clone()
    }
}
