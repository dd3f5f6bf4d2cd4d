use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, HeaderName, Method},
    response::{IntoResponse, Response},
};
use dog_flags::FlagError;
use tower::{Layer, Service};

use crate::FlagsAxumError;

pub const ROLES_HEADER: &str = "x-user-roles";

/// What an [`AuthenticationProvider`] gets to look at.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    /// `allowed_roles` from `FlagsOptions`.
    pub allowed_roles: Arc<Vec<String>>,
}

/// Decides whether a request may reach the administrative API.
///
/// Return `Ok(false)` to answer 401. An `Err` carrying a `FlagError`
/// (e.g. `FlagError::forbidden`) keeps its status; any other error is a 500.
#[async_trait]
pub trait AuthenticationProvider: Send + Sync {
    async fn authenticate(&self, ctx: &AuthContext) -> anyhow::Result<bool>;
}

/// Trusts a comma-separated role list in a request header, typically set
/// by an upstream gateway that already authenticated the caller.
///
/// Passes when any role is in `allowed_roles` (case-insensitive). With no
/// allowed roles configured, any caller presenting at least one role passes.
#[derive(Debug, Clone)]
pub struct RoleHeaderAuthenticationProvider {
    header: HeaderName,
}

impl Default for RoleHeaderAuthenticationProvider {
    fn default() -> Self {
        Self {
            header: HeaderName::from_static(ROLES_HEADER),
        }
    }
}

impl RoleHeaderAuthenticationProvider {
    pub fn new(header: HeaderName) -> Self {
        Self { header }
    }
}

#[async_trait]
impl AuthenticationProvider for RoleHeaderAuthenticationProvider {
    async fn authenticate(&self, ctx: &AuthContext) -> anyhow::Result<bool> {
        let roles: Vec<&str> = ctx
            .headers
            .get_all(&self.header)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .collect();

        if ctx.allowed_roles.is_empty() {
            return Ok(!roles.is_empty());
        }

        Ok(roles.iter().any(|role| {
            ctx.allowed_roles
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(role))
        }))
    }
}

/// Layer that runs every request through an [`AuthenticationProvider`].
#[derive(Clone)]
pub struct RequireAuthentication {
    provider: Arc<dyn AuthenticationProvider>,
    allowed_roles: Arc<Vec<String>>,
}

impl RequireAuthentication {
    pub fn new(provider: Arc<dyn AuthenticationProvider>, allowed_roles: Vec<String>) -> Self {
        Self {
            provider,
            allowed_roles: Arc::new(allowed_roles),
        }
    }
}

impl<S> Layer<S> for RequireAuthentication {
    type Service = RequireAuthenticationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequireAuthenticationService {
            inner,
            provider: Arc::clone(&self.provider),
            allowed_roles: Arc::clone(&self.allowed_roles),
        }
    }
}

#[derive(Clone)]
pub struct RequireAuthenticationService<S> {
    inner: S,
    provider: Arc<dyn AuthenticationProvider>,
    allowed_roles: Arc<Vec<String>>,
}

impl<S> Service<Request<Body>> for RequireAuthenticationService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut std::task::Context<'_>) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        // the clone may not be ready; keep the ready one for this call
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let provider = Arc::clone(&self.provider);

        let ctx = AuthContext {
            method: req.method().clone(),
            path: req.uri().path().to_string(),
            headers: req.headers().clone(),
            allowed_roles: Arc::clone(&self.allowed_roles),
        };

        Box::pin(async move {
            match provider.authenticate(&ctx).await {
                Ok(true) => inner.call(req).await,
                Ok(false) => {
                    tracing::warn!(method = %ctx.method, path = %ctx.path, "rejected unauthenticated request");
                    Ok(FlagsAxumError(FlagError::not_authenticated("Authentication required")).into_response())
                }
                Err(err) => Ok(FlagsAxumError::from(err).into_response()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn ctx(roles: Option<&'static str>, allowed: &[&str]) -> AuthContext {
        let mut headers = HeaderMap::new();
        if let Some(r) = roles {
            headers.insert(ROLES_HEADER, HeaderValue::from_static(r));
        }
        AuthContext {
            method: Method::GET,
            path: "/flagsmith/api/tenants".to_string(),
            headers,
            allowed_roles: Arc::new(allowed.iter().map(|s| s.to_string()).collect()),
        }
    }

    #[tokio::test]
    async fn matching_role_passes() {
        let p = RoleHeaderAuthenticationProvider::default();
        assert!(p.authenticate(&ctx(Some("viewer, admin"), &["Admin"])).await.unwrap());
    }

    #[tokio::test]
    async fn missing_or_foreign_roles_fail() {
        let p = RoleHeaderAuthenticationProvider::default();
        assert!(!p.authenticate(&ctx(None, &["Admin"])).await.unwrap());
        assert!(!p.authenticate(&ctx(Some("viewer"), &["Admin"])).await.unwrap());
    }

    #[tokio::test]
    async fn no_allowed_roles_needs_any_role() {
        let p = RoleHeaderAuthenticationProvider::default();
        assert!(p.authenticate(&ctx(Some("viewer"), &[])).await.unwrap());
        assert!(!p.authenticate(&ctx(Some(" , "), &[])).await.unwrap());
    }
}
