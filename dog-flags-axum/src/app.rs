use std::sync::Arc;

use axum::handler::Handler;
use axum::routing::get;
use axum::Router;
use dog_flags::FlagsApp;
use tokio::net::{TcpListener, ToSocketAddrs};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::middlewares::auth::{AuthenticationProvider, RequireAuthentication, RoleHeaderAuthenticationProvider};
use crate::rest;
use crate::FlagsAxumState;

/// Axum host for a [`FlagsApp`].
///
/// When `enable_dashboard` is set, the administrative API is mounted at
/// `{dashboard_path}/api`, behind the authentication gate when
/// `require_authentication` is set. Every API response carries an
/// `x-request-id`.
#[derive(Clone)]
pub struct AxumApp {
    pub app: FlagsApp,
    pub router: Router<()>,
}

impl AxumApp {
    /// Gate with [`RoleHeaderAuthenticationProvider`].
    pub fn new(app: FlagsApp) -> Self {
        Self::with_authentication(app, Arc::new(RoleHeaderAuthenticationProvider::default()))
    }

    pub fn with_authentication(app: FlagsApp, provider: Arc<dyn AuthenticationProvider>) -> Self {
        let options = app.options().clone();
        let mut router = Router::new();

        if options.enable_dashboard {
            let mut api = rest::api_router(FlagsAxumState::new(&app));

            if options.require_authentication {
                api = api.layer(RequireAuthentication::new(provider, options.allowed_roles.clone()));
            }

            let api = api.layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            );

            router = router.nest(&options.api_path(), api);
        }

        Self { app, router }
    }

    pub fn use_router(mut self, path: &str, router: Router<()>) -> Self {
        self.router = self.router.nest(path, router);
        self
    }

    pub fn use_get<H, T>(self, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()> + Clone + Send + Sync + 'static,
        T: 'static,
    {
        let router = Router::new().route("/", get(handler));
        self.use_router(path, router)
    }

    /// Run the startup pass, then serve until the listener fails.
    pub async fn listen<A>(self, addr: A) -> anyhow::Result<()>
    where
        A: ToSocketAddrs,
    {
        self.app.start().await;

        let listener = TcpListener::bind(addr).await?;
        tracing::info!(
            addr = %listener.local_addr()?,
            api = %self.app.options().api_path(),
            dashboard = self.app.options().enable_dashboard,
            "feature flag admin listening"
        );
        axum::serve(listener, self.router).await?;
        Ok(())
    }
}

pub fn flags_axum(app: FlagsApp) -> AxumApp {
    AxumApp::new(app)
}
