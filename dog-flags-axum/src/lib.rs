//! dog-flags-axum: Axum adapter for dog-flags.
//!
//! Mounts the administrative feature-flag API of a
//! [`FlagsApp`](dog_flags::FlagsApp) on an Axum router.

pub mod app;
pub mod middlewares;
pub mod params;
pub mod rest;
pub mod state;
mod error;
pub use error::FlagsAxumError;
pub use state::FlagsAxumState;

pub use app::{flags_axum, AxumApp};
pub use middlewares::auth::{AuthContext, AuthenticationProvider, RoleHeaderAuthenticationProvider};
