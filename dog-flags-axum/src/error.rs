use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dog_flags::{ErrorKind, FlagError};

#[derive(Debug)]
pub struct FlagsAxumError(pub FlagError);

impl From<FlagError> for FlagsAxumError {
    fn from(e: FlagError) -> Self {
        Self(e)
    }
}

impl From<anyhow::Error> for FlagsAxumError {
    fn from(e: anyhow::Error) -> Self {
        Self(FlagError::normalize(e))
    }
}

impl IntoResponse for FlagsAxumError {
    fn into_response(self) -> Response {
        if self.0.kind == ErrorKind::Storage {
            tracing::error!(error = %self.0, source = ?self.0.source, "feature store failure");
        }

        // never leak the inner source to clients
        let safe = self.0.sanitize_for_client();
        let status = StatusCode::from_u16(safe.code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(safe.to_json())).into_response()
    }
}
