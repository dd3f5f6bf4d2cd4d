use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use dog_flags::{FeatureWithTenants, FlagError, Tenant};

use crate::{params::UpdateParams, FlagsAxumError, FlagsAxumState};

type ApiResult<T> = Result<T, FlagsAxumError>;

/// Administrative API, relative to `{dashboard_path}/api`.
pub fn api_router(state: FlagsAxumState) -> Router<()> {
    Router::new()
        .route("/feature-flags", get(list_feature_flags))
        .route(
            "/feature-flags/{featureId}",
            get(get_feature_flag).patch(update_feature_flag),
        )
        .route("/available-ids", get(available_ids))
        .route("/tenants", get(list_tenants))
        .route(
            "/tenants/{tenantId}/overrides/{featureId}",
            delete(remove_override),
        )
        .route("/management/bulk-create-missing", post(bulk_create_missing))
        .fallback(not_found)
        .with_state(state)
}

async fn list_feature_flags(
    State(state): State<FlagsAxumState>,
) -> ApiResult<Json<Vec<FeatureWithTenants>>> {
    let res = state.service.get_all_features_with_tenants().await?;
    Ok(Json(res))
}

async fn get_feature_flag(
    State(state): State<FlagsAxumState>,
    Path(feature_id): Path<String>,
) -> ApiResult<Json<FeatureWithTenants>> {
    let res = state.service.get_feature_with_tenants(&feature_id).await?;
    Ok(Json(res))
}

async fn update_feature_flag(
    State(state): State<FlagsAxumState>,
    Path(feature_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<StatusCode> {
    let params = UpdateParams::from_query(&query)?;
    state
        .service
        .update_feature(&feature_id, params.enabled, params.tenant_id.as_deref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn available_ids(State(state): State<FlagsAxumState>) -> ApiResult<Json<Vec<String>>> {
    let res = state.service.get_available_feature_ids().await?;
    Ok(Json(res))
}

async fn list_tenants(State(state): State<FlagsAxumState>) -> ApiResult<Json<Vec<Tenant>>> {
    let res = state.service.get_all_tenants().await?;
    Ok(Json(res))
}

async fn remove_override(
    State(state): State<FlagsAxumState>,
    Path((tenant_id, feature_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state.service.toggle_override(&feature_id, &tenant_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn bulk_create_missing(State(state): State<FlagsAxumState>) -> ApiResult<StatusCode> {
    state.service.bulk_create_missing().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn not_found() -> FlagsAxumError {
    FlagError::not_found("No such route").into()
}
