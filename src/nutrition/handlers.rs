use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tracing::{instrument, warn};
use uuid::Uuid;

use super::calculator::preview;
use super::dto::{
    parse_preview, CreatePlanRequest, CreatedPlanResponse, Pagination, PlanDetails, PlanListItem,
    PreviewResponse,
};
use super::plan::PlanChanges;
use super::{repo, services};
use crate::{auth::AuthUser, error::ApiError, state::AppState};

pub fn nutrition_routes() -> Router<AppState> {
    Router::new()
        .route("/nutrition/calculate", post(calculate))
        .route("/nutrition/plans", get(list_plans).post(create_plan))
        .route(
            "/nutrition/plans/:id",
            get(get_plan).patch(update_plan).delete(delete_plan),
        )
        .route("/nutrition/plans/:id/recalculate", post(recalculate_plan))
        .route("/nutrition/plans/:id/activate", post(activate_plan))
        .route("/nutrition/plans/:id/deactivate", post(deactivate_plan))
}

/// POST /nutrition/calculate: stateless preview with goal-based ratios.
#[instrument(skip(payload))]
pub async fn calculate(
    AuthUser(user_id): AuthUser,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PreviewResponse>, ApiError> {
    let input = payload
        .map_err(ApiError::from)
        .and_then(|Json(v)| parse_preview(&v))
        .map_err(|e| {
            warn!(%user_id, error = %e, "preview input malformed");
            e
        })?;
    Ok(Json(PreviewResponse {
        success: true,
        preview: preview(&input),
    }))
}

#[instrument(skip(state))]
pub async fn list_plans(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    page: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<Vec<PlanListItem>>, ApiError> {
    let Query(page) = page?;
    let (limit, offset) = page.clamped();
    let plans = repo::list_active(&state.db, user_id, limit, offset).await?;
    Ok(Json(plans.into_iter().map(PlanListItem::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<CreatePlanRequest>, JsonRejection>,
) -> Result<(StatusCode, HeaderMap, Json<CreatedPlanResponse>), ApiError> {
    let Json(request) = payload?;
    let draft = request.into();
    let plan = services::create_plan(&state.db, user_id, draft).await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/api/v1/nutrition/plans/{}", plan.id)) {
        headers.insert(axum::http::header::LOCATION, location);
    }

    Ok((
        StatusCode::CREATED,
        headers,
        Json(CreatedPlanResponse::from(&plan)),
    ))
}

#[instrument(skip(state))]
pub async fn get_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PlanDetails>, ApiError> {
    let plan = services::get_plan(&state.db, user_id, id).await?;
    Ok(Json(plan.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    payload: Result<Json<PlanChanges>, JsonRejection>,
) -> Result<Json<PlanDetails>, ApiError> {
    let Json(changes) = payload?;
    let plan = services::update_plan(&state.db, user_id, id, changes).await?;
    Ok(Json(plan.into()))
}

#[instrument(skip(state))]
pub async fn recalculate_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PlanDetails>, ApiError> {
    let plan = services::recalculate_plan(&state.db, user_id, id).await?;
    Ok(Json(plan.into()))
}

#[instrument(skip(state))]
pub async fn activate_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PlanDetails>, ApiError> {
    let plan = services::set_active(&state.db, user_id, id, true).await?;
    Ok(Json(plan.into()))
}

#[instrument(skip(state))]
pub async fn deactivate_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PlanDetails>, ApiError> {
    let plan = services::set_active(&state.db, user_id, id, false).await?;
    Ok(Json(plan.into()))
}

#[instrument(skip(state))]
pub async fn delete_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    services::delete_plan(&state.db, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
