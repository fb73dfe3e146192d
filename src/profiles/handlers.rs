use axum::{
    extract::{rejection::JsonRejection, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::dto::{ProfileResponse, PutProfileRequest};
use super::repo::{self, Profile};
use crate::{auth::AuthUser, error::ApiError, state::AppState};

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/me/profile", get(get_profile).put(put_profile))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = repo::find(&state.db, user_id).await?.unwrap_or_default();
    Ok(Json(profile.into()))
}

#[instrument(skip(state, payload))]
pub async fn put_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<PutProfileRequest>, JsonRejection>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let Json(payload) = payload?;
    let profile = Profile {
        sex: payload.sex,
        phone: payload.phone.trim().to_string(),
        address: payload.address.trim().to_string(),
        height_cm: payload.height_cm,
        weight_kg: payload.weight_kg,
        fitness_goal: payload.fitness_goal.trim().to_string(),
    };
    if let Err(e) = profile.validate() {
        warn!(%user_id, fields = ?e.fields(), "profile rejected");
        return Err(e.into());
    }

    let saved = repo::upsert(&state.db, user_id, &profile).await?;
    info!(%user_id, "profile saved");
    Ok(Json(saved.into()))
}
