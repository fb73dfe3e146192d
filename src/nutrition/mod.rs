//! Nutrition calculator and meal plans.

pub mod calculator;
pub mod dto;
pub mod handlers;
pub mod plan;
pub mod repo;
mod repo_types;
pub mod services;
pub mod validation;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::nutrition_routes()
}
