use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use super::plan::{MealPlan, MealPlanDraft, PlanChanges};
use super::repo;
use crate::{error::ApiError, profiles};

const PLAN: &str = "meal plan";

fn found(plan: Option<MealPlan>) -> Result<MealPlan, ApiError> {
    plan.ok_or(ApiError::NotFound(PLAN))
}

/// draft -> created: validate, price once with the owner's sex, persist.
pub async fn create_plan(
    db: &PgPool,
    user_id: Uuid,
    draft: MealPlanDraft,
) -> Result<MealPlan, ApiError> {
    let valid = draft.validate().map_err(|e| {
        warn!(%user_id, fields = ?e.fields(), "meal plan rejected");
        e
    })?;
    let sex = profiles::repo::find_sex(db, user_id).await?;
    let new = valid.finalize(sex);
    let plan = repo::insert(db, user_id, &new).await?;
    info!(%user_id, plan_id = %plan.id, target_calories = ?plan.target_calories, "meal plan created");
    Ok(plan)
}

pub async fn get_plan(db: &PgPool, user_id: Uuid, plan_id: Uuid) -> Result<MealPlan, ApiError> {
    found(repo::find_for_owner(db, user_id, plan_id).await?)
}

/// Applies a partial update. Stored BMR/TDEE/target calories are kept; the
/// owner recalculates explicitly.
pub async fn update_plan(
    db: &PgPool,
    user_id: Uuid,
    plan_id: Uuid,
    changes: PlanChanges,
) -> Result<MealPlan, ApiError> {
    let current = get_plan(db, user_id, plan_id).await?;
    if changes.is_empty() {
        return Ok(current);
    }
    let merged = changes.apply(current.snapshot()).map_err(|e| {
        warn!(%user_id, %plan_id, fields = ?e.fields(), "meal plan update rejected");
        e
    })?;
    let plan = found(repo::update_snapshot(db, user_id, plan_id, &merged).await?)?;
    info!(%user_id, %plan_id, "meal plan updated");
    Ok(plan)
}

pub async fn recalculate_plan(
    db: &PgPool,
    user_id: Uuid,
    plan_id: Uuid,
) -> Result<MealPlan, ApiError> {
    let current = get_plan(db, user_id, plan_id).await?;
    let sex = profiles::repo::find_sex(db, user_id).await?;
    let energy = current.recalculate(sex);
    let plan = found(repo::store_energy(db, user_id, plan_id, &energy).await?)?;
    info!(%user_id, %plan_id, target_calories = energy.target_calories, "meal plan recalculated");
    Ok(plan)
}

pub async fn set_active(
    db: &PgPool,
    user_id: Uuid,
    plan_id: Uuid,
    active: bool,
) -> Result<MealPlan, ApiError> {
    let plan = found(repo::set_active(db, user_id, plan_id, active).await?)?;
    info!(%user_id, %plan_id, active, "meal plan active flag set");
    Ok(plan)
}

pub async fn delete_plan(db: &PgPool, user_id: Uuid, plan_id: Uuid) -> Result<(), ApiError> {
    if !repo::delete(db, user_id, plan_id).await? {
        return Err(ApiError::NotFound(PLAN));
    }
    info!(%user_id, %plan_id, "meal plan deleted");
    Ok(())
}
