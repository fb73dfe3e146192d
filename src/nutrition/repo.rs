use sqlx::PgPool;
use uuid::Uuid;

use super::calculator::EnergyEstimate;
use super::plan::{MealPlan, MealPlanDraft, NewMealPlan};
use super::repo_types::MealPlanRow;

const PLAN_COLUMNS: &str = r#"
    id, user_id, name, goal, activity_level, age, weight, height,
    bmr, tdee, target_calories, protein_ratio, carbs_ratio, fat_ratio,
    is_active, created_at, updated_at
"#;

fn into_plan(row: Option<MealPlanRow>) -> anyhow::Result<Option<MealPlan>> {
    row.map(MealPlan::try_from).transpose()
}

/// Insert a finalized plan for `user_id`.
pub async fn insert(db: &PgPool, user_id: Uuid, plan: &NewMealPlan) -> anyhow::Result<MealPlan> {
    let d = &plan.draft;
    let row = sqlx::query_as::<_, MealPlanRow>(&format!(
        r#"
        INSERT INTO meal_plans
            (id, user_id, name, goal, activity_level, age, weight, height,
             bmr, tdee, target_calories, protein_ratio, carbs_ratio, fat_ratio)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        RETURNING {PLAN_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&d.name)
    .bind(d.goal.code())
    .bind(d.activity_multiplier)
    .bind(d.age)
    .bind(d.weight_kg)
    .bind(d.height_cm)
    .bind(plan.energy.bmr)
    .bind(plan.energy.tdee)
    .bind(plan.energy.target_calories)
    .bind(d.ratios.protein)
    .bind(d.ratios.carbs)
    .bind(d.ratios.fat)
    .fetch_one(db)
    .await?;
    MealPlan::try_from(row)
}

/// Plan by id, only if owned by `user_id`. Inactive plans are included.
pub async fn find_for_owner(
    db: &PgPool,
    user_id: Uuid,
    plan_id: Uuid,
) -> anyhow::Result<Option<MealPlan>> {
    let row = sqlx::query_as::<_, MealPlanRow>(&format!(
        r#"
        SELECT {PLAN_COLUMNS}
        FROM meal_plans
        WHERE id = $1 AND user_id = $2
        "#
    ))
    .bind(plan_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    into_plan(row)
}

pub async fn list_active(
    db: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<MealPlan>> {
    let rows = sqlx::query_as::<_, MealPlanRow>(&format!(
        r#"
        SELECT {PLAN_COLUMNS}
        FROM meal_plans
        WHERE user_id = $1 AND is_active
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#
    ))
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    rows.into_iter().map(MealPlan::try_from).collect()
}

/// Overwrite the descriptive, biometric and ratio fields. Derived figures are
/// left as they are.
pub async fn update_snapshot(
    db: &PgPool,
    user_id: Uuid,
    plan_id: Uuid,
    d: &MealPlanDraft,
) -> anyhow::Result<Option<MealPlan>> {
    let row = sqlx::query_as::<_, MealPlanRow>(&format!(
        r#"
        UPDATE meal_plans
        SET name = $3, goal = $4, activity_level = $5, age = $6, weight = $7,
            height = $8, protein_ratio = $9, carbs_ratio = $10, fat_ratio = $11,
            updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING {PLAN_COLUMNS}
        "#
    ))
    .bind(plan_id)
    .bind(user_id)
    .bind(&d.name)
    .bind(d.goal.code())
    .bind(d.activity_multiplier)
    .bind(d.age)
    .bind(d.weight_kg)
    .bind(d.height_cm)
    .bind(d.ratios.protein)
    .bind(d.ratios.carbs)
    .bind(d.ratios.fat)
    .fetch_optional(db)
    .await?;
    into_plan(row)
}

pub async fn store_energy(
    db: &PgPool,
    user_id: Uuid,
    plan_id: Uuid,
    energy: &EnergyEstimate,
) -> anyhow::Result<Option<MealPlan>> {
    let row = sqlx::query_as::<_, MealPlanRow>(&format!(
        r#"
        UPDATE meal_plans
        SET bmr = $3, tdee = $4, target_calories = $5, updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING {PLAN_COLUMNS}
        "#
    ))
    .bind(plan_id)
    .bind(user_id)
    .bind(energy.bmr)
    .bind(energy.tdee)
    .bind(energy.target_calories)
    .fetch_optional(db)
    .await?;
    into_plan(row)
}

pub async fn set_active(
    db: &PgPool,
    user_id: Uuid,
    plan_id: Uuid,
    active: bool,
) -> anyhow::Result<Option<MealPlan>> {
    let row = sqlx::query_as::<_, MealPlanRow>(&format!(
        r#"
        UPDATE meal_plans
        SET is_active = $3, updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING {PLAN_COLUMNS}
        "#
    ))
    .bind(plan_id)
    .bind(user_id)
    .bind(active)
    .fetch_optional(db)
    .await?;
    into_plan(row)
}

/// Returns false when no plan with that id belongs to `user_id`.
pub async fn delete(db: &PgPool, user_id: Uuid, plan_id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query(r#"DELETE FROM meal_plans WHERE id = $1 AND user_id = $2"#)
        .bind(plan_id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}
