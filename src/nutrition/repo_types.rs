use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use super::calculator::{Goal, MacroRatios};
use super::plan::MealPlan;

/// Row of `meal_plans` as stored.
#[derive(Debug, FromRow)]
pub struct MealPlanRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub goal: String,                  // WL / MG / MT / EN
    pub activity_level: f64,
    pub age: i32,
    pub weight: f64,                   // kg
    pub height: f64,                   // cm
    pub bmr: Option<f64>,
    pub tdee: Option<f64>,
    pub target_calories: Option<f64>,
    pub protein_ratio: f64,
    pub carbs_ratio: f64,
    pub fat_ratio: f64,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<MealPlanRow> for MealPlan {
    type Error = anyhow::Error;

    fn try_from(r: MealPlanRow) -> Result<Self, Self::Error> {
        let goal = Goal::from_code(&r.goal)
            .ok_or_else(|| anyhow::anyhow!("unknown goal code {:?} on plan {}", r.goal, r.id))?;
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            name: r.name,
            goal,
            activity_multiplier: r.activity_level,
            age: r.age,
            weight_kg: r.weight,
            height_cm: r.height,
            bmr: r.bmr,
            tdee: r.tdee,
            target_calories: r.target_calories,
            ratios: MacroRatios::new(r.protein_ratio, r.carbs_ratio, r.fat_ratio),
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}
