use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use super::calculator::{Goal, MacroBreakdown, MacroPreview, MacroRatios, PreviewInput, Sex};
use super::plan::{MealPlan, MealPlanDraft};
use crate::error::ApiError;

// --- preview ---

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub success: bool,
    #[serde(flatten)]
    pub preview: MacroPreview,
}

/// First present, non-null value among `keys`.
fn field<'a>(body: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| body.get(*k))
        .find(|v| !v.is_null())
}

fn malformed(msg: String) -> ApiError {
    ApiError::MalformedInput(msg)
}

fn required_f64(body: &Value, keys: &[&str]) -> Result<f64, ApiError> {
    let name = keys[0];
    let value = field(body, keys).ok_or_else(|| malformed(format!("{name} is required")))?;
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match n {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(malformed(format!("{name} must be a number"))),
    }
}

fn required_i32(body: &Value, keys: &[&str]) -> Result<i32, ApiError> {
    let name = keys[0];
    let value = field(body, keys).ok_or_else(|| malformed(format!("{name} is required")))?;
    let n = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    n.and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| malformed(format!("{name} must be a whole number")))
}

fn optional_enum<T>(body: &Value, keys: &[&str]) -> Result<Option<T>, ApiError>
where
    T: for<'de> Deserialize<'de>,
{
    match field(body, keys) {
        None => Ok(None),
        Some(v) => serde_json::from_value(v.clone())
            .map(Some)
            .map_err(|_| malformed(format!("unknown {} {}", keys[0], v))),
    }
}

/// Reads a preview request leniently: numbers may arrive as JSON numbers or
/// numeric strings, `goal` defaults to maintenance and `sex` to male.
pub fn parse_preview(body: &Value) -> Result<PreviewInput, ApiError> {
    if !body.is_object() {
        return Err(malformed("request body must be a JSON object".into()));
    }
    let age = required_i32(body, &["age"])?;
    let weight_kg = required_f64(body, &["weight_kg", "weight"])?;
    let height_cm = required_f64(body, &["height_cm", "height"])?;
    let activity_multiplier = required_f64(body, &["activity_multiplier", "activity_level"])?;
    if activity_multiplier <= 0.0 {
        return Err(malformed("activity_multiplier must be positive".into()));
    }
    let goal: Goal = optional_enum(body, &["goal"])?.unwrap_or_default();
    let sex: Sex = optional_enum(body, &["sex", "gender"])?.unwrap_or_default();

    Ok(PreviewInput {
        age,
        weight_kg,
        height_cm,
        activity_multiplier,
        goal,
        sex,
    })
}

// --- plans ---

fn default_protein_ratio() -> f64 {
    MacroRatios::default().protein
}
fn default_carbs_ratio() -> f64 {
    MacroRatios::default().carbs
}
fn default_fat_ratio() -> f64 {
    MacroRatios::default().fat
}

#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    pub name: String,
    pub goal: Goal,
    #[serde(alias = "activity_level")]
    pub activity_multiplier: f64,
    pub age: i32,
    #[serde(alias = "weight")]
    pub weight_kg: f64,
    #[serde(alias = "height")]
    pub height_cm: f64,
    #[serde(default = "default_protein_ratio")]
    pub protein_ratio: f64,
    #[serde(default = "default_carbs_ratio")]
    pub carbs_ratio: f64,
    #[serde(default = "default_fat_ratio")]
    pub fat_ratio: f64,
}

impl From<CreatePlanRequest> for MealPlanDraft {
    fn from(r: CreatePlanRequest) -> Self {
        Self {
            name: r.name,
            goal: r.goal,
            activity_multiplier: r.activity_multiplier,
            age: r.age,
            weight_kg: r.weight_kg,
            height_cm: r.height_cm,
            ratios: MacroRatios::new(r.protein_ratio, r.carbs_ratio, r.fat_ratio),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedPlanResponse {
    pub id: Uuid,
    pub bmr: Option<f64>,
    pub tdee: Option<f64>,
    pub target_calories: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&MealPlan> for CreatedPlanResponse {
    fn from(p: &MealPlan) -> Self {
        Self {
            id: p.id,
            bmr: p.bmr,
            tdee: p.tdee,
            target_calories: p.target_calories,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlanListItem {
    pub id: Uuid,
    pub name: String,
    pub goal: Goal,
    pub target_calories: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<MealPlan> for PlanListItem {
    fn from(p: MealPlan) -> Self {
        Self {
            id: p.id,
            name: p.name,
            goal: p.goal,
            target_calories: p.target_calories,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlanDetails {
    pub id: Uuid,
    pub name: String,
    pub goal: Goal,
    pub activity_multiplier: f64,
    pub age: i32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub bmr: Option<f64>,
    pub tdee: Option<f64>,
    pub target_calories: Option<f64>,
    pub protein_ratio: f64,
    pub carbs_ratio: f64,
    pub fat_ratio: f64,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub macros: Option<MacroBreakdown>,
}

impl From<MealPlan> for PlanDetails {
    fn from(p: MealPlan) -> Self {
        let macros = p.macros();
        Self {
            id: p.id,
            name: p.name,
            goal: p.goal,
            activity_multiplier: p.activity_multiplier,
            age: p.age,
            weight_kg: p.weight_kg,
            height_cm: p.height_cm,
            bmr: p.bmr,
            tdee: p.tdee,
            target_calories: p.target_calories,
            protein_ratio: p.ratios.protein,
            carbs_ratio: p.ratios.carbs,
            fat_ratio: p.ratios.fat,
            is_active: p.is_active,
            created_at: p.created_at,
            updated_at: p.updated_at,
            macros,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 { 20 }

impl Pagination {
    pub fn clamped(&self) -> (i64, i64) {
        (self.limit.clamp(1, 100), self.offset.max(0))
    }
}
