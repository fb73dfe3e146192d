//! Meal plan lifecycle: an in-memory draft is validated and priced exactly
//! once on its way to storage; a stored plan keeps those derived figures
//! until the owner asks for a recalculation.

use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

use super::calculator::{
    compute_macros, estimate_energy, EnergyEstimate, Goal, MacroBreakdown, MacroRatios, Sex,
};
use super::validation::{validate_plan, ValidationError};

/// Sex used when the owner's profile has none.
pub fn resolve_sex(profile_sex: Option<Sex>) -> Sex {
    profile_sex.unwrap_or_default()
}

/// A plan that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct MealPlanDraft {
    pub name: String,
    pub goal: Goal,
    pub activity_multiplier: f64,
    pub age: i32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub ratios: MacroRatios,
}

impl MealPlanDraft {
    pub fn energy(&self, sex: Sex) -> EnergyEstimate {
        estimate_energy(
            self.age,
            self.weight_kg,
            self.height_cm,
            sex,
            self.activity_multiplier,
            self.goal,
        )
    }

    /// Trims the name and checks every field.
    pub fn validate(mut self) -> Result<ValidatedDraft, ValidationError> {
        self.name = self.name.trim().to_string();
        validate_plan(&self)?;
        Ok(ValidatedDraft(self))
    }

    /// Validates the draft and fills in BMR, TDEE and target calories.
    /// Nothing is computed when validation fails.
    pub fn finalize(self, sex: Option<Sex>) -> Result<NewMealPlan, ValidationError> {
        Ok(self.validate()?.finalize(sex))
    }
}

/// A draft that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDraft(MealPlanDraft);

impl ValidatedDraft {
    /// Runs the calculator once over the snapshot.
    pub fn finalize(self, sex: Option<Sex>) -> NewMealPlan {
        let energy = self.0.energy(resolve_sex(sex));
        NewMealPlan {
            draft: self.0,
            energy,
        }
    }
}

/// A validated draft with its derived figures, ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMealPlan {
    pub draft: MealPlanDraft,
    pub energy: EnergyEstimate,
}

/// A stored plan.
#[derive(Debug, Clone)]
pub struct MealPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub goal: Goal,
    pub activity_multiplier: f64,
    pub age: i32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub bmr: Option<f64>,
    pub tdee: Option<f64>,
    pub target_calories: Option<f64>,
    pub ratios: MacroRatios,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl MealPlan {
    /// Fresh breakdown from the stored target calories and ratios; `None`
    /// until target calories have been computed.
    pub fn macros(&self) -> Option<MacroBreakdown> {
        self.target_calories
            .map(|calories| compute_macros(calories, self.ratios))
    }

    pub fn snapshot(&self) -> MealPlanDraft {
        MealPlanDraft {
            name: self.name.clone(),
            goal: self.goal,
            activity_multiplier: self.activity_multiplier,
            age: self.age,
            weight_kg: self.weight_kg,
            height_cm: self.height_cm,
            ratios: self.ratios,
        }
    }

    /// Derived figures for the current snapshot. Does not modify the plan.
    pub fn recalculate(&self, sex: Option<Sex>) -> EnergyEstimate {
        self.snapshot().energy(resolve_sex(sex))
    }
}

/// Partial update of a stored plan. Absent fields keep their value; fields
/// outside the snapshot (such as `is_active`) are rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanChanges {
    pub name: Option<String>,
    pub goal: Option<Goal>,
    pub activity_multiplier: Option<f64>,
    pub age: Option<i32>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub protein_ratio: Option<f64>,
    pub carbs_ratio: Option<f64>,
    pub fat_ratio: Option<f64>,
}

impl PlanChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.goal.is_none()
            && self.activity_multiplier.is_none()
            && self.age.is_none()
            && self.weight_kg.is_none()
            && self.height_cm.is_none()
            && self.protein_ratio.is_none()
            && self.carbs_ratio.is_none()
            && self.fat_ratio.is_none()
    }

    /// Merges the changes over `current` and validates the result. Derived
    /// figures are not touched.
    pub fn apply(self, current: MealPlanDraft) -> Result<MealPlanDraft, ValidationError> {
        let merged = MealPlanDraft {
            name: self
                .name
                .map(|n| n.trim().to_string())
                .unwrap_or(current.name),
            goal: self.goal.unwrap_or(current.goal),
            activity_multiplier: self
                .activity_multiplier
                .unwrap_or(current.activity_multiplier),
            age: self.age.unwrap_or(current.age),
            weight_kg: self.weight_kg.unwrap_or(current.weight_kg),
            height_cm: self.height_cm.unwrap_or(current.height_cm),
            ratios: MacroRatios {
                protein: self.protein_ratio.unwrap_or(current.ratios.protein),
                carbs: self.carbs_ratio.unwrap_or(current.ratios.carbs),
                fat: self.fat_ratio.unwrap_or(current.ratios.fat),
            },
        };
        validate_plan(&merged)?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> MealPlanDraft {
        MealPlanDraft {
            name: "  Bulk  ".into(),
            goal: Goal::MuscleGain,
            activity_multiplier: 1.55,
            age: 25,
            weight_kg: 70.0,
            height_cm: 175.0,
            ratios: MacroRatios::new(0.4, 0.4, 0.2),
        }
    }

    fn stored(new: NewMealPlan) -> MealPlan {
        let now = OffsetDateTime::now_utc();
        MealPlan {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: new.draft.name,
            goal: new.draft.goal,
            activity_multiplier: new.draft.activity_multiplier,
            age: new.draft.age,
            weight_kg: new.draft.weight_kg,
            height_cm: new.draft.height_cm,
            bmr: Some(new.energy.bmr),
            tdee: Some(new.energy.tdee),
            target_calories: Some(new.energy.target_calories),
            ratios: new.draft.ratios,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn finalize_populates_derived_fields() {
        let new = draft().finalize(None).expect("valid draft");
        assert_eq!(new.draft.name, "Bulk");
        assert_eq!(new.energy.bmr, 1673.75);
        assert_eq!(new.energy.target_calories, new.energy.tdee + 300.0);
    }

    #[test]
    fn missing_sex_defaults_to_male() {
        let default = draft().finalize(None).unwrap();
        let male = draft().finalize(Some(Sex::Male)).unwrap();
        let female = draft().finalize(Some(Sex::Female)).unwrap();
        assert_eq!(default.energy, male.energy);
        assert_eq!(male.energy.bmr - female.energy.bmr, 166.0);
    }

    #[test]
    fn finalize_rejects_invalid_snapshot() {
        let mut d = draft();
        d.age = 5;
        let err = d.finalize(None).unwrap_err();
        assert_eq!(err.fields(), vec!["age"]);
    }

    #[test]
    fn macros_come_from_stored_target() {
        let plan = stored(draft().finalize(None).unwrap());
        let m = plan.macros().expect("target set");
        assert_eq!(m.protein_g, 289.4);
        assert_eq!(m.fat_kcal, 579);

        let mut uncalculated = plan.clone();
        uncalculated.target_calories = None;
        assert!(uncalculated.macros().is_none());
    }

    #[test]
    fn snapshot_changes_do_not_touch_stored_figures() {
        let plan = stored(draft().finalize(None).unwrap());
        let changes = PlanChanges {
            weight_kg: Some(90.0),
            ..Default::default()
        };
        let merged = changes.apply(plan.snapshot()).unwrap();
        assert_eq!(merged.weight_kg, 90.0);
        assert_eq!(merged.age, plan.age);

        // recalculation is explicit and reflects the new snapshot
        let mut updated = plan.clone();
        updated.weight_kg = merged.weight_kg;
        assert_eq!(updated.bmr, plan.bmr);
        assert_eq!(updated.recalculate(None).bmr, 1873.75);
    }

    #[test]
    fn changes_are_validated_after_merge() {
        let plan = stored(draft().finalize(None).unwrap());
        let changes = PlanChanges {
            protein_ratio: Some(0.6),
            ..Default::default()
        };
        let err = changes.apply(plan.snapshot()).unwrap_err();
        assert!(err.has_field("ratio_sum"));
        assert!(PlanChanges::default().is_empty());
    }

    #[test]
    fn changes_reject_fields_outside_the_snapshot() {
        let err = serde_json::from_value::<PlanChanges>(serde_json::json!({ "is_active": false }))
            .unwrap_err();
        assert!(err.to_string().contains("is_active"));

        let ok: PlanChanges = serde_json::from_value(serde_json::json!({ "age": 40 })).unwrap();
        assert_eq!(ok.age, Some(40));
    }
}
