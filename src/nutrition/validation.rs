//! Range checks run before a plan is created or its snapshot changes.
//!
//! Unlike [`super::calculator::normalize_ratios`], nothing here corrects its
//! input: an off-tolerance ratio sum is a rejection.

use std::ops::RangeInclusive;

use serde::Serialize;
use thiserror::Error;

use super::calculator::{ActivityLevel, MacroRatios, RATIO_SUM_TOLERANCE};
use super::plan::MealPlanDraft;

pub const AGE_RANGE: RangeInclusive<i32> = 10..=100;
pub const WEIGHT_KG_RANGE: RangeInclusive<f64> = 30.0..=300.0;
pub const HEIGHT_CM_RANGE: RangeInclusive<f64> = 100.0..=250.0;
pub const PROTEIN_RATIO_RANGE: RangeInclusive<f64> = 0.1..=0.6;
pub const CARBS_RATIO_RANGE: RangeInclusive<f64> = 0.1..=0.7;
pub const FAT_RATIO_RANGE: RangeInclusive<f64> = 0.1..=0.5;
pub const NAME_MAX_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

/// Every violated field of a rejected request.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("validation failed: {}", summary(.violations))]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

fn summary(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    pub fn fields(&self) -> Vec<&'static str> {
        self.violations.iter().map(|v| v.field).collect()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

/// Collects violations so that every bad field is reported at once.
#[derive(Default)]
pub struct Violations(Vec<FieldViolation>);

impl Violations {
    pub fn push(&mut self, field: &'static str, message: String) {
        self.0.push(FieldViolation { field, message });
    }

    pub fn check_f64(
        &mut self,
        field: &'static str,
        label: &str,
        value: f64,
        range: &RangeInclusive<f64>,
        unit: &str,
    ) {
        if !range.contains(&value) {
            self.push(
                field,
                format!("{label} must be between {} and {}{unit}", range.start(), range.end()),
            );
        }
    }

    fn check_ratios(&mut self, ratios: &MacroRatios) {
        let checks = [
            ("protein_ratio", "Protein ratio", ratios.protein, PROTEIN_RATIO_RANGE),
            ("carbs_ratio", "Carbs ratio", ratios.carbs, CARBS_RATIO_RANGE),
            ("fat_ratio", "Fat ratio", ratios.fat, FAT_RATIO_RANGE),
        ];
        for (field, label, value, range) in checks {
            self.check_f64(field, label, value, &range, "");
        }

        if !ratios.sums_to_one() {
            self.push(
                "ratio_sum",
                format!(
                    "Ratios must sum to 1.0 within {RATIO_SUM_TOLERANCE} (current: {:.2})",
                    ratios.sum()
                ),
            );
        }
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations: self.0 })
        }
    }
}

/// Rejects ratios outside their per-macro bounds or whose sum is off
/// tolerance.
pub fn validate_ratios(ratios: &MacroRatios) -> Result<(), ValidationError> {
    let mut v = Violations::default();
    v.check_ratios(ratios);
    v.finish()
}

/// Checks every field of a draft; all violations are reported together.
pub fn validate_plan(draft: &MealPlanDraft) -> Result<(), ValidationError> {
    let mut v = Violations::default();

    let name = draft.name.trim();
    if name.is_empty() {
        v.push("name", "Name is required".into());
    } else if name.chars().count() > NAME_MAX_CHARS {
        v.push("name", format!("Name must be at most {NAME_MAX_CHARS} characters"));
    }

    if !AGE_RANGE.contains(&draft.age) {
        v.push(
            "age",
            format!(
                "Age must be between {} and {} years",
                AGE_RANGE.start(),
                AGE_RANGE.end()
            ),
        );
    }
    v.check_f64("weight_kg", "Weight", draft.weight_kg, &WEIGHT_KG_RANGE, " kg");
    v.check_f64("height_cm", "Height", draft.height_cm, &HEIGHT_CM_RANGE, " cm");

    if ActivityLevel::from_multiplier(draft.activity_multiplier).is_none() {
        v.push(
            "activity_multiplier",
            "Activity multiplier must be one of 1.2, 1.375, 1.55, 1.725, 1.9".into(),
        );
    }

    v.check_ratios(&draft.ratios);
    v.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::calculator::Goal;

    fn draft() -> MealPlanDraft {
        MealPlanDraft {
            name: "Cut".into(),
            goal: Goal::WeightLoss,
            activity_multiplier: 1.375,
            age: 30,
            weight_kg: 80.0,
            height_cm: 180.0,
            ratios: MacroRatios::default(),
        }
    }

    #[test]
    fn accepts_valid_draft() {
        assert!(validate_plan(&draft()).is_ok());
    }

    #[test]
    fn accepts_bounds_inclusive() {
        let mut d = draft();
        d.age = 100;
        d.weight_kg = 30.0;
        d.height_cm = 250.0;
        assert!(validate_plan(&d).is_ok());
    }

    #[test]
    fn rejects_young_age_by_name() {
        let mut d = draft();
        d.age = 5;
        let err = validate_plan(&d).unwrap_err();
        assert_eq!(err.fields(), vec!["age"]);
        assert!(err.to_string().contains("Age must be between 10 and 100 years"));
    }

    #[test]
    fn rejects_ratio_sum_even_though_calculator_would_normalize() {
        let mut d = draft();
        d.ratios = MacroRatios::new(0.5, 0.5, 0.5);
        let err = validate_plan(&d).unwrap_err();
        assert!(err.has_field("ratio_sum"));
        assert!(err.to_string().contains("current: 1.50"));
    }

    #[test]
    fn reports_every_violation() {
        let d = MealPlanDraft {
            name: "  ".into(),
            goal: Goal::Maintenance,
            activity_multiplier: 1.5,
            age: 101,
            weight_kg: 20.0,
            height_cm: 260.0,
            ratios: MacroRatios::new(0.05, 0.8, 0.6),
        };
        let err = validate_plan(&d).unwrap_err();
        for field in [
            "name",
            "age",
            "weight_kg",
            "height_cm",
            "activity_multiplier",
            "protein_ratio",
            "carbs_ratio",
            "fat_ratio",
            "ratio_sum",
        ] {
            assert!(err.has_field(field), "missing {field}");
        }
    }

    #[test]
    fn nan_is_out_of_range() {
        let mut d = draft();
        d.weight_kg = f64::NAN;
        assert!(validate_plan(&d).unwrap_err().has_field("weight_kg"));
    }

    #[test]
    fn validate_ratios_alone() {
        assert!(validate_ratios(&MacroRatios::new(0.35, 0.35, 0.30)).is_ok());
        assert!(validate_ratios(&MacroRatios::new(0.3, 0.4, 0.305)).is_ok());
        let err = validate_ratios(&MacroRatios::new(0.3, 0.4, 0.32)).unwrap_err();
        assert_eq!(err.fields(), vec!["ratio_sum"]);
    }

    #[test]
    fn ratio_sum_tolerance_is_inclusive() {
        assert!(validate_ratios(&MacroRatios::new(0.33, 0.33, 0.33)).is_ok());
        assert!(validate_ratios(&MacroRatios::new(0.3, 0.4, 0.31)).is_ok());
        assert!(validate_ratios(&MacroRatios::new(0.3, 0.4, 0.29)).is_ok());
        let err = validate_ratios(&MacroRatios::new(0.3, 0.4, 0.312)).unwrap_err();
        assert_eq!(err.fields(), vec!["ratio_sum"]);
    }
}
