//! Energy and macronutrient arithmetic.
//!
//! Every function here is pure: no I/O, no shared state, no failure path for
//! finite numeric input. Range checking belongs to [`super::validation`];
//! the calculator tolerates anything it is handed, including macro ratios
//! that do not quite sum to one (those are normalized, not rejected).
//!
//! BMR follows the Mifflin-St Jeor equation:
//! `10 * weight_kg + 6.25 * height_cm - 5 * age + s`, with `s = +5` for men
//! and `s = -161` for women.

use serde::{Deserialize, Serialize};

/// Energy density of protein and carbohydrate (kcal per gram).
pub const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;
pub const KCAL_PER_GRAM_CARBS: f64 = 4.0;
/// Energy density of fat (kcal per gram).
pub const KCAL_PER_GRAM_FAT: f64 = 9.0;

/// Allowed distance of a ratio sum from 1.0 before it counts as "off".
pub const RATIO_SUM_TOLERANCE: f64 = 0.01;
/// Absorbs float error so sums sitting exactly on the tolerance are accepted.
const RATIO_SUM_SLACK: f64 = 1e-9;

/// Daily deficit applied for weight loss (kcal).
pub const WEIGHT_LOSS_DEFICIT: f64 = 500.0;
/// Daily surplus applied for muscle gain (kcal).
pub const MUSCLE_GAIN_SURPLUS: f64 = 300.0;

/// Sex as recorded on a user profile.
///
/// Only `Female` selects the female constant; `Male` and `Other` both use the
/// male one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    #[default]
    #[serde(alias = "M", alias = "Male")]
    Male,
    #[serde(alias = "F", alias = "Female")]
    Female,
    #[serde(alias = "O", alias = "Other")]
    Other,
}

impl Sex {
    pub fn code(self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
            Sex::Other => "O",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "M" => Some(Sex::Male),
            "F" => Some(Sex::Female),
            "O" => Some(Sex::Other),
            _ => None,
        }
    }
}

/// Fitness goal of a plan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    #[serde(alias = "WL")]
    WeightLoss,
    #[serde(alias = "MG")]
    MuscleGain,
    #[default]
    #[serde(alias = "MT")]
    Maintenance,
    #[serde(alias = "EN")]
    Endurance,
}

impl Goal {
    /// Two-letter code used in storage.
    pub fn code(self) -> &'static str {
        match self {
            Goal::WeightLoss => "WL",
            Goal::MuscleGain => "MG",
            Goal::Maintenance => "MT",
            Goal::Endurance => "EN",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "WL" => Some(Goal::WeightLoss),
            "MG" => Some(Goal::MuscleGain),
            "MT" => Some(Goal::Maintenance),
            "EN" => Some(Goal::Endurance),
            _ => None,
        }
    }
}

/// The five sanctioned activity multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// Exercise 1-3 days/week
    Light,
    /// Exercise 3-5 days/week
    Moderate,
    /// Exercise 6-7 days/week
    Active,
    /// Hard exercise daily
    VeryActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::Active,
        ActivityLevel::VeryActive,
    ];

    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }

    pub fn from_multiplier(value: f64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|level| (level.multiplier() - value).abs() < 1e-9)
    }
}

/// Fractions of total calories given to each macronutrient.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MacroRatios {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl Default for MacroRatios {
    fn default() -> Self {
        Self {
            protein: 0.3,
            carbs: 0.4,
            fat: 0.3,
        }
    }
}

impl MacroRatios {
    pub fn new(protein: f64, carbs: f64, fat: f64) -> Self {
        Self { protein, carbs, fat }
    }

    /// Ratios used by the stateless preview, chosen from the goal alone.
    /// Maintenance and endurance share the balanced split.
    pub fn for_goal(goal: Goal) -> Self {
        match goal {
            Goal::WeightLoss => Self::new(0.35, 0.35, 0.30),
            Goal::MuscleGain => Self::new(0.40, 0.40, 0.20),
            Goal::Maintenance | Goal::Endurance => Self::new(0.30, 0.40, 0.30),
        }
    }

    pub fn sum(&self) -> f64 {
        self.protein + self.carbs + self.fat
    }

    /// Inclusive: 0.33 + 0.33 + 0.33 is within tolerance.
    pub fn sums_to_one(&self) -> bool {
        (self.sum() - 1.0).abs() <= RATIO_SUM_TOLERANCE + RATIO_SUM_SLACK
    }
}

/// Rescales ratios whose sum is off by more than the tolerance so that they
/// sum to one. Ratios already within tolerance are returned untouched.
pub fn normalize_ratios(ratios: MacroRatios) -> MacroRatios {
    if ratios.sums_to_one() {
        return ratios;
    }
    let total = ratios.sum();
    if total <= 0.0 {
        return ratios;
    }
    MacroRatios {
        protein: ratios.protein / total,
        carbs: ratios.carbs / total,
        fat: ratios.fat / total,
    }
}

/// Grams and kcal per macronutrient for one day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MacroBreakdown {
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub protein_kcal: i64,
    pub carbs_kcal: i64,
    pub fat_kcal: i64,
}

/// Rounds to the nearest integer, ties to even.
pub fn round_kcal(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// Rounds to one decimal place, ties to even.
pub fn round_grams(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

pub fn compute_bmr(age: i32, weight_kg: f64, height_cm: f64, sex: Sex) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    match sex {
        Sex::Female => base - 161.0,
        Sex::Male | Sex::Other => base + 5.0,
    }
}

pub fn compute_tdee(bmr: f64, activity_multiplier: f64) -> f64 {
    bmr * activity_multiplier
}

/// Applies the goal's calorie adjustment. Endurance gets none.
pub fn compute_target_calories(tdee: f64, goal: Goal) -> f64 {
    match goal {
        Goal::WeightLoss => tdee - WEIGHT_LOSS_DEFICIT,
        Goal::MuscleGain => tdee + MUSCLE_GAIN_SURPLUS,
        Goal::Maintenance | Goal::Endurance => tdee,
    }
}

/// Splits `calories` by `ratios`. Ratios off by more than
/// [`RATIO_SUM_TOLERANCE`] are normalized first.
pub fn compute_macros(calories: f64, ratios: MacroRatios) -> MacroBreakdown {
    let ratios = normalize_ratios(ratios);

    let protein_kcal = calories * ratios.protein;
    let carbs_kcal = calories * ratios.carbs;
    let fat_kcal = calories * ratios.fat;

    MacroBreakdown {
        protein_g: round_grams(protein_kcal / KCAL_PER_GRAM_PROTEIN),
        carbs_g: round_grams(carbs_kcal / KCAL_PER_GRAM_CARBS),
        fat_g: round_grams(fat_kcal / KCAL_PER_GRAM_FAT),
        protein_kcal: round_kcal(protein_kcal),
        carbs_kcal: round_kcal(carbs_kcal),
        fat_kcal: round_kcal(fat_kcal),
    }
}

/// Unrounded BMR, TDEE and target calories for one biometric snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyEstimate {
    pub bmr: f64,
    pub tdee: f64,
    pub target_calories: f64,
}

pub fn estimate_energy(
    age: i32,
    weight_kg: f64,
    height_cm: f64,
    sex: Sex,
    activity_multiplier: f64,
    goal: Goal,
) -> EnergyEstimate {
    let bmr = compute_bmr(age, weight_kg, height_cm, sex);
    let tdee = compute_tdee(bmr, activity_multiplier);
    let target_calories = compute_target_calories(tdee, goal);
    EnergyEstimate {
        bmr,
        tdee,
        target_calories,
    }
}

/// Biometrics accepted by the stateless preview.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewInput {
    pub age: i32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub activity_multiplier: f64,
    pub goal: Goal,
    pub sex: Sex,
}

/// Result of a preview: rounded energy figures plus the goal's default split.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct MacroPreview {
    pub bmr: i64,
    pub tdee: i64,
    pub target_calories: i64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub protein_ratio: f64,
    pub carbs_ratio: f64,
    pub fat_ratio: f64,
}

/// Preview path: goal-dependent default ratios, nothing persisted.
pub fn preview(input: &PreviewInput) -> MacroPreview {
    let energy = estimate_energy(
        input.age,
        input.weight_kg,
        input.height_cm,
        input.sex,
        input.activity_multiplier,
        input.goal,
    );
    let ratios = MacroRatios::for_goal(input.goal);
    let macros = compute_macros(energy.target_calories, ratios);

    MacroPreview {
        bmr: round_kcal(energy.bmr),
        tdee: round_kcal(energy.tdee),
        target_calories: round_kcal(energy.target_calories),
        protein_g: macros.protein_g,
        carbs_g: macros.carbs_g,
        fat_g: macros.fat_g,
        protein_ratio: ratios.protein,
        carbs_ratio: ratios.carbs,
        fat_ratio: ratios.fat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn bmr_matches_mifflin_st_jeor() {
        assert!(approx(compute_bmr(25, 70.0, 175.0, Sex::Male), 1673.75));
        assert!(approx(compute_bmr(25, 70.0, 175.0, Sex::Female), 1507.75));
    }

    #[test]
    fn other_sex_uses_male_constant() {
        assert_eq!(
            compute_bmr(40, 82.5, 168.0, Sex::Other),
            compute_bmr(40, 82.5, 168.0, Sex::Male)
        );
    }

    #[test]
    fn bmr_is_monotonic_in_each_input() {
        for sex in [Sex::Male, Sex::Female, Sex::Other] {
            for step in 0..50 {
                let w = 30.0 + step as f64 * 5.0;
                assert!(compute_bmr(30, w + 1.0, 170.0, sex) > compute_bmr(30, w, 170.0, sex));
                let h = 100.0 + step as f64 * 3.0;
                assert!(compute_bmr(30, 70.0, h + 1.0, sex) > compute_bmr(30, 70.0, h, sex));
                let a = 10 + step;
                assert!(compute_bmr(a + 1, 70.0, 170.0, sex) < compute_bmr(a, 70.0, 170.0, sex));
            }
        }
    }

    #[test]
    fn tdee_is_plain_product() {
        for level in ActivityLevel::ALL {
            let m = level.multiplier();
            assert_eq!(compute_tdee(1673.75, m), 1673.75 * m);
        }
        assert_eq!(compute_tdee(1500.0, 2.3), 1500.0 * 2.3);
    }

    #[test]
    fn target_calories_by_goal() {
        let tdee = 2400.0;
        assert_eq!(compute_target_calories(tdee, Goal::WeightLoss), 1900.0);
        assert_eq!(compute_target_calories(tdee, Goal::MuscleGain), 2700.0);
        assert_eq!(compute_target_calories(tdee, Goal::Maintenance), tdee);
        assert_eq!(
            compute_target_calories(tdee, Goal::Endurance),
            compute_target_calories(tdee, Goal::Maintenance)
        );
    }

    #[test]
    fn macros_reconstruct_calories() {
        let cases = [
            (2000.0, MacroRatios::new(0.3, 0.4, 0.3)),
            (2894.3125, MacroRatios::new(0.4, 0.4, 0.2)),
            (1733.0, MacroRatios::new(0.35, 0.35, 0.30)),
            (3120.5, MacroRatios::new(0.25, 0.55, 0.20)),
        ];
        for (calories, ratios) in cases {
            let m = compute_macros(calories, ratios);
            let total = m.protein_kcal + m.carbs_kcal + m.fat_kcal;
            let target = round_kcal(calories);
            assert!((total - target).abs() <= 3, "{total} vs {target}");

            assert!((m.protein_g * KCAL_PER_GRAM_PROTEIN - m.protein_kcal as f64).abs() <= 1.0);
            assert!((m.carbs_g * KCAL_PER_GRAM_CARBS - m.carbs_kcal as f64).abs() <= 1.0);
            assert!((m.fat_g * KCAL_PER_GRAM_FAT - m.fat_kcal as f64).abs() <= 1.0);
        }
    }

    #[test]
    fn macros_are_deterministic() {
        let ratios = MacroRatios::new(0.33, 0.33, 0.34);
        assert_eq!(compute_macros(2222.2, ratios), compute_macros(2222.2, ratios));
    }

    #[test]
    fn off_tolerance_ratios_are_normalized() {
        let off = MacroRatios::new(0.31, 0.41, 0.30);
        let pre = MacroRatios::new(0.31 / 1.02, 0.41 / 1.02, 0.30 / 1.02);
        assert_eq!(compute_macros(1000.0, off), compute_macros(1000.0, pre));
    }

    #[test]
    fn in_tolerance_ratios_are_left_alone() {
        let r = MacroRatios::new(0.305, 0.4, 0.3);
        assert_eq!(normalize_ratios(r), r);
        let edge = MacroRatios::new(0.33, 0.33, 0.33);
        assert_eq!(normalize_ratios(edge), edge);
        let n = normalize_ratios(MacroRatios::new(0.5, 0.5, 0.5));
        assert!(approx(n.sum(), 1.0));
        assert!(approx(n.protein, 1.0 / 3.0));
    }

    #[test]
    fn rounding_is_half_to_even() {
        assert_eq!(round_kcal(2.5), 2);
        assert_eq!(round_kcal(3.5), 4);
        assert_eq!(round_kcal(578.8625), 579);
        assert_eq!(round_grams(64.31805), 64.3);
    }

    #[test]
    fn preview_end_to_end_muscle_gain() {
        let result = preview(&PreviewInput {
            age: 25,
            weight_kg: 70.0,
            height_cm: 175.0,
            activity_multiplier: ActivityLevel::Moderate.multiplier(),
            goal: Goal::MuscleGain,
            sex: Sex::Male,
        });
        assert_eq!(result.bmr, 1674);
        assert_eq!(result.tdee, 2594);
        assert_eq!(result.target_calories, 2894);
        assert_eq!(result.protein_g, 289.4);
        assert_eq!(result.carbs_g, 289.4);
        assert_eq!(result.fat_g, 64.3);
        assert_eq!(result.protein_ratio, 0.40);
        assert_eq!(result.fat_ratio, 0.20);

        let m = compute_macros(2894.3125, MacroRatios::for_goal(Goal::MuscleGain));
        assert_eq!((m.protein_kcal, m.carbs_kcal, m.fat_kcal), (1158, 1158, 579));
    }

    #[test]
    fn preview_defaults_depend_on_goal() {
        assert_eq!(MacroRatios::for_goal(Goal::WeightLoss), MacroRatios::new(0.35, 0.35, 0.30));
        assert_eq!(MacroRatios::for_goal(Goal::Endurance), MacroRatios::for_goal(Goal::Maintenance));
        assert_eq!(MacroRatios::default(), MacroRatios::new(0.3, 0.4, 0.3));
    }

    #[test]
    fn activity_levels_round_trip_through_multiplier() {
        for level in ActivityLevel::ALL {
            assert_eq!(ActivityLevel::from_multiplier(level.multiplier()), Some(level));
        }
        assert_eq!(ActivityLevel::from_multiplier(1.5), None);
    }

    #[test]
    fn codes_and_serde_aliases() {
        assert_eq!(Goal::from_code(Goal::Endurance.code()), Some(Goal::Endurance));
        assert_eq!(Goal::from_code("XX"), None);
        let g: Goal = serde_json::from_str("\"WL\"").unwrap();
        assert_eq!(g, Goal::WeightLoss);
        let g: Goal = serde_json::from_str("\"muscle_gain\"").unwrap();
        assert_eq!(g, Goal::MuscleGain);
        let s: Sex = serde_json::from_str("\"F\"").unwrap();
        assert_eq!(s, Sex::Female);
        assert_eq!(Sex::from_code("O"), Some(Sex::Other));
        assert_eq!(Sex::default(), Sex::Male);
    }
}
