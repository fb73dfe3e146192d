use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::nutrition::calculator::Sex;
use crate::nutrition::validation::{ValidationError, Violations, HEIGHT_CM_RANGE, WEIGHT_KG_RANGE};

pub const PHONE_MAX_CHARS: usize = 20;
pub const FITNESS_GOAL_MAX_CHARS: usize = 100;

#[derive(Debug, FromRow)]
struct ProfileRow {
    sex: Option<String>, // M / F / O, blank or NULL when unknown
    phone: String,
    address: String,
    height_cm: Option<f64>,
    weight_kg: Option<f64>,
    fitness_goal: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub sex: Option<Sex>,
    pub phone: String,
    pub address: String,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub fitness_goal: String,
}

impl From<ProfileRow> for Profile {
    fn from(r: ProfileRow) -> Self {
        Self {
            sex: r.sex.as_deref().and_then(Sex::from_code),
            phone: r.phone,
            address: r.address,
            height_cm: r.height_cm,
            weight_kg: r.weight_kg,
            fitness_goal: r.fitness_goal,
        }
    }
}

impl Profile {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Violations::default();
        if self.phone.chars().count() > PHONE_MAX_CHARS {
            v.push("phone", format!("Phone must be at most {PHONE_MAX_CHARS} characters"));
        }
        if self.fitness_goal.chars().count() > FITNESS_GOAL_MAX_CHARS {
            v.push(
                "fitness_goal",
                format!("Fitness goal must be at most {FITNESS_GOAL_MAX_CHARS} characters"),
            );
        }
        if let Some(h) = self.height_cm {
            v.check_f64("height_cm", "Height", h, &HEIGHT_CM_RANGE, " cm");
        }
        if let Some(w) = self.weight_kg {
            v.check_f64("weight_kg", "Weight", w, &WEIGHT_KG_RANGE, " kg");
        }
        v.finish()
    }
}

pub async fn find(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
    let row = sqlx::query_as::<_, ProfileRow>(
        r#"
        SELECT sex, phone, address, height_cm, weight_kg, fitness_goal
        FROM user_profiles
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(row.map(Profile::from))
}

/// Sex recorded on the user's profile, if any.
pub async fn find_sex(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<Sex>> {
    Ok(find(db, user_id).await?.and_then(|p| p.sex))
}

pub async fn upsert(db: &PgPool, user_id: Uuid, profile: &Profile) -> anyhow::Result<Profile> {
    let row = sqlx::query_as::<_, ProfileRow>(
        r#"
        INSERT INTO user_profiles
            (user_id, sex, phone, address, height_cm, weight_kg, fitness_goal)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (user_id) DO UPDATE
        SET sex = EXCLUDED.sex,
            phone = EXCLUDED.phone,
            address = EXCLUDED.address,
            height_cm = EXCLUDED.height_cm,
            weight_kg = EXCLUDED.weight_kg,
            fitness_goal = EXCLUDED.fitness_goal,
            updated_at = now()
        RETURNING sex, phone, address, height_cm, weight_kg, fitness_goal
        "#,
    )
    .bind(user_id)
    .bind(profile.sex.map(Sex::code))
    .bind(&profile.phone)
    .bind(&profile.address)
    .bind(profile.height_cm)
    .bind(profile.weight_kg)
    .bind(&profile.fitness_goal)
    .fetch_one(db)
    .await?;
    Ok(Profile::from(row))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_or_unknown_sex_reads_as_none() {
        let row = |sex: Option<&str>| ProfileRow {
            sex: sex.map(str::to_string),
            phone: String::new(),
            address: String::new(),
            height_cm: None,
            weight_kg: None,
            fitness_goal: String::new(),
        };
        assert_eq!(Profile::from(row(Some("F"))).sex, Some(Sex::Female));
        assert_eq!(Profile::from(row(Some(""))).sex, None);
        assert_eq!(Profile::from(row(None)).sex, None);
    }

    #[test]
    fn validate_checks_lengths_and_ranges() {
        assert!(Profile::default().validate().is_ok());
        let p = Profile {
            phone: "0".repeat(21),
            height_cm: Some(90.0),
            ..Default::default()
        };
        let err = p.validate().unwrap_err();
        assert_eq!(err.fields(), vec!["phone", "height_cm"]);
    }
}
