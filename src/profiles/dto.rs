use serde::{Deserialize, Serialize};

use crate::nutrition::calculator::Sex;

use super::repo::Profile;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub sex: Option<Sex>,
    pub phone: String,
    pub address: String,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub fitness_goal: String,
}

impl From<Profile> for ProfileResponse {
    fn from(p: Profile) -> Self {
        Self {
            sex: p.sex,
            phone: p.phone,
            address: p.address,
            height_cm: p.height_cm,
            weight_kg: p.weight_kg,
            fitness_goal: p.fitness_goal,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PutProfileRequest {
    pub sex: Option<Sex>,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub fitness_goal: String,
}
