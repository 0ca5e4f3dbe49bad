use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::{Collection, MealType, Record};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutritionLog {
    pub id: String,
    pub meal_description: String,
    pub calories: i64,
    pub protein: f64,
    pub is_healthy: bool,
    pub meal_type: MealType,
    pub logged_at: DateTime<Utc>,
    pub date: NaiveDate,
}

impl NutritionLog {
    pub fn new(meal_description: impl Into<String>, meal_type: MealType, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            meal_description: meal_description.into(),
            calories: 0,
            protein: 0.0,
            is_healthy: false,
            meal_type,
            logged_at: Utc::now(),
            date,
        }
    }

    pub fn with_nutrition(mut self, calories: i64, protein: f64, is_healthy: bool) -> Self {
        self.calories = calories;
        self.protein = protein;
        self.is_healthy = is_healthy;
        self
    }
}

impl Record for NutritionLog {
    const COLLECTION: Collection = Collection::NutritionLogs;

    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for NutritionLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} \"{}\" ({} kcal, {}g protein)",
            self.date, self.meal_type, self.meal_description, self.calories, self.protein
        )
    }
}
