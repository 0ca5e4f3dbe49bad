use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The five tracked-entity collections held in the local record store.
///
/// The wire names double as table keys and as the JSON keys of the sync
/// push/pull bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    AlcoholLogs,
    SleepLogs,
    NutritionLogs,
    SpendingLogs,
    ExerciseLogs,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::AlcoholLogs,
        Collection::SleepLogs,
        Collection::NutritionLogs,
        Collection::SpendingLogs,
        Collection::ExerciseLogs,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Collection::AlcoholLogs => "alcohol_logs",
            Collection::SleepLogs => "sleep_logs",
            Collection::NutritionLogs => "nutrition_logs",
            Collection::SpendingLogs => "spending_logs",
            Collection::ExerciseLogs => "exercise_logs",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alcohol_logs" => Ok(Collection::AlcoholLogs),
            "sleep_logs" => Ok(Collection::SleepLogs),
            "nutrition_logs" => Ok(Collection::NutritionLogs),
            "spending_logs" => Ok(Collection::SpendingLogs),
            "exercise_logs" => Ok(Collection::ExerciseLogs),
            _ => Err(format!("Unknown collection '{}'", s)),
        }
    }
}
