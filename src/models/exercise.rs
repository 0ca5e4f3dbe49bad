use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::{Collection, Record};

/// Fixed exercise types offered by the tracker.
pub const EXERCISE_TYPES: &[&str] = &[
    "Running",
    "Walking",
    "Cycling",
    "Swimming",
    "Gym/Weights",
    "Yoga",
    "HIIT",
    "Sports",
    "Dancing",
    "Other",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseLog {
    pub id: String,
    pub exercise_type: String,
    pub duration_minutes: i64,
    pub notes: Option<String>,
    pub logged_at: DateTime<Utc>,
    pub date: NaiveDate,
}

impl ExerciseLog {
    pub fn new(exercise_type: impl Into<String>, duration_minutes: i64, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            exercise_type: exercise_type.into(),
            duration_minutes,
            notes: None,
            logged_at: Utc::now(),
            date,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Case-insensitive exercise-type validation; returns the canonical spelling.
pub fn resolve_exercise_type(input: &str) -> Option<&'static str> {
    EXERCISE_TYPES
        .iter()
        .find(|t| t.eq_ignore_ascii_case(input))
        .copied()
}

impl Record for ExerciseLog {
    const COLLECTION: Collection = Collection::ExerciseLogs;

    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for ExerciseLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} for {} min",
            self.date, self.exercise_type, self.duration_minutes
        )?;
        if let Some(notes) = &self.notes {
            write!(f, " ({})", notes)?;
        }
        Ok(())
    }
}
