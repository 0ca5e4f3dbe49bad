use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::{Collection, Record};

/// Fixed spending categories offered by the tracker.
pub const SPENDING_CATEGORIES: &[&str] = &[
    "Food",
    "Transport",
    "Entertainment",
    "Shopping",
    "Bills",
    "Health",
    "Other",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendingLog {
    pub id: String,
    pub amount: f64,
    pub category: String,
    pub notes: String,
    pub logged_at: DateTime<Utc>,
    pub date: NaiveDate,
}

impl SpendingLog {
    pub fn new(amount: f64, category: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            amount,
            category: category.into(),
            notes: String::new(),
            logged_at: Utc::now(),
            date,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

/// Case-insensitive category validation against the fixed list; returns the
/// canonical spelling.
pub fn resolve_category(input: &str) -> Option<&'static str> {
    SPENDING_CATEGORIES
        .iter()
        .find(|c| c.eq_ignore_ascii_case(input))
        .copied()
}

impl Record for SpendingLog {
    const COLLECTION: Collection = Collection::SpendingLogs;

    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for SpendingLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.2} on {}", self.date, self.amount, self.category)?;
        if !self.notes.is_empty() {
            write!(f, " ({})", self.notes)?;
        }
        Ok(())
    }
}
