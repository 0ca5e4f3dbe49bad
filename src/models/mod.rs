mod alcohol;
mod collection;
mod exercise;
mod meal_type;
mod nutrition;
mod pending;
mod sleep;
mod spending;

pub use alcohol::{find_drink, AlcoholLog, Drink, DRINK_CATALOG};
pub use collection::Collection;
pub use exercise::{resolve_exercise_type, ExerciseLog, EXERCISE_TYPES};
pub use meal_type::MealType;
pub use nutrition::NutritionLog;
pub use pending::{PendingChange, SyncAction};
pub use sleep::SleepLog;
pub use spending::{resolve_category, SpendingLog, SPENDING_CATEGORIES};

use serde::Serialize;

/// A record belonging to one of the tracked collections.
///
/// The sync layer treats records as opaque JSON keyed by `id`; this trait is
/// what lets the typed mutation path hand records to the generic store.
pub trait Record: Serialize {
    const COLLECTION: Collection;

    /// Stable merge key, unique within the collection.
    fn id(&self) -> &str;
}
