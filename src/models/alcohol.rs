use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::{Collection, Record};

/// A catalog drink with its standard-drink conversion factors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Drink {
    pub name: &'static str,
    pub category: &'static str,
    pub alcohol_percentage: f64,
    pub standard_serving_ml: u32,
    pub standard_drinks_per_serving: f64,
}

impl Drink {
    /// Catalog id: lowercased name with spaces as underscores, parentheses
    /// stripped.
    pub fn catalog_id(&self) -> String {
        self.name
            .to_lowercase()
            .replace(' ', "_")
            .replace(['(', ')'], "")
    }
}

/// Built-in drink catalog used to convert servings into standard drinks.
pub const DRINK_CATALOG: &[Drink] = &[
    Drink { name: "Heineken", category: "Beer", alcohol_percentage: 5.0, standard_serving_ml: 355, standard_drinks_per_serving: 1.0 },
    Drink { name: "Corona Extra", category: "Beer", alcohol_percentage: 4.6, standard_serving_ml: 355, standard_drinks_per_serving: 0.9 },
    Drink { name: "Guinness", category: "Beer", alcohol_percentage: 4.2, standard_serving_ml: 355, standard_drinks_per_serving: 0.8 },
    Drink { name: "IPA (Craft)", category: "Beer", alcohol_percentage: 6.5, standard_serving_ml: 355, standard_drinks_per_serving: 1.3 },
    Drink { name: "Lager", category: "Beer", alcohol_percentage: 5.0, standard_serving_ml: 355, standard_drinks_per_serving: 1.0 },
    Drink { name: "Stout", category: "Beer", alcohol_percentage: 5.0, standard_serving_ml: 355, standard_drinks_per_serving: 1.0 },
    Drink { name: "Cabernet Sauvignon", category: "Wine", alcohol_percentage: 13.5, standard_serving_ml: 150, standard_drinks_per_serving: 1.1 },
    Drink { name: "Pinot Noir", category: "Wine", alcohol_percentage: 12.5, standard_serving_ml: 150, standard_drinks_per_serving: 1.0 },
    Drink { name: "Chardonnay", category: "Wine", alcohol_percentage: 13.0, standard_serving_ml: 150, standard_drinks_per_serving: 1.1 },
    Drink { name: "Riesling", category: "Wine", alcohol_percentage: 11.0, standard_serving_ml: 150, standard_drinks_per_serving: 0.9 },
    Drink { name: "Prosecco", category: "Wine", alcohol_percentage: 11.0, standard_serving_ml: 150, standard_drinks_per_serving: 0.9 },
    Drink { name: "Champagne", category: "Wine", alcohol_percentage: 12.0, standard_serving_ml: 150, standard_drinks_per_serving: 1.0 },
    Drink { name: "Vodka", category: "Spirit", alcohol_percentage: 40.0, standard_serving_ml: 44, standard_drinks_per_serving: 1.0 },
    Drink { name: "Gin", category: "Spirit", alcohol_percentage: 40.0, standard_serving_ml: 44, standard_drinks_per_serving: 1.0 },
    Drink { name: "Whiskey (Bourbon)", category: "Spirit", alcohol_percentage: 40.0, standard_serving_ml: 44, standard_drinks_per_serving: 1.0 },
    Drink { name: "Whiskey (Scotch)", category: "Spirit", alcohol_percentage: 40.0, standard_serving_ml: 44, standard_drinks_per_serving: 1.0 },
    Drink { name: "Tequila (Blanco)", category: "Spirit", alcohol_percentage: 40.0, standard_serving_ml: 44, standard_drinks_per_serving: 1.0 },
    Drink { name: "Sake", category: "Spirit", alcohol_percentage: 15.0, standard_serving_ml: 60, standard_drinks_per_serving: 0.5 },
    Drink { name: "Bailey's", category: "Liqueur", alcohol_percentage: 17.0, standard_serving_ml: 44, standard_drinks_per_serving: 0.4 },
    Drink { name: "Amaretto", category: "Liqueur", alcohol_percentage: 24.0, standard_serving_ml: 44, standard_drinks_per_serving: 0.6 },
    Drink { name: "Margarita", category: "Cocktail", alcohol_percentage: 13.0, standard_serving_ml: 240, standard_drinks_per_serving: 1.7 },
    Drink { name: "Old Fashioned", category: "Cocktail", alcohol_percentage: 32.0, standard_serving_ml: 90, standard_drinks_per_serving: 1.6 },
    Drink { name: "Negroni", category: "Cocktail", alcohol_percentage: 24.0, standard_serving_ml: 90, standard_drinks_per_serving: 1.2 },
    Drink { name: "Gin & Tonic", category: "Cocktail", alcohol_percentage: 13.0, standard_serving_ml: 200, standard_drinks_per_serving: 1.4 },
    Drink { name: "Apple Cider", category: "Cider", alcohol_percentage: 5.0, standard_serving_ml: 355, standard_drinks_per_serving: 1.0 },
    Drink { name: "Hard Seltzer", category: "Seltzer", alcohol_percentage: 5.0, standard_serving_ml: 355, standard_drinks_per_serving: 1.0 },
];

/// Look up a catalog drink by id or (case-insensitive) name.
pub fn find_drink(reference: &str) -> Option<&'static Drink> {
    DRINK_CATALOG
        .iter()
        .find(|d| d.catalog_id() == reference || d.name.eq_ignore_ascii_case(reference))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlcoholLog {
    pub id: String,
    pub drink_id: String,
    pub drink_name: String,
    pub servings: f64,
    pub standard_drinks: f64,
    pub logged_at: DateTime<Utc>,
    pub date: NaiveDate,
}

impl AlcoholLog {
    pub fn new(drink: &Drink, servings: f64, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            drink_id: drink.catalog_id(),
            drink_name: drink.name.to_string(),
            servings,
            standard_drinks: round2(servings * drink.standard_drinks_per_serving),
            logged_at: Utc::now(),
            date,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl Record for AlcoholLog {
    const COLLECTION: Collection = Collection::AlcoholLogs;

    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for AlcoholLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}x {} ({} std drinks)",
            self.date, self.servings, self.drink_name, self.standard_drinks
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_id_slugs() {
        let ipa = find_drink("ipa_craft").unwrap();
        assert_eq!(ipa.name, "IPA (Craft)");

        let gt = find_drink("Gin & Tonic").unwrap();
        assert_eq!(gt.catalog_id(), "gin_&_tonic");
    }

    #[test]
    fn test_find_drink_by_name_case_insensitive() {
        assert!(find_drink("guinness").is_some());
        assert!(find_drink("GUINNESS").is_some());
        assert!(find_drink("nonexistent brew").is_none());
    }

    #[test]
    fn test_standard_drinks_from_servings() {
        let drink = find_drink("margarita").unwrap();
        let log = AlcoholLog::new(drink, 2.0, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(log.standard_drinks, 3.4);
        assert_eq!(log.drink_name, "Margarita");
    }

    #[test]
    fn test_alcohol_log_json_round_trip() {
        let drink = find_drink("vodka").unwrap();
        let log = AlcoholLog::new(drink, 1.5, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());

        let json = serde_json::to_string(&log).unwrap();
        let parsed: AlcoholLog = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.id, log.id);
        assert_eq!(parsed.standard_drinks, 1.5);
        assert_eq!(parsed.date, log.date);
    }
}
