//! CO₂ savings estimate attached to every listing.

use crate::routes::models::{Category, Condition};

/// kg CO₂ saved by reusing an average garment instead of buying it new.
const BASE_IMPACT_KG: f64 = 5.0;

fn category_factor(category: Category) -> f64 {
    match category {
        Category::Synthetic => 1.5,
        Category::Cotton => 0.8,
        Category::Mixed => 1.0,
    }
}

fn condition_factor(condition: Condition) -> f64 {
    match condition {
        Condition::New => 1.2,
        Condition::LikeNew => 1.0,
        Condition::Good => 0.8,
        Condition::Fair => 0.6,
    }
}

pub fn eco_impact(category: Category, condition: Condition) -> f64 {
    BASE_IMPACT_KG * category_factor(category) * condition_factor(condition)
}
