//! The canonical food interest taxonomy.
//!
//! A fixed, ordered list of 23 labels that categories are mapped onto.
//! The order only matters for deterministic iteration; ranking is driven by
//! similarity scores. Immutable for the lifetime of the process.

pub const CANONICAL_INTERESTS: [&str; 23] = [
    "Pizza",
    "Sushi",
    "Burgers",
    "Tacos",
    "Mexican",
    "Chinese",
    "Japanese",
    "Thai",
    "Indian",
    "Italian",
    "American",
    "Mediterranean",
    "Korean",
    "Vietnamese",
    "Seafood",
    "BBQ",
    "Vegan/Vegetarian",
    "Breakfast/Brunch",
    "Desserts",
    "Coffee/Tea",
    "Bakery",
    "Fast Food",
    "Healthy",
];

/// The canonical interest taxonomy, in its fixed iteration order.
pub fn canonical_interests() -> &'static [&'static str] {
    &CANONICAL_INTERESTS
}
