//! Direct keyword matching against category text.
//!
//! A static substring-rule table yields high-confidence interests without
//! going through embedding similarity at all. Scraped category labels lean
//! heavily on a small lexical core ("Taco Truck", "Sushi Bar", "BBQ & Grill"),
//! so literal fragments catch most of them.
//!
//! Processing order:
//! 1. exclusion patterns short-circuit to no matches
//! 2. exact "Pizza" takes a fixed fast path
//! 3. the fragment table is scanned, first-seen order, de-duplicated
//! 4. canonical interest names appearing verbatim in the text are unioned in

use once_cell::sync::Lazy;

use crate::engine::interests::canonical_interests;

/// Lowercased taxonomy names for the verbatim scan, paired with their
/// canonical spelling. Computed once.
static LOWERCASE_INTERESTS: Lazy<Vec<(String, &'static str)>> = Lazy::new(|| {
    canonical_interests()
        .iter()
        .map(|interest| (interest.to_lowercase(), *interest))
        .collect()
});

/// Category fragments that mark a label as opening-hours noise rather than a
/// cuisine. Excluded labels match nothing, ever.
const EXCLUSION_FRAGMENTS: [&str; 3] = ["24 hour", "24hours", "24/7"];

/// Exact-match exclusion, kept separate from the fragments: the scraper emits
/// this one verbatim.
const EXCLUSION_EXACT: &str = "24 hours food";

/// Lexical fragment -> canonical interests. Scanned in order; a category can
/// hit any number of rules.
const KEYWORD_RULES: [(&str, &[&str]); 67] = [
    ("taco", &["Tacos", "Mexican"]),
    ("burrito", &["Mexican"]),
    ("quesadilla", &["Mexican"]),
    ("tex-mex", &["Mexican"]),
    ("sushi", &["Sushi", "Japanese"]),
    ("sashimi", &["Sushi", "Japanese"]),
    ("ramen", &["Japanese"]),
    ("izakaya", &["Japanese"]),
    ("burger", &["Burgers", "American"]),
    ("hot dog", &["American", "Fast Food"]),
    ("wings", &["American"]),
    ("steak", &["American"]),
    ("diner", &["American", "Breakfast/Brunch"]),
    ("deli", &["American"]),
    ("sandwich", &["American"]),
    ("bbq", &["BBQ"]),
    ("barbecue", &["BBQ"]),
    ("barbeque", &["BBQ"]),
    ("smokehouse", &["BBQ"]),
    ("brisket", &["BBQ"]),
    ("dim sum", &["Chinese"]),
    ("dumpling", &["Chinese"]),
    ("szechuan", &["Chinese"]),
    ("cantonese", &["Chinese"]),
    ("noodle", &["Chinese"]),
    ("curry", &["Indian", "Thai"]),
    ("tandoor", &["Indian"]),
    ("biryani", &["Indian"]),
    ("pasta", &["Italian"]),
    ("trattoria", &["Italian"]),
    ("pizzeria", &["Pizza", "Italian"]),
    ("gyro", &["Mediterranean"]),
    ("falafel", &["Mediterranean"]),
    ("kebab", &["Mediterranean"]),
    ("shawarma", &["Mediterranean"]),
    ("hummus", &["Mediterranean"]),
    ("kimchi", &["Korean"]),
    ("pho", &["Vietnamese"]),
    ("banh mi", &["Vietnamese"]),
    ("oyster", &["Seafood"]),
    ("lobster", &["Seafood"]),
    ("crab", &["Seafood"]),
    ("shrimp", &["Seafood"]),
    ("fish", &["Seafood"]),
    ("poke", &["Seafood", "Healthy"]),
    ("vegan", &["Vegan/Vegetarian"]),
    ("vegetarian", &["Vegan/Vegetarian"]),
    ("plant based", &["Vegan/Vegetarian", "Healthy"]),
    ("breakfast", &["Breakfast/Brunch"]),
    ("brunch", &["Breakfast/Brunch"]),
    ("pancake", &["Breakfast/Brunch"]),
    ("waffle", &["Breakfast/Brunch"]),
    ("dessert", &["Desserts"]),
    ("ice cream", &["Desserts"]),
    ("gelato", &["Desserts"]),
    ("donut", &["Desserts", "Bakery"]),
    ("doughnut", &["Desserts", "Bakery"]),
    ("pastry", &["Bakery"]),
    ("bagel", &["Bakery", "Breakfast/Brunch"]),
    ("coffee", &["Coffee/Tea"]),
    ("espresso", &["Coffee/Tea"]),
    ("cafe", &["Coffee/Tea"]),
    ("boba", &["Coffee/Tea"]),
    ("bubble tea", &["Coffee/Tea"]),
    ("salad", &["Healthy"]),
    ("juice", &["Healthy"]),
    ("smoothie", &["Healthy"]),
];

// Single-word cuisine names ("Thai", "Korean", "Bakery", "Healthy", ...)
// need no table entry: they hit via the verbatim taxonomy scan below.
// Compound names ("Coffee/Tea", "Breakfast/Brunch") never appear verbatim in
// scraped labels, which is what their fragment entries above are for.

/// Whether a category label is opening-hours noise.
pub fn is_excluded(category: &str) -> bool {
    let lower = category.trim().to_lowercase();
    if lower == EXCLUSION_EXACT {
        return true;
    }
    EXCLUSION_FRAGMENTS
        .iter()
        .any(|fragment| lower.contains(fragment))
}

/// Direct keyword matches for a category label.
///
/// Returns canonical interests in first-seen order, de-duplicated. Excluded
/// labels return an empty list.
pub fn direct_matches(category: &str) -> Vec<&'static str> {
    let trimmed = category.trim();
    if is_excluded(trimmed) {
        return vec![];
    }

    // The bare "Pizza" label dominates the scraped corpus; it gets a fixed
    // answer instead of a table scan.
    if trimmed == "Pizza" {
        return vec!["Pizza", "American"];
    }

    let lower = trimmed.to_lowercase();
    let mut matches: Vec<&'static str> = Vec::new();

    for (fragment, interests) in KEYWORD_RULES {
        if lower.contains(fragment) {
            for interest in interests {
                if !matches.contains(interest) {
                    matches.push(*interest);
                }
            }
        }
    }

    // Canonical names used verbatim ("Thai Kitchen", "Korean BBQ") match
    // without needing a table entry.
    for (lowercase, interest) in LOWERCASE_INTERESTS.iter() {
        if lower.contains(lowercase.as_str()) && !matches.contains(interest) {
            matches.push(*interest);
        }
    }

    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_match() {
        assert_eq!(direct_matches("Taco Truck"), vec!["Tacos", "Mexican"]);
    }

    #[test]
    fn test_multiple_rules_union() {
        let matches = direct_matches("Sushi & Ramen House");
        assert_eq!(matches, vec!["Sushi", "Japanese"]);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(direct_matches("TACO STAND"), direct_matches("taco stand"));
        assert!(!direct_matches("BBQ Joint").is_empty());
    }

    #[test]
    fn test_pizza_exact_fast_path() {
        assert_eq!(direct_matches("Pizza"), vec!["Pizza", "American"]);
    }

    #[test]
    fn test_pizza_non_exact_goes_through_table() {
        // "Pizza Place" is not the exact label, so it resolves via the
        // verbatim taxonomy scan instead of the fast path.
        let matches = direct_matches("Pizza Place");
        assert!(matches.contains(&"Pizza"));
        assert!(!matches.contains(&"American"));
    }

    #[test]
    fn test_taxonomy_name_scan() {
        assert_eq!(direct_matches("Thai Kitchen"), vec!["Thai"]);
        let matches = direct_matches("Korean BBQ");
        assert!(matches.contains(&"Korean"));
        assert!(matches.contains(&"BBQ"));
    }

    #[test]
    fn test_deduplicated() {
        // "sushi" rule targets Sushi and Japanese; the taxonomy scan would
        // find "Sushi" again.
        let matches = direct_matches("Sushi Sushi Bar");
        let unique: std::collections::HashSet<_> = matches.iter().collect();
        assert_eq!(unique.len(), matches.len());
    }

    #[test]
    fn test_exclusions() {
        assert!(is_excluded("24 Hours Food"));
        assert!(is_excluded("open 24/7"));
        assert!(is_excluded("24hours diner"));
        assert!(is_excluded("24 hour breakfast"));
        assert!(!is_excluded("Breakfast"));

        assert_eq!(direct_matches("24 Hours Food"), Vec::<&str>::new());
        assert_eq!(direct_matches("Tacos 24/7"), Vec::<&str>::new());
    }

    #[test]
    fn test_no_match() {
        assert!(direct_matches("Fine Dining").is_empty());
        assert!(direct_matches("").is_empty());
    }

    #[test]
    fn test_all_rule_targets_are_canonical() {
        let taxonomy = canonical_interests();
        for (fragment, interests) in KEYWORD_RULES {
            for interest in interests {
                assert!(
                    taxonomy.contains(interest),
                    "rule {fragment:?} targets unknown interest {interest:?}"
                );
            }
        }
    }
}
