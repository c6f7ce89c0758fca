//! Per-category score combination and ranking.
//!
//! Merges two evidence sources for one category: direct keyword matches and
//! threshold-filtered embedding similarity. Scores pass through an ordered
//! list of named adjustment rules before ranking, so cuisine-specific
//! corrections live in a table instead of the ranking loop.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::engine::keywords::{direct_matches, is_excluded};
use crate::engine::similarity::{cosine_similarity, SimilarityError};
use crate::engine::MAX_INTERESTS_PER_CATEGORY;

/// Score floor for direct keyword matches. Keeps a direct match ahead of
/// every threshold-only embedding match in the ranking, whatever its raw
/// embedding score was.
pub const DIRECT_MATCH_SCORE_FLOOR: f32 = 0.95;

/// Multiplier for interests that drift upward on generic category text.
const DRIFT_PENALTY: f32 = 0.85;

/// Minimum "Pizza" score for categories that mention pizza without being the
/// bare "Pizza" label.
const PIZZA_MENTION_FLOOR: f32 = 0.98;

/// The mapping produced for one category: its ranked interests and the full
/// post-adjustment score table over the whole taxonomy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryMapping {
    pub category: String,
    pub interests: Vec<String>,
    pub similarity_scores: BTreeMap<String, f32>,
}

impl CategoryMapping {
    /// The mapping emitted when per-category computation fails: no interests,
    /// no scores, batch continues.
    pub fn empty(category: &str) -> Self {
        Self {
            category: category.to_string(),
            interests: vec![],
            similarity_scores: BTreeMap::new(),
        }
    }
}

/// Inputs every adjustment rule can consult.
struct AdjustmentContext<'a> {
    category: &'a str,
    lowercase: String,
    direct: &'a [&'static str],
}

impl AdjustmentContext<'_> {
    fn is_direct(&self, interest: &str) -> bool {
        self.direct.contains(&interest)
    }

    fn mentions(&self, fragment: &str) -> bool {
        self.lowercase.contains(fragment)
    }
}

/// A named score transform for one interest. Returns the new score, or
/// `None` when the rule does not apply to this category.
struct ScoreAdjustment {
    name: &'static str,
    interest: &'static str,
    apply: fn(&AdjustmentContext, f32) -> Option<f32>,
}

/// Applied in order, before threshold filtering and ranking.
const SCORE_ADJUSTMENTS: [ScoreAdjustment; 4] = [
    ScoreAdjustment {
        name: "mediterranean-drift-penalty",
        interest: "Mediterranean",
        apply: mediterranean_drift_penalty,
    },
    ScoreAdjustment {
        name: "tacos-drift-penalty",
        interest: "Tacos",
        apply: tacos_drift_penalty,
    },
    ScoreAdjustment {
        name: "pizza-exact-pin",
        interest: "Pizza",
        apply: pizza_exact_pin,
    },
    ScoreAdjustment {
        name: "pizza-mention-floor",
        interest: "Pizza",
        apply: pizza_mention_floor,
    },
];

/// "Mediterranean" scores high against almost any savory label; damp it
/// unless the category actually points there.
fn mediterranean_drift_penalty(ctx: &AdjustmentContext, score: f32) -> Option<f32> {
    (!ctx.is_direct("Mediterranean") && !ctx.mentions("mediterranean") && !ctx.mentions("greek"))
        .then_some(score * DRIFT_PENALTY)
}

/// Same drift for "Tacos" on labels with no Mexican signal.
fn tacos_drift_penalty(ctx: &AdjustmentContext, score: f32) -> Option<f32> {
    (!ctx.is_direct("Tacos") && !ctx.mentions("taco") && !ctx.mentions("mexican"))
        .then_some(score * DRIFT_PENALTY)
}

/// The bare "Pizza" label is a perfect match by definition.
fn pizza_exact_pin(ctx: &AdjustmentContext, _score: f32) -> Option<f32> {
    (ctx.category == "Pizza").then_some(1.0)
}

/// Any other mention of pizza ("Pizzeria", "Pizza & Pasta") is close to
/// certain too.
fn pizza_mention_floor(ctx: &AdjustmentContext, score: f32) -> Option<f32> {
    (ctx.category != "Pizza" && (ctx.mentions("pizza") || ctx.mentions("pizz")))
        .then_some(score.max(PIZZA_MENTION_FLOOR))
}

/// Combine keyword and embedding evidence into a ranked mapping for one
/// category.
///
/// `taxonomy_embeddings` pairs every canonical interest with its embedding,
/// in taxonomy order.
pub fn combine_category(
    category: &str,
    category_embedding: &[f32],
    taxonomy_embeddings: &[(&'static str, Arc<Vec<f32>>)],
    threshold: f32,
) -> Result<CategoryMapping, SimilarityError> {
    let category = category.trim();
    let direct = direct_matches(category);
    let ctx = AdjustmentContext {
        category,
        lowercase: category.to_lowercase(),
        direct: &direct,
    };

    // Raw cosine against the whole taxonomy, then the adjustment table.
    let mut scores: Vec<(&'static str, f32)> = Vec::with_capacity(taxonomy_embeddings.len());
    for (interest, embedding) in taxonomy_embeddings {
        let mut score = cosine_similarity(category_embedding, embedding)?;
        for rule in &SCORE_ADJUSTMENTS {
            if rule.interest == *interest {
                if let Some(adjusted) = (rule.apply)(&ctx, score) {
                    log::trace!(
                        "category {category:?}: {} adjusted {interest} {score} -> {adjusted}",
                        rule.name
                    );
                    score = adjusted;
                }
            }
        }
        scores.push((interest, score));
    }

    // Opening-hours noise maps to nothing regardless of threshold. The score
    // table is still reported.
    if is_excluded(category) {
        return Ok(CategoryMapping {
            category: category.to_string(),
            interests: vec![],
            similarity_scores: to_score_table(&scores),
        });
    }

    let embedding_matches: Vec<&'static str> = scores
        .iter()
        .filter(|(_, score)| *score >= threshold)
        .map(|(interest, _)| *interest)
        .collect();

    // Direct matches outrank every threshold-only embedding match via the
    // score floor; Pizza's absolute precedence below is the one exception to
    // pure score ordering.
    for (interest, score) in scores.iter_mut() {
        if direct.contains(interest) && *score < DIRECT_MATCH_SCORE_FLOOR {
            *score = DIRECT_MATCH_SCORE_FLOOR;
        }
    }

    // Union, direct matches first; order is the stable-sort tie-break.
    let mut combined: Vec<&'static str> = Vec::new();
    for interest in direct.iter().chain(embedding_matches.iter()) {
        if !combined.contains(interest) {
            combined.push(*interest);
        }
    }

    let score_of = |interest: &str| -> f32 {
        scores
            .iter()
            .find(|(name, _)| *name == interest)
            .map(|(_, score)| *score)
            .unwrap_or(0.0)
    };

    combined.sort_by(|a, b| {
        score_of(b)
            .partial_cmp(&score_of(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    if let Some(position) = combined.iter().position(|interest| *interest == "Pizza") {
        let pizza = combined.remove(position);
        combined.insert(0, pizza);
    }

    combined.truncate(MAX_INTERESTS_PER_CATEGORY);

    Ok(CategoryMapping {
        category: category.to_string(),
        interests: combined.iter().map(|interest| interest.to_string()).collect(),
        similarity_scores: to_score_table(&scores),
    })
}

fn to_score_table(scores: &[(&'static str, f32)]) -> BTreeMap<String, f32> {
    scores
        .iter()
        .map(|(interest, score)| (interest.to_string(), *score))
        .collect()
}
