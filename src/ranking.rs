//! Relevance scoring and tier assignment
//!
//! Pure functions: no I/O, deterministic for a given result set and criteria.

use crate::types::{AnalyzedResult, ImageResult, RecommendationTier};

/// Pixel-area thresholds for the resolution bonus
const AREA_HIGH: u64 = 1_000_000;
const AREA_MID: u64 = 500_000;

/// Score a single result against free-text criteria
///
/// Each whitespace-separated criteria token found as a substring of the
/// lower-cased title adds 2 points; repeated tokens count every time. When both
/// dimensions are known a resolution bonus applies, and non-product results get
/// one extra point.
pub fn score(result: &ImageResult, criteria: &str) -> u32 {
    let title = result.title.to_lowercase();
    let mut score: u32 = 0;

    for token in criteria.split_whitespace() {
        if title.contains(&token.to_lowercase()) {
            score += 2;
        }
    }

    if let (Some(w), Some(h)) = (result.width, result.height) {
        let area = u64::from(w) * u64::from(h);
        score += if area > AREA_HIGH {
            3
        } else if area > AREA_MID {
            2
        } else {
            1
        };
    }

    if !result.is_product {
        score += 1;
    }

    score
}

/// Tier for a given rank in the scored ordering
fn tier_for_rank(rank: usize) -> RecommendationTier {
    match rank {
        0..=2 => RecommendationTier::HighlyRecommended,
        3..=5 => RecommendationTier::Recommended,
        _ => RecommendationTier::Standard,
    }
}

/// Score, rank, and tier a batch of results
///
/// Sorted by descending score; ties keep their original relative order.
pub fn analyze(results: Vec<ImageResult>, criteria: &str) -> Vec<AnalyzedResult> {
    let mut scored: Vec<(u32, ImageResult)> = results
        .into_iter()
        .map(|r| (score(&r, criteria), r))
        .collect();

    // sort_by is stable, preserving input order among equal scores
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    scored
        .into_iter()
        .enumerate()
        .map(|(rank, (relevance_score, result))| AnalyzedResult {
            result,
            relevance_score,
            recommendation_tier: tier_for_rank(rank),
        })
        .collect()
}
