use crate::models::{CompatibilityWeights, UserCandidate};

/// Score how well two users would share a dinner table (0-1)
///
/// Scoring formula:
/// score = (
///     dining_style_match * 0.4 +   # Same non-null style
///     dietary_overlap * 0.3 +      # Shared tags / larger set
///     locality_bonus * 0.3         # Flat; proximity is gated upstream
/// )
///
/// The score is symmetric and bounded; it is a heuristic, not a metric.
pub fn compatibility_score(
    a: &UserCandidate,
    b: &UserCandidate,
    weights: &CompatibilityWeights,
) -> f64 {
    let mut score = 0.0;

    // Dining-style match requires both users to have picked one
    if let (Some(style_a), Some(style_b)) = (a.dining_style, b.dining_style) {
        if style_a == style_b {
            score += weights.dining_style;
        }
    }

    score += weights.dietary * dietary_overlap(&a.dietary_preferences, &b.dietary_preferences);

    // Locality bonus is unconditional: every pair under consideration has
    // already passed the group builder's radius gate
    score += weights.locality;

    score.min(1.0).max(0.0)
}

/// Shared-tag ratio normalized by the larger set; 0 when both sets are empty
#[inline]
fn dietary_overlap(a: &[String], b: &[String]) -> f64 {
    let shared = a.iter().filter(|tag| b.contains(tag)).count() as f64;
    let denom = a.len().max(b.len()).max(1) as f64;
    shared / denom
}
