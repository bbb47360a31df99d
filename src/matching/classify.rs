// src/matching/classify.rs

use crate::config::MatchThresholds;
use crate::models::matching::{MatchCandidate, Verdict, VerdictKind};

/// Linear confidence ramp for SameEntity: 70 at similarity 85, 100 at 100
fn same_entity_confidence(similarity: u8) -> u8 {
    let linear = 70 + 2 * (similarity as i32 - 85);
    linear.clamp(0, 100) as u8
}

/// Map a candidate pairing to its verdict
///
/// Deterministic thresholding, evaluated in a fixed order. The temporal-gap
/// rule runs ahead of the title-similarity rules: names recur across
/// generations (remakes, unrelated people sharing a surname), and a long gap
/// is counter-evidence strong enough to override a high name score.
pub fn classify(candidate: &MatchCandidate, thresholds: &MatchThresholds) -> Verdict {
    if candidate.degraded {
        return Verdict::new(
            VerdictKind::Distinct,
            5,
            "record is missing a comparable title/name",
        );
    }

    let sim = candidate.title_similarity;
    let delta = candidate.temporal_delta;

    if sim >= thresholds.identical_min
        && (delta == Some(0) || candidate.both_anchors_absent)
    {
        return Verdict::new(
            VerdictKind::Identical,
            sim,
            format!("titles match at {} with aligned temporal anchors", sim),
        );
    }

    if sim >= thresholds.review_band_min {
        if let Some(gap) = delta {
            if gap >= thresholds.ambiguous_year_gap {
                return Verdict::new(
                    VerdictKind::Ambiguous,
                    60,
                    "large temporal gap suggests distinct persons/films sharing a name",
                );
            }
        }
    }

    if candidate.shares_external_id && sim >= thresholds.identifier_sim_floor {
        let confidence = same_entity_confidence(sim).max(90);
        return Verdict::new(
            VerdictKind::SameEntity,
            confidence,
            "records share an external identifier with plausible name agreement",
        );
    }

    if sim >= thresholds.same_entity_min {
        return Verdict::new(
            VerdictKind::SameEntity,
            same_entity_confidence(sim),
            format!("strong title similarity ({})", sim),
        );
    }

    if sim >= thresholds.variant_min && candidate.spelling_variant {
        let confidence = (80 + (sim - thresholds.variant_min) as i32).min(90) as u8;
        return Verdict::new(
            VerdictKind::SameEntityVariant,
            confidence,
            "known alias/spelling-variant pattern matched",
        );
    }

    if sim >= thresholds.review_band_min {
        return Verdict::new(
            VerdictKind::Ambiguous,
            50,
            format!("title similarity {} is in the uncertain band", sim),
        );
    }

    Verdict::new(
        VerdictKind::Distinct,
        100 - sim,
        format!("title similarity {} is below the match floor", sim),
    )
}
