// src/matching/candidates.rs

use std::collections::HashSet;

use log::debug;

use crate::config::ReconcilerConfig;
use crate::matching::name::normalize;
use crate::matching::similarity::{is_spelling_variant, similarity_score};
use crate::models::core::{Entity, EntityId};
use crate::models::matching::MatchCandidate;

/// Precomputed comparison keys for one record
#[derive(Debug, Clone)]
pub struct EntityKeys {
    pub primary: String,
    pub secondary: Option<String>,
}

impl EntityKeys {
    pub fn for_entity(entity: &Entity, config: &ReconcilerConfig) -> Self {
        Self {
            primary: normalize(&entity.name, &config.aliases),
            secondary: entity
                .secondary_name
                .as_deref()
                .map(|name| normalize(name, &config.aliases))
                .filter(|key| !key.is_empty()),
        }
    }
}

/// Best title similarity across primary and secondary keys of both records
fn best_similarity(a: &EntityKeys, b: &EntityKeys) -> u8 {
    let mut best = similarity_score(&a.primary, &b.primary);
    if let Some(sec_b) = b.secondary.as_deref() {
        best = best.max(similarity_score(&a.primary, sec_b));
    }
    if let Some(sec_a) = a.secondary.as_deref() {
        best = best.max(similarity_score(sec_a, &b.primary));
        if let Some(sec_b) = b.secondary.as_deref() {
            best = best.max(similarity_score(sec_a, sec_b));
        }
    }
    best
}

/// Build the candidate pairing for two distinct records
///
/// Callers guarantee the two records differ by identity; the pipeline and
/// matcher below filter self-pairs before getting here.
pub(crate) fn score_pair(
    a: &Entity,
    keys_a: &EntityKeys,
    b: &Entity,
    keys_b: &EntityKeys,
    config: &ReconcilerConfig,
) -> MatchCandidate {
    MatchCandidate {
        entity_a: a.id.clone(),
        entity_b: b.id.clone(),
        title_similarity: best_similarity(keys_a, keys_b),
        temporal_delta: a.temporal_delta(b),
        both_anchors_absent: a.year.is_none() && b.year.is_none(),
        shares_external_id: a.shares_external_id(b),
        spelling_variant: is_spelling_variant(&keys_a.primary, &keys_b.primary, &config.aliases),
        degraded: keys_a.primary.is_empty() || keys_b.primary.is_empty(),
    }
}

/// Does the pool entry survive the coarse pre-filters for this record?
///
/// The year window is a performance and precision device, not a correctness
/// requirement: when either anchor is missing the filter is skipped rather
/// than excluding the record.
fn passes_prefilter(record: &Entity, other: &Entity, config: &ReconcilerConfig) -> bool {
    if record.kind != other.kind {
        return false;
    }
    match (config.year_window, record.temporal_delta(other)) {
        (Some(window), Some(delta)) => delta <= window,
        _ => true,
    }
}

/// Find the best match for one record in a pool of existing records
///
/// Pool entries carrying the record's own id are skipped. Ties are broken by
/// smaller temporal delta, then by which candidate has more populated fields
/// (the more complete record is the probable canonical target). Returns None
/// when nothing survives the pre-filters.
pub fn find_best_match(
    record: &Entity,
    pool: &[Entity],
    config: &ReconcilerConfig,
) -> Option<MatchCandidate> {
    let record_keys = EntityKeys::for_entity(record, config);

    let mut best: Option<(MatchCandidate, usize)> = None;
    for other in pool {
        if other.id == record.id || !other.active {
            continue;
        }
        if !passes_prefilter(record, other, config) {
            continue;
        }
        let other_keys = EntityKeys::for_entity(other, config);
        let candidate = score_pair(record, &record_keys, other, &other_keys, config);
        let completeness = other.populated_field_count();

        let replace = match &best {
            None => true,
            Some((current, current_completeness)) => {
                let by_score = candidate.title_similarity.cmp(&current.title_similarity);
                let by_delta = delta_rank(current.temporal_delta).cmp(&delta_rank(candidate.temporal_delta));
                by_score
                    .then(by_delta)
                    .then(completeness.cmp(current_completeness))
                    .is_gt()
            }
        };
        if replace {
            best = Some((candidate, completeness));
        }
    }

    best.map(|(candidate, _)| candidate)
}

/// Rank for the smaller-delta tie-break; missing anchors sort last
fn delta_rank(delta: Option<i32>) -> i64 {
    match delta {
        Some(d) => d as i64,
        None => i64::MAX,
    }
}

/// One deduplicated best-match candidate per record across a whole pool
///
/// Each active record contributes its single best match; pairs reached from
/// both sides are emitted once, keyed on the ordered id pair.
pub fn generate_candidates(pool: &[Entity], config: &ReconcilerConfig) -> Vec<MatchCandidate> {
    let keys: Vec<EntityKeys> = pool
        .iter()
        .map(|entity| EntityKeys::for_entity(entity, config))
        .collect();

    let mut seen_pairs: HashSet<(EntityId, EntityId)> = HashSet::new();
    let mut candidates = Vec::new();

    for (i, record) in pool.iter().enumerate() {
        if !record.active {
            continue;
        }
        let mut best: Option<(usize, MatchCandidate)> = None;
        for (j, other) in pool.iter().enumerate() {
            if i == j || !other.active || !passes_prefilter(record, other, config) {
                continue;
            }
            let candidate = score_pair(record, &keys[i], other, &keys[j], config);
            let completeness = other.populated_field_count();
            let replace = match &best {
                None => true,
                Some((best_j, current)) => {
                    let current_completeness = pool[*best_j].populated_field_count();
                    candidate
                        .title_similarity
                        .cmp(&current.title_similarity)
                        .then(delta_rank(current.temporal_delta).cmp(&delta_rank(candidate.temporal_delta)))
                        .then(completeness.cmp(&current_completeness))
                        .is_gt()
                }
            };
            if replace {
                best = Some((j, candidate));
            }
        }

        if let Some((_, candidate)) = best {
            let pair_key = ordered_pair(&candidate.entity_a, &candidate.entity_b);
            if seen_pairs.insert(pair_key) {
                candidates.push(candidate);
            }
        }
    }

    debug!(
        "Generated {} candidate pairs from pool of {}",
        candidates.len(),
        pool.len()
    );
    candidates
}

fn ordered_pair(a: &EntityId, b: &EntityId) -> (EntityId, EntityId) {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::core::{EntityKind, SourceTag};

    fn movie(id: &str, name: &str, year: i32) -> Entity {
        Entity::new(id, EntityKind::Movie, name, SourceTag::Catalog).with_year(year)
    }

    #[test]
    fn test_empty_pool_returns_none() {
        let record = movie("m1", "Vikram", 2005);
        assert!(find_best_match(&record, &[], &ReconcilerConfig::new()).is_none());
    }

    #[test]
    fn test_year_window_filters_far_candidates() {
        let record = movie("m1", "Puli", 1985);
        let pool = vec![movie("m2", "Puli", 2009)];
        let config = ReconcilerConfig::new();
        assert!(find_best_match(&record, &pool, &config).is_none());

        // dropping the filter lets the pair through for audit sweeps
        let audit = ReconcilerConfig::new().without_year_filter();
        assert!(find_best_match(&record, &pool, &audit).is_some());
    }

    #[test]
    fn test_missing_anchor_skips_filter_not_record() {
        let record = movie("m1", "Vikram", 2005);
        let mut other = Entity::new("m2", EntityKind::Movie, "Vikram", SourceTag::Search);
        other.year = None;
        let best = find_best_match(&record, &[other], &ReconcilerConfig::new()).unwrap();
        assert_eq!(best.entity_b, EntityId::from("m2"));
        assert_eq!(best.temporal_delta, None);
        assert!(!best.both_anchors_absent);
    }

    #[test]
    fn test_kind_mismatch_is_filtered() {
        let record = movie("m1", "Vikram", 2005);
        let person =
            Entity::new("p1", EntityKind::Person, "Vikram", SourceTag::Catalog).with_year(2005);
        assert!(find_best_match(&record, &[person], &ReconcilerConfig::new()).is_none());
    }

    #[test]
    fn test_own_id_and_retired_records_are_skipped() {
        let record = movie("m1", "Vikram", 2005);
        let mut retired = movie("m2", "Vikram", 2005);
        retired.active = false;
        let pool = vec![record.clone(), retired];
        assert!(find_best_match(&record, &pool, &ReconcilerConfig::new()).is_none());
    }

    #[test]
    fn test_secondary_title_contributes_to_score() {
        let record = movie("m1", "Demon Dance", 2012);
        let other = movie("m2", "Raakshasa Natyam", 2012).with_secondary_name("Demon Dance");
        let best = find_best_match(&record, &[other], &ReconcilerConfig::new()).unwrap();
        assert_eq!(best.title_similarity, 100);
    }

    #[test]
    fn test_tie_breaks_smaller_delta_then_completeness() {
        let record = movie("m1", "Vikram", 2005);
        let near = movie("m2", "Vikram", 2005);
        let far = movie("m3", "Vikram", 2006);
        let best = find_best_match(&record, &[far.clone(), near], &ReconcilerConfig::new()).unwrap();
        assert_eq!(best.entity_b, EntityId::from("m2"));

        // equal deltas: the more complete record wins
        let sparse = movie("m4", "Vikram", 2005);
        let rich = movie("m5", "Vikram", 2005)
            .with_field("director", "A. Vincent")
            .with_external_id("imdb:tt0478311");
        let best = find_best_match(&record, &[sparse, rich], &ReconcilerConfig::new()).unwrap();
        assert_eq!(best.entity_b, EntityId::from("m5"));
    }

    #[test]
    fn test_generate_candidates_dedupes_mirrored_pairs() {
        let pool = vec![
            movie("m1", "Vikram", 2005),
            movie("m2", "Vikram", 2005),
            movie("m3", "Anniyan", 2005),
        ];
        let candidates = generate_candidates(&pool, &ReconcilerConfig::new());
        let vikram_pairs = candidates
            .iter()
            .filter(|c| {
                let pair = ordered_pair(&c.entity_a, &c.entity_b);
                pair == (EntityId::from("m1"), EntityId::from("m2"))
            })
            .count();
        assert_eq!(vikram_pairs, 1);
    }

    #[test]
    fn test_degraded_flag_for_nameless_records() {
        let record = movie("m1", "!!!", 2005);
        let other = movie("m2", "Vikram", 2005);
        let best = find_best_match(&record, &[other], &ReconcilerConfig::new()).unwrap();
        assert!(best.degraded);
        assert_eq!(best.title_similarity, 0);
    }
}
