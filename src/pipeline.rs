// src/pipeline.rs
//! One reconciliation pass over an in-memory pool: normalize, match,
//! classify, assemble the report. Pure reads throughout; applying the
//! report's merges is the executor's job.

use std::collections::HashMap;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::config::ReconcilerConfig;
use crate::matching::candidates::generate_candidates;
use crate::matching::classify::classify;
use crate::matching::name::normalize;
use crate::models::core::{Entity, EntityId};
use crate::models::matching::{ClassifiedPair, PairEvidence};
use crate::report::ReconciliationReport;
use crate::utils::progress::ProgressConfig;
use crate::utils::signature::entity_signature;

/// Run one batch pass and return the report
///
/// The pool is read once and never mutated; callers that want throughput can
/// shard it (for example by year bucket) and run independent passes, since
/// each pass only reads the pool and writes its own report.
pub fn run_reconciliation_pass(
    pool: &[Entity],
    config: &ReconcilerConfig,
    progress: &ProgressConfig,
) -> Result<ReconciliationReport> {
    let active_count = pool.iter().filter(|e| e.active).count();
    info!(
        "Starting reconciliation pass over {} records ({} active)",
        pool.len(),
        active_count
    );
    config.log_config();

    let by_id: HashMap<&EntityId, &Entity> = pool.iter().map(|e| (&e.id, e)).collect();

    info!("Generating candidate pairs");
    let candidates = generate_candidates(pool, config);
    info!("Generated {} candidate pairs", candidates.len());

    let pb = progress.create_bar(candidates.len() as u64, "Classifying pairs...");
    let mut report = ReconciliationReport::new();
    for candidate in candidates {
        pb.inc(1);
        let entity_a = by_id
            .get(&candidate.entity_a)
            .copied()
            .with_context(|| format!("candidate references unknown record {}", candidate.entity_a))?;
        let entity_b = by_id
            .get(&candidate.entity_b)
            .copied()
            .with_context(|| format!("candidate references unknown record {}", candidate.entity_b))?;

        let verdict = classify(&candidate, &config.thresholds);
        debug!(
            "classified ({}, {}): {} at confidence {}",
            candidate.entity_a,
            candidate.entity_b,
            verdict.kind.as_str(),
            verdict.confidence
        );

        let evidence = PairEvidence {
            name_a: entity_a.name.clone(),
            name_b: entity_b.name.clone(),
            normalized_a: normalize(&entity_a.name, &config.aliases),
            normalized_b: normalize(&entity_b.name, &config.aliases),
            signature_a: entity_signature(entity_a),
            signature_b: entity_signature(entity_b),
        };
        report.push(ClassifiedPair {
            candidate,
            verdict,
            evidence,
        });
    }
    pb.finish_and_clear();

    let summary = report.summary(config.thresholds.auto_apply_min_confidence);
    info!(
        "✅ Pass {} complete: {} pairs ({} auto-apply, {} for review, {} distinct)",
        report.run_id, summary.total, summary.auto_apply, summary.needs_review, summary.distinct
    );
    Ok(report)
}
