// src/report.rs
//! The audit trail of one reconciliation run: every classified pair with its
//! verdict and evidence, partitioned into what may merge automatically and
//! what a human has to look at. Created fresh per run and superseded by the
//! next; the records themselves stay the store of truth.

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::core::EntityId;
use crate::models::matching::{ClassifiedPair, PairEvidence, VerdictKind};

/// Counts by verdict plus bucket sizes for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    pub identical: usize,
    pub same_entity: usize,
    pub same_entity_variant: usize,
    pub ambiguous: usize,
    pub distinct: usize,
    pub auto_apply: usize,
    pub needs_review: usize,
}

/// One needs-review entry flattened for a presentation surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewItem {
    pub entity_id_1: EntityId,
    pub entity_id_2: EntityId,
    pub verdict: VerdictKind,
    pub confidence: u8,
    pub reason: String,
    pub evidence: PairEvidence,
}

/// A human decision flowing back in for a needs-review entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewChoice {
    Approve,
    Reject,
    Defer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewDecision {
    pub entity_id_1: EntityId,
    pub entity_id_2: EntityId,
    pub decision: ReviewChoice,
    #[serde(default)]
    pub reviewed_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub run_id: String,
    pub created_at: NaiveDateTime,
    pub entries: Vec<ClassifiedPair>,
}

impl ReconciliationReport {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            created_at: Utc::now().naive_utc(),
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: ClassifiedPair) {
        self.entries.push(entry);
    }

    /// Entries confident enough to merge without human approval
    ///
    /// Only Identical and SameEntity qualify; SameEntityVariant always goes
    /// to review no matter how confident.
    pub fn auto_apply(&self, min_confidence: u8) -> Vec<&ClassifiedPair> {
        self.entries
            .iter()
            .filter(|entry| {
                matches!(
                    entry.verdict.kind,
                    VerdictKind::Identical | VerdictKind::SameEntity
                ) && entry.verdict.confidence >= min_confidence
            })
            .collect()
    }

    /// Entries a human has to decide
    ///
    /// Ambiguous and variant verdicts, plus match verdicts that fell short
    /// of the auto-apply floor. Distinct entries route to no action and land
    /// in neither bucket.
    pub fn needs_review(&self, min_confidence: u8) -> Vec<&ClassifiedPair> {
        self.entries
            .iter()
            .filter(|entry| match entry.verdict.kind {
                VerdictKind::Ambiguous | VerdictKind::SameEntityVariant => true,
                VerdictKind::Identical | VerdictKind::SameEntity => {
                    entry.verdict.confidence < min_confidence
                }
                VerdictKind::Distinct => false,
            })
            .collect()
    }

    /// Flat export of the review bucket for any presentation layer
    pub fn review_export(&self, min_confidence: u8) -> Vec<ReviewItem> {
        self.needs_review(min_confidence)
            .into_iter()
            .map(|entry| ReviewItem {
                entity_id_1: entry.candidate.entity_a.clone(),
                entity_id_2: entry.candidate.entity_b.clone(),
                verdict: entry.verdict.kind,
                confidence: entry.verdict.confidence,
                reason: entry.verdict.reason.clone(),
                evidence: entry.evidence.clone(),
            })
            .collect()
    }

    /// Look up an entry by its id pair, in either order
    pub fn find_pair(&self, id_1: &EntityId, id_2: &EntityId) -> Option<&ClassifiedPair> {
        self.entries.iter().find(|entry| {
            (entry.candidate.entity_a == *id_1 && entry.candidate.entity_b == *id_2)
                || (entry.candidate.entity_a == *id_2 && entry.candidate.entity_b == *id_1)
        })
    }

    pub fn summary(&self, min_confidence: u8) -> ReportSummary {
        let count = |kind: VerdictKind| {
            self.entries
                .iter()
                .filter(|entry| entry.verdict.kind == kind)
                .count()
        };
        ReportSummary {
            total: self.entries.len(),
            identical: count(VerdictKind::Identical),
            same_entity: count(VerdictKind::SameEntity),
            same_entity_variant: count(VerdictKind::SameEntityVariant),
            ambiguous: count(VerdictKind::Ambiguous),
            distinct: count(VerdictKind::Distinct),
            auto_apply: self.auto_apply(min_confidence).len(),
            needs_review: self.needs_review(min_confidence).len(),
        }
    }
}

impl Default for ReconciliationReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::matching::{MatchCandidate, Verdict};

    fn entry(id_a: &str, id_b: &str, kind: VerdictKind, confidence: u8) -> ClassifiedPair {
        ClassifiedPair {
            candidate: MatchCandidate {
                entity_a: EntityId::from(id_a),
                entity_b: EntityId::from(id_b),
                title_similarity: 90,
                temporal_delta: Some(0),
                both_anchors_absent: false,
                shares_external_id: false,
                spelling_variant: false,
                degraded: false,
            },
            verdict: Verdict::new(kind, confidence, "test entry"),
            evidence: PairEvidence {
                name_a: id_a.to_string(),
                name_b: id_b.to_string(),
                normalized_a: id_a.to_string(),
                normalized_b: id_b.to_string(),
                signature_a: String::new(),
                signature_b: String::new(),
            },
        }
    }

    fn sample_report() -> ReconciliationReport {
        let mut report = ReconciliationReport::new();
        report.push(entry("a", "b", VerdictKind::Identical, 100));
        report.push(entry("c", "d", VerdictKind::SameEntity, 92));
        report.push(entry("e", "f", VerdictKind::SameEntity, 74));
        report.push(entry("g", "h", VerdictKind::SameEntityVariant, 90));
        report.push(entry("i", "j", VerdictKind::Ambiguous, 60));
        report.push(entry("k", "l", VerdictKind::Distinct, 80));
        report
    }

    #[test]
    fn test_partition_buckets() {
        let report = sample_report();
        let auto = report.auto_apply(90);
        let review = report.needs_review(90);

        assert_eq!(auto.len(), 2);
        assert_eq!(review.len(), 3);
        // distinct entries land in neither bucket
        assert_eq!(auto.len() + review.len() + 1, report.entries.len());
    }

    #[test]
    fn test_confident_variant_still_needs_review() {
        let report = sample_report();
        let review = report.needs_review(90);
        assert!(review
            .iter()
            .any(|e| e.verdict.kind == VerdictKind::SameEntityVariant));
    }

    #[test]
    fn test_summary_counts() {
        let summary = sample_report().summary(90);
        assert_eq!(summary.total, 6);
        assert_eq!(summary.identical, 1);
        assert_eq!(summary.same_entity, 2);
        assert_eq!(summary.same_entity_variant, 1);
        assert_eq!(summary.ambiguous, 1);
        assert_eq!(summary.distinct, 1);
        assert_eq!(summary.auto_apply, 2);
        assert_eq!(summary.needs_review, 3);
    }

    #[test]
    fn test_find_pair_is_order_insensitive() {
        let report = sample_report();
        assert!(report.find_pair(&EntityId::from("b"), &EntityId::from("a")).is_some());
        assert!(report.find_pair(&EntityId::from("a"), &EntityId::from("z")).is_none());
    }

    #[test]
    fn test_review_export_carries_reason_and_evidence() {
        let report = sample_report();
        let items = report.review_export(90);
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|item| !item.reason.is_empty()));
    }
}
