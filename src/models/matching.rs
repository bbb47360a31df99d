// src/models/matching.rs

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::models::core::EntityId;

/// A pair of records under evaluation, with the signals the classifier needs
///
/// Ephemeral: produced and consumed within one reconciliation pass, never
/// persisted on the records themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCandidate {
    /// The record being reconciled
    pub entity_a: EntityId,

    /// The best-scoring record from the pool
    pub entity_b: EntityId,

    /// Title/name similarity, 0-100
    pub title_similarity: u8,

    /// Absolute year gap; None when either anchor is missing
    pub temporal_delta: Option<i32>,

    /// True when neither record carries a temporal anchor
    pub both_anchors_absent: bool,

    /// The records carry at least one common external identifier
    pub shares_external_id: bool,

    /// A known alias or spelling-variant pattern links the two names
    pub spelling_variant: bool,

    /// Either record lacked a comparable name after normalization
    pub degraded: bool,
}

impl MatchCandidate {
    /// Checked constructor for host callers
    ///
    /// A self-pair is a caller bug, not a data problem, so it fails loudly.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        entity_a: EntityId,
        entity_b: EntityId,
        title_similarity: u8,
        temporal_delta: Option<i32>,
        both_anchors_absent: bool,
        shares_external_id: bool,
        spelling_variant: bool,
        degraded: bool,
    ) -> Result<Self> {
        if entity_a == entity_b {
            bail!(
                "match candidate must pair two distinct records, got self-pair {}",
                entity_a
            );
        }
        Ok(Self {
            entity_a,
            entity_b,
            title_similarity,
            temporal_delta,
            both_anchors_absent,
            shares_external_id,
            spelling_variant,
            degraded,
        })
    }
}

/// The five possible answers to "are these two records the same entity?"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerdictKind {
    /// Same title, same (or absent) temporal anchor
    Identical,

    /// Same entity under different record content
    SameEntity,

    /// Same entity under a known alias or spelling variant
    SameEntityVariant,

    /// Plausible match that a human must decide
    Ambiguous,

    /// Different entities
    Distinct,
}

impl VerdictKind {
    /// Converts the enum to a string representation
    pub fn as_str(&self) -> &str {
        match self {
            Self::Identical => "identical",
            Self::SameEntity => "same_entity",
            Self::SameEntityVariant => "same_entity_variant",
            Self::Ambiguous => "ambiguous",
            Self::Distinct => "distinct",
        }
    }
}

/// A classification outcome: verdict kind, confidence 0-100, and the reason
///
/// Immutable once produced; persisted only in the reconciliation report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub kind: VerdictKind,
    pub confidence: u8,
    pub reason: String,
}

impl Verdict {
    pub fn new(kind: VerdictKind, confidence: u8, reason: impl Into<String>) -> Self {
        Self {
            kind,
            confidence: confidence.min(100),
            reason: reason.into(),
        }
    }
}

/// The compared values backing a verdict, kept for the audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairEvidence {
    pub name_a: String,
    pub name_b: String,
    pub normalized_a: String,
    pub normalized_b: String,
    /// Content signatures of both records at classification time
    pub signature_a: String,
    pub signature_b: String,
}

/// One classified pair: the report's entry type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedPair {
    pub candidate: MatchCandidate,
    pub verdict: Verdict,
    pub evidence: PairEvidence,
}
