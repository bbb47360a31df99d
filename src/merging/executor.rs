// src/merging/executor.rs

use std::collections::BTreeMap;

use chrono::{NaiveDateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SourceTrustOrder;
use crate::merging::field_resolution::{resolve_fields, union_field_names, FieldDecision};
use crate::models::core::{Entity, EntityId};
use crate::models::matching::{ClassifiedPair, Verdict};
use crate::report::{ReconciliationReport, ReviewChoice, ReviewDecision};
use crate::utils::signature::entity_signature;

/// In-memory working set of records, keyed by id
///
/// The host loads the pool once and writes the result back; all mutation
/// during a run goes through the merge executor.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    entities: BTreeMap<EntityId, Entity>,
}

impl EntityStore {
    pub fn from_entities(entities: Vec<Entity>) -> Self {
        let mut map = BTreeMap::new();
        for entity in entities {
            if map.contains_key(&entity.id) {
                warn!("duplicate record id {} in pool; keeping the first", entity.id);
                continue;
            }
            map.insert(entity.id.clone(), entity);
        }
        Self { entities: map }
    }

    pub fn get(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn active_entities(&self) -> Vec<Entity> {
        self.entities.values().filter(|e| e.active).cloned().collect()
    }

    pub fn into_entities(self) -> Vec<Entity> {
        self.entities.into_values().collect()
    }
}

/// Immutable audit row appended for every applied merge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeRecord {
    pub id: String,
    pub winner_id: EntityId,
    pub loser_id: EntityId,
    pub verdict: Verdict,
    pub decisions: Vec<FieldDecision>,
    /// Content signatures of both records before the merge was applied
    pub winner_signature_before: String,
    pub loser_signature: String,
    pub applied_at: NaiveDateTime,
}

/// Per-merge result; one failed or skipped merge never aborts the batch
#[derive(Debug, Clone)]
pub enum MergeOutcome {
    Applied(MergeRecord),
    /// One of the records was already retired; fail closed, change nothing
    SkippedInactive {
        winner_id: EntityId,
        loser_id: EntityId,
        reason: String,
    },
    Failed {
        entity_a: EntityId,
        entity_b: EntityId,
        error: String,
    },
}

impl MergeOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// The single mutation point of a reconciliation run
///
/// Applies one approved pair at a time: resolve fields, union identifiers,
/// retire the loser behind a compare-and-set on its `active` flag, append an
/// audit record. Retired records are kept, never hard-deleted, so every
/// merge stays reversible.
pub struct MergeExecutor<'a> {
    store: &'a mut EntityStore,
    trust: SourceTrustOrder,
    audit: Vec<MergeRecord>,
}

impl<'a> MergeExecutor<'a> {
    pub fn new(store: &'a mut EntityStore, trust: SourceTrustOrder) -> Self {
        Self {
            store,
            trust,
            audit: Vec::new(),
        }
    }

    /// Pick the canonical target: the more populated record wins, ties go to
    /// the pool-side record of the candidate
    fn choose_winner(&self, a: &Entity, b: &Entity) -> (EntityId, EntityId) {
        if a.populated_field_count() > b.populated_field_count() {
            (a.id.clone(), b.id.clone())
        } else {
            (b.id.clone(), a.id.clone())
        }
    }

    /// Apply one classified pair as a single logical step
    pub fn apply(&mut self, pair: &ClassifiedPair) -> MergeOutcome {
        let id_a = &pair.candidate.entity_a;
        let id_b = &pair.candidate.entity_b;

        let (a, b) = match (self.store.get(id_a), self.store.get(id_b)) {
            (Some(a), Some(b)) => (a.clone(), b.clone()),
            _ => {
                let error = format!("pair ({}, {}) references a record not in the store", id_a, id_b);
                warn!("merge failed: {}", error);
                return MergeOutcome::Failed {
                    entity_a: id_a.clone(),
                    entity_b: id_b.clone(),
                    error,
                };
            }
        };

        let (winner_id, loser_id) = self.choose_winner(&a, &b);
        let (mut winner, mut loser) = if winner_id == a.id { (a, b) } else { (b, a) };

        // compare-and-set on the active flag: a record that has already been
        // retired (or a winner that lost an earlier merge) is never touched
        // twice and never resurrected
        if !loser.active {
            let reason = format!("loser {} is already retired", loser_id);
            warn!("merge skipped: {}", reason);
            return MergeOutcome::SkippedInactive {
                winner_id,
                loser_id,
                reason,
            };
        }
        if !winner.active {
            let reason = format!("winner {} is already retired", winner_id);
            warn!("merge skipped: {}", reason);
            return MergeOutcome::SkippedInactive {
                winner_id,
                loser_id,
                reason,
            };
        }

        let winner_signature_before = entity_signature(&winner);
        let loser_signature = entity_signature(&loser);

        let field_list = union_field_names(&winner, &loser);
        let resolution = resolve_fields(&winner, &loser, &field_list, &self.trust);

        let now = Utc::now().naive_utc();
        winner.name = resolution.name.clone();
        winner.secondary_name = resolution.secondary_name.clone();
        winner.year = resolution.year;
        winner.fields = resolution.fields.clone();
        winner.external_ids = resolution.external_ids.clone();
        winner.updated_at = now;

        loser.active = false;
        loser.merged_into = Some(winner_id.clone());
        loser.updated_at = now;

        self.store.entities.insert(winner_id.clone(), winner);
        self.store.entities.insert(loser_id.clone(), loser);

        let record = MergeRecord {
            id: Uuid::new_v4().to_string(),
            winner_id: winner_id.clone(),
            loser_id: loser_id.clone(),
            verdict: pair.verdict.clone(),
            decisions: resolution.decisions,
            winner_signature_before,
            loser_signature,
            applied_at: now,
        };
        info!(
            "merged {} into {} ({} field decisions)",
            loser_id,
            winner_id,
            record.decisions.len()
        );
        self.audit.push(record.clone());
        MergeOutcome::Applied(record)
    }

    /// Apply a batch; outcomes are surfaced independently per pair
    pub fn apply_all(&mut self, pairs: &[&ClassifiedPair]) -> Vec<MergeOutcome> {
        pairs.iter().map(|pair| self.apply(pair)).collect()
    }

    /// Apply every auto-apply-eligible entry of a report
    pub fn apply_auto(
        &mut self,
        report: &ReconciliationReport,
        min_confidence: u8,
    ) -> Vec<MergeOutcome> {
        let eligible = report.auto_apply(min_confidence);
        info!("applying {} auto-eligible merges", eligible.len());
        self.apply_all(&eligible)
    }

    /// Apply the review entries a human explicitly approved
    ///
    /// Rejected and deferred decisions are no-ops here; only an Approve is
    /// an authorization to merge.
    pub fn apply_approved(
        &mut self,
        report: &ReconciliationReport,
        decisions: &[ReviewDecision],
    ) -> Vec<MergeOutcome> {
        let approved: Vec<&ClassifiedPair> = decisions
            .iter()
            .filter(|d| d.decision == ReviewChoice::Approve)
            .filter_map(|d| report.find_pair(&d.entity_id_1, &d.entity_id_2))
            .collect();
        info!("applying {} human-approved merges", approved.len());
        self.apply_all(&approved)
    }

    /// The immutable merge records appended by this executor
    pub fn audit_trail(&self) -> &[MergeRecord] {
        &self.audit
    }
}
