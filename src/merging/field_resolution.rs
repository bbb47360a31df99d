// src/merging/field_resolution.rs

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::config::SourceTrustOrder;
use crate::models::core::Entity;

/// Which record supplied the surviving value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChosenSide {
    Winner,
    Loser,
}

/// One per-field decision, kept in the merge's audit trail
///
/// A discarded alternative is recorded, never silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecision {
    pub field: String,
    pub chosen: ChosenSide,
    pub value: String,
    pub discarded: Option<String>,
}

/// The resolved content of a merge, before it is applied to the store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldResolution {
    pub name: String,
    pub secondary_name: Option<String>,
    pub year: Option<i32>,
    pub fields: BTreeMap<String, String>,
    pub external_ids: BTreeSet<String>,
    pub decisions: Vec<FieldDecision>,
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Decide one field: sole non-empty value survives; conflicts go to the
/// higher-trust source, ties keep the winner's value.
fn resolve_value(
    field: &str,
    winner_value: Option<&str>,
    loser_value: Option<&str>,
    winner_outranked: bool,
) -> Option<FieldDecision> {
    match (winner_value, loser_value) {
        (None, None) => None,
        (Some(w), None) => Some(FieldDecision {
            field: field.to_string(),
            chosen: ChosenSide::Winner,
            value: w.to_string(),
            discarded: None,
        }),
        (None, Some(l)) => Some(FieldDecision {
            field: field.to_string(),
            chosen: ChosenSide::Loser,
            value: l.to_string(),
            discarded: None,
        }),
        (Some(w), Some(l)) if w == l => Some(FieldDecision {
            field: field.to_string(),
            chosen: ChosenSide::Winner,
            value: w.to_string(),
            discarded: None,
        }),
        (Some(w), Some(l)) => {
            let (chosen, value, discarded) = if winner_outranked {
                (ChosenSide::Loser, l, w)
            } else {
                (ChosenSide::Winner, w, l)
            };
            Some(FieldDecision {
                field: field.to_string(),
                chosen,
                value: value.to_string(),
                discarded: Some(discarded.to_string()),
            })
        }
    }
}

/// Union of both records' attribute field names, in stable order
pub fn union_field_names(winner: &Entity, loser: &Entity) -> Vec<String> {
    let mut names: BTreeSet<&String> = winner.fields.keys().collect();
    names.extend(loser.fields.keys());
    names.into_iter().cloned().collect()
}

/// Decide, per attribute, which of the two records' values survives
///
/// Never overwrites a populated value with an empty one, never fabricates a
/// value, and unions external identifiers rather than replacing them. The
/// loser's non-conflicting information migrates to the winner; conflicting
/// alternatives are preserved in the decision list.
pub fn resolve_fields(
    winner: &Entity,
    loser: &Entity,
    field_list: &[String],
    trust: &SourceTrustOrder,
) -> FieldResolution {
    let winner_outranked = trust.outranks(&loser.source, &winner.source);
    let mut decisions = Vec::new();

    let name_decision = resolve_value(
        "name",
        non_empty(&winner.name),
        non_empty(&loser.name),
        winner_outranked,
    );
    let name = name_decision
        .as_ref()
        .map(|d| d.value.clone())
        .unwrap_or_default();
    decisions.extend(name_decision);

    let secondary_decision = resolve_value(
        "secondary_name",
        winner.secondary_name.as_deref().and_then(non_empty),
        loser.secondary_name.as_deref().and_then(non_empty),
        winner_outranked,
    );
    let secondary_name = secondary_decision.as_ref().map(|d| d.value.clone());
    decisions.extend(secondary_decision);

    let year_decision = resolve_value(
        "year",
        winner.year.map(|y| y.to_string()).as_deref(),
        loser.year.map(|y| y.to_string()).as_deref(),
        winner_outranked,
    );
    let year = year_decision.as_ref().and_then(|d| d.value.parse().ok());
    decisions.extend(year_decision);

    let mut fields = BTreeMap::new();
    for field in field_list {
        if let Some(decision) = resolve_value(
            field,
            winner.field(field),
            loser.field(field),
            winner_outranked,
        ) {
            fields.insert(field.clone(), decision.value.clone());
            decisions.push(decision);
        }
    }

    let external_ids: BTreeSet<String> = winner
        .external_ids
        .union(&loser.external_ids)
        .cloned()
        .collect();

    FieldResolution {
        name,
        secondary_name,
        year,
        fields,
        external_ids,
        decisions,
    }
}
