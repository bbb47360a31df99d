// src/utils/signature.rs

use serde_json::json;
use sha2::{Digest, Sha256};

use crate::models::core::Entity;

/// Hashes a field value if it's longer than 100 characters, otherwise
/// returns it as is. Keeps signatures stable for long free-text fields
/// like AI-generated biographies.
fn hash_long_field(text: &str) -> String {
    if text.len() > 100 {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        hex::encode(hasher.finalize())
    } else {
        text.to_string()
    }
}

/// Deterministic content signature of a record's comparable fields
///
/// Two records with identical comparable content produce identical
/// signatures regardless of id, lifecycle state, or timestamps. Attached to
/// report evidence and merge records so a reviewer can tell whether either
/// side changed since classification.
pub fn entity_signature(entity: &Entity) -> String {
    let fields: Vec<(&str, String)> = entity
        .fields
        .iter()
        .map(|(k, v)| (k.as_str(), hash_long_field(v)))
        .collect();
    let external_ids: Vec<&str> = entity.external_ids.iter().map(|s| s.as_str()).collect();

    let payload = json!({
        "kind": entity.kind.as_str(),
        "name": entity.name,
        "secondary_name": entity.secondary_name,
        "year": entity.year,
        "fields": fields,
        "external_ids": external_ids,
        "source": entity.source.as_str(),
    });

    let mut hasher = Sha256::new();
    hasher.update(payload.to_string().as_bytes());
    hex::encode(hasher.finalize())
}
