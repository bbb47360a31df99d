// src/config.rs
//! Reconciliation policy: alias table, source trust ordering, and the
//! consolidated classifier thresholds. All domain knowledge lives here and is
//! passed in explicitly; the matching and merging code carries none of it.

use std::collections::HashMap;

use log::info;
use serde::{Deserialize, Serialize};

use crate::matching::name::fold_and_strip;
use crate::models::core::SourceTag;

/// Caller-supplied table of known name variants
///
/// Keys and values are sanitized through the same fold/strip rules the
/// normalizer applies, so "Wm." and "wm" land on the same entry. Values are
/// expected to be canonical forms, not further variants.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AliasTable {
    entries: HashMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut table = Self::new();
        for (variant, canonical) in pairs {
            table.insert(variant, canonical);
        }
        table
    }

    pub fn insert(&mut self, variant: &str, canonical: &str) {
        let variant = fold_and_strip(variant);
        let canonical = fold_and_strip(canonical);
        if !variant.is_empty() && !canonical.is_empty() && variant != canonical {
            self.entries.insert(variant, canonical);
        }
    }

    /// Canonical form for a single token, if the table knows it
    pub fn canonical_for(&self, token: &str) -> Option<&str> {
        self.entries.get(token).map(|s| s.as_str())
    }

    /// True when the table maps one whole key onto the other, either way
    pub fn maps_between(&self, key_a: &str, key_b: &str) -> bool {
        self.canonical_for(key_a) == Some(key_b) || self.canonical_for(key_b) == Some(key_a)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Caller-defined ranking of data sources, most trusted first
///
/// Sources not in the ordering rank below every listed one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceTrustOrder {
    order: Vec<SourceTag>,
}

impl Default for SourceTrustOrder {
    fn default() -> Self {
        Self {
            order: vec![
                SourceTag::Curated,
                SourceTag::Catalog,
                SourceTag::Search,
                SourceTag::Generated,
            ],
        }
    }
}

impl SourceTrustOrder {
    pub fn new(order: Vec<SourceTag>) -> Self {
        Self { order }
    }

    /// Rank of a source; lower is more trusted
    pub fn rank(&self, tag: &SourceTag) -> usize {
        self.order
            .iter()
            .position(|t| t == tag)
            .unwrap_or(self.order.len())
    }

    /// True when `a` is strictly more trusted than `b`
    pub fn outranks(&self, a: &SourceTag, b: &SourceTag) -> bool {
        self.rank(a) < self.rank(b)
    }
}

/// Consolidated classifier cutoffs
///
/// The historical per-script values were inconsistent; these are the single
/// tunable policy, validated by the classifier tests rather than fixed truths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchThresholds {
    /// Minimum similarity for an Identical verdict
    pub identical_min: u8,
    /// Minimum similarity for SameEntity on title evidence alone
    pub same_entity_min: u8,
    /// Minimum similarity for SameEntityVariant when a variant pattern matched
    pub variant_min: u8,
    /// Bottom of the band that routes to human review
    pub review_band_min: u8,
    /// Name-plausibility floor when a shared external identifier is present
    pub identifier_sim_floor: u8,
    /// Year gap at which a plausible name match becomes ambiguous
    pub ambiguous_year_gap: i32,
    /// Minimum confidence for a verdict to merge without human approval
    pub auto_apply_min_confidence: u8,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            identical_min: 95,
            same_entity_min: 85,
            variant_min: 75,
            review_band_min: 70,
            identifier_sim_floor: 40,
            ambiguous_year_gap: 40,
            auto_apply_min_confidence: 90,
        }
    }
}

/// Year window for the matcher's coarse audit sweeps
pub const COARSE_YEAR_WINDOW: i32 = 3;

/// Everything a reconciliation pass needs to know about the domain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    pub aliases: AliasTable,
    pub trust: SourceTrustOrder,
    pub thresholds: MatchThresholds,
    /// Temporal pre-filter window; None disables the filter entirely
    pub year_window: Option<i32>,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            aliases: AliasTable::default(),
            trust: SourceTrustOrder::default(),
            thresholds: MatchThresholds::default(),
            year_window: Some(1),
        }
    }
}

impl ReconcilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Widened window for coarse audit sweeps
    pub fn coarse(mut self) -> Self {
        self.year_window = Some(COARSE_YEAR_WINDOW);
        self
    }

    /// Disable the temporal pre-filter (full-pool audits)
    pub fn without_year_filter(mut self) -> Self {
        self.year_window = None;
        self
    }

    pub fn with_aliases(mut self, aliases: AliasTable) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_trust(mut self, trust: SourceTrustOrder) -> Self {
        self.trust = trust;
        self
    }

    /// Log the active policy
    pub fn log_config(&self) {
        info!("🔍 Reconciliation policy:");
        info!("   Alias table entries: {}", self.aliases.len());
        match self.year_window {
            Some(w) => info!("   Year window: ±{}", w),
            None => info!("   Year window: disabled (full-pool sweep)"),
        }
        info!(
            "   Auto-apply floor: confidence >= {}",
            self.thresholds.auto_apply_min_confidence
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_table_sanitizes_entries() {
        let mut table = AliasTable::new();
        table.insert("Wm.", "William");
        assert_eq!(table.canonical_for("wm"), Some("william"));
        assert_eq!(table.canonical_for("Wm."), None);
    }

    #[test]
    fn test_alias_table_rejects_degenerate_entries() {
        let mut table = AliasTable::new();
        table.insert("", "william");
        table.insert("...", "william");
        table.insert("william", "william");
        assert!(table.is_empty());
    }

    #[test]
    fn test_maps_between_is_symmetric() {
        let table = AliasTable::from_pairs([("chiru", "chiranjeevi")]);
        assert!(table.maps_between("chiru", "chiranjeevi"));
        assert!(table.maps_between("chiranjeevi", "chiru"));
        assert!(!table.maps_between("chiru", "rajinikanth"));
    }

    #[test]
    fn test_trust_order_ranks() {
        let trust = SourceTrustOrder::default();
        assert!(trust.outranks(&SourceTag::Curated, &SourceTag::Catalog));
        assert!(trust.outranks(&SourceTag::Catalog, &SourceTag::Generated));
        assert!(!trust.outranks(&SourceTag::Generated, &SourceTag::Curated));
        // unlisted custom sources rank below everything in the ordering
        let custom = SourceTag::Custom("forum-scrape".to_string());
        assert!(trust.outranks(&SourceTag::Generated, &custom));
    }

    #[test]
    fn test_default_thresholds() {
        let t = MatchThresholds::default();
        assert_eq!(t.identical_min, 95);
        assert_eq!(t.same_entity_min, 85);
        assert_eq!(t.ambiguous_year_gap, 40);
        assert_eq!(t.auto_apply_min_confidence, 90);
    }

    #[test]
    fn test_config_presets() {
        assert_eq!(ReconcilerConfig::new().year_window, Some(1));
        assert_eq!(ReconcilerConfig::new().coarse().year_window, Some(3));
        assert_eq!(
            ReconcilerConfig::new().without_year_filter().year_window,
            None
        );
    }
}
