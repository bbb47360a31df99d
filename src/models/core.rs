// src/models/core.rs

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

//------------------------------------------------------------------------------
// IDENTIFIER TYPES
//------------------------------------------------------------------------------
// Using newtype pattern for type safety to prevent mixing different ID types

/// Strongly typed identifier for catalog records
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

//------------------------------------------------------------------------------
// CORE DOMAIN MODELS
//------------------------------------------------------------------------------

/// What kind of real-world thing a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// A film record; the temporal anchor is the release year
    Movie,

    /// A person record; the temporal anchor is the birth year
    Person,
}

impl EntityKind {
    /// Converts the enum to a string representation
    pub fn as_str(&self) -> &str {
        match self {
            Self::Movie => "movie",
            Self::Person => "person",
        }
    }

    /// Creates the enum from a string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "movie" | "film" => Some(Self::Movie),
            "person" | "celebrity" => Some(Self::Person),
            _ => None,
        }
    }
}

/// Provenance of a record's data
///
/// Trust between sources is not implied by this enum; the caller supplies
/// an explicit ordering (see `SourceTrustOrder`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceTag {
    /// Hand-curated by an editor
    Curated,

    /// Imported from a third-party metadata catalog
    Catalog,

    /// Scraped or derived from web search results
    Search,

    /// AI-generated placeholder text
    Generated,

    /// Custom source tag (for extensibility)
    Custom(String),
}

impl SourceTag {
    /// Converts the enum to a string representation
    pub fn as_str(&self) -> &str {
        match self {
            Self::Curated => "curated",
            Self::Catalog => "catalog",
            Self::Search => "search",
            Self::Generated => "generated",
            Self::Custom(s) => s.as_str(),
        }
    }

    /// Creates the enum from a string representation
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "curated" => Self::Curated,
            "catalog" => Self::Catalog,
            "search" => Self::Search,
            "generated" => Self::Generated,
            _ => Self::Custom(s.to_string()),
        }
    }
}

fn default_active() -> bool {
    true
}

fn default_timestamp() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// A movie or person record of uncertain uniqueness
///
/// Identity is never guaranteed unique on ingestion; uniqueness is
/// established by reconciliation. Retired records keep their data and a
/// back-pointer to the canonical record that absorbed them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier for this record
    pub id: EntityId,

    /// Movie or person
    pub kind: EntityKind,

    /// Display title (movies) or display name (persons)
    pub name: String,

    /// Secondary localized title/name, when a source supplies one
    #[serde(default)]
    pub secondary_name: Option<String>,

    /// Temporal anchor: release year for movies, birth year for persons
    #[serde(default)]
    pub year: Option<i32>,

    /// Named role/attribute fields (director, lead performer, ...)
    #[serde(default)]
    pub fields: BTreeMap<String, String>,

    /// Opaque identifiers from third-party catalogs
    #[serde(default)]
    pub external_ids: BTreeSet<String>,

    /// Where this record's data came from
    pub source: SourceTag,

    /// False once the record has been retired by a merge
    #[serde(default = "default_active")]
    pub active: bool,

    /// The canonical record this one was merged into, if retired
    #[serde(default)]
    pub merged_into: Option<EntityId>,

    /// When this record was first created
    #[serde(default = "default_timestamp")]
    pub created_at: NaiveDateTime,

    /// When this record was last updated
    #[serde(default = "default_timestamp")]
    pub updated_at: NaiveDateTime,
}

impl Entity {
    pub fn new(id: &str, kind: EntityKind, name: &str, source: SourceTag) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: EntityId(id.to_string()),
            kind,
            name: name.to_string(),
            secondary_name: None,
            year: None,
            fields: BTreeMap::new(),
            external_ids: BTreeSet::new(),
            source,
            active: true,
            merged_into: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_secondary_name(mut self, name: &str) -> Self {
        self.secondary_name = Some(name.to_string());
        self
    }

    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_external_id(mut self, id: &str) -> Self {
        self.external_ids.insert(id.to_string());
        self
    }

    /// Value of a named attribute field, if populated
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.as_str())
            .filter(|v| !v.trim().is_empty())
    }

    /// How many informative slots this record fills
    ///
    /// Used as the completeness tie-break when picking the probable
    /// canonical record of a pair.
    pub fn populated_field_count(&self) -> usize {
        let mut count = 0;
        if !self.name.trim().is_empty() {
            count += 1;
        }
        if self
            .secondary_name
            .as_deref()
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false)
        {
            count += 1;
        }
        if self.year.is_some() {
            count += 1;
        }
        count += self
            .fields
            .values()
            .filter(|v| !v.trim().is_empty())
            .count();
        count += self.external_ids.len();
        count
    }

    /// Absolute year gap between two records, when both anchors are present
    pub fn temporal_delta(&self, other: &Entity) -> Option<i32> {
        match (self.year, other.year) {
            (Some(a), Some(b)) => Some((a - b).abs()),
            _ => None,
        }
    }

    /// True when the two records carry at least one common external identifier
    pub fn shares_external_id(&self, other: &Entity) -> bool {
        self.external_ids
            .intersection(&other.external_ids)
            .next()
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        assert_eq!(EntityKind::from_str("movie"), Some(EntityKind::Movie));
        assert_eq!(EntityKind::from_str("Person"), Some(EntityKind::Person));
        assert_eq!(EntityKind::from_str("album"), None);
        assert_eq!(EntityKind::Movie.as_str(), "movie");
    }

    #[test]
    fn test_source_tag_round_trip() {
        assert_eq!(SourceTag::from_str("curated"), SourceTag::Curated);
        assert_eq!(
            SourceTag::from_str("wiki-import"),
            SourceTag::Custom("wiki-import".to_string())
        );
        assert_eq!(SourceTag::Generated.as_str(), "generated");
    }

    #[test]
    fn test_populated_field_count() {
        let sparse = Entity::new("m1", EntityKind::Movie, "Puli", SourceTag::Generated);
        let rich = Entity::new("m2", EntityKind::Movie, "Puli", SourceTag::Catalog)
            .with_year(1985)
            .with_field("director", "S. P. Muthuraman")
            .with_field("lead", "")
            .with_external_id("tmdb:411");

        assert_eq!(sparse.populated_field_count(), 1);
        // name + year + director + external id; empty "lead" not counted
        assert_eq!(rich.populated_field_count(), 4);
    }

    #[test]
    fn test_temporal_delta_requires_both_anchors() {
        let a = Entity::new("a", EntityKind::Person, "Vikram", SourceTag::Catalog).with_year(1966);
        let b = Entity::new("b", EntityKind::Person, "Vikram", SourceTag::Catalog).with_year(2006);
        let c = Entity::new("c", EntityKind::Person, "Vikram", SourceTag::Catalog);

        assert_eq!(a.temporal_delta(&b), Some(40));
        assert_eq!(a.temporal_delta(&c), None);
    }

    #[test]
    fn test_shares_external_id() {
        let a = Entity::new("a", EntityKind::Movie, "Vikram", SourceTag::Catalog)
            .with_external_id("imdb:tt0478311");
        let b = Entity::new("b", EntityKind::Movie, "Vikramarkudu", SourceTag::Search)
            .with_external_id("imdb:tt0478311")
            .with_external_id("tmdb:25676");
        let c = Entity::new("c", EntityKind::Movie, "Vikram", SourceTag::Search);

        assert!(a.shares_external_id(&b));
        assert!(!a.shares_external_id(&c));
    }
}
