// src/matching/similarity.rs

use strsim::{jaro_winkler, levenshtein};

use crate::config::AliasTable;

/// Containment evidence is weaker than equality, so its score is capped
/// below 100 by this factor.
const CONTAINMENT_CAP: usize = 90;

/// Shortest key that containment is allowed to match on
const MIN_CONTAINMENT_LEN: usize = 4;

/// Single-word keys at or above this length get the embedded-substring guard
const GUARD_WORD_LEN: usize = 3;

/// Jaro-Winkler floor for calling two differing keys a spelling variant
const VARIANT_JARO_THRESHOLD: f64 = 0.92;

/// Similarity between two normalized keys, 0-100
///
/// Fixed priority order, first matching rule wins:
/// 1. exact equality -> 100
/// 2. guarded containment -> floor(len_shorter / len_longer * 90)
/// 3. normalized Levenshtein -> floor((max_len - distance) / max_len * 100)
///
/// A single-word key embedded mid-token in a longer key must not match by
/// containment; only a true prefix or a whole-word occurrence qualifies.
/// That guard exists for the "puli" / "pulijoodam" class of false positive
/// and takes precedence over the containment rule. Symmetric in its
/// arguments; two empty keys score 0.
pub fn similarity_score(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    if a == b {
        return 100;
    }

    let (shorter, longer) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    let shorter_len = shorter.chars().count();
    let longer_len = longer.chars().count();

    if shorter_len >= MIN_CONTAINMENT_LEN && longer.contains(shorter) {
        let word_bounded = format!(" {} ", longer).contains(&format!(" {} ", shorter));
        let guarded = !shorter.contains(' ')
            && shorter_len >= GUARD_WORD_LEN
            && !word_bounded
            && !longer.starts_with(shorter);
        if !guarded {
            return (shorter_len * CONTAINMENT_CAP / longer_len) as u8;
        }
    }

    let distance = levenshtein(a, b);
    ((longer_len.saturating_sub(distance)) * 100 / longer_len) as u8
}

/// Does a known alias or spelling-variant pattern link the two keys?
///
/// True when the caller's alias table maps one whole key onto the other, or
/// when the keys differ only by the kind of drift Jaro-Winkler rates very
/// highly (transliteration variants, single-letter swaps).
pub fn is_spelling_variant(key_a: &str, key_b: &str, aliases: &AliasTable) -> bool {
    if key_a.is_empty() || key_b.is_empty() || key_a == key_b {
        return false;
    }
    if aliases.maps_between(key_a, key_b) {
        return true;
    }
    jaro_winkler(key_a, key_b) >= VARIANT_JARO_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_equality_scores_100() {
        assert_eq!(similarity_score("vikram", "vikram"), 100);
        assert_eq!(similarity_score("the godfather", "the godfather"), 100);
    }

    #[test]
    fn test_empty_keys_never_match() {
        assert_eq!(similarity_score("", ""), 0);
        assert_eq!(similarity_score("", "vikram"), 0);
        assert_eq!(similarity_score("vikram", ""), 0);
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            ("vikram", "vikramarkudu"),
            ("puli", "pulijoodam"),
            ("amelie", "amelia"),
            ("the godfather", "godfather"),
            ("", "x"),
        ];
        for (a, b) in pairs {
            assert_eq!(
                similarity_score(a, b),
                similarity_score(b, a),
                "asymmetric for ({:?}, {:?})",
                a,
                b
            );
        }
    }

    #[test]
    fn test_containment_is_capped_below_equality() {
        // "godfather" inside "the godfather": floor(9 / 13 * 90) = 62
        assert_eq!(similarity_score("godfather", "the godfather"), 62);
        assert!(similarity_score("godfather", "the godfather") < 100);
    }

    #[test]
    fn test_containment_requires_min_length() {
        // "ram" is only three characters; containment must not fire, so the
        // score falls through to Levenshtein: distance 4 over max len 7
        let score = similarity_score("ram", "ramayan");
        assert_eq!(score as usize, (7 - 4) * 100 / 7);
    }

    #[test]
    fn test_prefix_containment_stays_low_for_compound_titles() {
        // regression guard for the named false-positive class: a short title
        // that prefixes a longer compound title must never look like a match
        let score = similarity_score("puli", "pulijoodam");
        assert_eq!(score as usize, 4 * 90 / 10);
        assert!(score < 70, "containment score {} must stay distinct", score);
    }

    #[test]
    fn test_embedded_single_word_guard() {
        // "mara" is embedded mid-string in "samara"; the guard forces the
        // Levenshtein path instead of containment
        let contained = 4 * 90 / 6;
        let score = similarity_score("mara", "samara");
        assert_ne!(score as usize, contained);
        assert_eq!(score as usize, (6 - 2) * 100 / 6);
    }

    #[test]
    fn test_multi_word_containment_allowed_mid_string() {
        // multi-word keys are not subject to the single-word guard
        let score = similarity_score("food bank", "seattle food bank north");
        assert_eq!(score as usize, 9 * 90 / 23);
    }

    #[test]
    fn test_levenshtein_fallback() {
        // "amelie" vs "amelia": distance 1 over max len 6
        assert_eq!(similarity_score("amelie", "amelia") as usize, 5 * 100 / 6);
    }

    #[test]
    fn test_variant_detection_from_alias_table() {
        let aliases = AliasTable::from_pairs([("chiru", "chiranjeevi")]);
        assert!(is_spelling_variant("chiru", "chiranjeevi", &aliases));
        assert!(is_spelling_variant("chiranjeevi", "chiru", &aliases));
        assert!(!is_spelling_variant("chiru", "rajinikanth", &aliases));
    }

    #[test]
    fn test_variant_detection_from_jaro_winkler() {
        let aliases = AliasTable::new();
        // transliteration drift rates very highly on Jaro-Winkler
        assert!(is_spelling_variant("rajinikanth", "rajnikanth", &aliases));
        // identical keys are an exact match, not a variant
        assert!(!is_spelling_variant("vikram", "vikram", &aliases));
        assert!(!is_spelling_variant("puli", "pulijoodam", &aliases));
    }
}
