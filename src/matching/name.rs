// src/matching/name.rs

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::AliasTable;

/// Latin diacritics folded to their base letters before stripping
///
/// Covers the accented forms that show up in catalog imports; anything
/// outside the table that is still non-alphanumeric gets stripped.
const DIACRITIC_FOLDS: [(&str, &str); 24] = [
    ("á", "a"),
    ("à", "a"),
    ("â", "a"),
    ("ä", "a"),
    ("ã", "a"),
    ("å", "a"),
    ("é", "e"),
    ("è", "e"),
    ("ê", "e"),
    ("ë", "e"),
    ("í", "i"),
    ("ì", "i"),
    ("î", "i"),
    ("ï", "i"),
    ("ó", "o"),
    ("ò", "o"),
    ("ô", "o"),
    ("ö", "o"),
    ("õ", "o"),
    ("ú", "u"),
    ("ù", "u"),
    ("û", "u"),
    ("ü", "u"),
    ("ñ", "n"),
];

/// Punctuation that reads as a word separator rather than noise
const CHAR_SUBSTITUTIONS: [(&str, &str); 9] = [
    ("&", " and "),
    ("+", " plus "),
    ("/", " "),
    ("-", " "),
    (".", " "),
    (",", " "),
    ("(", " "),
    (")", " "),
    ("'", ""),
];

static PAREN_QUALIFIER: Lazy<Regex> = Lazy::new(|| {
    // trailing parenthesized qualifier, e.g. "Puli (1985 film)"
    Regex::new(r"\s*\((.*?)\)\s*$").expect("paren qualifier regex is valid")
});

/// Lowercase, fold diacritics, strip punctuation, collapse whitespace
///
/// The shared projection under both the normalizer and the alias table's
/// entry sanitization, so variants meet their canonical forms on equal terms.
pub fn fold_and_strip(text: &str) -> String {
    let mut folded = text.to_lowercase();
    for (accented, base) in &DIACRITIC_FOLDS {
        if folded.contains(accented) {
            folded = folded.replace(accented, base);
        }
    }
    for (pattern, replacement) in &CHAR_SUBSTITUTIONS {
        folded = folded.replace(pattern, replacement);
    }
    let stripped: String = folded
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonicalize a free-text title/name into its comparison key
///
/// Deterministic and idempotent; empty or blank input yields an empty key,
/// never an error. The alias table is the only domain knowledge applied, and
/// it is supplied by the caller.
pub fn normalize(text: &str, aliases: &AliasTable) -> String {
    let mut working = text.to_string();
    if let Some(captures) = PAREN_QUALIFIER.captures(&working) {
        if captures.get(1).is_some() {
            working = PAREN_QUALIFIER.replace(&working, "").trim().to_string();
        }
    }

    let stripped = fold_and_strip(&working);
    if aliases.is_empty() {
        return stripped;
    }

    stripped
        .split_whitespace()
        .map(|token| aliases.canonical_for(token).unwrap_or(token))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_aliases() -> AliasTable {
        AliasTable::new()
    }

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize("  The  GODFATHER ", &no_aliases()), "the godfather");
        assert_eq!(normalize("Spider-Man: No Way Home", &no_aliases()), "spider man no way home");
        assert_eq!(normalize("Amélie", &no_aliases()), "amelie");
    }

    #[test]
    fn test_normalize_strips_trailing_qualifier() {
        assert_eq!(normalize("Puli (1985 film)", &no_aliases()), "puli");
        assert_eq!(normalize("Vikram (Tamil)", &no_aliases()), "vikram");
        // interior parentheses are not a trailing qualifier
        assert_eq!(
            normalize("8 1/2 (Otto e mezzo) remaster", &no_aliases()),
            "8 1 2 otto e mezzo remaster"
        );
    }

    #[test]
    fn test_normalize_empty_input() {
        assert_eq!(normalize("", &no_aliases()), "");
        assert_eq!(normalize("   ", &no_aliases()), "");
        assert_eq!(normalize("!!!", &no_aliases()), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let aliases = AliasTable::from_pairs([("wm", "william"), ("jr", "junior")]);
        for raw in [
            "Wm. H. Macy Jr.",
            "Amélie Poulain",
            "S/O Satyamurthy",
            "The Good, the Bad & the Ugly",
            "",
        ] {
            let once = normalize(raw, &aliases);
            assert_eq!(normalize(&once, &aliases), once, "not idempotent for {:?}", raw);
        }
    }

    #[test]
    fn test_alias_substitution_is_whole_word() {
        let aliases = AliasTable::from_pairs([("wm", "william")]);
        assert_eq!(normalize("Wm. Holden", &aliases), "william holden");
        // "wm" inside another token is left alone
        assert_eq!(normalize("Gwmley", &aliases), "gwmley");
    }

    #[test]
    fn test_ampersand_reads_as_and() {
        assert_eq!(
            normalize("Fast & Furious", &no_aliases()),
            "fast and furious"
        );
    }
}
