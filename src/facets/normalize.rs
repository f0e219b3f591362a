//! Facet value normalization.
//!
//! # Responsibilities
//! - Map raw product attributes to URL slugs
//! - Map user-supplied path segments to the same slugs
//!
//! # Design Decisions
//! - One normalizer per dimension, shared by every hub type
//! - Output alphabet is `[a-z0-9-]` (formulas: `[0-9x]`), so every
//!   normalizer is idempotent
//! - Cyrillic is transliterated before NFKD folding; whatever is still
//!   non-ASCII afterwards is dropped

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// A single product classification dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Line,
    Category,
    Formula,
    Engine,
    ModelCode,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Line,
        Dimension::Category,
        Dimension::Formula,
        Dimension::Engine,
        Dimension::ModelCode,
    ];

    /// Segment name used in hub paths.
    pub fn url_name(self) -> &'static str {
        match self {
            Dimension::Line => "line",
            Dimension::Category => "category",
            Dimension::Formula => "formula",
            Dimension::Engine => "engine",
            Dimension::ModelCode => "model",
        }
    }

    /// Parse a path segment name, case-insensitively.
    pub fn from_url_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.url_name().eq_ignore_ascii_case(name.trim()))
    }

    /// Normalize a raw value for this dimension.
    pub fn normalize(self, raw: &str) -> String {
        match self {
            Dimension::Formula => normalize_formula(raw),
            Dimension::Engine => normalize_engine(raw),
            Dimension::Line | Dimension::Category | Dimension::ModelCode => slugify(raw),
        }
    }
}

/// Wheel formula: lowercase, keep only digits and `x`.
///
/// `×` and Cyrillic `х` count as `x`, so "6Х4" and "6×4" both become "6x4".
pub fn normalize_formula(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .map(|c| match c {
            '\u{00d7}' | '\u{0445}' => 'x',
            other => other,
        })
        .filter(|c| c.is_ascii_digit() || *c == 'x')
        .collect()
}

/// Engine model: dots become hyphens, then the generic slug.
///
/// `WP13.550E501` → `wp13-550e501`.
pub fn normalize_engine(raw: &str) -> String {
    slugify(&raw.trim().replace('.', "-"))
}

/// Generic slug: case fold, transliterate, drop punctuation, collapse separators.
pub fn slugify(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();

    let mut transliterated = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        match transliterate(c) {
            Some(latin) => transliterated.push_str(latin),
            None => transliterated.push(c),
        }
    }

    let mut out = String::with_capacity(transliterated.len());
    let mut pending_separator = false;
    for c in transliterated.nfkd() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push('-');
            }
            pending_separator = false;
            out.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_separator = true;
        }
        // Anything else (punctuation, combining marks, other scripts) is dropped.
    }
    out
}

fn transliterate(c: char) -> Option<&'static str> {
    let latin = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' | 'ё' | 'э' => "e",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' | 'ы' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' | 'ь' => "",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    };
    Some(latin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_engine_slug() {
        assert_eq!(normalize_engine("WP13.550E501"), "wp13-550e501");
        assert_eq!(normalize_engine("WP10.336E53"), "wp10-336e53");
        assert_eq!(normalize_engine(" ISM 11.E5 "), "ism-11-e5");
    }

    #[test]
    fn test_formula() {
        assert_eq!(normalize_formula("6X4"), "6x4");
        assert_eq!(normalize_formula("8 × 4"), "8x4");
        assert_eq!(normalize_formula("4х2"), "4x2");
        assert_eq!(normalize_formula("n/a"), "");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("  X3000  Tractor__Unit -- 2024 "), "x3000-tractor-unit-2024");
        assert_eq!(slugify("SX4258GC4"), "sx4258gc4");
        assert_eq!(slugify("---"), "");
        assert_eq!(slugify("Dump/Truck!"), "dumptruck");
    }

    #[test]
    fn test_slugify_transliterates() {
        assert_eq!(slugify("Самосвалы"), "samosvaly");
        assert_eq!(slugify("Седельный тягач"), "sedelnyy-tyagach");
        assert_eq!(slugify("Café Crème"), "cafe-creme");
        assert_eq!(slugify("北京"), "");
    }

    #[test]
    fn test_dimension_names_round_trip() {
        for d in Dimension::ALL {
            assert_eq!(Dimension::from_url_name(d.url_name()), Some(d));
        }
        assert_eq!(Dimension::from_url_name("ENGINE"), Some(Dimension::Engine));
        assert_eq!(Dimension::from_url_name("color"), None);
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(raw in "\\PC{0,40}") {
            for d in Dimension::ALL {
                let once = d.normalize(&raw);
                prop_assert_eq!(d.normalize(&once), once.clone());
            }
        }

        #[test]
        fn normalization_is_idempotent_on_mixed_input(
            raw in "[A-Za-zА-Яа-яё0-9 ._×/-]{0,30}"
        ) {
            for d in Dimension::ALL {
                let once = d.normalize(&raw);
                prop_assert_eq!(d.normalize(&once), once.clone());
            }
        }
    }
}
