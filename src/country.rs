// country.rs
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref PARENTHETICAL: Regex = Regex::new(r"\s*\([^)]*\)\s*").unwrap();
    static ref SPACE_RUN: Regex = Regex::new(r" {2,}").unwrap();
}

/// Reduces a country name to the guessable puzzle word: uppercase latin
/// letters and single spaces only.
pub fn normalize(raw_name: &str) -> String {
    let upper = raw_name.to_uppercase();
    let without_parens = PARENTHETICAL.replace_all(&upper, " ");
    let letters: String = without_parens
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_uppercase() || *c == ' ')
        .collect();
    SPACE_RUN.replace_all(letters.trim(), " ").into_owned()
}

/// A country as served by the data source, before filtering.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawCountry {
    #[serde(default)]
    pub name: RawName,
    #[serde(default)]
    pub flags: RawFlags,
    #[serde(default)]
    pub population: u64,
    #[serde(default)]
    pub area: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawName {
    #[serde(default)]
    pub common: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawFlags {
    pub svg: Option<String>,
}

impl RawCountry {
    pub fn new(name: &str, flag: &str, population: u64, area: f64) -> Self {
        Self {
            name: RawName {
                common: name.to_string(),
            },
            flags: RawFlags {
                svg: Some(flag.to_string()),
            },
            population,
            area,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountryRecord {
    pub name: String,
    pub flag_ref: String,
    pub normalized_key: String,
    pub is_dominated: bool,
}

impl CountryRecord {
    /// Keeps only entries with a name, a flag and more than `min_population`
    /// inhabitants.
    pub fn from_raw(raw: &RawCountry, min_population: u64) -> Option<Self> {
        let name = raw.name.common.trim();
        let flag_ref = raw.flags.svg.as_deref().map(str::trim).unwrap_or("");
        if name.is_empty() || flag_ref.is_empty() || raw.population <= min_population {
            return None;
        }
        if normalize(name).is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            flag_ref: flag_ref.to_string(),
            normalized_key: format!("{}{}", normalize(name), raw.area),
            is_dominated: false,
        })
    }

    pub fn puzzle_word(&self) -> String {
        normalize(&self.name)
    }
}
