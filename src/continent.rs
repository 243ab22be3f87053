// continent.rs
use crate::error::GameError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Continent {
    Africa,
    Americas,
    Asia,
    Europe,
    Oceania,
}

impl Continent {
    pub const ALL: [Continent; 5] = [
        Continent::Africa,
        Continent::Americas,
        Continent::Asia,
        Continent::Europe,
        Continent::Oceania,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Continent::Africa => "Africa",
            Continent::Americas => "Americas",
            Continent::Asia => "Asia",
            Continent::Europe => "Europe",
            Continent::Oceania => "Oceania",
        }
    }

    /// Path segment used by the country data source.
    pub fn slug(&self) -> String {
        self.name().to_lowercase()
    }
}

impl fmt::Display for Continent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Continent {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Continent::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| GameError::UnknownContinent(s.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ContinentProgress {
    #[default]
    Available,
    InProgress { dominated: Vec<String> },
    Dominated,
}

impl ContinentProgress {
    pub fn is_dominated(&self) -> bool {
        matches!(self, ContinentProgress::Dominated)
    }

    pub fn dominated_names(&self) -> &[String] {
        match self {
            ContinentProgress::InProgress { dominated } => dominated,
            _ => &[],
        }
    }

    /// Records one more dominated country. `Available` becomes `InProgress`;
    /// a `Dominated` continent is left alone.
    pub fn add_dominated(&mut self, country: &str) {
        match self {
            ContinentProgress::Available => {
                *self = ContinentProgress::InProgress {
                    dominated: vec![country.to_string()],
                };
            }
            ContinentProgress::InProgress { dominated } => {
                if !dominated.iter().any(|name| name == country) {
                    dominated.push(country.to_string());
                }
            }
            ContinentProgress::Dominated => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_any_case() {
        assert_eq!("africa".parse::<Continent>(), Ok(Continent::Africa));
        assert_eq!(" OCEANIA ".parse::<Continent>(), Ok(Continent::Oceania));
        assert_eq!(
            "Atlantis".parse::<Continent>(),
            Err(GameError::UnknownContinent("Atlantis".to_string()))
        );
    }

    #[test]
    fn first_win_moves_available_to_in_progress() {
        let mut progress = ContinentProgress::Available;
        progress.add_dominated("Peru");
        progress.add_dominated("Chile");
        progress.add_dominated("Peru");
        assert_eq!(progress.dominated_names(), ["Peru", "Chile"]);
    }

    #[test]
    fn dominated_is_terminal_for_wins() {
        let mut progress = ContinentProgress::Dominated;
        progress.add_dominated("Peru");
        assert!(progress.is_dominated());
    }
}
