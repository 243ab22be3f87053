// board.rs
use crate::continent::{Continent, ContinentProgress};
use crate::country::CountryRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Fetched country pools plus per-continent progress.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Board {
    pub countries: HashMap<Continent, Vec<CountryRecord>>,
    pub progress: BTreeMap<Continent, ContinentProgress>,
}

impl Board {
    pub fn new(progress: BTreeMap<Continent, ContinentProgress>) -> Self {
        let mut board = Self {
            countries: HashMap::new(),
            progress,
        };
        for continent in Continent::ALL {
            board.progress.entry(continent).or_default();
        }
        board
    }

    pub fn get_progress(&self, continent: Continent) -> &ContinentProgress {
        const AVAILABLE: &ContinentProgress = &ContinentProgress::Available;
        self.progress.get(&continent).unwrap_or(AVAILABLE)
    }

    pub fn get_countries(&self, continent: Continent) -> &[CountryRecord] {
        self.countries
            .get(&continent)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Installs a freshly fetched pool, marking countries recorded as
    /// dominated. Stored names missing from the pool are dropped from the
    /// progress and returned.
    pub fn install_countries(
        &mut self,
        continent: Continent,
        mut records: Vec<CountryRecord>,
    ) -> Vec<String> {
        let progress = self.progress.entry(continent).or_default();
        let mut stale = Vec::new();

        if let ContinentProgress::InProgress { dominated } = progress {
            let fetched: HashSet<&str> = records.iter().map(|r| r.name.as_str()).collect();
            let (kept, dropped): (Vec<String>, Vec<String>) = dominated
                .drain(..)
                .partition(|name| fetched.contains(name.as_str()));
            stale = dropped;

            for record in records.iter_mut() {
                if kept.contains(&record.name) {
                    record.is_dominated = true;
                }
            }
            *progress = if kept.is_empty() {
                ContinentProgress::Available
            } else {
                ContinentProgress::InProgress { dominated: kept }
            };
        }

        self.countries.insert(continent, records);
        stale
    }

    pub fn undominated_indices(&self, continent: Continent) -> Vec<usize> {
        self.get_countries(continent)
            .iter()
            .enumerate()
            .filter(|(_, record)| !record.is_dominated)
            .map(|(index, _)| index)
            .collect()
    }

    /// Flags the country with `normalized_key` and appends it to the
    /// continent's progress. Returns false if the key is unknown or the
    /// country was already dominated.
    pub fn mark_dominated(&mut self, continent: Continent, normalized_key: &str) -> bool {
        let Some(record) = self
            .countries
            .get_mut(&continent)
            .and_then(|records| records.iter_mut().find(|r| r.normalized_key == normalized_key))
        else {
            return false;
        };
        if record.is_dominated {
            return false;
        }
        record.is_dominated = true;
        let name = record.name.clone();
        self.progress.entry(continent).or_default().add_dominated(&name);
        true
    }

    pub fn set_dominated(&mut self, continent: Continent) {
        self.progress.insert(continent, ContinentProgress::Dominated);
    }

    pub fn all_dominated(&self) -> bool {
        Continent::ALL
            .iter()
            .all(|continent| self.get_progress(*continent).is_dominated())
    }

    /// Starts a new campaign. Cached pools are cleared along with their
    /// dominated flags.
    pub fn reset_campaign(&mut self) {
        self.countries.clear();
        for continent in Continent::ALL {
            self.progress.insert(continent, ContinentProgress::Available);
        }
    }
}
