// progress_store.rs
use crate::continent::{Continent, ContinentProgress};
use crate::error::PersistenceError;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

pub const BEST_STREAK_KEY: &str = "bestStreak";
pub const CONTINENT_STATUS_KEY: &str = "continentStatus";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressSnapshot {
    pub best_streak: u32,
    pub continent_status: BTreeMap<Continent, ContinentProgress>,
}

/// Where best streak and continent progress survive between sessions.
pub trait ProgressStore: Send {
    /// Never fails: unreadable fields come back as their defaults.
    fn load(&self) -> ProgressSnapshot;
    fn save(&mut self, snapshot: &ProgressSnapshot) -> Result<(), PersistenceError>;
}

/// String key-value backend in the shape of browser local storage.
pub trait KeyValueStore: Send {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

pub struct KeyValueProgressStore<K> {
    backend: K,
}

impl<K: KeyValueStore> KeyValueProgressStore<K> {
    pub fn new(backend: K) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &K {
        &self.backend
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.backend.get_item(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "progress entry unreadable, using default");
                None
            }
        }
    }
}

impl<K: KeyValueStore> ProgressStore for KeyValueProgressStore<K> {
    fn load(&self) -> ProgressSnapshot {
        let best_streak = self
            .read(BEST_STREAK_KEY)
            .map(|raw| decode_best_streak(&raw))
            .transpose()
            .unwrap_or_else(|err| {
                warn!(error = %err, "ignoring stored best streak");
                None
            })
            .unwrap_or(0);

        let continent_status = self
            .read(CONTINENT_STATUS_KEY)
            .map(|raw| decode_continent_status(&raw))
            .transpose()
            .unwrap_or_else(|err| {
                warn!(error = %err, "ignoring stored continent status");
                None
            })
            .unwrap_or_default();

        ProgressSnapshot {
            best_streak,
            continent_status,
        }
    }

    fn save(&mut self, snapshot: &ProgressSnapshot) -> Result<(), PersistenceError> {
        self.backend
            .set_item(BEST_STREAK_KEY, &snapshot.best_streak.to_string())?;
        self.backend.set_item(
            CONTINENT_STATUS_KEY,
            &encode_continent_status(&snapshot.continent_status),
        )?;
        debug!(best_streak = snapshot.best_streak, "progress saved");
        Ok(())
    }
}

pub fn decode_best_streak(raw: &str) -> Result<u32, PersistenceError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|err| PersistenceError::Malformed {
            key: BEST_STREAK_KEY.to_string(),
            reason: err.to_string(),
        })
}

pub fn encode_continent_status(status: &BTreeMap<Continent, ContinentProgress>) -> String {
    let mut map = Map::new();
    for (continent, progress) in status {
        let value = match progress {
            ContinentProgress::Available => json!("available"),
            ContinentProgress::Dominated => json!("dominated"),
            ContinentProgress::InProgress { dominated } => json!({
                "status": "in-progress",
                "countries": dominated,
            }),
        };
        map.insert(continent.name().to_string(), value);
    }
    Value::Object(map).to_string()
}

/// Reads both the plain-string and the object form of every entry. Entries
/// that cannot be understood are skipped; only a non-object document fails.
pub fn decode_continent_status(
    raw: &str,
) -> Result<BTreeMap<Continent, ContinentProgress>, PersistenceError> {
    let malformed = |reason: String| PersistenceError::Malformed {
        key: CONTINENT_STATUS_KEY.to_string(),
        reason,
    };
    let document: Value = serde_json::from_str(raw).map_err(|err| malformed(err.to_string()))?;
    let Value::Object(entries) = document else {
        return Err(malformed("expected a JSON object".to_string()));
    };

    let mut status = BTreeMap::new();
    for (key, value) in entries {
        let Ok(continent) = key.parse::<Continent>() else {
            debug!(key = %key, "skipping unknown continent in stored progress");
            continue;
        };
        match decode_progress(&value) {
            Some(progress) => {
                status.insert(continent, progress);
            }
            None => warn!(continent = %continent, "skipping malformed continent progress"),
        }
    }
    Ok(status)
}

fn decode_progress(value: &Value) -> Option<ContinentProgress> {
    let (label, countries) = match value {
        Value::String(label) => (label.as_str(), None),
        Value::Object(fields) => (
            fields.get("status")?.as_str()?,
            fields.get("countries").and_then(Value::as_array),
        ),
        _ => return None,
    };

    match label.to_ascii_lowercase().replace(['_', '-'], "").as_str() {
        "available" => Some(ContinentProgress::Available),
        "dominated" => Some(ContinentProgress::Dominated),
        "inprogress" => {
            let dominated: Vec<String> = countries?
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect();
            if dominated.is_empty() {
                Some(ContinentProgress::Available)
            } else {
                Some(ContinentProgress::InProgress { dominated })
            }
        }
        _ => None,
    }
}

/// Entries kept in a single JSON object on disk, rewritten on every set.
pub struct FileKeyValueStore {
    path: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<HashMap<String, String>, PersistenceError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(err) => return Err(err.into()),
        };
        serde_json::from_str(&data).map_err(|err| PersistenceError::Malformed {
            key: self.path.display().to_string(),
            reason: err.to_string(),
        })
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let mut items = self.read_all().unwrap_or_else(|err| {
            warn!(error = %err, "progress file unreadable, starting over");
            HashMap::new()
        });
        items.insert(key.to_string(), value.to_string());
        let data = serde_json::to_string_pretty(&items)
            .map_err(|err| PersistenceError::Encode(err.to_string()))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, data)?;
        Ok(())
    }
}

/// In-memory backend. Clones share their entries, so a clone kept outside
/// a `Game` can inspect or pre-seed what the game reads and writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items<'a>(items: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::new();
        if let Ok(mut map) = store.items.lock() {
            map.extend(items.into_iter().map(|(k, v)| (k.to_string(), v.to_string())));
        }
        store
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.items.lock().ok()?.get(key).cloned()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.get(key))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let mut items = self
            .items
            .lock()
            .map_err(|err| PersistenceError::Encode(err.to_string()))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_legacy_and_object_forms() {
        let raw = r#"{
            "Africa": "dominated",
            "Asia": "available",
            "Europe": {"status": "in-progress", "countries": ["France", 7, "Spain"]},
            "Oceania": {"status": "dominated"},
            "Atlantis": "dominated"
        }"#;
        let status = decode_continent_status(raw).unwrap();
        assert_eq!(status[&Continent::Africa], ContinentProgress::Dominated);
        assert_eq!(status[&Continent::Asia], ContinentProgress::Available);
        assert_eq!(
            status[&Continent::Europe],
            ContinentProgress::InProgress {
                dominated: vec!["France".to_string(), "Spain".to_string()]
            }
        );
        assert_eq!(status[&Continent::Oceania], ContinentProgress::Dominated);
        assert!(!status.contains_key(&Continent::Americas));
    }

    #[test]
    fn skips_unreadable_entries_only() {
        let raw = r#"{"Africa": 42, "Asia": {"status": "conquering"}, "Europe": "dominated"}"#;
        let status = decode_continent_status(raw).unwrap();
        assert_eq!(status.len(), 1);
        assert_eq!(status[&Continent::Europe], ContinentProgress::Dominated);
    }

    #[test]
    fn rejects_non_object_documents() {
        assert!(decode_continent_status("[1, 2]").is_err());
        assert!(decode_continent_status("{not json").is_err());
    }

    #[test]
    fn encodes_in_progress_as_object() {
        let mut status = BTreeMap::new();
        status.insert(
            Continent::Americas,
            ContinentProgress::InProgress {
                dominated: vec!["Peru".to_string()],
            },
        );
        status.insert(Continent::Africa, ContinentProgress::Dominated);
        let encoded: Value = serde_json::from_str(&encode_continent_status(&status)).unwrap();
        assert_eq!(
            encoded,
            json!({
                "Africa": "dominated",
                "Americas": {"status": "in-progress", "countries": ["Peru"]}
            })
        );
    }

    #[test]
    fn malformed_streak_falls_back_without_touching_status() {
        let backend = MemoryKeyValueStore::with_items([
            (BEST_STREAK_KEY, "seven"),
            (CONTINENT_STATUS_KEY, r#"{"Asia": "dominated"}"#),
        ]);
        let snapshot = KeyValueProgressStore::new(backend).load();
        assert_eq!(snapshot.best_streak, 0);
        assert_eq!(snapshot.continent_status[&Continent::Asia], ContinentProgress::Dominated);
    }

    #[test]
    fn empty_backend_loads_defaults() {
        let snapshot = KeyValueProgressStore::new(MemoryKeyValueStore::new()).load();
        assert_eq!(snapshot, ProgressSnapshot::default());
    }
}
