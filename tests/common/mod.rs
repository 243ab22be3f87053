//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use country_hangman_server::continent::Continent;
use country_hangman_server::country::{CountryRecord, RawCountry};
use country_hangman_server::error::PersistenceError;
use country_hangman_server::game::Game;
use country_hangman_server::picker::SequencePicker;
use country_hangman_server::progress_store::{ProgressSnapshot, ProgressStore};
use std::sync::{Arc, Mutex};

/// Keeps every saved snapshot; `load` returns the latest one (or the seed).
#[derive(Clone, Default)]
pub struct RecordingStore {
    pub seed: ProgressSnapshot,
    pub saves: Arc<Mutex<Vec<ProgressSnapshot>>>,
}

impl RecordingStore {
    pub fn seeded(seed: ProgressSnapshot) -> Self {
        Self {
            seed,
            saves: Arc::default(),
        }
    }

    pub fn saves(&self) -> Vec<ProgressSnapshot> {
        self.saves.lock().unwrap().clone()
    }
}

impl ProgressStore for RecordingStore {
    fn load(&self) -> ProgressSnapshot {
        self.saves
            .lock()
            .unwrap()
            .last()
            .cloned()
            .unwrap_or_else(|| self.seed.clone())
    }

    fn save(&mut self, snapshot: &ProgressSnapshot) -> Result<(), PersistenceError> {
        self.saves.lock().unwrap().push(snapshot.clone());
        Ok(())
    }
}

pub fn records(names: &[&str]) -> Vec<CountryRecord> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let raw = RawCountry::new(name, &format!("{name}.svg"), 1_000_000, 100.0 + i as f64);
            CountryRecord::from_raw(&raw, 100_000).unwrap()
        })
        .collect()
}

pub fn game_with(store: RecordingStore, picks: impl IntoIterator<Item = usize>) -> Game {
    Game::new(Box::new(store), Box::new(SequencePicker::new(picks)))
}

/// Selects `continent` and feeds it `names` as the fetch result.
pub fn load(game: &mut Game, continent: Continent, names: &[&str]) {
    let ticket = game.select_continent(continent).unwrap();
    assert!(game.finish_load(ticket, Ok(records(names))).unwrap());
}

/// Guesses every distinct letter of the current target word.
pub fn solve_current(game: &mut Game) {
    let word = game.round.as_ref().unwrap().target_word.clone();
    for letter in word.chars().filter(|c| *c != ' ') {
        game.guess_letter(letter).unwrap();
    }
}

/// First letter of A-Z that does not occur in the current target word.
pub fn wrong_letter(game: &Game) -> char {
    let word = &game.round.as_ref().unwrap().target_word;
    ('A'..='Z').find(|c| !word.contains(*c)).unwrap()
}

/// The first `n` letters that do not occur in the current target word.
pub fn wrong_letters(game: &Game, n: usize) -> Vec<char> {
    let word = &game.round.as_ref().unwrap().target_word;
    ('A'..='Z').filter(|c| !word.contains(*c)).take(n).collect()
}
