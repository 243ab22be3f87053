// round.rs
use crate::country::CountryRecord;
use crate::error::GameError;
use crate::game::{Game, Outcome, View};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

pub const STARTING_TROOPS: u8 = 3;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum RoundPhase {
    Active,
    Won,
    Lost,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum GuessEffect {
    Ignored,
    Hit,
    Miss,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundState {
    pub target_word: String,
    pub guessed_letters: BTreeSet<char>,
    pub troops_remaining: u8,
    pub phase: RoundPhase,
    pub country_key: String,
    pub country_name: String,
    pub flag_ref: String,
}

impl RoundState {
    pub fn new(country: &CountryRecord) -> Self {
        Self {
            target_word: country.puzzle_word(),
            guessed_letters: BTreeSet::new(),
            troops_remaining: STARTING_TROOPS,
            phase: RoundPhase::Active,
            country_key: country.normalized_key.clone(),
            country_name: country.name.clone(),
            flag_ref: country.flag_ref.clone(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase == RoundPhase::Active
    }

    /// Records an already uppercased letter. Repeats and guesses on a
    /// finished round are ignored.
    pub fn apply_guess(&mut self, letter: char) -> GuessEffect {
        if !self.is_active() || !self.guessed_letters.insert(letter) {
            return GuessEffect::Ignored;
        }
        if self.target_word.contains(letter) {
            GuessEffect::Hit
        } else {
            self.troops_remaining = self.troops_remaining.saturating_sub(1);
            GuessEffect::Miss
        }
    }

    pub fn is_solved(&self) -> bool {
        self.target_word
            .chars()
            .filter(|c| *c != ' ')
            .all(|c| self.guessed_letters.contains(&c))
    }

    /// Word as shown to the player, e.g. `P _ R U`. Word gaps render as
    /// three spaces.
    pub fn masked_word(&self) -> String {
        self.target_word
            .split(' ')
            .map(|word| {
                word.chars()
                    .map(|c| if self.guessed_letters.contains(&c) { c } else { '_' })
                    .join(" ")
            })
            .join("   ")
    }
}

impl Game {
    /// Starts a round on a random undominated country of the current
    /// continent, or completes the continent when none is left.
    pub fn new_round(&mut self) -> Result<Option<Outcome>, GameError> {
        let continent = match self.view {
            View::Loading { .. } => return Err(GameError::LoadInProgress),
            View::Round => self.current_continent.ok_or(GameError::NoContinentLoaded)?,
            _ => return Err(GameError::NoContinentLoaded),
        };
        if self.round.as_ref().is_some_and(RoundState::is_active) {
            return Err(GameError::RoundInProgress);
        }
        if self.board.get_countries(continent).is_empty() {
            return Err(GameError::NoContinentLoaded);
        }

        let candidates = self.board.undominated_indices(continent);
        if candidates.is_empty() {
            self.round = None;
            return Ok(Some(self.complete_continent(continent)));
        }

        let choice = candidates[self.picker.pick(candidates.len())];
        let country = &self.board.get_countries(continent)[choice];
        debug!(continent = %continent, country = %country.name, "starting round");
        self.round = Some(RoundState::new(country));
        self.last_outcome = None;
        Ok(None)
    }

    pub fn guess_letter(&mut self, letter: char) -> Result<Option<Outcome>, GameError> {
        if !letter.is_ascii_alphabetic() {
            return Err(GameError::InvalidLetter(letter));
        }
        let letter = letter.to_ascii_uppercase();
        let (Some(continent), Some(round)) = (self.current_continent, self.round.as_mut()) else {
            return Ok(None);
        };

        let effect = round.apply_guess(letter);
        match effect {
            GuessEffect::Ignored => return Ok(None),
            GuessEffect::Hit => {}
            GuessEffect::Miss => self.stats.break_streak(),
        }

        let outcome = if round.is_solved() {
            round.phase = RoundPhase::Won;
            let country = round.country_name.clone();
            let key = round.country_key.clone();
            self.stats.record_win();
            self.board.mark_dominated(continent, &key);
            self.persist();
            info!(
                continent = %continent,
                country = %country,
                streak = self.stats.current_streak,
                "country dominated"
            );
            Some(Outcome::CountryDominated {
                country,
                streak: self.stats.current_streak,
            })
        } else if round.troops_remaining == 0 {
            round.phase = RoundPhase::Lost;
            info!(continent = %continent, country = %round.country_name, "troops depleted");
            Some(Outcome::TroopsDepleted {
                country: round.country_name.clone(),
            })
        } else {
            None
        };

        match (&outcome, effect) {
            (Some(outcome), _) => self.show_feedback(outcome.message()),
            (None, GuessEffect::Hit) => self.show_feedback(format!("{letter} is in the name")),
            (None, _) => self.show_feedback(format!("{letter} cost you a troop")),
        }
        self.last_outcome = outcome.clone();
        Ok(outcome)
    }
}
