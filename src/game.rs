// game.rs
use crate::board::Board;
use crate::continent::{Continent, ContinentProgress};
use crate::country::CountryRecord;
use crate::error::{GameError, LoadError};
use crate::picker::IndexPicker;
use crate::player::PlayerStats;
use crate::progress_store::{ProgressSnapshot, ProgressStore};
use crate::round::{RoundPhase, RoundState, STARTING_TROOPS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View {
    ContinentMap,
    Loading { continent: Continent },
    LoadFailed { continent: Continent },
    Round,
    ContinentConquered { continent: Continent },
    GlobalVictory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    CountryDominated { country: String, streak: u32 },
    TroopsDepleted { country: String },
    ContinentConquered { continent: Continent },
    GlobalVictory,
}

impl Outcome {
    pub fn message(&self) -> String {
        match self {
            Outcome::CountryDominated { country, streak } => {
                format!("{country} dominated! Streak: {streak}")
            }
            Outcome::TroopsDepleted { country } => {
                format!("Your troops are depleted. The country was {country}.")
            }
            Outcome::ContinentConquered { continent } => format!("{continent} conquered!"),
            Outcome::GlobalVictory => "Every continent is yours. World domination!".to_string(),
        }
    }
}

/// Identifies one continent request. Only the latest ticket may apply its
/// result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub token: u64,
    pub continent: Continent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: u64,
    pub text: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameState {
    pub view: View,
    pub current_continent: Option<Continent>,
    pub continents: Vec<ContinentSummary>,
    pub round: Option<RoundView>,
    pub current_streak: u32,
    pub best_streak: u32,
    pub feedback: Option<Feedback>,
    pub last_outcome: Option<Outcome>,
    pub possible_actions: Vec<Action>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContinentSummary {
    pub continent: Continent,
    pub progress: ContinentProgress,
    pub dominated_count: usize,
    pub country_count: Option<usize>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoundView {
    pub masked_word: String,
    pub guessed_letters: Vec<char>,
    pub troops_remaining: u8,
    pub max_troops: u8,
    pub phase: RoundPhase,
    pub flag_ref: String,
    pub country_name: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    SelectContinent { continent: Continent },
    GuessLetter { letter: char },
    NewRound,
    QuitToMap,
    Acknowledge,
}

pub struct Game {
    pub board: Board,
    pub stats: PlayerStats,
    pub view: View,
    pub current_continent: Option<Continent>,
    pub round: Option<RoundState>,
    pub feedback: Option<Feedback>,
    pub last_outcome: Option<Outcome>,
    pub(crate) picker: Box<dyn IndexPicker>,
    store: Box<dyn ProgressStore>,
    load_token: u64,
    feedback_counter: u64,
}

impl Game {
    pub fn new(store: Box<dyn ProgressStore>, picker: Box<dyn IndexPicker>) -> Self {
        let snapshot = store.load();
        info!(best_streak = snapshot.best_streak, "progress loaded");
        let board = Board::new(snapshot.continent_status);
        // A campaign won before the last shutdown still needs its reset.
        let (view, last_outcome) = if board.all_dominated() {
            (View::GlobalVictory, Some(Outcome::GlobalVictory))
        } else {
            (View::ContinentMap, None)
        };
        Self {
            board,
            stats: PlayerStats::new(snapshot.best_streak),
            view,
            current_continent: None,
            round: None,
            feedback: None,
            last_outcome,
            picker,
            store,
            load_token: 0,
            feedback_counter: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.view, View::Loading { .. })
    }

    /// Moves to the loading view and hands out the ticket the fetch result
    /// must be presented with.
    pub fn select_continent(&mut self, continent: Continent) -> Result<LoadTicket, GameError> {
        if self.is_loading() {
            return Err(GameError::LoadInProgress);
        }
        if self.board.get_progress(continent).is_dominated() {
            return Err(GameError::ContinentDominated(continent));
        }
        self.load_token += 1;
        self.round = None;
        self.last_outcome = None;
        self.current_continent = Some(continent);
        self.view = View::Loading { continent };
        info!(continent = %continent, token = self.load_token, "loading continent");
        Ok(LoadTicket {
            token: self.load_token,
            continent,
        })
    }

    /// Applies a fetch result. Returns `Ok(false)` when the ticket is stale
    /// and the result was discarded.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<CountryRecord>, LoadError>,
    ) -> Result<bool, GameError> {
        let still_loading = self.view == View::Loading {
            continent: ticket.continent,
        };
        if ticket.token != self.load_token || !still_loading {
            warn!(
                continent = %ticket.continent,
                token = ticket.token,
                "discarding stale continent load"
            );
            return Ok(false);
        }

        let result = result.and_then(|records| {
            if records.is_empty() {
                Err(LoadError::Empty(ticket.continent))
            } else {
                Ok(records)
            }
        });
        match result {
            Ok(records) => {
                let stale = self.board.install_countries(ticket.continent, records);
                if !stale.is_empty() {
                    warn!(
                        continent = %ticket.continent,
                        ?stale,
                        "stored dominated countries missing from fetch"
                    );
                }
                self.view = View::Round;
                self.new_round()?;
            }
            Err(err) => {
                warn!(continent = %ticket.continent, error = %err, "continent load failed");
                self.view = View::LoadFailed {
                    continent: ticket.continent,
                };
                self.current_continent = None;
                self.show_feedback(format!("Could not load {}: {err}", ticket.continent));
            }
        }
        Ok(true)
    }

    pub(crate) fn complete_continent(&mut self, continent: Continent) -> Outcome {
        self.board.set_dominated(continent);
        self.persist();

        let outcome = if self.board.all_dominated() {
            self.view = View::GlobalVictory;
            Outcome::GlobalVictory
        } else {
            self.view = View::ContinentConquered { continent };
            Outcome::ContinentConquered { continent }
        };
        info!(continent = %continent, ?outcome, "continent complete");
        self.show_feedback(outcome.message());
        self.last_outcome = Some(outcome.clone());
        outcome
    }

    /// Dismisses a conquest screen. Global victory also starts a fresh
    /// campaign; the best streak is kept.
    pub fn acknowledge(&mut self) -> Result<(), GameError> {
        match self.view {
            View::GlobalVictory => {
                self.board.reset_campaign();
                self.persist();
                info!("campaign reset after global victory");
            }
            View::ContinentConquered { .. } => {}
            _ => return Err(GameError::NothingToAcknowledge),
        }
        self.return_to_map();
        Ok(())
    }

    /// Leaves the round or an outstanding load. A load still in flight will
    /// find its ticket stale. On a conquest screen this is an acknowledge,
    /// so global victory still resets the campaign.
    pub fn quit_to_map(&mut self) {
        match self.view {
            View::GlobalVictory | View::ContinentConquered { .. } => {
                if let Err(err) = self.acknowledge() {
                    warn!(error = %err, "quit could not dismiss the conquest screen");
                }
            }
            _ => self.return_to_map(),
        }
    }

    fn return_to_map(&mut self) {
        self.round = None;
        self.current_continent = None;
        self.last_outcome = None;
        self.view = View::ContinentMap;
    }

    pub(crate) fn show_feedback(&mut self, text: impl Into<String>) {
        self.feedback_counter += 1;
        self.feedback = Some(Feedback {
            id: self.feedback_counter,
            text: text.into(),
        });
    }

    pub fn feedback_id(&self) -> Option<u64> {
        self.feedback.as_ref().map(|f| f.id)
    }

    /// Clears the message only if it is still the one the timer was armed
    /// for. A failed load returns to the continent map at the same time.
    pub fn clear_feedback(&mut self, id: u64) -> bool {
        if self.feedback_id() != Some(id) {
            return false;
        }
        self.feedback = None;
        if matches!(self.view, View::LoadFailed { .. }) {
            self.view = View::ContinentMap;
        }
        true
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            best_streak: self.stats.best_streak,
            continent_status: self.board.progress.clone(),
        }
    }

    pub(crate) fn persist(&mut self) {
        let snapshot = self.snapshot();
        if let Err(err) = self.store.save(&snapshot) {
            warn!(error = %err, "failed to save progress");
        }
    }

    pub fn get_game_state(&self) -> GameState {
        let continents = Continent::ALL
            .iter()
            .map(|&continent| {
                let progress = self.board.get_progress(continent).clone();
                let countries = self.board.get_countries(continent);
                ContinentSummary {
                    continent,
                    dominated_count: match &progress {
                        ContinentProgress::Dominated if !countries.is_empty() => countries.len(),
                        other => other.dominated_names().len(),
                    },
                    country_count: (!countries.is_empty()).then_some(countries.len()),
                    progress,
                }
            })
            .collect();

        let round = self.round.as_ref().map(|round| RoundView {
            masked_word: round.masked_word(),
            guessed_letters: round.guessed_letters.iter().copied().collect(),
            troops_remaining: round.troops_remaining,
            max_troops: STARTING_TROOPS,
            phase: round.phase,
            flag_ref: round.flag_ref.clone(),
            country_name: (!round.is_active()).then(|| round.country_name.clone()),
        });

        GameState {
            view: self.view.clone(),
            current_continent: self.current_continent,
            continents,
            round,
            current_streak: self.stats.current_streak,
            best_streak: self.stats.best_streak,
            feedback: self.feedback.clone(),
            last_outcome: self.last_outcome.clone(),
            possible_actions: self.get_possible_actions(),
        }
    }

    pub fn get_possible_actions(&self) -> Vec<Action> {
        match &self.view {
            View::ContinentMap | View::LoadFailed { .. } => Continent::ALL
                .iter()
                .filter(|c| !self.board.get_progress(**c).is_dominated())
                .map(|&continent| Action::SelectContinent { continent })
                .collect(),
            View::Loading { .. } => vec![Action::QuitToMap],
            View::Round => {
                let mut actions = Vec::new();
                if let Some(round) = self.round.as_ref().filter(|r| r.is_active()) {
                    let guessed: &BTreeSet<char> = &round.guessed_letters;
                    actions.extend(
                        ('A'..='Z')
                            .filter(|letter| !guessed.contains(letter))
                            .map(|letter| Action::GuessLetter { letter }),
                    );
                } else {
                    actions.push(Action::NewRound);
                }
                actions.push(Action::QuitToMap);
                actions
            }
            View::ContinentConquered { .. } | View::GlobalVictory => vec![Action::Acknowledge],
        }
    }
}
