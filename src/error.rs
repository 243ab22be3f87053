// error.rs
use crate::continent::Continent;
use thiserror::Error;

/// Failure to produce a playable country list for a continent.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LoadError {
    #[error("country service answered with HTTP status {status}")]
    Http { status: u16 },
    #[error("country service unreachable: {0}")]
    Network(String),
    #[error("country service sent an unreadable body: {0}")]
    Decode(String),
    #[error("no playable countries found for {0}")]
    Empty(Continent),
}

impl From<reqwest::Error> for LoadError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => LoadError::Http {
                status: status.as_u16(),
            },
            None if err.is_decode() => LoadError::Decode(err.to_string()),
            None => LoadError::Network(err.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("stored value for '{key}' is malformed: {reason}")]
    Malformed { key: String, reason: String },
    #[error("progress storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("progress could not be encoded: {0}")]
    Encode(String),
}

/// Rejected controller operations. None of these change game state.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GameError {
    #[error("'{0}' is not a continent")]
    UnknownContinent(String),
    #[error("{0} is already dominated")]
    ContinentDominated(Continent),
    #[error("a continent is still loading")]
    LoadInProgress,
    #[error("no continent has been loaded")]
    NoContinentLoaded,
    #[error("'{0}' is not a letter")]
    InvalidLetter(char),
    #[error("there is nothing to acknowledge")]
    NothingToAcknowledge,
    #[error("the current round is still being played")]
    RoundInProgress,
}
