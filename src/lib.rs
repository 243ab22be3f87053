// lib.rs
pub mod board;
pub mod continent;
pub mod country;
pub mod country_source;
pub mod error;
pub mod game;
pub mod game_config;
pub mod picker;
pub mod player;
pub mod progress_store;
pub mod round;
