// player.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerStats {
    pub current_streak: u32,
    pub best_streak: u32,
}

impl PlayerStats {
    pub fn new(best_streak: u32) -> Self {
        Self {
            current_streak: 0,
            best_streak,
        }
    }

    pub fn break_streak(&mut self) {
        self.current_streak = 0;
    }

    /// Counts a country win. Returns true when the best streak went up.
    pub fn record_win(&mut self) -> bool {
        self.current_streak += 1;
        if self.current_streak > self.best_streak {
            self.best_streak = self.current_streak;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_streak_follows_current_only_upwards() {
        let mut stats = PlayerStats::new(2);
        assert!(!stats.record_win());
        assert!(!stats.record_win());
        assert!(stats.record_win());
        assert_eq!(stats.best_streak, 3);

        stats.break_streak();
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.best_streak, 3);
    }
}
