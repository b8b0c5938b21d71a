//! Challenge pool and weighted draws
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{EASY_WEIGHT, HARD_WEIGHT, MAX_REDRAWS, MEDIUM_WEIGHT};

pub(crate) const STATIC_POOL: &str = include_str!("../assets/challenges.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(()),
        }
    }
}

/// A single prompt shown to the player. Immutable once drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub text: String,
    pub icon: String,
    pub difficulty: Difficulty,
}

/// Pool entry before it is tagged with its tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeEntry {
    pub text: String,
    #[serde(default)]
    pub icon: String,
}

impl ChallengeEntry {
    fn tagged(&self, difficulty: Difficulty) -> Challenge {
        Challenge {
            text: self.text.clone(),
            icon: self.icon.clone(),
            difficulty,
        }
    }
}

/// Percent weights used to pick a difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyWeights {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

impl Default for DifficultyWeights {
    fn default() -> Self {
        Self {
            easy: EASY_WEIGHT,
            medium: MEDIUM_WEIGHT,
            hard: HARD_WEIGHT,
        }
    }
}

impl DifficultyWeights {
    #[must_use]
    pub const fn weight(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("challenge pool JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),
    #[error("challenge pool contains no challenges")]
    Empty,
}

/// Static, tiered challenge data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ChallengePool {
    #[serde(default)]
    pub easy: Vec<ChallengeEntry>,
    #[serde(default)]
    pub medium: Vec<ChallengeEntry>,
    #[serde(default)]
    pub hard: Vec<ChallengeEntry>,
    #[serde(default, skip_serializing)]
    pub weights: DifficultyWeights,
}

impl ChallengePool {
    /// Parse a pool from its JSON asset form.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or every tier is empty.
    pub fn from_json(json: &str) -> Result<Self, PoolError> {
        let pool: Self = serde_json::from_str(json)?;
        if pool.total_count() == 0 {
            return Err(PoolError::Empty);
        }
        Ok(pool)
    }

    /// Pool embedded in the crate's assets.
    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(STATIC_POOL).unwrap_or_else(|err| {
            log::error!("embedded challenge pool failed to load: {err}");
            Self::default()
        })
    }

    /// Build a pool from explicit tiers (tests, custom hosts).
    #[must_use]
    pub fn from_tiers(
        easy: Vec<ChallengeEntry>,
        medium: Vec<ChallengeEntry>,
        hard: Vec<ChallengeEntry>,
    ) -> Self {
        Self {
            easy,
            medium,
            hard,
            weights: DifficultyWeights::default(),
        }
    }

    #[must_use]
    pub fn tier(&self, difficulty: Difficulty) -> &[ChallengeEntry] {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        }
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.easy.len() + self.medium.len() + self.hard.len()
    }

    /// Pick a tier by weight, then a challenge uniformly within it.
    pub fn draw<R: Rng>(&self, rng: &mut R) -> Option<Challenge> {
        let weighted: Vec<(Difficulty, u32)> = Difficulty::ALL
            .iter()
            .filter(|difficulty| !self.tier(**difficulty).is_empty())
            .map(|difficulty| (*difficulty, self.weights.weight(*difficulty)))
            .collect();
        let difficulty = choose_weighted(&weighted, rng)?;
        self.draw_from(difficulty, rng)
    }

    /// Uniform draw restricted to one tier.
    pub fn draw_from<R: Rng>(
        &self,
        difficulty: Difficulty,
        rng: &mut R,
    ) -> Option<Challenge> {
        let tier = self.tier(difficulty);
        if tier.is_empty() {
            return None;
        }
        let idx = rng.gen_range(0..tier.len());
        tier.get(idx).map(|entry| entry.tagged(difficulty))
    }

    /// Draw while avoiding an immediate textual repeat of `last`.
    ///
    /// Re-draws at most [`MAX_REDRAWS`] times and keeps the final draw even if
    /// it still collides, so a single-entry pool cannot loop forever.
    pub fn draw_avoiding<R: Rng>(
        &self,
        last: Option<&Challenge>,
        rng: &mut R,
    ) -> Option<Challenge> {
        let mut challenge = self.draw(rng)?;
        let Some(last) = last else {
            return Some(challenge);
        };
        let mut redraws = 0;
        while challenge.text == last.text && redraws < MAX_REDRAWS {
            challenge = self.draw(rng)?;
            redraws += 1;
        }
        if challenge.text == last.text {
            log::debug!("accepting repeat after {redraws} redraws: {}", challenge.text);
        }
        Some(challenge)
    }
}

/// Cumulative-roll weighted choice. An all-zero table falls back to its first entry.
fn choose_weighted<T: Copy, R: Rng>(weights: &[(T, u32)], rng: &mut R) -> Option<T> {
    let total_weight: u32 = weights.iter().map(|(_, weight)| *weight).sum();
    if total_weight == 0 {
        return weights.first().map(|(item, _)| *item);
    }

    let roll = rng.gen_range(0..total_weight);
    let mut current = 0;
    for (item, weight) in weights {
        current += *weight;
        if roll < current {
            return Some(*item);
        }
    }

    weights.first().map(|(item, _)| *item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use std::collections::HashMap;

    fn entry(text: &str) -> ChallengeEntry {
        ChallengeEntry {
            text: text.to_string(),
            icon: "🍺".to_string(),
        }
    }

    #[test]
    fn static_pool_loads_all_tiers() {
        let pool = ChallengePool::load_from_static();
        assert_eq!(pool.easy.len(), 9);
        assert_eq!(pool.medium.len(), 12);
        assert_eq!(pool.hard.len(), 5);
        assert_eq!(pool.total_count(), 26);
    }

    #[test]
    fn from_json_rejects_empty_pool() {
        let err = ChallengePool::from_json(r#"{"easy": []}"#).unwrap_err();
        assert!(matches!(err, PoolError::Empty));
        assert!(matches!(
            ChallengePool::from_json("not json"),
            Err(PoolError::Json(_))
        ));
    }

    #[test]
    fn draw_tags_difficulty_from_tier() {
        let pool = ChallengePool::from_tiers(vec![], vec![], vec![entry("only hard")]);
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let challenge = pool.draw(&mut rng).unwrap();
        assert_eq!(challenge.difficulty, Difficulty::Hard);
        assert_eq!(challenge.text, "only hard");
    }

    #[test]
    fn empty_pool_draws_nothing() {
        let pool = ChallengePool::default();
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        assert!(pool.draw(&mut rng).is_none());
        assert!(pool.draw_from(Difficulty::Easy, &mut rng).is_none());
    }

    #[test]
    fn weighted_tiers_follow_configured_shares() {
        let pool = ChallengePool::load_from_static();
        let mut rng = ChaCha20Rng::seed_from_u64(0x00C0_FFEE);
        let mut counts: HashMap<Difficulty, u32> = HashMap::new();
        for _ in 0..10_000 {
            let challenge = pool.draw(&mut rng).unwrap();
            *counts.entry(challenge.difficulty).or_default() += 1;
        }
        let easy = counts[&Difficulty::Easy];
        let medium = counts[&Difficulty::Medium];
        let hard = counts[&Difficulty::Hard];
        assert!((4_700..=5_300).contains(&easy), "easy {easy}");
        assert!((3_200..=3_800).contains(&medium), "medium {medium}");
        assert!((1_200..=1_800).contains(&hard), "hard {hard}");
    }

    #[test]
    fn draw_avoiding_skips_immediate_repeat() {
        let pool = ChallengePool::from_tiers(vec![entry("a"), entry("b")], vec![], vec![]);
        let mut rng = ChaCha20Rng::seed_from_u64(99);
        let mut last = pool.draw(&mut rng).unwrap();
        for _ in 0..200 {
            let next = pool.draw_avoiding(Some(&last), &mut rng).unwrap();
            assert_ne!(next.text, last.text);
            last = next;
        }
    }

    #[test]
    fn draw_avoiding_accepts_repeat_from_single_entry_pool() {
        let pool = ChallengePool::from_tiers(vec![entry("solo")], vec![], vec![]);
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let last = pool.draw(&mut rng).unwrap();
        let next = pool.draw_avoiding(Some(&last), &mut rng).unwrap();
        assert_eq!(next.text, "solo");
    }

    #[test]
    fn difficulty_parses_and_displays() {
        for difficulty in Difficulty::ALL {
            assert_eq!(difficulty.as_str().parse::<Difficulty>(), Ok(difficulty));
            assert_eq!(difficulty.to_string(), difficulty.as_str());
        }
        assert!("legendary".parse::<Difficulty>().is_err());
    }

    #[test]
    fn choose_weighted_handles_zero_weights() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        assert_eq!(choose_weighted(&[(1_u8, 0), (2, 0)], &mut rng), Some(1));
        assert_eq!(choose_weighted::<u8, _>(&[], &mut rng), None);
        assert_eq!(choose_weighted(&[(1_u8, 0), (2, 10)], &mut rng), Some(2));
    }
}
