use anyhow::{Result, ensure};
use serde::Serialize;

use crate::logic::CrawlTester;
use pubcrawl_game::{Challenge, Difficulty, seeded_rng};

/// Largest accepted gap between observed and configured tier share.
pub const DEFAULT_TOLERANCE: f64 = 0.03;

/// Tier counts for one seed's run of draws.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
}

impl TierCounts {
    fn record(&mut self, difficulty: Difficulty) {
        match difficulty {
            Difficulty::Easy => self.easy += 1,
            Difficulty::Medium => self.medium += 1,
            Difficulty::Hard => self.hard += 1,
        }
    }

    #[must_use]
    pub const fn get(&self, difficulty: Difficulty) -> usize {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.easy + self.medium + self.hard
    }

    fn absorb(&mut self, other: &Self) {
        self.easy += other.easy;
        self.medium += other.medium;
        self.hard += other.hard;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DistributionRecord {
    pub seed: u64,
    pub draws: usize,
    pub counts: TierCounts,
    /// Draws that repeated the previous challenge's text.
    pub repeats: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TierShare {
    pub difficulty: Difficulty,
    pub expected: f64,
    pub observed: f64,
}

impl TierShare {
    #[must_use]
    pub fn deviation(&self) -> f64 {
        (self.observed - self.expected).abs()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DistributionAggregate {
    pub seeds: usize,
    pub draws: usize,
    pub counts: TierCounts,
    pub repeats: usize,
    pub shares: Vec<TierShare>,
}

/// Draw `draws` challenges per seed the way the session does.
pub fn run_distribution_analysis(
    tester: &CrawlTester,
    seeds: &[u64],
    draws: usize,
) -> Vec<DistributionRecord> {
    let pool = &tester.data().pool;
    seeds
        .iter()
        .map(|&seed| {
            let mut rng = seeded_rng(seed);
            let mut counts = TierCounts::default();
            let mut repeats = 0;
            let mut last: Option<Challenge> = None;
            for _ in 0..draws {
                let Some(challenge) = pool.draw_avoiding(last.as_ref(), &mut rng) else {
                    break;
                };
                if last.as_ref().is_some_and(|prev| prev.text == challenge.text) {
                    repeats += 1;
                }
                counts.record(challenge.difficulty);
                last = Some(challenge);
            }
            if tester.verbose() {
                println!(
                    "  🎲 seed {seed}: easy {} medium {} hard {}",
                    counts.easy, counts.medium, counts.hard
                );
            }
            DistributionRecord {
                seed,
                draws: counts.total(),
                counts,
                repeats,
            }
        })
        .collect()
}

#[must_use]
pub fn aggregate_distribution(
    tester: &CrawlTester,
    records: &[DistributionRecord],
) -> DistributionAggregate {
    let mut counts = TierCounts::default();
    for record in records {
        counts.absorb(&record.counts);
    }
    let draws = counts.total();
    let weights = &tester.data().pool.weights;
    let weight_total: u32 = Difficulty::ALL
        .iter()
        .map(|difficulty| weights.weight(*difficulty))
        .sum();

    let shares = Difficulty::ALL
        .iter()
        .map(|&difficulty| TierShare {
            difficulty,
            expected: ratio(weights.weight(difficulty) as usize, weight_total as usize),
            observed: ratio(counts.get(difficulty), draws),
        })
        .collect();

    DistributionAggregate {
        seeds: records.len(),
        draws,
        counts,
        repeats: records.iter().map(|record| record.repeats).sum(),
        shares,
    }
}

#[allow(clippy::cast_precision_loss)]
fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Check observed tier shares against the configured weights.
pub fn validate_distribution(aggregate: &DistributionAggregate, tolerance: f64) -> Result<()> {
    ensure!(aggregate.draws > 0, "no challenges were drawn");
    for share in &aggregate.shares {
        ensure!(
            share.deviation() <= tolerance,
            "{} share {:.3} strays from {:.3} by more than {tolerance}",
            share.difficulty,
            share.observed,
            share.expected
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_every_draw() {
        let tester = CrawlTester::try_new(false);
        let records = run_distribution_analysis(&tester, &[1, 2], 500);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|record| record.draws == 500));
        assert!(records.iter().all(|record| record.counts.total() == 500));
    }

    #[test]
    fn large_sample_matches_weights() {
        let tester = CrawlTester::try_new(false);
        let records = run_distribution_analysis(&tester, &[1337, 42, 7], 10_000);
        let aggregate = aggregate_distribution(&tester, &records);
        assert_eq!(aggregate.draws, 30_000);
        let expected: Vec<f64> = aggregate.shares.iter().map(|share| share.expected).collect();
        assert_eq!(expected, vec![0.5, 0.35, 0.15]);
        validate_distribution(&aggregate, DEFAULT_TOLERANCE).unwrap();
    }

    #[test]
    fn validation_flags_skewed_samples() {
        let aggregate = DistributionAggregate {
            seeds: 1,
            draws: 100,
            counts: TierCounts {
                easy: 100,
                medium: 0,
                hard: 0,
            },
            repeats: 0,
            shares: vec![TierShare {
                difficulty: Difficulty::Easy,
                expected: 0.5,
                observed: 1.0,
            }],
        };
        assert!(validate_distribution(&aggregate, DEFAULT_TOLERANCE).is_err());
    }
}
