//! Pub Crawl Game Engine
//!
//! Platform-agnostic core for the pub crawl challenge game: the weighted
//! challenge pool, venue roster, session state machine and day-scoped
//! persistence. Rendering, timers and storage are supplied by the host.

pub mod challenges;
pub mod constants;
pub mod effects;
pub mod persistence;
pub mod session;
pub mod share;
pub mod state;
pub mod timers;
pub mod venues;

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

// Re-export commonly used types
pub use challenges::{
    Challenge, ChallengeEntry, ChallengePool, Difficulty, DifficultyWeights, PoolError,
};
pub use effects::{Celebration, Effect, EffectSink, Haptic, NoopEffects};
pub use persistence::{
    Clock, KeyValueStore, ManualClock, MemoryStore, SessionPersistence, SessionStore, Snapshot,
    StorageError, SystemClock,
};
pub use session::{Action, ActionOutcome, ChallengeSession, SessionView};
pub use share::ShareMessage;
pub use state::{MachineState, SessionState, UndoSnapshot};
pub use timers::{ManualScheduler, Scheduler, TaskHandle, TimerTask};
pub use venues::{VenueConfig, VenueProgress};

/// RNG used for challenge draws.
pub type SessionRng = ChaCha20Rng;

/// Deterministic RNG for a given seed.
#[must_use]
pub fn seeded_rng(seed: u64) -> SessionRng {
    ChaCha20Rng::seed_from_u64(seed)
}

/// Static data a session is built from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionData {
    pub pool: ChallengePool,
    pub venues: VenueConfig,
}

impl SessionData {
    /// Data embedded in the crate's assets.
    #[must_use]
    pub fn load_from_static() -> Self {
        Self {
            pool: ChallengePool::load_from_static(),
            venues: VenueConfig::load_from_static(),
        }
    }
}

/// Trait for abstracting data loading operations
/// Hosts that ship their own challenge packs provide this
pub trait SessionDataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the challenge pool
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be loaded or parsed.
    fn load_pool(&self) -> Result<ChallengePool, Self::Error>;

    /// Load the venue roster
    ///
    /// # Errors
    ///
    /// Returns an error if the roster cannot be loaded or parsed.
    fn load_venues(&self) -> Result<VenueConfig, Self::Error>;

    /// Load both in one go
    ///
    /// # Errors
    ///
    /// Returns the first loading error encountered.
    fn load_session_data(&self) -> Result<SessionData, Self::Error> {
        Ok(SessionData {
            pool: self.load_pool()?,
            venues: self.load_venues()?,
        })
    }
}

/// Loader backed by the JSON assets compiled into this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticDataLoader;

impl SessionDataLoader for StaticDataLoader {
    type Error = PoolError;

    fn load_pool(&self) -> Result<ChallengePool, Self::Error> {
        ChallengePool::from_json(challenges::STATIC_POOL)
    }

    fn load_venues(&self) -> Result<VenueConfig, Self::Error> {
        Ok(VenueConfig::load_from_static())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use std::convert::Infallible;

    #[derive(Clone, Copy, Default)]
    struct FixtureLoader;

    impl SessionDataLoader for FixtureLoader {
        type Error = Infallible;

        fn load_pool(&self) -> Result<ChallengePool, Self::Error> {
            Ok(ChallengePool::from_tiers(
                Vec::new(),
                vec![ChallengeEntry {
                    text: "Sing the chorus".to_string(),
                    icon: "🎤".to_string(),
                }],
                Vec::new(),
            ))
        }

        fn load_venues(&self) -> Result<VenueConfig, Self::Error> {
            Ok(VenueConfig::default_config())
        }
    }

    #[test]
    fn static_loader_matches_embedded_data() {
        let data = StaticDataLoader.load_session_data().unwrap();
        assert_eq!(data, SessionData::load_from_static());
        assert!(data.pool.total_count() > 0);
    }

    #[test]
    fn custom_loader_feeds_a_session() {
        let data = FixtureLoader.load_session_data().unwrap();
        let mut session = ChallengeSession::new(
            data,
            seeded_rng(1),
            ManualScheduler::new(),
            SessionStore::new(MemoryStore::new(), MemoryStore::new(), SystemClock),
            NoopEffects,
        );
        session.request_challenge();
        let shown = session.state().active_challenge.clone().unwrap();
        assert_eq!(shown.difficulty, Difficulty::Medium);
        assert_eq!(shown.text, "Sing the chorus");
    }

    #[test]
    fn seeded_rng_is_deterministic() {
        let mut a = seeded_rng(42);
        let mut b = seeded_rng(42);
        for _ in 0..4 {
            assert_eq!(a.gen_range(0..1_000_u32), b.gen_range(0..1_000_u32));
        }
    }
}
