use serde::{Deserialize, Serialize};

use crate::challenges::Challenge;

/// Whether a challenge is currently on screen awaiting a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineState {
    Idle,
    ChallengeShown,
}

/// Values captured just before a completion so it can be reverted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoSnapshot {
    pub challenge: Challenge,
    pub count_before: u32,
    pub completions_at_venue_before: u32,
    /// Venue the completion was recorded at.
    pub venue_index: u32,
}

/// The single mutable entity behind a crawl session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub challenge_count: u32,
    pub current_venue_index: u32,
    pub completions_at_current_venue: u32,
    pub active_challenge: Option<Challenge>,
    pub last_shown_challenge: Option<Challenge>,
    pub completed_challenge_log: Vec<String>,
    pub undo: Option<UndoSnapshot>,
    pub share_prompt_shown: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::fresh()
    }
}

impl SessionState {
    #[must_use]
    pub const fn fresh() -> Self {
        Self {
            challenge_count: 0,
            current_venue_index: 1,
            completions_at_current_venue: 0,
            active_challenge: None,
            last_shown_challenge: None,
            completed_challenge_log: Vec::new(),
            undo: None,
            share_prompt_shown: false,
        }
    }

    #[must_use]
    pub const fn machine_state(&self) -> MachineState {
        if self.active_challenge.is_some() {
            MachineState::ChallengeShown
        } else {
            MachineState::Idle
        }
    }

    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self.machine_state(), MachineState::Idle)
    }

    #[must_use]
    pub const fn undo_available(&self) -> bool {
        self.undo.is_some()
    }

    /// Record a completion of the active challenge.
    ///
    /// Returns the completed challenge, or `None` when nothing was shown.
    pub(crate) fn record_completion(&mut self) -> Option<Challenge> {
        let challenge = self.active_challenge.take()?;
        self.undo = Some(UndoSnapshot {
            challenge: challenge.clone(),
            count_before: self.challenge_count,
            completions_at_venue_before: self.completions_at_current_venue,
            venue_index: self.current_venue_index,
        });
        self.completed_challenge_log.push(challenge.text.clone());
        self.challenge_count = self.challenge_count.saturating_add(1);
        self.completions_at_current_venue = self.completions_at_current_venue.saturating_add(1);
        Some(challenge)
    }

    /// Revert the last completion captured in the undo slot.
    ///
    /// The per-venue tally is only restored while still at the venue the
    /// completion happened at; a venue change already reset it.
    pub(crate) fn revert_completion(&mut self) -> Option<UndoSnapshot> {
        let snapshot = self.undo.take()?;
        self.challenge_count = snapshot.count_before;
        if snapshot.venue_index == self.current_venue_index {
            self.completions_at_current_venue = snapshot.completions_at_venue_before;
        }
        self.completed_challenge_log.pop();
        Some(snapshot)
    }

    pub(crate) fn advance_venue(&mut self) {
        self.current_venue_index = self.current_venue_index.saturating_add(1);
        self.completions_at_current_venue = 0;
    }

    pub(crate) fn retreat_venue(&mut self) -> bool {
        if self.current_venue_index <= 1 {
            return false;
        }
        self.current_venue_index -= 1;
        self.completions_at_current_venue = 0;
        true
    }
}
