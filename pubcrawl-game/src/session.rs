//! The challenge session state machine.
//!
//! A [`ChallengeSession`] owns the [`SessionState`] and every capability it
//! needs: randomness, a scheduler for delayed tasks, persistence and an
//! effect sink. Hosts forward button presses through [`ChallengeSession::dispatch`]
//! and timer callbacks through [`ChallengeSession::fire`].
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::SessionData;
use crate::challenges::{Challenge, ChallengePool};
use crate::constants::{
    INPUT_DEBOUNCE, SHARE_PROMPT_DELAY, SHARE_PROMPT_THRESHOLD, TOAST_COMPLETED, TOAST_SKIPPED,
    TOAST_UNDONE, UNDO_WINDOW, VENUE_PULSE_THRESHOLD,
};
use crate::effects::{Celebration, Effect, EffectSink, Haptic};
use crate::persistence::SessionPersistence;
use crate::share::ShareMessage;
use crate::state::{MachineState, SessionState};
use crate::timers::{ManualScheduler, Scheduler, TaskHandle, TimerTask};
use crate::venues::{VenueConfig, VenueProgress};

/// User-facing buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    RequestChallenge,
    CompleteChallenge,
    SkipChallenge,
    Undo,
    NextVenue,
    PreviousVenue,
    Reset,
    Share,
}

impl Action {
    pub const ALL: [Self; 8] = [
        Self::RequestChallenge,
        Self::CompleteChallenge,
        Self::SkipChallenge,
        Self::Undo,
        Self::NextVenue,
        Self::PreviousVenue,
        Self::Reset,
        Self::Share,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RequestChallenge => "request-challenge",
            Self::CompleteChallenge => "complete-challenge",
            Self::SkipChallenge => "skip-challenge",
            Self::Undo => "undo",
            Self::NextVenue => "next-venue",
            Self::PreviousVenue => "previous-venue",
            Self::Reset => "reset",
            Self::Share => "share",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of handing an action to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionOutcome {
    /// The transition ran.
    Applied,
    /// Not valid in the current state; nothing changed.
    Ignored,
    /// Dropped by the input guard.
    Suppressed,
}

impl ActionOutcome {
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct TimerSlots {
    undo_expiry: Option<TaskHandle>,
    share_prompt: Option<TaskHandle>,
    input_release: Option<TaskHandle>,
}

/// Read model consumed by renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub challenge_count: u32,
    pub machine_state: MachineState,
    pub active_challenge: Option<Challenge>,
    pub venue: VenueProgress,
    pub completions_at_current_venue: u32,
    pub undo_available: bool,
    pub completed_count: usize,
    pub share_prompt_shown: bool,
    pub input_locked: bool,
}

pub struct ChallengeSession<R, T, P, E>
where
    R: Rng,
    T: Scheduler,
    P: SessionPersistence,
    E: EffectSink,
{
    state: SessionState,
    pool: ChallengePool,
    venues: VenueConfig,
    rng: R,
    scheduler: T,
    persistence: P,
    effects: E,
    timers: TimerSlots,
}

impl<R, T, P, E> ChallengeSession<R, T, P, E>
where
    R: Rng,
    T: Scheduler,
    P: SessionPersistence,
    E: EffectSink,
{
    /// Fresh session that ignores anything already persisted.
    pub fn new(data: SessionData, rng: R, scheduler: T, persistence: P, effects: E) -> Self {
        Self {
            state: SessionState::fresh(),
            pool: data.pool,
            venues: data.venues,
            rng,
            scheduler,
            persistence,
            effects,
            timers: TimerSlots::default(),
        }
    }

    /// Session rehydrated from today's snapshot, or fresh if there is none.
    pub fn start(data: SessionData, rng: R, scheduler: T, persistence: P, effects: E) -> Self {
        let mut session = Self::new(data, rng, scheduler, persistence, effects);
        if let Some(state) = session.persistence.load() {
            log::debug!(
                "resuming session: {} completed, venue {}",
                state.challenge_count,
                state.current_venue_index
            );
            session.state = state;
            if let Some(challenge) = session.state.active_challenge.clone() {
                session.effects.emit(Effect::ChallengeRevealed(challenge));
            }
        }
        session
    }

    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub const fn pool(&self) -> &ChallengePool {
        &self.pool
    }

    #[must_use]
    pub const fn venues(&self) -> &VenueConfig {
        &self.venues
    }

    pub const fn scheduler(&self) -> &T {
        &self.scheduler
    }

    pub const fn scheduler_mut(&mut self) -> &mut T {
        &mut self.scheduler
    }

    pub const fn persistence(&self) -> &P {
        &self.persistence
    }

    pub const fn effects(&self) -> &E {
        &self.effects
    }

    pub const fn effects_mut(&mut self) -> &mut E {
        &mut self.effects
    }

    #[must_use]
    pub const fn input_locked(&self) -> bool {
        self.timers.input_release.is_some()
    }

    #[must_use]
    pub const fn share_prompt_pending(&self) -> bool {
        self.timers.share_prompt.is_some()
    }

    #[must_use]
    pub fn view(&self) -> SessionView {
        SessionView {
            challenge_count: self.state.challenge_count,
            machine_state: self.state.machine_state(),
            active_challenge: self.state.active_challenge.clone(),
            venue: self.venues.progress_for(self.state.current_venue_index),
            completions_at_current_venue: self.state.completions_at_current_venue,
            undo_available: self.state.undo_available(),
            completed_count: self.state.completed_challenge_log.len(),
            share_prompt_shown: self.state.share_prompt_shown,
            input_locked: self.input_locked(),
        }
    }

    /// Share text for the current progress.
    #[must_use]
    pub fn share_message(&self) -> ShareMessage {
        ShareMessage::compose(
            self.state.challenge_count,
            &self.state.completed_challenge_log,
            self.venues.name_for(self.state.current_venue_index),
        )
    }

    /// Entry point for button presses.
    ///
    /// Every accepted press closes the input guard for [`INPUT_DEBOUNCE`];
    /// presses arriving while it is closed are dropped.
    pub fn dispatch(&mut self, action: Action) -> ActionOutcome {
        if self.input_locked() {
            log::debug!("input guard dropped {action}");
            return ActionOutcome::Suppressed;
        }
        self.timers.input_release = Some(
            self.scheduler
                .schedule(TimerTask::InputRelease, INPUT_DEBOUNCE),
        );

        let outcome = match action {
            Action::RequestChallenge => self.request_challenge(),
            Action::CompleteChallenge => self.complete_challenge(),
            Action::SkipChallenge => self.skip_challenge(),
            Action::Undo => self.undo(),
            Action::NextVenue => self.advance_venue(),
            Action::PreviousVenue => self.retreat_venue(),
            Action::Reset => self.reset_session(),
            Action::Share => self.share(),
        };
        log::debug!("{action} -> {outcome:?}");
        outcome
    }

    /// Timer callback. Returns the task that ran, or `None` for a stale handle.
    pub fn fire(&mut self, handle: TaskHandle) -> Option<TimerTask> {
        if self.timers.input_release == Some(handle) {
            self.timers.input_release = None;
            return Some(TimerTask::InputRelease);
        }
        if self.timers.undo_expiry == Some(handle) {
            self.timers.undo_expiry = None;
            self.expire_undo();
            return Some(TimerTask::UndoExpiry);
        }
        if self.timers.share_prompt == Some(handle) {
            self.timers.share_prompt = None;
            self.show_share_prompt();
            return Some(TimerTask::SharePrompt);
        }
        log::debug!("ignoring stale timer {handle:?}");
        None
    }

    pub fn request_challenge(&mut self) -> ActionOutcome {
        if !self.state.is_idle() {
            return ActionOutcome::Ignored;
        }
        let Some(challenge) = self
            .pool
            .draw_avoiding(self.state.last_shown_challenge.as_ref(), &mut self.rng)
        else {
            log::warn!("challenge pool is empty; nothing to draw");
            return ActionOutcome::Ignored;
        };

        self.state.active_challenge = Some(challenge.clone());
        self.state.last_shown_challenge = Some(challenge.clone());
        self.persist();
        self.effects.emit(Effect::ChallengeRevealed(challenge));
        self.effects.emit(Effect::Haptic(Haptic::Pulse));
        ActionOutcome::Applied
    }

    pub fn complete_challenge(&mut self) -> ActionOutcome {
        let Some(challenge) = self.state.record_completion() else {
            return ActionOutcome::Ignored;
        };
        log::debug!(
            "completed {} challenge, total {}",
            challenge.difficulty,
            self.state.challenge_count
        );

        if let Some(previous) = self.timers.undo_expiry.take() {
            self.scheduler.cancel(previous);
        }
        self.timers.undo_expiry = Some(self.scheduler.schedule(TimerTask::UndoExpiry, UNDO_WINDOW));

        if self.state.challenge_count == SHARE_PROMPT_THRESHOLD
            && !self.state.share_prompt_shown
            && self.timers.share_prompt.is_none()
        {
            self.timers.share_prompt = Some(
                self.scheduler
                    .schedule(TimerTask::SharePrompt, SHARE_PROMPT_DELAY),
            );
        }

        self.persist();
        self.effects.emit(Effect::ChallengeCleared);
        self.effects.emit(Effect::Toast(TOAST_COMPLETED.to_string()));
        self.effects.emit(Effect::Celebrate(Celebration::Burst));
        self.effects.emit(Effect::Haptic(Haptic::Cheer));
        self.effects.emit(Effect::UndoAvailable(true));
        if self.state.completions_at_current_venue >= VENUE_PULSE_THRESHOLD {
            let next = self.state.current_venue_index.saturating_add(1);
            self.effects
                .emit(Effect::SuggestNextVenue(self.venues.name_for(next).to_string()));
        }
        ActionOutcome::Applied
    }

    pub fn skip_challenge(&mut self) -> ActionOutcome {
        if self.state.active_challenge.take().is_none() {
            return ActionOutcome::Ignored;
        }
        self.persist();
        self.effects.emit(Effect::ChallengeCleared);
        self.effects.emit(Effect::Toast(TOAST_SKIPPED.to_string()));
        self.effects.emit(Effect::Haptic(Haptic::Tap));
        ActionOutcome::Applied
    }

    pub fn undo(&mut self) -> ActionOutcome {
        let Some(snapshot) = self.state.revert_completion() else {
            return ActionOutcome::Ignored;
        };
        if let Some(handle) = self.timers.undo_expiry.take() {
            self.scheduler.cancel(handle);
        }
        log::debug!("undid completion of {:?}", snapshot.challenge.text);
        self.persist();
        self.effects.emit(Effect::Toast(TOAST_UNDONE.to_string()));
        self.effects.emit(Effect::UndoAvailable(false));
        ActionOutcome::Applied
    }

    pub fn advance_venue(&mut self) -> ActionOutcome {
        self.state.advance_venue();
        self.persist();
        let index = self.state.current_venue_index;
        self.effects.emit(Effect::Celebrate(Celebration::Burst));
        self.effects.emit(Effect::Haptic(Haptic::Cheer));
        self.effects
            .emit(Effect::Toast(self.venues.arrival_message(index)));
        ActionOutcome::Applied
    }

    pub fn retreat_venue(&mut self) -> ActionOutcome {
        if !self.state.retreat_venue() {
            return ActionOutcome::Ignored;
        }
        self.persist();
        let index = self.state.current_venue_index;
        self.effects.emit(Effect::Haptic(Haptic::Tap));
        self.effects
            .emit(Effect::Toast(self.venues.return_message(index)));
        ActionOutcome::Applied
    }

    /// Back to a fresh session. Clears storage and re-arms the share prompt.
    pub fn reset_session(&mut self) -> ActionOutcome {
        for handle in [self.timers.undo_expiry.take(), self.timers.share_prompt.take()]
            .into_iter()
            .flatten()
        {
            self.scheduler.cancel(handle);
        }
        self.state = SessionState::fresh();
        self.persistence.clear();
        self.effects.emit(Effect::ChallengeCleared);
        self.effects.emit(Effect::UndoAvailable(false));
        ActionOutcome::Applied
    }

    /// Open the share target with the current progress.
    pub fn share(&mut self) -> ActionOutcome {
        let url = self.share_message().whatsapp_url();
        self.effects.emit(Effect::OpenShare(url));
        self.effects.emit(Effect::Haptic(Haptic::Pulse));
        ActionOutcome::Applied
    }

    fn expire_undo(&mut self) {
        if self.state.undo.take().is_some() {
            self.effects.emit(Effect::UndoAvailable(false));
        }
    }

    fn show_share_prompt(&mut self) {
        if self.state.share_prompt_shown {
            return;
        }
        let message = self.share_message();
        self.state.share_prompt_shown = true;
        self.persist();
        self.effects.emit(Effect::SharePrompt(message));
        self.effects.emit(Effect::Celebrate(Celebration::Grand));
    }

    fn persist(&self) {
        self.persistence.save(&self.state);
    }
}

impl<R, P, E> ChallengeSession<R, ManualScheduler, P, E>
where
    R: Rng,
    P: SessionPersistence,
    E: EffectSink,
{
    /// Move virtual time forward and run every task that came due.
    pub fn advance_time(&mut self, by: Duration) -> Vec<TimerTask> {
        let due = self.scheduler.advance(by);
        due.into_iter().filter_map(|handle| self.fire(handle)).collect()
    }
}

impl<R, T, P> ChallengeSession<R, T, P, Vec<Effect>>
where
    R: Rng,
    T: Scheduler,
    P: SessionPersistence,
{
    /// Drain recorded effects.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }
}
