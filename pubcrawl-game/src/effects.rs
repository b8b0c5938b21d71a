//! Display-side effects requested by the session.
//!
//! Rendering, confetti, vibration and toasts belong to the host. The session
//! only describes what should happen through an [`EffectSink`].
use serde::{Deserialize, Serialize};

use crate::challenges::Challenge;
use crate::share::ShareMessage;

/// Vibration patterns, in milliseconds of on/off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Haptic {
    Tap,
    Pulse,
    Cheer,
}

impl Haptic {
    #[must_use]
    pub const fn pattern(self) -> &'static [u32] {
        match self {
            Self::Tap => &[30],
            Self::Pulse => &[50],
            Self::Cheer => &[50, 100, 50],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Celebration {
    /// Single confetti burst from the centre of the screen.
    Burst,
    /// Full-screen celebration for milestones.
    Grand,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    ChallengeRevealed(Challenge),
    ChallengeCleared,
    Haptic(Haptic),
    Celebrate(Celebration),
    Toast(String),
    SuggestNextVenue(String),
    UndoAvailable(bool),
    SharePrompt(ShareMessage),
    OpenShare(String),
}

pub trait EffectSink {
    fn emit(&mut self, effect: Effect);
}

/// Records every effect in order.
impl EffectSink for Vec<Effect> {
    fn emit(&mut self, effect: Effect) {
        self.push(effect);
    }
}

/// Discards all effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEffects;

impl EffectSink for NoopEffects {
    fn emit(&mut self, _effect: Effect) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haptic_patterns() {
        assert_eq!(Haptic::Tap.pattern(), &[30]);
        assert_eq!(Haptic::Pulse.pattern(), &[50]);
        assert_eq!(Haptic::Cheer.pattern(), &[50, 100, 50]);
    }

    #[test]
    fn vec_sink_records_in_order() {
        let mut sink: Vec<Effect> = Vec::new();
        sink.emit(Effect::Haptic(Haptic::Tap));
        sink.emit(Effect::Toast("hi".to_string()));
        NoopEffects.emit(Effect::ChallengeCleared);
        assert_eq!(
            sink,
            vec![Effect::Haptic(Haptic::Tap), Effect::Toast("hi".to_string())]
        );
    }
}
