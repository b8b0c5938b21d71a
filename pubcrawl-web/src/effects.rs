//! Browser side of the session's effects.
use pubcrawl_game::{Effect, EffectSink};

use crate::dom;

/// Plays device effects right away and queues the rest for the view.
///
/// Vibration and the share window are fire-and-forget browser calls. Every
/// effect, including those, is also queued so the component tree can react
/// after the action that caused it returns.
#[derive(Debug, Default)]
pub struct WebEffects {
    device: bool,
    queued: Vec<Effect>,
}

impl WebEffects {
    /// Sink that talks to the device.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            device: true,
            queued: Vec::new(),
        }
    }

    /// Sink that only queues, for rendering without a browser.
    #[must_use]
    pub const fn headless() -> Self {
        Self {
            device: false,
            queued: Vec::new(),
        }
    }

    pub fn drain(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.queued)
    }

    fn perform(effect: &Effect) {
        match effect {
            Effect::Haptic(haptic) => {
                dom::vibrate(haptic.pattern());
            }
            Effect::OpenShare(url) => {
                if let Err(err) = dom::open_in_new_tab(url) {
                    log::warn!("share target blocked: {err}");
                }
            }
            _ => {}
        }
    }
}

impl EffectSink for WebEffects {
    fn emit(&mut self, effect: Effect) {
        if self.device {
            Self::perform(&effect);
        }
        self.queued.push(effect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pubcrawl_game::Haptic;

    #[test]
    fn headless_sink_queues_in_order() {
        let mut sink = WebEffects::headless();
        sink.emit(Effect::Haptic(Haptic::Tap));
        sink.emit(Effect::Toast("hi".to_string()));
        assert_eq!(
            sink.drain(),
            vec![Effect::Haptic(Haptic::Tap), Effect::Toast("hi".to_string())]
        );
        assert!(sink.drain().is_empty());
    }
}
