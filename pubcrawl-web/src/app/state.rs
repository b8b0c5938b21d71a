use std::rc::Rc;

use pubcrawl_game::{Celebration, Effect, SessionView, ShareMessage};
use yew::prelude::*;

/// How long a toast stays up, in milliseconds.
pub const TOAST_MS: i32 = 3_000;
/// How long celebration and flip classes stay applied, in milliseconds.
pub const FLOURISH_MS: i32 = 700;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastMessage {
    pub id: u64,
    pub text: AttrValue,
}

/// Everything the component tree renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    pub view: Option<SessionView>,
    pub toast: Option<ToastMessage>,
    pub share_prompt: Option<ShareMessage>,
    pub suggest_next: bool,
    pub celebration: Option<(u64, Celebration)>,
    pub flipping: Option<u64>,
    next_id: u64,
}

pub enum UiAction {
    /// Fresh view plus the effects the last session call produced.
    Sync {
        view: SessionView,
        effects: Vec<Effect>,
    },
    DismissToast(u64),
    EndFlourish(u64),
    CloseSharePrompt,
}

impl UiState {
    fn bump(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::Toast(text) => {
                let id = self.bump();
                self.toast = Some(ToastMessage {
                    id,
                    text: AttrValue::from(text),
                });
            }
            Effect::SharePrompt(message) => self.share_prompt = Some(message),
            Effect::SuggestNextVenue(_) => self.suggest_next = true,
            Effect::Celebrate(kind) => {
                let id = self.bump();
                self.celebration = Some((id, kind));
            }
            Effect::ChallengeRevealed(_) => self.flipping = Some(self.bump()),
            Effect::ChallengeCleared
            | Effect::Haptic(_)
            | Effect::UndoAvailable(_)
            | Effect::OpenShare(_) => {}
        }
    }
}

impl Reducible for UiState {
    type Action = UiAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            UiAction::Sync { view, effects } => {
                let moved = next
                    .view
                    .as_ref()
                    .is_none_or(|old| old.venue.index != view.venue.index);
                if moved || view.completions_at_current_venue == 0 {
                    next.suggest_next = false;
                }
                next.view = Some(view);
                for effect in effects {
                    next.apply(effect);
                }
            }
            UiAction::DismissToast(id) => {
                if next.toast.as_ref().is_some_and(|toast| toast.id == id) {
                    next.toast = None;
                }
            }
            UiAction::EndFlourish(id) => {
                if next.celebration.is_some_and(|(current, _)| current == id) {
                    next.celebration = None;
                }
                if next.flipping == Some(id) {
                    next.flipping = None;
                }
            }
            UiAction::CloseSharePrompt => next.share_prompt = None,
        }
        Rc::new(next)
    }
}
