pub mod state;

pub use state::{UiAction, UiState};

#[cfg(target_arch = "wasm32")]
pub use shell::App;

#[cfg(target_arch = "wasm32")]
mod shell {
    use std::cell::RefCell;
    use std::rc::Rc;

    use pubcrawl_game::{
        Action, Celebration, ChallengeSession, SessionData, SessionRng, SessionStore,
        SystemClock, TaskHandle, seeded_rng,
    };
    use yew::prelude::*;

    use super::state::{FLOURISH_MS, TOAST_MS, UiAction, UiState};
    use crate::dom;
    use crate::effects::WebEffects;
    use crate::storage::WebStorage;
    use crate::timers::BrowserScheduler;
    use crate::view::{ActionBar, ChallengeCard, ShareModal, StatsBar, Toast, VenuePanel};

    type WebSession = ChallengeSession<
        SessionRng,
        BrowserScheduler,
        SessionStore<WebStorage, WebStorage, SystemClock>,
        WebEffects,
    >;
    type SessionSlot = Rc<RefCell<Option<WebSession>>>;

    fn browser_seed() -> u64 {
        let noise = js_sys::Math::random().to_bits();
        let now = js_sys::Date::now().to_bits();
        noise ^ now.rotate_left(32)
    }

    /// Push the current view and any queued effects into the UI reducer.
    fn sync(session: &mut WebSession, ui: &UseReducerDispatcher<UiState>) {
        let effects = session.effects_mut().drain();
        ui.dispatch(UiAction::Sync {
            view: session.view(),
            effects,
        });
    }

    fn with_session(
        slot: &SessionSlot,
        ui: &UseReducerDispatcher<UiState>,
        f: impl FnOnce(&mut WebSession),
    ) {
        let Ok(mut guard) = slot.try_borrow_mut() else {
            log::warn!("session busy; dropping re-entrant call");
            return;
        };
        if let Some(session) = guard.as_mut() {
            f(session);
            sync(session, ui);
        }
    }

    fn dispatch_later(delay_ms: i32, ui: UseReducerDispatcher<UiState>, action: UiAction) {
        if let Err(err) = dom::set_timeout(delay_ms, move || ui.dispatch(action)) {
            dom::console_error(&format!("Failed to delay UI update: {err}"));
        }
    }

    const fn celebration_class(kind: Celebration) -> &'static str {
        match kind {
            Celebration::Burst => "celebrate-burst",
            Celebration::Grand => "celebrate-grand",
        }
    }

    #[function_component(App)]
    pub fn app() -> Html {
        let slot: SessionSlot = use_mut_ref(|| None);
        let ui = use_reducer(UiState::default);

        {
            let slot = slot.clone();
            let dispatcher = ui.dispatcher();
            use_effect_with((), move |()| {
                let on_fire = {
                    let slot = slot.clone();
                    let dispatcher = dispatcher.clone();
                    Callback::from(move |handle: TaskHandle| {
                        with_session(&slot, &dispatcher, |session| {
                            session.scheduler_mut().settle(handle);
                            session.fire(handle);
                        });
                    })
                };
                let mut session = ChallengeSession::start(
                    SessionData::load_from_static(),
                    seeded_rng(browser_seed()),
                    BrowserScheduler::new(on_fire),
                    SessionStore::new(WebStorage::local(), WebStorage::session(), SystemClock),
                    WebEffects::new(),
                );
                sync(&mut session, &dispatcher);
                *slot.borrow_mut() = Some(session);
                || {}
            });
        }

        {
            let dispatcher = ui.dispatcher();
            let toast_id = ui.toast.as_ref().map(|toast| toast.id);
            use_effect_with(toast_id, move |id| {
                if let Some(id) = *id {
                    dispatch_later(TOAST_MS, dispatcher, UiAction::DismissToast(id));
                }
                || {}
            });
        }

        {
            let dispatcher = ui.dispatcher();
            let flourishes = (ui.celebration.map(|(id, _)| id), ui.flipping);
            use_effect_with(flourishes, move |(celebration, flipping)| {
                for id in [*celebration, *flipping].into_iter().flatten() {
                    dispatch_later(FLOURISH_MS, dispatcher.clone(), UiAction::EndFlourish(id));
                }
                || {}
            });
        }

        let on_action = {
            let slot = slot.clone();
            let dispatcher = ui.dispatcher();
            Callback::from(move |action: Action| {
                with_session(&slot, &dispatcher, |session| {
                    session.dispatch(action);
                });
            })
        };
        let on_next = on_action.reform(|()| Action::NextVenue);
        let on_previous = on_action.reform(|()| Action::PreviousVenue);
        let on_share = {
            let on_action = on_action.clone();
            let dispatcher = ui.dispatcher();
            Callback::from(move |()| {
                dispatcher.dispatch(UiAction::CloseSharePrompt);
                on_action.emit(Action::Share);
            })
        };
        let on_dismiss = {
            let dispatcher = ui.dispatcher();
            Callback::from(move |()| dispatcher.dispatch(UiAction::CloseSharePrompt))
        };

        let Some(view) = ui.view.clone() else {
            return html! { <main class="app loading" aria-busy="true"></main> };
        };
        let celebrating = ui.celebration.map(|(_, kind)| celebration_class(kind));

        html! {
            <main class={classes!("app", celebrating)}>
                <header class="app-header">
                    <h1>{ "🍻 Pub Crawl Challenge" }</h1>
                </header>
                <StatsBar
                    challenge_count={view.challenge_count}
                    completions_here={view.completions_at_current_venue}
                />
                <VenuePanel
                    venue={view.venue.clone()}
                    pulse={ui.suggest_next}
                    disabled={view.input_locked}
                    {on_next}
                    {on_previous}
                />
                <ChallengeCard
                    challenge={view.active_challenge.clone()}
                    flipping={ui.flipping.is_some()}
                />
                <ActionBar
                    machine_state={view.machine_state}
                    undo_available={view.undo_available}
                    locked={view.input_locked}
                    {on_action}
                />
                <ShareModal message={ui.share_prompt.clone()} {on_share} {on_dismiss} />
                <Toast message={ui.toast.as_ref().map(|toast| toast.text.clone())} />
            </main>
        }
    }
}
