use pubcrawl_game::{Action, MachineState};
use yew::prelude::*;

#[derive(Properties, Clone, PartialEq)]
pub struct Props {
    pub machine_state: MachineState,
    #[prop_or_default]
    pub undo_available: bool,
    /// Input guard is closed; buttons render disabled.
    #[prop_or_default]
    pub locked: bool,
    pub on_action: Callback<Action>,
}

fn action_button(
    id: &'static str,
    label: &'static str,
    class: &'static str,
    action: Action,
    p: &Props,
) -> Html {
    let onclick = {
        let cb = p.on_action.clone();
        Callback::from(move |_| cb.emit(action))
    };
    html! {
        <button {id} type="button" class={classes!("btn", class)} disabled={p.locked} {onclick} data-action={action.as_str()}>
            { label }
        </button>
    }
}

#[function_component(ActionBar)]
pub fn action_bar(p: &Props) -> Html {
    let primary = match p.machine_state {
        MachineState::Idle => html! {
            <div id="actionButtons" class="action-row">
                { action_button("newChallengeBtn", "🎲 Get Challenge", "btn-primary", Action::RequestChallenge, p) }
            </div>
        },
        MachineState::ChallengeShown => html! {
            <div id="challengeActions" class="action-row">
                { action_button("completeBtn", "✅ Complete", "btn-success", Action::CompleteChallenge, p) }
                { action_button("skipBtn", "⏭ Skip", "btn-ghost", Action::SkipChallenge, p) }
            </div>
        },
    };
    let undo = if p.undo_available {
        action_button("undoBtn", "↩ Undo", "btn-link", Action::Undo, p)
    } else {
        Html::default()
    };

    html! {
        <nav class="action-bar" aria-label="Challenge actions">
            { primary }
            <div class="secondary-row">
                { undo }
                { action_button("resetBtn", "Start Over", "btn-link", Action::Reset, p) }
            </div>
        </nav>
    }
}
