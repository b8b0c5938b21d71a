use pubcrawl_game::Challenge;
use yew::prelude::*;

pub const IDLE_ICON: &str = "🍻";
pub const IDLE_PROMPT: &str = "Tap the button below to reveal your challenge!";

#[derive(Properties, Clone, Default, PartialEq, Eq)]
pub struct Props {
    #[prop_or_default]
    pub challenge: Option<Challenge>,
    /// Plays the flip animation.
    #[prop_or_default]
    pub flipping: bool,
}

#[function_component(ChallengeCard)]
pub fn challenge_card(p: &Props) -> Html {
    let (icon, text) = p.challenge.as_ref().map_or((IDLE_ICON, IDLE_PROMPT), |c| {
        (c.icon.as_str(), c.text.as_str())
    });
    let badge = p.challenge.as_ref().map_or_else(Html::default, |c| {
        let tier = c.difficulty.as_str();
        html! {
            <span class={classes!("difficulty-badge", format!("difficulty-{tier}"))}>{ tier }</span>
        }
    });

    html! {
        <article
            id="challengeCard"
            class={classes!("challenge-card", p.flipping.then_some("flipping"), p.challenge.is_some().then_some("active"))}
            aria-live="polite"
        >
            <div class="challenge-icon" aria-hidden="true">{ icon }</div>
            <p id="challengeText" class="challenge-text">{ text }</p>
            { badge }
        </article>
    }
}
