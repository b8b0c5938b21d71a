use yew::prelude::*;

#[derive(Properties, Clone, PartialEq, Eq)]
pub struct Props {
    pub challenge_count: u32,
    pub completions_here: u32,
}

#[function_component(StatsBar)]
pub fn stats_bar(p: &Props) -> Html {
    let label = if p.challenge_count == 1 {
        "Challenge Completed"
    } else {
        "Challenges Completed"
    };
    html! {
        <section class="panel stats-panel" role="region" aria-label="Progress">
            <div class="stat-chip">
                <span id="challengeCount" class="stat-value" aria-live="polite">{ p.challenge_count }</span>
                <span class="stat-label">{ label }</span>
            </div>
            <div class="stat-chip muted">
                <span class="stat-value">{ p.completions_here }</span>
                <span class="stat-label">{ "here" }</span>
            </div>
        </section>
    }
}
