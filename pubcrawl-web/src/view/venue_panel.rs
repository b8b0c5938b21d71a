use pubcrawl_game::VenueProgress;
use yew::prelude::*;

#[derive(Properties, Clone, PartialEq)]
pub struct Props {
    pub venue: VenueProgress,
    /// Highlight the next-venue button after a few completions here.
    #[prop_or_default]
    pub pulse: bool,
    #[prop_or_default]
    pub disabled: bool,
    pub on_next: Callback<()>,
    pub on_previous: Callback<()>,
}

#[function_component(VenuePanel)]
pub fn venue_panel(p: &Props) -> Html {
    let on_next = {
        let cb = p.on_next.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let on_previous = {
        let cb = p.on_previous.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let percent = p.venue.percent();

    html! {
        <section class={classes!("panel", "venue-panel", p.venue.beyond_route.then_some("beyond-route"))} aria-label="Venue">
            <p id="barIndicator" class="muted">{ p.venue.indicator.clone() }</p>
            <h2 id="barName">{ p.venue.name.clone() }</h2>
            <div class="bar-wrap" role="progressbar" aria-valuemin="0" aria-valuemax="100" aria-valuenow={percent.to_string()}>
                <div id="progressFill" class="bar-fill" style={format!("width: {percent}%")}></div>
            </div>
            <div class="venue-nav">
                <button
                    id="prevBarBtn"
                    type="button"
                    class="btn btn-ghost"
                    disabled={p.disabled || !p.venue.can_retreat}
                    onclick={on_previous}
                >
                    { "← Previous" }
                </button>
                <button
                    id="nextBarBtn"
                    type="button"
                    class={classes!("btn", "btn-secondary", p.pulse.then_some("pulse"))}
                    disabled={p.disabled}
                    onclick={on_next}
                >
                    { p.venue.next_label.clone() }
                </button>
            </div>
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use pubcrawl_game::VenueConfig;
    use yew::LocalServerRenderer;

    fn render(index: u32, pulse: bool) -> String {
        let props = Props {
            venue: VenueConfig::default_config().progress_for(index),
            pulse,
            disabled: false,
            on_next: Callback::noop(),
            on_previous: Callback::noop(),
        };
        block_on(LocalServerRenderer::<VenuePanel>::with_props(props).render())
    }

    #[test]
    fn first_venue_cannot_go_back() {
        let html = render(1, false);
        assert!(html.contains("Bar 1 of 4"), "indicator: {html}");
        assert!(html.contains("City of London"));
        assert!(html.contains("width: 25%"));
        assert!(html.contains("disabled"));
        assert!(!html.contains("pulse"));
    }

    #[test]
    fn last_planned_venue_offers_to_continue() {
        let html = render(4, true);
        assert!(html.contains("Continue Adventure →"));
        assert!(html.contains("width: 100%"));
        assert!(html.contains("pulse"));
    }

    #[test]
    fn past_the_route_uses_overflow_label() {
        let html = render(6, false);
        assert!(html.contains("Bar 6"));
        assert!(!html.contains("of 4"));
        assert!(html.contains("The Adventure Continues..."));
        assert!(html.contains("beyond-route"));
    }
}
