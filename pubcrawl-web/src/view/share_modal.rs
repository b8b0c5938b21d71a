use pubcrawl_game::ShareMessage;
use pubcrawl_game::share::{PROMPT_BODY, PROMPT_DISMISS_LABEL, PROMPT_SHARE_LABEL, PROMPT_TITLE};
use yew::prelude::*;

#[derive(Properties, Clone, PartialEq, Eq)]
pub struct Props {
    /// Modal is open while a message is present.
    #[prop_or_default]
    pub message: Option<ShareMessage>,
    pub on_share: Callback<()>,
    pub on_dismiss: Callback<()>,
}

#[function_component(ShareModal)]
pub fn share_modal(p: &Props) -> Html {
    let Some(message) = p.message.as_ref() else {
        return Html::default();
    };

    let on_share = {
        let cb = p.on_share.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let on_dismiss = {
        let cb = p.on_dismiss.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let on_keydown = {
        let cb = p.on_dismiss.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Escape" {
                e.prevent_default();
                cb.emit(());
            }
        })
    };

    html! {
        <div class="share-modal-overlay show" role="presentation">
            <div
                class="share-modal"
                role="dialog"
                aria-modal="true"
                aria-labelledby="share-modal-title"
                aria-describedby="share-modal-text"
                onkeydown={on_keydown}
            >
                <div class="share-modal-icon" aria-hidden="true">{ "🎉" }</div>
                <h2 id="share-modal-title" class="share-modal-title">{ PROMPT_TITLE }</h2>
                <p id="share-modal-text" class="share-modal-text">{ PROMPT_BODY }</p>
                <pre class="share-preview">{ message.text.clone() }</pre>
                <button id="shareWhatsAppBtn" type="button" class="btn-whatsapp" onclick={on_share}>
                    <span class="whatsapp-icon" aria-hidden="true">{ "📱" }</span>
                    <span>{ PROMPT_SHARE_LABEL }</span>
                </button>
                <button id="closeModalBtn" type="button" class="btn-close-modal" onclick={on_dismiss}>
                    { PROMPT_DISMISS_LABEL }
                </button>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use yew::LocalServerRenderer;

    fn render(message: Option<ShareMessage>) -> String {
        let props = Props {
            message,
            on_share: Callback::noop(),
            on_dismiss: Callback::noop(),
        };
        block_on(LocalServerRenderer::<ShareModal>::with_props(props).render())
    }

    #[test]
    fn closed_modal_renders_nothing() {
        assert!(!render(None).contains("share-modal"));
    }

    #[test]
    fn open_modal_previews_message() {
        let message = ShareMessage::compose(4, &["Toast the bartender".to_string()], "Dubliners");
        let html = render(Some(message));
        assert!(html.contains(PROMPT_TITLE));
        assert!(html.contains(PROMPT_SHARE_LABEL));
        assert!(html.contains(PROMPT_DISMISS_LABEL));
        assert!(html.contains("Toast the bartender"));
        assert!(html.contains("role=\"dialog\""));
    }
}
