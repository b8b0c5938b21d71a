use yew::prelude::*;

#[derive(Properties, Clone, Default, PartialEq, Eq)]
pub struct Props {
    #[prop_or_default]
    pub message: Option<AttrValue>,
}

#[function_component(Toast)]
pub fn toast(p: &Props) -> Html {
    html! {
        <div class="toast-region" role="status" aria-live="polite">
            { p.message.as_ref().map_or_else(Html::default, |text| html! {
                <div class="toast show">{ text.clone() }</div>
            }) }
        </div>
    }
}
