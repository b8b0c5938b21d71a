use js_sys::Array;
use thiserror::Error;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Window};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("`window` is unavailable")]
    NoWindow,
    #[error("{0} is unavailable")]
    Missing(&'static str),
    #[error("browser call failed: {0}")]
    Js(String),
}

impl From<JsValue> for DomError {
    fn from(value: JsValue) -> Self {
        Self::Js(js_error_message(&value))
    }
}

/// Retrieve the global `window` object.
///
/// # Errors
/// Returns [`DomError::NoWindow`] outside a browser context.
pub fn window() -> Result<Window, DomError> {
    web_sys::window().ok_or(DomError::NoWindow)
}

/// Retrieve the document object for DOM interactions.
///
/// # Errors
/// Returns an error when no window or document is reachable.
pub fn document() -> Result<Document, DomError> {
    window()?.document().ok_or(DomError::Missing("document"))
}

/// Convert a JavaScript value into a readable string for error reporting.
#[must_use]
pub fn js_error_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|err| err.message().into())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

/// Log an error message to the browser console.
pub fn console_error(message: &str) {
    web_sys::console::error_1(&JsValue::from(message));
}

/// Run `f` once after `delay_ms`. Returns the browser timeout id.
///
/// # Errors
/// Returns an error if the timer cannot be scheduled.
pub fn set_timeout(delay_ms: i32, f: impl FnOnce() + 'static) -> Result<i32, DomError> {
    let callback = Closure::once_into_js(f);
    let id = window()?
        .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay_ms)?;
    Ok(id)
}

/// Cancel a timeout created with [`set_timeout`]. Unknown ids are ignored.
pub fn clear_timeout(id: i32) {
    if let Ok(win) = window() {
        win.clear_timeout_with_handle(id);
    }
}

/// Vibrate the device with an on/off pattern in milliseconds.
///
/// Returns `false` when the browser has no vibration support.
pub fn vibrate(pattern: &[u32]) -> bool {
    let Ok(win) = window() else {
        return false;
    };
    let steps: Array = pattern.iter().map(|ms| JsValue::from(*ms)).collect();
    win.navigator().vibrate_with_pattern(&steps)
}

/// Open `url` in a new tab or the handling app.
///
/// # Errors
/// Returns an error if the browser refuses to open the target.
pub fn open_in_new_tab(url: &str) -> Result<(), DomError> {
    window()?.open_with_url_and_target(url, "_blank")?;
    Ok(())
}
