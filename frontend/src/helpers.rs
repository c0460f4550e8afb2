//! Small UI utilities shared by the pages.

use num_format::{Locale, ToFormattedString};
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

/// Formats a price as whole currency units with thousands separators, e.g.
/// `52,900 EUR`. Missing prices read "Price on request".
pub fn format_price(price: Option<f64>, currency: &str) -> String {
    match price {
        Some(p) if p.is_finite() => {
            let whole = p.round() as i64;
            format!("{} {}", whole.to_formatted_string(&Locale::en), currency)
        }
        _ => "Price on request".to_string(),
    }
}

/// Shows a short notification at the bottom of the page for three seconds.
pub fn show_toast(message: &str) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let (Ok(toast), Some(body)) = (document.create_element("div"), document.body()) else {
        return;
    };
    toast.set_text_content(Some(message));
    let html_toast: HtmlElement = toast.unchecked_into();
    html_toast.set_class_name("toast");

    if body.append_child(&html_toast).is_ok() {
        wasm_bindgen_futures::spawn_local(async move {
            gloo_timers::future::TimeoutFuture::new(3000).await;
            if let Some(parent) = html_toast.parent_node() {
                parent.remove_child(&html_toast).ok();
            }
        });
    }
}
