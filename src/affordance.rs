//! The "enable motion" button shown while device orientation needs a
//! user gesture to unlock.

use crate::dom::{self, surface_err};
use backdrop_core::{BackdropError, Result};
use wasm_bindgen::JsCast;
use web_sys as web;

pub const AFFORDANCE_CLASS: &str = "backdrop-motion-permission";

/// Create the button inside `target`, initially hidden.
pub fn create(document: &web::Document, target: &web::Element) -> Result<web::HtmlButtonElement> {
    let button: web::HtmlButtonElement = document
        .create_element("button")
        .map_err(|e| surface_err("create button", e))?
        .dyn_into()
        .map_err(|_| BackdropError::Surface("created element is not a button".into()))?;
    button.set_type("button");
    button.set_text_content(Some("Enable motion"));
    _ = button.set_attribute("aria-label", "Enable device motion for the background");
    _ = button.class_list().add_1(AFFORDANCE_CLASS);
    dom::style_button(&button)?;
    hide(&button);
    target
        .append_child(&button)
        .map_err(|e| surface_err("append button", e))?;
    Ok(button)
}

#[inline]
pub fn show(el: &web::HtmlElement) {
    _ = el.class_list().remove_1("hidden");
    // fallback for pages without a `.hidden` rule
    _ = el.style().remove_property("display");
}

#[inline]
pub fn hide(el: &web::HtmlElement) {
    _ = el.class_list().add_1("hidden");
    _ = el.style().set_property("display", "none");
}

#[inline]
pub fn set_visible(el: &web::HtmlElement, visible: bool) {
    if visible {
        show(el);
    } else {
        hide(el);
    }
}
