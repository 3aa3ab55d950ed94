use backdrop_core::{BackdropError, Result, Viewport};
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<(web::Window, web::Document)> {
    let window = web::window()?;
    let document = window.document()?;
    Some((window, document))
}

/// Window inner size in CSS pixels plus the current device pixel ratio.
pub fn read_viewport(window: &web::Window) -> Viewport {
    let px = |v: std::result::Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32
    };
    Viewport::new(
        px(window.inner_width()),
        px(window.inner_height()),
        window.device_pixel_ratio() as f32,
    )
}

pub(crate) fn surface_err(what: &str, e: wasm_bindgen::JsValue) -> BackdropError {
    BackdropError::Surface(format!("{what}: {e:?}"))
}

fn set_styles(el: &web::HtmlElement, styles: &[(&str, &str)]) -> Result<()> {
    let style = el.style();
    for (name, value) in styles {
        style
            .set_property(name, value)
            .map_err(|e| surface_err("style", e))?;
    }
    Ok(())
}

/// Full-bleed canvas that never intercepts pointer input.
pub fn create_canvas(document: &web::Document, size: (u32, u32)) -> Result<web::HtmlCanvasElement> {
    let canvas: web::HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(|e| surface_err("create canvas", e))?
        .dyn_into()
        .map_err(|_| BackdropError::Surface("created element is not a canvas".into()))?;
    set_styles(
        &canvas,
        &[
            ("position", "absolute"),
            ("inset", "0"),
            ("width", "100%"),
            ("height", "100%"),
            ("display", "block"),
            ("pointer-events", "none"),
        ],
    )?;
    _ = canvas.set_attribute("aria-hidden", "true");
    set_backing_size(&canvas, size);
    Ok(canvas)
}

#[inline]
pub fn set_backing_size(canvas: &web::HtmlCanvasElement, (width, height): (u32, u32)) {
    canvas.set_width(width.max(1));
    canvas.set_height(height.max(1));
}

pub(crate) fn style_button(button: &web::HtmlElement) -> Result<()> {
    set_styles(
        button,
        &[
            ("position", "absolute"),
            ("right", "1rem"),
            ("bottom", "1rem"),
            ("pointer-events", "auto"),
            ("font", "13px system-ui"),
            ("color", "#e0e7ff"),
            ("background", "rgba(30, 27, 75, 0.8)"),
            ("border", "1px solid rgba(99, 102, 241, 0.5)"),
            ("border-radius", "6px"),
            ("padding", "6px 12px"),
            ("cursor", "pointer"),
        ],
    )
}
