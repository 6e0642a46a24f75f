use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RenderOptions {
    class_name: Option<String>,
    /// Defaults to wrapping only when a class name is given.
    wrap: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderResult {
    html: String,
    block_count: usize,
}

#[wasm_bindgen]
pub fn render_html(source: &str) -> String {
    quillmark_core::render(source)
}

#[wasm_bindgen]
pub fn render_html_with_options(source: &str, options: JsValue) -> Result<JsValue, JsValue> {
    let options = options_from_js(options)?;
    let result = render_with_options(source, &options);
    serde_wasm_bindgen::to_value(&result).map_err(|err| JsValue::from_str(&err.to_string()))
}

fn options_from_js(value: JsValue) -> Result<RenderOptions, JsValue> {
    if value.is_null() || value.is_undefined() {
        return Ok(RenderOptions::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|err| JsValue::from_str(&err.to_string()))
}

fn render_with_options(source: &str, options: &RenderOptions) -> RenderResult {
    let blocks = quillmark_core::parse(source);
    let fragment = quillmark_core::emit_html(&blocks);
    let class_name = options.class_name.as_deref().unwrap_or("");
    let wrap = options.wrap.unwrap_or(options.class_name.is_some());
    let html = if wrap {
        quillmark_renderer::wrap_content(&fragment, class_name)
    } else {
        fragment
    };
    RenderResult {
        html,
        block_count: blocks.len(),
    }
}
