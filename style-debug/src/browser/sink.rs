use wasm_bindgen::JsValue;
use web_sys::Document;

use super::describe_js;
use crate::error::{DebugError, Result};
use crate::flush::StyleSink;

/// Appends each block as a new `<style>` element in `document.head`.
pub struct HeadSink {
    document: Document,
}

impl HeadSink {
    pub fn new() -> Result<Self> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| DebugError::Host("no global document".into()))?;
        Ok(Self { document })
    }
}

impl StyleSink for HeadSink {
    fn append_style(&self, css: &str) -> Result<()> {
        let head = self
            .document
            .head()
            .ok_or_else(|| DebugError::inject("document has no <head>"))?;
        let style = self.document.create_element("style").map_err(inject)?;
        style
            .append_child(&self.document.create_text_node(css))
            .map_err(inject)?;
        head.append_child(&style).map_err(inject)?;
        Ok(())
    }
}

fn inject(err: JsValue) -> DebugError {
    DebugError::inject(describe_js(&err))
}
