//! Inline source maps for debug style blocks.
//!
//! Maps are built and parsed with the `sourcemap` crate; this module adds
//! the `data:` URL comment that carries them inside CSS.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;
use sourcemap::SourceMap;

use crate::error::{DebugError, Result};

/// Prefix of the comment that carries an inline source map.
pub const SOURCE_MAPPING_URL_PREFIX: &str =
    "/*# sourceMappingURL=data:application/json;charset=utf-8;base64,";

const COMMENT_START: &str = "/*# sourceMappingURL=";
const JSON_DATA_URL: &str = "data:application/json";

/// Where one generated rule points. `source_line` is 0-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOrigin {
    pub generated_line: u32,
    pub source: String,
    pub source_line: u32,
}

/// Serialize a map. `sourcesContent` is always present and index-aligned
/// with `sources`, with `null` for files whose content is unknown.
pub fn to_json(map: &SourceMap) -> Result<String> {
    let mut bytes = Vec::new();
    map.to_writer(&mut bytes)?;
    let mut json: Value = serde_json::from_slice(&bytes)?;
    if let Some(object) = json.as_object_mut() {
        if !object.contains_key("sourcesContent") {
            let nulls = vec![Value::Null; map.get_source_count() as usize];
            object.insert("sourcesContent".to_string(), Value::Array(nulls));
        }
    }
    Ok(serde_json::to_string(&json)?)
}

/// The full `/*# sourceMappingURL=... */` comment.
pub fn to_comment(map: &SourceMap) -> Result<String> {
    let payload = STANDARD.encode(to_json(map)?);
    Ok(format!("{SOURCE_MAPPING_URL_PREFIX}{payload} */"))
}

/// Decode the base64 payload of a data URL.
pub fn from_base64(payload: &str) -> Result<SourceMap> {
    let json = STANDARD.decode(payload.trim())?;
    Ok(SourceMap::from_slice(&json)?)
}

/// Parse `data:application/json[;charset=...];base64,<payload>`.
pub fn from_data_url(url: &str) -> Result<SourceMap> {
    let payload = url
        .trim()
        .strip_prefix(JSON_DATA_URL)
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_, payload)| payload)
        .ok_or_else(|| DebugError::inline_map("expected a base64 application/json data URL"))?;
    from_base64(payload)
}

/// Find every inline source map comment in a stylesheet and decode it.
/// Returns, per comment, the CSS text that precedes it (back to the
/// previous comment) and the decoded map.
pub fn extract_inline_maps(css: &str) -> Result<Vec<(String, SourceMap)>> {
    let mut found = Vec::new();
    let mut rest = css;
    while let Some(start) = rest.find(COMMENT_START) {
        let generated = rest[..start].to_string();
        let after = &rest[start + COMMENT_START.len()..];
        let end = after
            .find("*/")
            .ok_or_else(|| DebugError::inline_map("unterminated sourceMappingURL comment"))?;
        found.push((generated, from_data_url(&after[..end])?));
        rest = &after[end + 2..];
    }
    Ok(found)
}

/// Every mapped position in `map`, in generated order.
pub fn rule_origins(map: &SourceMap) -> Vec<RuleOrigin> {
    map.tokens()
        .filter_map(|token| {
            Some(RuleOrigin {
                generated_line: token.get_dst_line(),
                source: token.get_source()?.to_string(),
                source_line: token.get_src_line(),
            })
        })
        .collect()
}
