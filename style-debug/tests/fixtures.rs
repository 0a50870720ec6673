use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use serde_json::Value;

use style_debug::inline_map::{extract_inline_maps, to_json};
use style_debug::{inspect_stylesheet, render_entries, DebugEntry, SourceCache};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn read(name: &str) -> String {
    let path = fixture(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

#[test]
fn entries_fixture_renders_and_inspects() {
    let entries: Vec<DebugEntry> =
        serde_json::from_str(&read("entries.json")).expect("fixture should parse");
    assert_eq!(entries.len(), 3);

    let css = render_entries(&entries, &SourceCache::new()).expect("render should succeed");
    assert_eq!(
        inspect_stylesheet(&css).unwrap(),
        vec![
            (".__debug_0".to_string(), "src/button.js".to_string(), 12),
            (".__debug_1".to_string(), "src/card.js".to_string(), 4),
            (".__debug_2".to_string(), "src/button.js".to_string(), 30),
        ]
    );
}

#[test]
fn injected_fixture_matches_a_fresh_render() {
    let injected = read("injected.css");
    let entries = vec![
        DebugEntry::new(".__debug_0", "a.js", 10),
        DebugEntry::new(".__debug_1", "b.js", 20),
    ];
    let css = render_entries(&entries, &SourceCache::new()).unwrap();

    // Key order inside the JSON payload is the writer's business, so compare
    // the decoded maps rather than the base64 bytes.
    let decode = |css: &str| {
        let (rules, map) = extract_inline_maps(css).unwrap().remove(0);
        let json: Value = serde_json::from_str(&to_json(&map).unwrap()).unwrap();
        (rules, json)
    };
    let (fresh_rules, fresh_map) = decode(&css);
    let (fixture_rules, fixture_map) = decode(&injected);
    assert_eq!(fresh_rules, fixture_rules);
    assert_eq!(fresh_map["sources"], fixture_map["sources"]);
    assert_eq!(fresh_map["mappings"], fixture_map["mappings"]);
    assert_eq!(fixture_map["mappings"], "AASA;ACUA");
    assert_eq!(
        inspect_stylesheet(&injected).unwrap(),
        vec![
            (".__debug_0".to_string(), "a.js".to_string(), 10),
            (".__debug_1".to_string(), "b.js".to_string(), 20),
        ]
    );
}
