use std::fs;
use std::path::Path;

use quillmark_core::render;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RenderCase {
    name: String,
    input: String,
    expected: String,
}

#[test]
fn render_cases() -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../tests/cases/render.json");
    let cases: Vec<RenderCase> = serde_json::from_str(&fs::read_to_string(&path)?)?;
    assert!(!cases.is_empty());

    let mut failures = Vec::new();
    for case in &cases {
        let actual = render(&case.input);
        if actual != case.expected {
            failures.push(format!(
                "{}\n  input:    {:?}\n  expected: {:?}\n  actual:   {:?}",
                case.name, case.input, case.expected, actual
            ));
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(format!("{} case(s) failed:\n{}", failures.len(), failures.join("\n")).into())
    }
}
