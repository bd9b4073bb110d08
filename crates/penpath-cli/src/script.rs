//! Replay scripts: a JSON list of editor events applied in order.

use anyhow::{Context, Result, bail};
use kurbo::Point;
use penpath_core::{Editor, EditorConfig, Modifiers, ShapeId, ToolKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Time between presses when a step does not give one, long enough that
/// consecutive clicks never form a double click.
const STEP_INTERVAL_MS: u64 = 1000;

/// One step of a replay script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ScriptStep {
    Tool {
        tool: ToolKind,
    },
    Down {
        x: f64,
        y: f64,
        #[serde(default)]
        shift: bool,
        #[serde(default)]
        time_ms: Option<u64>,
    },
    Move {
        x: f64,
        y: f64,
        #[serde(default)]
        shift: bool,
    },
    Up {
        x: f64,
        y: f64,
        #[serde(default)]
        shift: bool,
    },
    Key {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Replace path text; targets the shape at `index` or else the selection.
    SetPathText {
        text: String,
        #[serde(default)]
        index: Option<usize>,
    },
}

fn modifiers(shift: bool) -> Modifiers {
    if shift { Modifiers::SHIFT } else { Modifiers::NONE }
}

/// Read a script file.
pub fn load_script(path: &Path) -> Result<Vec<ScriptStep>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid script {}", path.display()))
}

/// Read an editor config file.
pub fn load_config(path: &Path) -> Result<EditorConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    EditorConfig::from_json(&json).with_context(|| format!("Invalid config {}", path.display()))
}

/// Apply every step to a fresh editor.
pub fn replay(steps: &[ScriptStep], config: EditorConfig) -> Result<Editor> {
    let mut editor = Editor::with_config(config);
    let mut clock = 0;

    for (n, step) in steps.iter().enumerate() {
        log::debug!("Step {n}: {step:?}");
        match step {
            ScriptStep::Tool { tool } => editor.set_tool(*tool),
            ScriptStep::Down { x, y, shift, time_ms } => {
                clock = time_ms.unwrap_or(clock + STEP_INTERVAL_MS);
                editor.pointer_down(Point::new(*x, *y), modifiers(*shift), clock);
            }
            ScriptStep::Move { x, y, shift } => {
                editor.pointer_move(Point::new(*x, *y), modifiers(*shift))
            }
            ScriptStep::Up { x, y, shift } => editor.pointer_up(Point::new(*x, *y), modifiers(*shift)),
            ScriptStep::Key { key, modifiers } => editor.key_pressed(key, *modifiers),
            ScriptStep::SetPathText { text, index } => {
                let Some(id) = text_target(&editor, *index) else {
                    bail!("Step {n}: no shape to edit");
                };
                if let Err(e) = editor.set_path_text(id, text) {
                    log::warn!("Step {n}: path text kept: {e}");
                }
            }
        }
    }
    Ok(editor)
}

fn text_target(editor: &Editor, index: Option<usize>) -> Option<ShapeId> {
    match index {
        Some(i) => editor.document.shapes().get(i).map(|s| s.id()),
        None => editor.document.selected(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SCRIPT: &str = r#"[
        { "step": "tool", "tool": "Pen" },
        { "step": "down", "x": 10, "y": 10 },
        { "step": "up", "x": 10, "y": 10 },
        { "step": "down", "x": 10, "y": 10 },
        { "step": "up", "x": 100, "y": 10 },
        { "step": "key", "key": "Enter" }
    ]"#;

    #[test]
    fn test_replay_draws_line() {
        let steps: Vec<ScriptStep> = serde_json::from_str(SCRIPT).unwrap();
        let editor = replay(&steps, EditorConfig::default()).unwrap();

        let path = editor.document.shapes()[0].as_path().unwrap();
        assert_eq!(path.data(), "M 10 10 L 100 10");
        assert!(editor.in_progress_path().is_none());
    }

    #[test]
    fn test_default_clock_avoids_double_clicks() {
        let steps: Vec<ScriptStep> = serde_json::from_str(
            r#"[
                { "step": "tool", "tool": "Pen" },
                { "step": "down", "x": 0, "y": 0 },
                { "step": "up", "x": 0, "y": 0 },
                { "step": "down", "x": 50, "y": 0 },
                { "step": "up", "x": 50, "y": 0 },
                { "step": "down", "x": 50, "y": 0, "time_ms": 2100 },
                { "step": "up", "x": 50, "y": 0 }
            ]"#,
        )
        .unwrap();
        let editor = replay(&steps, EditorConfig::default()).unwrap();
        // The third press lands 100 ms after the second and finalizes.
        assert!(editor.in_progress_path().is_none());
        assert_eq!(editor.document.shapes()[0].as_path().unwrap().data(), "M 0 0 M 50 0");
    }

    #[test]
    fn test_set_path_text_step() {
        let steps = vec![
            ScriptStep::Tool { tool: ToolKind::Pen },
            ScriptStep::Down { x: 0.0, y: 0.0, shift: false, time_ms: None },
            ScriptStep::Up { x: 0.0, y: 0.0, shift: false },
            ScriptStep::SetPathText { text: "garbage".to_string(), index: None },
            ScriptStep::SetPathText { text: "M 1,2 L 3 4".to_string(), index: Some(0) },
        ];
        let editor = replay(&steps, EditorConfig::default()).unwrap();
        assert_eq!(editor.document.shapes()[0].as_path().unwrap().data(), "M 1 2 L 3 4");

        let missing = [ScriptStep::SetPathText { text: "M 0 0".to_string(), index: Some(3) }];
        assert!(replay(&missing, EditorConfig::default()).is_err());
    }

    #[test]
    fn test_load_files() {
        let mut script = tempfile::NamedTempFile::new().unwrap();
        script.write_all(SCRIPT.as_bytes()).unwrap();
        let steps = load_script(script.path()).unwrap();
        assert_eq!(steps.len(), 6);

        let mut config = tempfile::NamedTempFile::new().unwrap();
        config.write_all(br#"{ "polygon_sides": 8 }"#).unwrap();
        assert_eq!(load_config(config.path()).unwrap().polygon_sides, 8);

        let dir = tempfile::tempdir().unwrap();
        assert!(load_script(&dir.path().join("missing.json")).is_err());
    }
}
