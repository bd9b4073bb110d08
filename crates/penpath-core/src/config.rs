//! Editor configuration.

use crate::shapes::ShapeStyle;
use serde::{Deserialize, Serialize};

/// Tolerances and defaults used by the editor.
///
/// All distances are in world units. Missing fields in a JSON config take
/// their default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Radius around an anchor that counts as clicking it.
    pub anchor_hit_radius: f64,
    /// Radius within which a connect drag snaps to another anchor.
    pub snap_radius: f64,
    /// Pointer travel that turns a press into a drag.
    pub drag_threshold: f64,
    /// Maximum time between two clicks of a double click.
    pub double_click_ms: u64,
    /// Maximum distance between two clicks of a double click.
    pub double_click_distance: f64,
    /// Style given to newly created shapes.
    pub default_style: ShapeStyle,
    /// Side count for the polygon tool.
    pub polygon_sides: usize,
    /// Tip count for the star tool.
    pub star_points: usize,
    /// Radius used when a polygon or star is placed with a plain click.
    pub default_radius: f64,
    /// Inner radius of a star as a fraction of its outer radius.
    pub star_inner_ratio: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            anchor_hit_radius: 10.0,
            snap_radius: 15.0,
            drag_threshold: 5.0,
            double_click_ms: 500,
            double_click_distance: 5.0,
            default_style: ShapeStyle::default(),
            polygon_sides: 6,
            star_points: 5,
            default_radius: 50.0,
            star_inner_ratio: 0.5,
        }
    }
}

impl EditorConfig {
    /// Load a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the config to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
