//! Board background templates.

use serde::{Deserialize, Serialize};

/// Fallback grid spacing when a patterned background omits one.
pub const DEFAULT_GRID_SIZE: f64 = 20.0;

/// Background pattern kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundKind {
    #[default]
    Solid,
    Grid,
    Dots,
    Lines,
}

/// Canvas background description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Background {
    #[serde(rename = "type")]
    pub kind: BackgroundKind,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl Background {
    fn solid(color: &str) -> Self {
        Self {
            kind: BackgroundKind::Solid,
            color: color.to_string(),
            grid_size: None,
            grid_color: None,
            opacity: None,
        }
    }

    fn pattern(kind: BackgroundKind, grid_size: f64, grid_color: &str, opacity: f64) -> Self {
        Self {
            kind,
            color: "#ffffff".to_string(),
            grid_size: Some(grid_size),
            grid_color: Some(grid_color.to_string()),
            opacity: Some(opacity),
        }
    }

    /// Spacing of the pattern in world units, `None` for solid backgrounds.
    pub fn spacing(&self) -> Option<f64> {
        match self.kind {
            BackgroundKind::Solid => None,
            BackgroundKind::Grid | BackgroundKind::Dots | BackgroundKind::Lines => {
                Some(self.grid_size.filter(|s| *s > 0.0).unwrap_or(DEFAULT_GRID_SIZE))
            }
        }
    }

    /// Effective opacity (missing means fully opaque).
    pub fn effective_opacity(&self) -> f64 {
        self.opacity.unwrap_or(1.0).clamp(0.0, 1.0)
    }
}

/// A named background preset a board is created with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardTemplate {
    pub id: String,
    pub name: String,
    pub background: Background,
}

impl Default for BoardTemplate {
    fn default() -> Self {
        default_template()
    }
}

/// All built-in templates, in display order.
pub fn builtin_templates() -> Vec<BoardTemplate> {
    use BackgroundKind::*;

    let template = |id: &str, name: &str, background: Background| BoardTemplate {
        id: id.to_string(),
        name: name.to_string(),
        background,
    };

    vec![
        template("blank-white", "Blank White", Background::solid("#ffffff")),
        template("grid-small", "Small Grid", Background::pattern(Grid, 20.0, "#e5e7eb", 0.8)),
        template("grid-medium", "Medium Grid", Background::pattern(Grid, 40.0, "#d1d5db", 0.7)),
        template("grid-large", "Large Grid", Background::pattern(Grid, 80.0, "#9ca3af", 0.6)),
        template("dots-small", "Small Dots", Background::pattern(Dots, 20.0, "#d1d5db", 0.8)),
        template("dots-medium", "Medium Dots", Background::pattern(Dots, 30.0, "#9ca3af", 0.7)),
        template("dots-large", "Large Dots", Background::pattern(Dots, 50.0, "#6b7280", 0.6)),
        template("lines-horizontal", "Horizontal Lines", Background::pattern(Lines, 40.0, "#e5e7eb", 0.7)),
    ]
}

/// The template new boards get unless another is requested.
pub fn default_template() -> BoardTemplate {
    BoardTemplate {
        id: "blank-white".to_string(),
        name: "Blank White".to_string(),
        background: Background::solid("#ffffff"),
    }
}

/// Look up a built-in template by id.
pub fn template_by_id(id: &str) -> Option<BoardTemplate> {
    builtin_templates().into_iter().find(|t| t.id == id)
}
