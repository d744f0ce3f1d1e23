use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Series colors: column name → Color32
// ---------------------------------------------------------------------------

/// Stable colour assignment for every column that can appear on an axis.
/// Colours stay put while the user switches groups, so a series keeps its
/// identity across plan changes.
#[derive(Debug, Clone, Default)]
pub struct SeriesColors {
    mapping: BTreeMap<String, Color32>,
}

impl SeriesColors {
    /// Assign palette colours to `columns` in their given (table) order.
    pub fn new<'a>(columns: impl Iterator<Item = &'a str>) -> Self {
        let names: Vec<&str> = columns.collect();
        let palette = generate_palette(names.len());
        SeriesColors {
            mapping: names
                .into_iter()
                .map(str::to_string)
                .zip(palette)
                .collect(),
        }
    }

    /// Look up the colour for a column; unknown names get a neutral grey.
    pub fn color_for(&self, column: &str) -> Color32 {
        self.mapping.get(column).copied().unwrap_or(Color32::GRAY)
    }
}
