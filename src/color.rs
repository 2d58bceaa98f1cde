use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Lighten, Srgb};

use crate::labels::{LabelId, LabelSet, MAX_LABELS};

// ---------------------------------------------------------------------------
// Fixed categorical palette, one colour per possible label
// ---------------------------------------------------------------------------

/// The ten "category10" colours. The label limit follows from this table.
const CATEGORY10: [(u8, u8, u8); MAX_LABELS] = [
    (0x1f, 0x77, 0xb4),
    (0xff, 0x7f, 0x0e),
    (0x2c, 0xa0, 0x2c),
    (0xd6, 0x27, 0x28),
    (0x94, 0x67, 0xbd),
    (0x8c, 0x56, 0x4b),
    (0xe3, 0x77, 0xc2),
    (0x7f, 0x7f, 0x7f),
    (0xbc, 0xbd, 0x22),
    (0x17, 0xbe, 0xcf),
];

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

/// Lighten a colour in HSL space by `amount` (0.0 – 1.0).
pub fn lighten(color: Color32, amount: f32) -> Color32 {
    let rgb: Srgb = Srgb::new(color.r(), color.g(), color.b()).into_format();
    let hsl: Hsl = rgb.into_color();
    to_color32(hsl.lighten(amount).into_color())
}

// ---------------------------------------------------------------------------
// Color mapping: label → Color32
// ---------------------------------------------------------------------------

/// Colours for every label of a set, in label order.
#[derive(Debug, Clone)]
pub struct LabelColors {
    colors: Vec<Color32>,
}

impl LabelColors {
    pub fn new(set: &LabelSet) -> Self {
        let colors = CATEGORY10
            .iter()
            .take(set.len())
            .map(|&(r, g, b)| Color32::from_rgb(r, g, b))
            .collect();
        LabelColors { colors }
    }

    /// Look up the colour for a label.
    pub fn color_for(&self, label: LabelId) -> Color32 {
        self.colors
            .get(label.index())
            .copied()
            .unwrap_or(Color32::GRAY)
    }

    /// Translucent fill and outline for the brush rectangle of `label`.
    pub fn brush_colors(&self, label: LabelId) -> (Color32, Color32) {
        let stroke = self.color_for(label);
        let fill = lighten(stroke, 0.3).gamma_multiply(0.25);
        (fill, stroke)
    }

    /// Return the legend entries (label name → colour) for the UI.
    pub fn legend_entries(&self, set: &LabelSet) -> Vec<(String, Color32)> {
        set.ids()
            .map(|id| (set.name(id).to_string(), self.color_for(id)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_distinct_colour_per_label() {
        let names: Vec<String> = (0..MAX_LABELS).map(|i| i.to_string()).collect();
        let set = LabelSet::new(names, "0").unwrap();
        let colors = LabelColors::new(&set);
        let entries = colors.legend_entries(&set);
        assert_eq!(entries.len(), MAX_LABELS);
        for (i, (_, a)) in entries.iter().enumerate() {
            for (_, b) in &entries[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn lighten_moves_towards_white() {
        let base = Color32::from_rgb(0x1f, 0x77, 0xb4);
        let light = lighten(base, 0.5);
        assert!(light.r() > base.r());
        assert!(light.g() > base.g());
        assert_eq!(lighten(Color32::WHITE, 0.5), Color32::WHITE);
    }
}
