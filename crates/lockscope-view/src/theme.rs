//! Visual constants for graph scenes.

use std::f64::consts::FRAC_PI_6;

use palette::Srgb;

/// Colors and fixed sizes used by the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
    pub background: Srgb<u8>,
    pub process_fill: Srgb<u8>,
    /// Also used for nodes of unknown kind.
    pub resource_fill: Srgb<u8>,
    pub node_stroke: Srgb<u8>,
    /// Stroke for nodes on a detected deadlock cycle.
    pub deadlock_stroke: Srgb<u8>,
    pub edge: Srgb<u8>,
    pub label: Srgb<u8>,
    pub sublabel: Srgb<u8>,
    pub placeholder: Srgb<u8>,

    /// Process circle radius; resource squares have side `2 * node_radius`.
    pub node_radius: f64,
    pub stroke_width: f64,
    pub deadlock_stroke_width: f64,
    pub edge_width: f64,
    pub arrow_length: f64,
    /// Angle between the edge and each arrowhead wing, in radians.
    pub arrow_half_angle: f64,
    pub font_size: f64,
    pub placeholder_text: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Srgb::new(0xff, 0xff, 0xff),
            process_fill: Srgb::new(0x3b, 0x82, 0xf6),    // blue
            resource_fill: Srgb::new(0x10, 0xb9, 0x81),   // green
            node_stroke: Srgb::new(0x1f, 0x29, 0x37),     // slate
            deadlock_stroke: Srgb::new(0xef, 0x44, 0x44), // red
            edge: Srgb::new(0x64, 0x74, 0x8b),
            label: Srgb::new(0xff, 0xff, 0xff),
            sublabel: Srgb::new(0x37, 0x41, 0x51),
            placeholder: Srgb::new(0x9c, 0xa3, 0xaf),

            node_radius: 20.0,
            stroke_width: 2.0,
            deadlock_stroke_width: 4.0,
            edge_width: 2.0,
            arrow_length: 10.0,
            arrow_half_angle: FRAC_PI_6,
            font_size: 12.0,
            placeholder_text: "No processes or resources yet".to_string(),
        }
    }
}

/// `#rrggbb` form of a color.
pub fn hex(color: Srgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        assert_eq!(hex(Srgb::new(0x3b, 0x82, 0xf6)), "#3b82f6");
        assert_eq!(hex(Srgb::new(0, 0, 0)), "#000000");
    }

    #[test]
    fn test_default_arrow_geometry() {
        let theme = Theme::default();
        assert_eq!(theme.arrow_length, 10.0);
        assert!((theme.arrow_half_angle.to_degrees() - 30.0).abs() < 1e-9);
    }
}
