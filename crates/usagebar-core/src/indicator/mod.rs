//! Indicator rendering: maps a usage fraction to a color, label and icon.
//!
//! Everything here is pure. The icon for each color is built once and shared.

pub mod icon;

pub use icon::IconSpec;

use serde::Serialize;

use crate::usage::display_percent;

/// Badge glyph drawn inside the indicator icon
pub const GLYPH: char = 'C';

/// Label shown after a failed cycle
pub const ERROR_LABEL: &str = "ERR";

/// Label shown before any data is available
pub const PLACEHOLDER_LABEL: &str = "--";

/// Indicator color bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorColor {
    Green,
    Yellow,
    Orange,
    Red,
    Gray,
}

impl IndicatorColor {
    /// Every color, in band order
    pub const ALL: [IndicatorColor; 5] = [
        IndicatorColor::Green,
        IndicatorColor::Yellow,
        IndicatorColor::Orange,
        IndicatorColor::Red,
        IndicatorColor::Gray,
    ];

    /// Band for a usage fraction; lower bounds are inclusive
    pub fn for_fraction(fraction: f64) -> Self {
        if fraction < 0.5 {
            IndicatorColor::Green
        } else if fraction < 0.75 {
            IndicatorColor::Yellow
        } else if fraction < 0.9 {
            IndicatorColor::Orange
        } else {
            IndicatorColor::Red
        }
    }

    /// Hex color code
    pub fn hex(&self) -> &'static str {
        match self {
            IndicatorColor::Green => "#22c55e",
            IndicatorColor::Yellow => "#eab308",
            IndicatorColor::Orange => "#f97316",
            IndicatorColor::Red => "#ef4444",
            IndicatorColor::Gray => "#6b7280",
        }
    }

    /// RGB components (0-255)
    pub fn rgb(&self) -> (u8, u8, u8) {
        let hex = &self.hex()[1..];
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0);
        (channel(0), channel(2), channel(4))
    }

    /// Icon for this color (built once per color)
    pub fn icon(&self) -> &'static IconSpec {
        icon::icon_for(*self)
    }
}

/// What the UI should show for the current state. Derived fresh every cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderIntent {
    pub color: IndicatorColor,
    pub glyph: char,
    /// Short label next to the icon ("45%", "ERR", "--")
    pub label: String,
    /// Percentage for the tooltip, absent on error or placeholder
    pub tooltip_pct: Option<u8>,
    pub error: bool,
}

impl RenderIntent {
    /// Gray "--" intent used before the first cycle and while no token is set
    pub fn placeholder() -> Self {
        Self {
            color: IndicatorColor::Gray,
            glyph: GLYPH,
            label: PLACEHOLDER_LABEL.to_string(),
            tooltip_pct: None,
            error: false,
        }
    }

    /// Tooltip text for the icon
    pub fn tooltip(&self) -> String {
        match self.tooltip_pct {
            Some(pct) => format!("{}%", pct),
            None if self.error => "Error".to_string(),
            None => "No data".to_string(),
        }
    }

    /// Icon for this intent's color
    pub fn icon(&self) -> &'static IconSpec {
        self.color.icon()
    }
}

impl Default for RenderIntent {
    fn default() -> Self {
        Self::placeholder()
    }
}

/// Render the indicator for a dominant usage fraction
pub fn render(dominant_fraction: f64, error: bool) -> RenderIntent {
    if error {
        return RenderIntent {
            color: IndicatorColor::Gray,
            glyph: GLYPH,
            label: ERROR_LABEL.to_string(),
            tooltip_pct: None,
            error: true,
        };
    }

    let pct = display_percent(dominant_fraction);
    RenderIntent {
        color: IndicatorColor::for_fraction(dominant_fraction),
        glyph: GLYPH,
        label: format!("{}%", pct),
        tooltip_pct: Some(pct),
        error: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_color_boundaries_exact() {
        let cases = [
            (0.0, IndicatorColor::Green),
            (0.49, IndicatorColor::Green),
            (0.50, IndicatorColor::Yellow),
            (0.74, IndicatorColor::Yellow),
            (0.75, IndicatorColor::Orange),
            (0.89, IndicatorColor::Orange),
            (0.90, IndicatorColor::Red),
            (1.0, IndicatorColor::Red),
        ];
        for (fraction, expected) in cases {
            assert_eq!(render(fraction, false).color, expected, "fraction {fraction}");
        }
    }

    #[test]
    fn test_error_is_gray_regardless_of_fraction() {
        let intent = render(0.95, true);
        assert_eq!(
            intent,
            RenderIntent {
                color: IndicatorColor::Gray,
                glyph: 'C',
                label: "ERR".to_string(),
                tooltip_pct: None,
                error: true,
            }
        );
        assert_eq!(intent.tooltip(), "Error");
    }

    #[test]
    fn test_label_and_tooltip() {
        let intent = render(0.45, false);
        assert_eq!(intent.label, "45%");
        assert_eq!(intent.tooltip(), "45%");
        assert!(!intent.error);
    }

    #[test]
    fn test_placeholder() {
        let intent = RenderIntent::placeholder();
        assert_eq!(intent.color, IndicatorColor::Gray);
        assert_eq!(intent.label, "--");
        assert!(!intent.error);
        assert_eq!(intent.tooltip(), "No data");
    }

    #[test]
    fn test_rgb_from_hex() {
        assert_eq!(IndicatorColor::Green.rgb(), (0x22, 0xc5, 0x5e));
        assert_eq!(IndicatorColor::Gray.rgb(), (0x6b, 0x72, 0x80));
    }
}
