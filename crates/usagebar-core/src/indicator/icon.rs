//! Badge icon geometry and SVG rendering, one cached icon per color.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::{IndicatorColor, GLYPH};

/// Icon canvas edge in pixels
pub const ICON_SIZE: u32 = 32;
const CIRCLE_RADIUS: f32 = 13.0;
const FILL_ALPHA: f32 = 0.25;
const RING_WIDTH: f32 = 2.0;
const GLYPH_FONT_SIZE: f32 = 22.0;

/// Fully resolved icon: a translucent disc, a solid ring and a bold glyph
#[derive(Debug, Clone, PartialEq)]
pub struct IconSpec {
    pub color: IndicatorColor,
    pub size: u32,
    pub glyph: char,
    /// Standalone SVG document
    pub svg: String,
}

static ICONS: Lazy<HashMap<IndicatorColor, IconSpec>> = Lazy::new(|| {
    IndicatorColor::ALL
        .iter()
        .map(|c| (*c, build_icon(*c)))
        .collect()
});

/// Cached icon for a color
pub fn icon_for(color: IndicatorColor) -> &'static IconSpec {
    // ALL covers every variant, so the lookup cannot miss
    &ICONS[&color]
}

fn build_icon(color: IndicatorColor) -> IconSpec {
    let center = ICON_SIZE as f32 / 2.0;
    let hex = color.hex();
    let svg = format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {size} {size}">"#,
            r#"<circle cx="{c}" cy="{c}" r="{r}" fill="{hex}" fill-opacity="{alpha}"/>"#,
            r#"<circle cx="{c}" cy="{c}" r="{r}" fill="none" stroke="{hex}" stroke-width="{ring}"/>"#,
            r#"<text x="{c}" y="{c}" fill="{hex}" font-family="Sans" font-weight="bold" font-size="{font}" text-anchor="middle" dominant-baseline="central">{glyph}</text>"#,
            "</svg>"
        ),
        size = ICON_SIZE,
        c = center,
        r = CIRCLE_RADIUS,
        hex = hex,
        alpha = FILL_ALPHA,
        ring = RING_WIDTH,
        font = GLYPH_FONT_SIZE,
        glyph = GLYPH,
    );

    IconSpec {
        color,
        size: ICON_SIZE,
        glyph: GLYPH,
        svg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_is_deterministic_per_color() {
        let a = icon_for(IndicatorColor::Red);
        let b = icon_for(IndicatorColor::Red);
        assert!(std::ptr::eq(a, b));
        assert_eq!(a, &build_icon(IndicatorColor::Red));
    }

    #[test]
    fn test_icon_svg_uses_color_and_glyph() {
        let icon = icon_for(IndicatorColor::Orange);
        assert_eq!(icon.size, 32);
        assert!(icon.svg.starts_with("<svg"));
        assert!(icon.svg.contains("#f97316"));
        assert!(icon.svg.contains(r#"r="13""#));
        assert!(icon.svg.contains(">C</text>"));
    }

    #[test]
    fn test_every_color_has_distinct_icon() {
        let svgs: std::collections::HashSet<&str> = IndicatorColor::ALL
            .iter()
            .map(|c| c.icon().svg.as_str())
            .collect();
        assert_eq!(svgs.len(), IndicatorColor::ALL.len());
    }
}
