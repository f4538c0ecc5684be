//! Scene configuration: the tunable values exposed to the debug panel.

/// Linear RGB triple in [0, 1].
pub type Rgb = [f32; 3];

/// Parse a `#rrggbb` hex string. Returns `None` for anything else so a bad
/// panel value leaves the current color untouched.
pub fn parse_hex_color(hex: &str) -> Option<Rgb> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| -> Option<f32> {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .ok()
            .map(|v| v as f32 / 255.0)
    };
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// All user-tunable values in one explicit struct, replacing ambient
/// mutation of globals: the panel-binding layer and the render loop both
/// borrow this.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub clear_color: Rgb,
    pub portal_color_start: Rgb,
    pub portal_color_end: Rgb,
    pub fireflies_size: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            clear_color: parse_hex_color("#2f2927").unwrap(),
            portal_color_start: parse_hex_color("#7d9d45").unwrap(),
            portal_color_end: parse_hex_color("#19340d").unwrap(),
            fireflies_size: 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_hex() {
        let c = parse_hex_color("#ff0080").unwrap();
        assert_eq!(c[0], 1.0);
        assert_eq!(c[1], 0.0);
        assert!((c[2] - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse_hex_color("7d9d45").is_none());
        assert!(parse_hex_color("#7d9d4").is_none());
        assert!(parse_hex_color("#zzzzzz").is_none());
        assert!(parse_hex_color("#7d9d45aa").is_none());
    }

    #[test]
    fn defaults_match_scene_palette() {
        let cfg = SceneConfig::default();
        assert_eq!(cfg.fireflies_size, 100.0);
        assert_eq!(cfg.clear_color, parse_hex_color("#2f2927").unwrap());
    }
}
