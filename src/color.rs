use egui::Color32;

use crate::error::ColorError;

/// Named colors accepted by [`parse_color`], matched case-insensitively.
const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black", [0x00, 0x00, 0x00]),
    ("darkgray", [0x44, 0x44, 0x44]),
    ("darkgrey", [0x44, 0x44, 0x44]),
    ("gray", [0x88, 0x88, 0x88]),
    ("grey", [0x88, 0x88, 0x88]),
    ("lightgray", [0xCC, 0xCC, 0xCC]),
    ("lightgrey", [0xCC, 0xCC, 0xCC]),
    ("white", [0xFF, 0xFF, 0xFF]),
    ("red", [0xFF, 0x00, 0x00]),
    ("green", [0x00, 0xFF, 0x00]),
    ("blue", [0x00, 0x00, 0xFF]),
    ("yellow", [0xFF, 0xFF, 0x00]),
    ("cyan", [0x00, 0xFF, 0xFF]),
    ("magenta", [0xFF, 0x00, 0xFF]),
    ("aqua", [0x00, 0xFF, 0xFF]),
    ("fuchsia", [0xFF, 0x00, 0xFF]),
    ("lime", [0x00, 0xFF, 0x00]),
    ("maroon", [0x80, 0x00, 0x00]),
    ("navy", [0x00, 0x00, 0x80]),
    ("olive", [0x80, 0x80, 0x00]),
    ("purple", [0x80, 0x00, 0x80]),
    ("silver", [0xC0, 0xC0, 0xC0]),
    ("teal", [0x00, 0x80, 0x80]),
];

/// Parse a color value.
///
/// Accepts `#RRGGBB`, `#AARRGGBB` or one of the names in [`NAMED_COLORS`].
pub fn parse_color(value: &str) -> Result<Color32, ColorError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ColorError::Empty);
    }

    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(|| ColorError::InvalidHex(value.to_owned()));
    }

    let lower = value.to_ascii_lowercase();
    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, [r, g, b])| Color32::from_rgb(*r, *g, *b))
        .ok_or_else(|| ColorError::UnknownName(value.to_owned()))
}

fn parse_hex(hex: &str) -> Option<Color32> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let packed = u32::from_str_radix(hex, 16).ok()?;
    let [a, r, g, b] = match hex.len() {
        6 => (packed | 0xFF00_0000).to_be_bytes(),
        8 => packed.to_be_bytes(),
        _ => return None,
    };
    Some(Color32::from_rgba_unmultiplied(r, g, b, a))
}

/// Format an opaque color as `#RRGGBB`
pub fn to_hex(color: Color32) -> String {
    let [r, g, b, _] = color.to_srgba_unmultiplied();
    format!("#{r:02X}{g:02X}{b:02X}")
}
