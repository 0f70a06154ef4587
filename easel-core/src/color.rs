//! Color parsing and perceptual luminance.

use std::str::FromStr;

use crate::CanvasError;

/// An sRGB color with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha in `[0, 1]`.
    pub a: f32,
}

impl Rgba {
    /// Opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Perceptual luminance in `[0, 1]`, composited over a background of
    /// luminance `background_lum`.
    #[must_use]
    pub fn luminance(&self, background_lum: f32) -> f32 {
        let lum = (0.299 * f32::from(self.r) + 0.587 * f32::from(self.g) + 0.114 * f32::from(self.b))
            / 255.0;
        lum * self.a + (1.0 - self.a) * background_lum
    }
}

impl FromStr for Rgba {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s).ok_or_else(|| CanvasError::InvalidColor(s.to_string()))
    }
}

/// CSS named colors, sorted by name. `transparent` is handled separately.
const NAMED: &[(&str, Rgba)] = &[
    ("aliceblue", Rgba::rgb(240, 248, 255)),
    ("antiquewhite", Rgba::rgb(250, 235, 215)),
    ("aqua", Rgba::rgb(0, 255, 255)),
    ("aquamarine", Rgba::rgb(127, 255, 212)),
    ("azure", Rgba::rgb(240, 255, 255)),
    ("beige", Rgba::rgb(245, 245, 220)),
    ("bisque", Rgba::rgb(255, 228, 196)),
    ("black", Rgba::rgb(0, 0, 0)),
    ("blanchedalmond", Rgba::rgb(255, 235, 205)),
    ("blue", Rgba::rgb(0, 0, 255)),
    ("blueviolet", Rgba::rgb(138, 43, 226)),
    ("brown", Rgba::rgb(165, 42, 42)),
    ("burlywood", Rgba::rgb(222, 184, 135)),
    ("cadetblue", Rgba::rgb(95, 158, 160)),
    ("chartreuse", Rgba::rgb(127, 255, 0)),
    ("chocolate", Rgba::rgb(210, 105, 30)),
    ("coral", Rgba::rgb(255, 127, 80)),
    ("cornflowerblue", Rgba::rgb(100, 149, 237)),
    ("cornsilk", Rgba::rgb(255, 248, 220)),
    ("crimson", Rgba::rgb(220, 20, 60)),
    ("cyan", Rgba::rgb(0, 255, 255)),
    ("darkblue", Rgba::rgb(0, 0, 139)),
    ("darkcyan", Rgba::rgb(0, 139, 139)),
    ("darkgoldenrod", Rgba::rgb(184, 134, 11)),
    ("darkgray", Rgba::rgb(169, 169, 169)),
    ("darkgreen", Rgba::rgb(0, 100, 0)),
    ("darkgrey", Rgba::rgb(169, 169, 169)),
    ("darkkhaki", Rgba::rgb(189, 183, 107)),
    ("darkmagenta", Rgba::rgb(139, 0, 139)),
    ("darkolivegreen", Rgba::rgb(85, 107, 47)),
    ("darkorange", Rgba::rgb(255, 140, 0)),
    ("darkorchid", Rgba::rgb(153, 50, 204)),
    ("darkred", Rgba::rgb(139, 0, 0)),
    ("darksalmon", Rgba::rgb(233, 150, 122)),
    ("darkseagreen", Rgba::rgb(143, 188, 143)),
    ("darkslateblue", Rgba::rgb(72, 61, 139)),
    ("darkslategray", Rgba::rgb(47, 79, 79)),
    ("darkslategrey", Rgba::rgb(47, 79, 79)),
    ("darkturquoise", Rgba::rgb(0, 206, 209)),
    ("darkviolet", Rgba::rgb(148, 0, 211)),
    ("deeppink", Rgba::rgb(255, 20, 147)),
    ("deepskyblue", Rgba::rgb(0, 191, 255)),
    ("dimgray", Rgba::rgb(105, 105, 105)),
    ("dimgrey", Rgba::rgb(105, 105, 105)),
    ("dodgerblue", Rgba::rgb(30, 144, 255)),
    ("firebrick", Rgba::rgb(178, 34, 34)),
    ("floralwhite", Rgba::rgb(255, 250, 240)),
    ("forestgreen", Rgba::rgb(34, 139, 34)),
    ("fuchsia", Rgba::rgb(255, 0, 255)),
    ("gainsboro", Rgba::rgb(220, 220, 220)),
    ("ghostwhite", Rgba::rgb(248, 248, 255)),
    ("gold", Rgba::rgb(255, 215, 0)),
    ("goldenrod", Rgba::rgb(218, 165, 32)),
    ("gray", Rgba::rgb(128, 128, 128)),
    ("green", Rgba::rgb(0, 128, 0)),
    ("greenyellow", Rgba::rgb(173, 255, 47)),
    ("grey", Rgba::rgb(128, 128, 128)),
    ("honeydew", Rgba::rgb(240, 255, 240)),
    ("hotpink", Rgba::rgb(255, 105, 180)),
    ("indianred", Rgba::rgb(205, 92, 92)),
    ("indigo", Rgba::rgb(75, 0, 130)),
    ("ivory", Rgba::rgb(255, 255, 240)),
    ("khaki", Rgba::rgb(240, 230, 140)),
    ("lavender", Rgba::rgb(230, 230, 250)),
    ("lavenderblush", Rgba::rgb(255, 240, 245)),
    ("lawngreen", Rgba::rgb(124, 252, 0)),
    ("lemonchiffon", Rgba::rgb(255, 250, 205)),
    ("lightblue", Rgba::rgb(173, 216, 230)),
    ("lightcoral", Rgba::rgb(240, 128, 128)),
    ("lightcyan", Rgba::rgb(224, 255, 255)),
    ("lightgoldenrodyellow", Rgba::rgb(250, 250, 210)),
    ("lightgray", Rgba::rgb(211, 211, 211)),
    ("lightgreen", Rgba::rgb(144, 238, 144)),
    ("lightgrey", Rgba::rgb(211, 211, 211)),
    ("lightpink", Rgba::rgb(255, 182, 193)),
    ("lightsalmon", Rgba::rgb(255, 160, 122)),
    ("lightseagreen", Rgba::rgb(32, 178, 170)),
    ("lightskyblue", Rgba::rgb(135, 206, 250)),
    ("lightslategray", Rgba::rgb(119, 136, 153)),
    ("lightslategrey", Rgba::rgb(119, 136, 153)),
    ("lightsteelblue", Rgba::rgb(176, 196, 222)),
    ("lightyellow", Rgba::rgb(255, 255, 224)),
    ("lime", Rgba::rgb(0, 255, 0)),
    ("limegreen", Rgba::rgb(50, 205, 50)),
    ("linen", Rgba::rgb(250, 240, 230)),
    ("magenta", Rgba::rgb(255, 0, 255)),
    ("maroon", Rgba::rgb(128, 0, 0)),
    ("mediumaquamarine", Rgba::rgb(102, 205, 170)),
    ("mediumblue", Rgba::rgb(0, 0, 205)),
    ("mediumorchid", Rgba::rgb(186, 85, 211)),
    ("mediumpurple", Rgba::rgb(147, 112, 219)),
    ("mediumseagreen", Rgba::rgb(60, 179, 113)),
    ("mediumslateblue", Rgba::rgb(123, 104, 238)),
    ("mediumspringgreen", Rgba::rgb(0, 250, 154)),
    ("mediumturquoise", Rgba::rgb(72, 209, 204)),
    ("mediumvioletred", Rgba::rgb(199, 21, 133)),
    ("midnightblue", Rgba::rgb(25, 25, 112)),
    ("mintcream", Rgba::rgb(245, 255, 250)),
    ("mistyrose", Rgba::rgb(255, 228, 225)),
    ("moccasin", Rgba::rgb(255, 228, 181)),
    ("navajowhite", Rgba::rgb(255, 222, 173)),
    ("navy", Rgba::rgb(0, 0, 128)),
    ("oldlace", Rgba::rgb(253, 245, 230)),
    ("olive", Rgba::rgb(128, 128, 0)),
    ("olivedrab", Rgba::rgb(107, 142, 35)),
    ("orange", Rgba::rgb(255, 165, 0)),
    ("orangered", Rgba::rgb(255, 69, 0)),
    ("orchid", Rgba::rgb(218, 112, 214)),
    ("palegoldenrod", Rgba::rgb(238, 232, 170)),
    ("palegreen", Rgba::rgb(152, 251, 152)),
    ("paleturquoise", Rgba::rgb(175, 238, 238)),
    ("palevioletred", Rgba::rgb(219, 112, 147)),
    ("papayawhip", Rgba::rgb(255, 239, 213)),
    ("peachpuff", Rgba::rgb(255, 218, 185)),
    ("peru", Rgba::rgb(205, 133, 63)),
    ("pink", Rgba::rgb(255, 192, 203)),
    ("plum", Rgba::rgb(221, 160, 221)),
    ("powderblue", Rgba::rgb(176, 224, 230)),
    ("purple", Rgba::rgb(128, 0, 128)),
    ("rebeccapurple", Rgba::rgb(102, 51, 153)),
    ("red", Rgba::rgb(255, 0, 0)),
    ("rosybrown", Rgba::rgb(188, 143, 143)),
    ("royalblue", Rgba::rgb(65, 105, 225)),
    ("saddlebrown", Rgba::rgb(139, 69, 19)),
    ("salmon", Rgba::rgb(250, 128, 114)),
    ("sandybrown", Rgba::rgb(244, 164, 96)),
    ("seagreen", Rgba::rgb(46, 139, 87)),
    ("seashell", Rgba::rgb(255, 245, 238)),
    ("sienna", Rgba::rgb(160, 82, 45)),
    ("silver", Rgba::rgb(192, 192, 192)),
    ("skyblue", Rgba::rgb(135, 206, 235)),
    ("slateblue", Rgba::rgb(106, 90, 205)),
    ("slategray", Rgba::rgb(112, 128, 144)),
    ("slategrey", Rgba::rgb(112, 128, 144)),
    ("snow", Rgba::rgb(255, 250, 250)),
    ("springgreen", Rgba::rgb(0, 255, 127)),
    ("steelblue", Rgba::rgb(70, 130, 180)),
    ("tan", Rgba::rgb(210, 180, 140)),
    ("teal", Rgba::rgb(0, 128, 128)),
    ("thistle", Rgba::rgb(216, 191, 216)),
    ("tomato", Rgba::rgb(255, 99, 71)),
    ("turquoise", Rgba::rgb(64, 224, 208)),
    ("violet", Rgba::rgb(238, 130, 238)),
    ("wheat", Rgba::rgb(245, 222, 179)),
    ("white", Rgba::rgb(255, 255, 255)),
    ("whitesmoke", Rgba::rgb(245, 245, 245)),
    ("yellow", Rgba::rgb(255, 255, 0)),
    ("yellowgreen", Rgba::rgb(154, 205, 50)),
];

const TRANSPARENT: Rgba = Rgba {
    r: 0,
    g: 0,
    b: 0,
    a: 0.0,
};

/// Parse a CSS color: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`,
/// `rgb()`, `rgba()`, `hsl()`, `hsla()` or a CSS color name.
#[must_use]
pub fn parse(input: &str) -> Option<Rgba> {
    let s = input.trim().to_ascii_lowercase();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(body) = s.strip_prefix("rgba(").or_else(|| s.strip_prefix("rgb(")) {
        return parse_functional(body.strip_suffix(')')?);
    }
    if let Some(body) = s.strip_prefix("hsla(").or_else(|| s.strip_prefix("hsl(")) {
        return parse_hsl(body.strip_suffix(')')?);
    }
    if s == "transparent" {
        return Some(TRANSPARENT);
    }
    NAMED
        .binary_search_by(|(name, _)| (*name).cmp(s.as_str()))
        .ok()
        .map(|i| NAMED[i].1)
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 | 4 => {
            let a = if hex.len() == 4 {
                f32::from(nibble(3)?) / 255.0
            } else {
                1.0
            };
            Some(Rgba {
                r: nibble(0)?,
                g: nibble(1)?,
                b: nibble(2)?,
                a,
            })
        }
        6 | 8 => {
            let a = if hex.len() == 8 {
                f32::from(byte(6)?) / 255.0
            } else {
                1.0
            };
            Some(Rgba {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
                a,
            })
        }
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_functional(body: &str) -> Option<Rgba> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |p: &str| -> Option<u8> {
        let v = if let Some(pct) = p.strip_suffix('%') {
            pct.parse::<f32>().ok()? * 2.55
        } else {
            p.parse::<f32>().ok()?
        };
        Some(v.round().clamp(0.0, 255.0) as u8)
    };
    let a = parse_alpha(parts.get(3).copied())?;
    Some(Rgba {
        r: channel(parts[0])?,
        g: channel(parts[1])?,
        b: channel(parts[2])?,
        a,
    })
}

fn parse_alpha(part: Option<&str>) -> Option<f32> {
    match part {
        Some(p) => {
            let a = match p.strip_suffix('%') {
                Some(pct) => pct.parse::<f32>().ok()? / 100.0,
                None => p.parse::<f32>().ok()?,
            };
            Some(a.clamp(0.0, 1.0))
        }
        None => Some(1.0),
    }
}

/// `h, s%, l%[, a]`, hue in degrees.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_hsl(body: &str) -> Option<Rgba> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let percent = |p: &str| -> Option<f32> {
        let v = p.strip_suffix('%').unwrap_or(p).parse::<f32>().ok()?;
        Some((v / 100.0).clamp(0.0, 1.0))
    };
    let h = parts[0].strip_suffix("deg").unwrap_or(parts[0]).parse::<f32>().ok()?;
    let h = h.rem_euclid(360.0) / 360.0;
    let s = percent(parts[1])?;
    let l = percent(parts[2])?;
    let a = parse_alpha(parts.get(3).copied())?;

    let m2 = if l <= 0.5 { l * (s + 1.0) } else { l + s - l * s };
    let m1 = l * 2.0 - m2;
    let channel = |t: f32| (hue_to_rgb(m1, m2, t) * 255.0).round().clamp(0.0, 255.0) as u8;
    Some(Rgba {
        r: channel(h + 1.0 / 3.0),
        g: channel(h),
        b: channel(h - 1.0 / 3.0),
        a,
    })
}

fn hue_to_rgb(m1: f32, m2: f32, h: f32) -> f32 {
    let h = h.rem_euclid(1.0);
    if h * 6.0 < 1.0 {
        m1 + (m2 - m1) * h * 6.0
    } else if h * 2.0 < 1.0 {
        m2
    } else if h * 3.0 < 2.0 {
        m1 + (m2 - m1) * (2.0 / 3.0 - h) * 6.0
    } else {
        m1
    }
}

/// Luminance of a color string over a background of luminance
/// `background_lum`; unparseable colors count as 0.
#[must_use]
pub fn lum(color: &str, background_lum: f32) -> f32 {
    parse(color).map_or(0.0, |c| c.luminance(background_lum))
}
