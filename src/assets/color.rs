use std::str::FromStr;

use crate::foundation::error::{CopsError, CopsResult};

/// Straight (non-premultiplied) RGBA8 color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub(crate) fn to_peniko(self) -> vello_cpu::peniko::Color {
        vello_cpu::peniko::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

impl FromStr for Rgba8 {
    type Err = CopsError;

    /// Parses `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb()`/`rgba()`, `hsl()`/`hsla()` and a
    /// small set of CSS color names.
    fn from_str(s: &str) -> CopsResult<Self> {
        let s = s.trim();
        let lower = s.to_ascii_lowercase();
        if let Some(hex) = lower.strip_prefix('#') {
            return parse_hex(hex).map_err(|e| CopsError::invalid_option(format!("color '{s}': {e}")));
        }
        if let Some(args) = function_args(&lower, &["rgba", "rgb"]) {
            return parse_rgb_fn(args)
                .map_err(|e| CopsError::invalid_option(format!("color '{s}': {e}")));
        }
        if let Some(args) = function_args(&lower, &["hsla", "hsl"]) {
            return parse_hsl_fn(args)
                .map_err(|e| CopsError::invalid_option(format!("color '{s}': {e}")));
        }
        named(&lower).ok_or_else(|| CopsError::invalid_option(format!("unknown color '{s}'")))
    }
}

fn function_args<'a>(s: &'a str, names: &[&str]) -> Option<&'a str> {
    names.iter().find_map(|name| {
        s.strip_prefix(name)?
            .trim_start()
            .strip_prefix('(')?
            .strip_suffix(')')
    })
}

fn parse_hex(s: &str) -> Result<Rgba8, String> {
    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }
    fn hex_nibble(c: &str) -> Result<u8, String> {
        hex_byte(c).map(|v| v * 17)
    }

    if !s.is_ascii() {
        return Err("hex color must be ascii".to_owned());
    }

    match s.len() {
        3 | 4 => {
            let r = hex_nibble(&s[0..1])?;
            let g = hex_nibble(&s[1..2])?;
            let b = hex_nibble(&s[2..3])?;
            let a = if s.len() == 4 { hex_nibble(&s[3..4])? } else { 255 };
            Ok(Rgba8::rgba(r, g, b, a))
        }
        6 | 8 => {
            let r = hex_byte(&s[0..2])?;
            let g = hex_byte(&s[2..4])?;
            let b = hex_byte(&s[4..6])?;
            let a = if s.len() == 8 { hex_byte(&s[6..8])? } else { 255 };
            Ok(Rgba8::rgba(r, g, b, a))
        }
        _ => Err("hex color must be #RGB, #RGBA, #RRGGBB or #RRGGBBAA".to_owned()),
    }
}

fn split_args(args: &str) -> Vec<&str> {
    args.split(',').map(str::trim).collect()
}

fn parse_alpha(s: Option<&&str>) -> Result<u8, String> {
    let Some(s) = s else {
        return Ok(255);
    };
    let a: f64 = s.parse().map_err(|_| format!("invalid alpha \"{s}\""))?;
    Ok(to_u8(a))
}

fn parse_rgb_fn(args: &str) -> Result<Rgba8, String> {
    let parts = split_args(args);
    if !(3..=4).contains(&parts.len()) {
        return Err("rgb() takes 3 or 4 arguments".to_owned());
    }
    let channel = |s: &str| -> Result<u8, String> {
        let v: f64 = s.parse().map_err(|_| format!("invalid channel \"{s}\""))?;
        Ok(v.clamp(0.0, 255.0).round() as u8)
    };
    Ok(Rgba8::rgba(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        parse_alpha(parts.get(3))?,
    ))
}

fn parse_hsl_fn(args: &str) -> Result<Rgba8, String> {
    let parts = split_args(args);
    if !(3..=4).contains(&parts.len()) {
        return Err("hsl() takes 3 or 4 arguments".to_owned());
    }
    let h: f64 = parts[0]
        .trim_end_matches("deg")
        .parse()
        .map_err(|_| format!("invalid hue \"{}\"", parts[0]))?;
    let percent = |s: &str| -> Result<f64, String> {
        let v: f64 = s
            .trim_end_matches('%')
            .parse()
            .map_err(|_| format!("invalid percentage \"{s}\""))?;
        Ok(v / 100.0)
    };
    let (r, g, b) = hsl_to_rgb(h, percent(parts[1])?, percent(parts[2])?);
    Ok(Rgba8::rgba(
        to_u8(r),
        to_u8(g),
        to_u8(b),
        parse_alpha(parts.get(3))?,
    ))
}

fn to_u8(x: f64) -> u8 {
    (x.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    let h = (h % 360.0 + 360.0) % 360.0 / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        return (l, l, l);
    }

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    (
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    )
}

fn named(name: &str) -> Option<Rgba8> {
    let c = match name {
        "transparent" => Rgba8::TRANSPARENT,
        "black" => Rgba8::BLACK,
        "white" => Rgba8::WHITE,
        "gray" | "grey" => Rgba8::rgb(128, 128, 128),
        "silver" => Rgba8::rgb(192, 192, 192),
        "red" => Rgba8::rgb(255, 0, 0),
        "maroon" => Rgba8::rgb(128, 0, 0),
        "orange" => Rgba8::rgb(255, 165, 0),
        "yellow" => Rgba8::rgb(255, 255, 0),
        "lime" => Rgba8::rgb(0, 255, 0),
        "green" => Rgba8::rgb(0, 128, 0),
        "olive" => Rgba8::rgb(128, 128, 0),
        "teal" => Rgba8::rgb(0, 128, 128),
        "cyan" | "aqua" => Rgba8::rgb(0, 255, 255),
        "blue" => Rgba8::rgb(0, 0, 255),
        "navy" => Rgba8::rgb(0, 0, 128),
        "purple" => Rgba8::rgb(128, 0, 128),
        "magenta" | "fuchsia" => Rgba8::rgb(255, 0, 255),
        "pink" => Rgba8::rgb(255, 192, 203),
        _ => return None,
    };
    Some(c)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/color.rs"]
mod tests;
