use serde::{Deserialize, Serialize};

use crate::foundation::error::{NatriconError, NatriconResult};

/// Perceived-brightness channel weights (luma style, applied to squared channels).
pub const RED_PB_WEIGHT: f64 = 0.299;
pub const GREEN_PB_WEIGHT: f64 = 0.587;
pub const BLUE_PB_WEIGHT: f64 = 0.114;

/// RGB color with fractional channels in `[0, 255]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Hue in degrees `[0, 360)`, saturation and brightness in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Hsb {
    pub h: f64,
    pub s: f64,
    pub b: f64,
}

/// Hue in degrees, saturation and lightness in `[0, 1]`. Reporting only.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb::new(255.0, 255.0, 255.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Perceived brightness on a `0..=100` scale.
    ///
    /// `sqrt(0.299 r² + 0.587 g² + 0.114 b²)` lands on `0..=255`, then gets normalized.
    pub fn perceived_brightness(self) -> f64 {
        let pb255 = (RED_PB_WEIGHT * self.r * self.r
            + GREEN_PB_WEIGHT * self.g * self.g
            + BLUE_PB_WEIGHT * self.b * self.b)
            .sqrt();
        pb255 / 255.0 * 100.0
    }

    /// Upper-case `RRGGBB`, optionally prefixed with `#`. Channels round to nearest.
    pub fn to_html(self, with_hash: bool) -> String {
        fn to_u8(v: f64) -> u8 {
            v.clamp(0.0, 255.0).round() as u8
        }

        let hex = format!(
            "{:02X}{:02X}{:02X}",
            to_u8(self.r),
            to_u8(self.g),
            to_u8(self.b)
        );
        if with_hash { format!("#{hex}") } else { hex }
    }

    /// Parse `#RRGGBB` or `RRGGBB` (case-insensitive).
    pub fn from_hex(s: &str) -> NatriconResult<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        if s.len() != 6 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(NatriconError::validation(format!(
                "hex color must be #RRGGBB, got \"{s}\""
            )));
        }

        let byte = |i: usize| -> NatriconResult<f64> {
            u8::from_str_radix(&s[i..i + 2], 16)
                .map(f64::from)
                .map_err(|e| NatriconError::validation(format!("invalid hex byte: {e}")))
        };
        Ok(Self::new(byte(0)?, byte(2)?, byte(4)?))
    }

    pub fn to_hsb(self) -> Hsb {
        let (max, min) = self.max_min();
        let delta = max - min;

        let s = if max == 0.0 { 0.0 } else { delta / max };
        Hsb {
            h: self.hue(max, delta),
            s,
            b: max / 255.0,
        }
    }

    pub fn to_hsl(self) -> Hsl {
        let (max, min) = self.max_min();
        let delta = max - min;

        let l = (max + min) / 2.0 / 255.0;
        let s = if delta == 0.0 {
            0.0
        } else {
            (delta / 255.0) / (1.0 - (2.0 * l - 1.0).abs())
        };
        Hsl {
            h: self.hue(max, delta),
            s,
            l,
        }
    }

    fn max_min(self) -> (f64, f64) {
        (
            self.r.max(self.g).max(self.b),
            self.r.min(self.g).min(self.b),
        )
    }

    fn hue(self, max: f64, delta: f64) -> f64 {
        if delta == 0.0 {
            return 0.0;
        }
        let h = if max == self.r {
            60.0 * ((self.g - self.b) / delta)
        } else if max == self.g {
            60.0 * ((self.b - self.r) / delta + 2.0)
        } else {
            60.0 * ((self.r - self.g) / delta + 4.0)
        };
        wrap_degrees(h)
    }
}

impl Hsb {
    pub fn to_rgb(self) -> Rgb {
        let v = self.b * 255.0;
        let c = v * self.s;
        let (r, g, b) = sector_rgb(self.h, c);
        let m = v - c;
        Rgb::new(r + m, g + m, b + m)
    }

    /// Component-wise `other - self`, used when reporting how far hair drifted from body.
    pub fn delta(self, other: Hsb) -> Hsb {
        Hsb {
            h: other.h - self.h,
            s: other.s - self.s,
            b: other.b - self.b,
        }
    }
}

impl Hsl {
    pub fn to_rgb(self) -> Rgb {
        let c = (1.0 - (2.0 * self.l - 1.0).abs()) * self.s * 255.0;
        let (r, g, b) = sector_rgb(self.h, c);
        let m = self.l * 255.0 - c / 2.0;
        Rgb::new(r + m, g + m, b + m)
    }
}

/// Wrap an angle into `[0, 360)`.
pub fn wrap_degrees(h: f64) -> f64 {
    let w = h.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if w >= 360.0 { 0.0 } else { w }
}

fn sector_rgb(h: f64, c: f64) -> (f64, f64, f64) {
    let hp = wrap_degrees(h) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    }
}

impl Serialize for Rgb {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_html(true))
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            Obj { r: f64, g: f64, b: f64 },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => Rgb::from_hex(&s).map_err(serde::de::Error::custom),
            Repr::Obj { r, g, b } => {
                for v in [r, g, b] {
                    if !(0.0..=255.0).contains(&v) {
                        return Err(serde::de::Error::custom(
                            "rgb channels must be within [0, 255]",
                        ));
                    }
                }
                Ok(Rgb::new(r, g, b))
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/color/space.rs"]
mod tests;
