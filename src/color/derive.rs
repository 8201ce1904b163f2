use std::marker::PhantomData;

use crate::color::rng::{PinnedRng, SeedSource};
use crate::color::space::{
    BLUE_PB_WEIGHT, GREEN_PB_WEIGHT, Hsb, RED_PB_WEIGHT, Rgb, wrap_degrees,
};
use crate::foundation::config::{BlueSolveWeight, DerivationConfig, HairHuePolicy};
use crate::foundation::error::{NatriconError, NatriconResult};

/// Hex characters consumed per generator seed.
pub const SEED_HEX_LEN: usize = 4;
/// Minimum entropy length accepted by [`ColorDeriver::body_color`].
pub const BODY_ENTROPY_LEN: usize = 3 * SEED_HEX_LEN;
/// Hex characters of an account hash consumed by [`ColorDeriver::palette`].
pub const PALETTE_ENTROPY_LEN: usize = BODY_ENTROPY_LEN + 3 * SEED_HEX_LEN;

/// Body and hair colors derived for one account hash.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub body: Rgb,
    pub hair: Rgb,
}

/// Seeded, bounded color generation.
///
/// Generic over the seed source so the pinned generator stays an explicit type-level choice.
#[derive(Clone, Debug)]
pub struct ColorDeriver<R = PinnedRng> {
    cfg: DerivationConfig,
    _rng: PhantomData<fn() -> R>,
}

impl ColorDeriver<PinnedRng> {
    pub fn new(cfg: DerivationConfig) -> Self {
        Self::with_source(cfg)
    }
}

impl Default for ColorDeriver<PinnedRng> {
    fn default() -> Self {
        Self::new(DerivationConfig::default())
    }
}

impl<R: SeedSource> ColorDeriver<R> {
    pub fn with_source(cfg: DerivationConfig) -> Self {
        Self {
            cfg,
            _rng: PhantomData,
        }
    }

    pub fn config(&self) -> &DerivationConfig {
        &self.cfg
    }

    fn precision(&self) -> f64 {
        f64::from(self.cfg.precision)
    }

    fn precision_i32(&self) -> i32 {
        self.cfg.precision as i32
    }

    /// Derive the body color from at least twelve hex characters of entropy.
    ///
    /// Red and green are free over `[0, 255]`; blue is drawn from the interval that keeps the
    /// perceived brightness inside the configured band.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn body_color(&self, entropy: &str) -> NatriconResult<Rgb> {
        if !entropy.get(..BODY_ENTROPY_LEN).is_some_and(str::is_ascii) {
            return Err(NatriconError::derivation(format!(
                "body entropy must be at least {BODY_ENTROPY_LEN} hex characters"
            )));
        }
        let p = self.precision();

        let mut rng = R::from_seed(parse_seed(&entropy[0..4])?);
        let r = f64::from(rng.int31n(255 * self.precision_i32())) / p;

        let mut rng = R::from_seed(parse_seed(&entropy[4..8])?);
        let g = f64::from(rng.int31n(255 * self.precision_i32())) / p;

        let mut rng = R::from_seed(parse_seed(&entropy[8..12])?);
        let (lower, upper) = self.blue_bounds(r, g);
        let lower = lower * p;
        let upper = upper * p;
        let b = (f64::from(rng.int31n(upper as i32 - lower as i32)) + lower) / p;

        let color = Rgb::new(r, g, b);
        tracing::debug!(
            color = %color.to_html(true),
            perceived_brightness = color.perceived_brightness(),
            "derived body color"
        );
        Ok(color)
    }

    /// Blue channel interval `[lower, upper]` keeping perceived brightness inside the band,
    /// both ends clamped to `[0, 255]`.
    pub fn blue_bounds(&self, r: f64, g: f64) -> (f64, f64) {
        let weight = match self.cfg.blue_solve_weight {
            BlueSolveWeight::Blue => BLUE_PB_WEIGHT,
            BlueSolveWeight::Green => GREEN_PB_WEIGHT,
        };
        let fixed = RED_PB_WEIGHT * r * r + GREEN_PB_WEIGHT * g * g;
        let solve = |pb: f64| {
            let pb255 = pb / 100.0 * 255.0;
            ((pb255 * pb255 - fixed) / weight).max(0.0).sqrt()
        };

        let lower = solve(self.cfg.min_perceived_brightness).clamp(0.0, 255.0);
        let upper = solve(self.cfg.max_perceived_brightness).clamp(0.0, 255.0);
        (lower, upper)
    }

    /// Derive a hair color constrained jointly with `body`.
    ///
    /// Each entropy argument seeds its own generator (1 to 16 hex characters; only the low 32
    /// bits of the value are used).
    #[tracing::instrument(level = "debug", skip(self, body))]
    pub fn hair_color(
        &self,
        body: Rgb,
        hue_entropy: &str,
        sat_entropy: &str,
        bright_entropy: &str,
    ) -> NatriconResult<Rgb> {
        let body_hsb = body.to_hsb();
        let p = self.precision();
        let hue_seed = parse_seed(hue_entropy)?;
        let sat_seed = parse_seed(sat_entropy)?;
        let bright_seed = parse_seed(bright_entropy)?;

        let h = match self.cfg.hair_hue {
            HairHuePolicy::MatchBody => body_hsb.h,
            HairHuePolicy::Complementary { half_width } => {
                let center = body_hsb.h + 180.0;
                let lower = (center - half_width) * p;
                let upper = (center + half_width) * p;
                let mut rng = R::from_seed(hue_seed);
                let h = (f64::from(rng.int31n(upper as i32 - lower as i32)) + lower) / p;
                wrap_degrees(h)
            }
        };

        let full = 100 * self.precision_i32();
        let lower_s =
            ((self.cfg.min_total_saturation - body_hsb.s * 100.0).max(0.0) * p) as i32;
        let mut rng = R::from_seed(sat_seed);
        let s = f64::from(rng.int31n(full - lower_s) + lower_s) / (100.0 * p);

        let upper_b = if s * 100.0 > self.cfg.hair_saturation_threshold {
            100.0
        } else {
            self.cfg.hair_brightness_cap
        };
        let lower_b = (self.cfg.min_total_brightness - body_hsb.b * 100.0)
            .max(self.cfg.min_hair_brightness)
            .min(upper_b);
        let (upper_b, lower_b) = ((upper_b * p) as i32, (lower_b * p) as i32);
        let mut rng = R::from_seed(bright_seed);
        let b = f64::from(rng.int31n(upper_b - lower_b) + lower_b) / (100.0 * p);

        let color = Hsb { h, s, b }.to_rgb();
        tracing::debug!(color = %color.to_html(true), "derived hair color");
        Ok(color)
    }

    /// Body and hair colors from the leading hex characters of an account hash.
    pub fn palette(&self, hash: &str) -> NatriconResult<Palette> {
        if !hash.get(..PALETTE_ENTROPY_LEN).is_some_and(str::is_ascii) {
            return Err(NatriconError::derivation(format!(
                "hash must be at least {PALETTE_ENTROPY_LEN} hex characters"
            )));
        }
        let body = self.body_color(&hash[0..BODY_ENTROPY_LEN])?;
        let hair = self.hair_color(body, &hash[12..16], &hash[16..20], &hash[20..24])?;
        Ok(Palette { body, hair })
    }
}

/// Parse a hex seed. Values wider than 32 bits keep their low 32 bits.
pub fn parse_seed(hex: &str) -> NatriconResult<u32> {
    if hex.is_empty() || hex.len() > 16 {
        return Err(NatriconError::derivation(format!(
            "seed must be 1 to 16 hex characters, got {}",
            hex.len()
        )));
    }
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(NatriconError::derivation(format!(
            "invalid hex seed \"{hex}\""
        )));
    }
    u64::from_str_radix(hex, 16)
        .map(|v| v as u32)
        .map_err(|e| NatriconError::derivation(format!("invalid hex seed \"{hex}\": {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/color/derive.rs"]
mod tests;
