use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::compose::MinifyOptions;
use crate::foundation::error::{NatriconError, NatriconResult};

/// How the hair hue relates to the body hue.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "policy")]
pub enum HairHuePolicy {
    /// Hair shares the body hue.
    MatchBody,
    /// Hair hue is drawn within `half_width` degrees of the complementary hue.
    Complementary { half_width: f64 },
}

/// Which perceived-brightness weight divides the blue-bound solve.
///
/// `Green` reproduces the historical solver, which divided by the green weight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlueSolveWeight {
    Blue,
    Green,
}

/// Bounds for body and hair color generation. Scales are `0..=100` unless noted.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DerivationConfig {
    pub min_perceived_brightness: f64,
    pub max_perceived_brightness: f64,
    pub hair_hue: HairHuePolicy,
    pub min_total_saturation: f64,
    pub min_total_brightness: f64,
    pub min_hair_brightness: f64,
    /// Hair brightness ceiling while hair saturation stays at or below the threshold.
    pub hair_brightness_cap: f64,
    pub hair_saturation_threshold: f64,
    /// Fixed-point scale shared by every random draw (1000 = three decimal digits).
    pub precision: u32,
    pub blue_solve_weight: BlueSolveWeight,
}

impl DerivationConfig {
    /// Current generation policy.
    pub fn current() -> Self {
        Self {
            min_perceived_brightness: 18.0,
            max_perceived_brightness: 95.0,
            hair_hue: HairHuePolicy::MatchBody,
            min_total_saturation: 60.0,
            min_total_brightness: 130.0,
            min_hair_brightness: 60.0,
            hair_brightness_cap: 90.0,
            hair_saturation_threshold: 10.0,
            precision: 1000,
            blue_solve_weight: BlueSolveWeight::Blue,
        }
    }

    /// The earlier policy: finer precision, darker hair allowed, complementary hue window and
    /// the green-weight blue solve.
    pub fn legacy() -> Self {
        Self {
            hair_hue: HairHuePolicy::Complementary { half_width: 90.0 },
            min_hair_brightness: 40.0,
            precision: 10_000,
            blue_solve_weight: BlueSolveWeight::Green,
            ..Self::current()
        }
    }

    pub fn validate(&self) -> NatriconResult<()> {
        let pb_ok = (0.0..=100.0).contains(&self.min_perceived_brightness)
            && (0.0..=100.0).contains(&self.max_perceived_brightness)
            && self.min_perceived_brightness < self.max_perceived_brightness;
        if !pb_ok {
            return Err(NatriconError::validation(
                "perceived brightness band must satisfy 0 <= min < max <= 100",
            ));
        }
        if self.precision == 0 {
            return Err(NatriconError::validation("derivation precision must be > 0"));
        }
        // 100 * precision must fit the generator's 31-bit range.
        if u64::from(self.precision) * 360 > i32::MAX as u64 {
            return Err(NatriconError::validation("derivation precision is too large"));
        }
        if !(0.0..=100.0).contains(&self.min_hair_brightness)
            || !(0.0..=100.0).contains(&self.hair_brightness_cap)
        {
            return Err(NatriconError::validation(
                "hair brightness bounds must be within [0, 100]",
            ));
        }
        if !(0.0..=100.0).contains(&self.min_total_saturation)
            || !(0.0..=100.0).contains(&self.hair_saturation_threshold)
        {
            return Err(NatriconError::validation(
                "saturation thresholds must be within [0, 100]",
            ));
        }
        if !(0.0..=200.0).contains(&self.min_total_brightness) {
            return Err(NatriconError::validation(
                "min total brightness must be within [0, 200]",
            ));
        }
        if let HairHuePolicy::Complementary { half_width } = self.hair_hue
            && !(0.0..=180.0).contains(&half_width)
        {
            return Err(NatriconError::validation(
                "complementary hue half width must be within [0, 180]",
            ));
        }
        Ok(())
    }
}

impl Default for DerivationConfig {
    fn default() -> Self {
        Self::current()
    }
}

/// Layer recoloring parameters and canvas size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComposeConfig {
    pub canvas_size: u32,
    pub min_shadow_opacity: f64,
    pub max_shadow_opacity: f64,
    pub min_accessory_opacity: f64,
    pub max_accessory_opacity: f64,
    /// Bodies with perceived brightness below this count as dark.
    pub light_dark_switch: u32,
    /// Replaces white on dark monochrome accessories.
    pub dark_white_fallback: Rgb,
    pub minify: MinifyOptions,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            canvas_size: 1080,
            min_shadow_opacity: 0.075,
            max_shadow_opacity: 0.4,
            min_accessory_opacity: 0.2,
            max_accessory_opacity: 0.5,
            light_dark_switch: 30,
            dark_white_fallback: Rgb::new(156.0, 162.0, 175.0),
            minify: MinifyOptions::default(),
        }
    }
}

impl ComposeConfig {
    pub fn validate(&self) -> NatriconResult<()> {
        if self.canvas_size == 0 {
            return Err(NatriconError::validation("canvas size must be > 0"));
        }
        for (name, lo, hi) in [
            ("shadow", self.min_shadow_opacity, self.max_shadow_opacity),
            (
                "accessory",
                self.min_accessory_opacity,
                self.max_accessory_opacity,
            ),
        ] {
            if !(0.0..=1.0).contains(&lo) || !(0.0..=1.0).contains(&hi) || lo > hi {
                return Err(NatriconError::validation(format!(
                    "{name} opacity range must satisfy 0 <= min <= max <= 1"
                )));
            }
        }
        Ok(())
    }
}

/// Raster output limits and conversion concurrency.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RasterConfig {
    pub min_size: u32,
    pub max_size: u32,
    pub default_size: u32,
    /// Worker threads for conversions. `None` uses available parallelism.
    pub max_in_flight: Option<usize>,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            min_size: 100,
            max_size: 1000,
            default_size: 128,
            max_in_flight: None,
        }
    }
}

impl RasterConfig {
    pub fn validate(&self) -> NatriconResult<()> {
        if self.min_size == 0 || self.min_size > self.max_size {
            return Err(NatriconError::validation(
                "raster size range must satisfy 0 < min <= max",
            ));
        }
        if !(self.min_size..=self.max_size).contains(&self.default_size) {
            return Err(NatriconError::validation(
                "default raster size must be inside the size range",
            ));
        }
        if self.max_in_flight == Some(0) {
            return Err(NatriconError::validation(
                "raster 'max_in_flight' must be >= 1 when set",
            ));
        }
        Ok(())
    }

    /// Reject sizes outside `[min_size, max_size]`.
    pub fn check_size(&self, size: u32) -> NatriconResult<u32> {
        if size < self.min_size || size > self.max_size {
            return Err(NatriconError::validation(format!(
                "size must be an integer between {} and {}",
                self.min_size, self.max_size
            )));
        }
        Ok(size)
    }
}

/// Top-level configuration, usually read from a JSON file at startup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AvatarConfig {
    pub derivation: DerivationConfig,
    pub compose: ComposeConfig,
    pub raster: RasterConfig,
}

impl AvatarConfig {
    pub fn from_json_str(s: &str) -> NatriconResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| NatriconError::serde(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_path(path: impl AsRef<Path>) -> NatriconResult<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    pub fn validate(&self) -> NatriconResult<()> {
        self.derivation.validate()?;
        self.compose.validate()?;
        self.raster.validate()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
