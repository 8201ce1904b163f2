//! Request-level facade: hash or account in, SVG or bitmap bytes out.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::assets::{AssetBundle, AssetResolver, BadgeKind, VanityOverride, VanityPlan, VanityTable};
use crate::color::{Hsb, Hsl, Rgb};
use crate::compose::{Composer, Minifier, VectorDocument};
use crate::foundation::config::{AvatarConfig, RasterConfig};
use crate::foundation::error::{NatriconError, NatriconResult};
use crate::identity::account_hash;
use crate::render::{RasterFormat, Rasterizer};

/// Output encodings a request may ask for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Svg,
    Png,
    Webp,
}

impl OutputFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
            OutputFormat::Webp => "webp",
        }
    }

    pub const fn raster(self) -> Option<RasterFormat> {
        match self {
            OutputFormat::Svg => None,
            OutputFormat::Png => Some(RasterFormat::Png),
            OutputFormat::Webp => Some(RasterFormat::Webp),
        }
    }

    pub const fn mime_type(self) -> &'static str {
        match self.raster() {
            Some(f) => f.mime_type(),
            None => "image/svg+xml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = NatriconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "svg" => Ok(OutputFormat::Svg),
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::Webp),
            _ => Err(NatriconError::validation(
                "valid formats are 'svg', 'png', or 'webp'",
            )),
        }
    }
}

/// Per-request rendering options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AvatarRequest {
    pub badge: BadgeKind,
    pub outline: bool,
    /// Used only with `outline`; white when absent.
    pub outline_color: Option<Rgb>,
    pub format: OutputFormat,
    /// Raster edge length in pixels. Ignored for SVG.
    pub size: Option<u32>,
}

impl AvatarRequest {
    /// Raster size the request resolves to, `None` for SVG output.
    pub fn validate(&self, cfg: &RasterConfig) -> NatriconResult<Option<u32>> {
        if self.format.raster().is_none() {
            return Ok(None);
        }
        cfg.check_size(self.size.unwrap_or(cfg.default_size))
            .map(Some)
    }

    fn outline_color(&self) -> Option<Rgb> {
        if self.outline { self.outline_color } else { None }
    }
}

/// Encoded avatar bytes plus their format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedAvatar {
    pub format: OutputFormat,
    pub bytes: Vec<u8>,
}

impl RenderedAvatar {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// Color components scaled the way reports show them: hue in degrees, the rest ×100, truncated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Components {
    pub h: i16,
    pub s: i16,
    pub v: i16,
}

impl Components {
    fn from_hsb(c: Hsb) -> Self {
        Self {
            h: c.h as i16,
            s: (c.s * 100.0) as i16,
            v: (c.b * 100.0) as i16,
        }
    }

    fn from_hsl(c: Hsl) -> Self {
        Self {
            h: c.h as i16,
            s: (c.s * 100.0) as i16,
            v: (c.l * 100.0) as i16,
        }
    }
}

/// Derived colors for a hash, for inspection tools.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AvatarReport {
    pub hash: String,
    pub body_color: String,
    pub hair_color: String,
    pub body_perceived_brightness: f64,
    pub body_hsb: Components,
    pub body_hsl: Components,
    pub hair_hsb: Components,
    pub hair_hsl: Components,
    /// Hair minus body.
    pub delta_hsb: Components,
}

impl AvatarReport {
    fn new(hash: &str, body: Rgb, hair: Rgb) -> Self {
        let (body_hsb, hair_hsb) = (body.to_hsb(), hair.to_hsb());
        Self {
            hash: hash.to_owned(),
            body_color: body.to_html(false),
            hair_color: hair.to_html(false),
            body_perceived_brightness: body.perceived_brightness(),
            body_hsb: Components::from_hsb(body_hsb),
            body_hsl: Components::from_hsl(body.to_hsl()),
            hair_hsb: Components::from_hsb(hair_hsb),
            hair_hsl: Components::from_hsl(hair.to_hsl()),
            delta_hsb: Components::from_hsb(body_hsb.delta(hair_hsb)),
        }
    }
}

/// Process-wide avatar generator. Build once, share by reference.
pub struct AvatarService {
    config: AvatarConfig,
    resolver: Arc<dyn AssetResolver>,
    composer: Composer,
    rasterizer: Rasterizer,
    vanities: VanityTable,
    server_seed: String,
}

impl fmt::Debug for AvatarService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvatarService")
            .field("config", &self.config)
            .field("rasterizer", &self.rasterizer)
            .field("vanities", &self.vanities.len())
            .finish_non_exhaustive()
    }
}

impl AvatarService {
    pub fn new(config: AvatarConfig, resolver: Arc<dyn AssetResolver>) -> NatriconResult<Self> {
        config.validate()?;
        let minifier = Arc::new(Minifier::new(config.compose.minify));
        Ok(Self {
            config,
            resolver,
            composer: Composer::new(config.compose, minifier),
            rasterizer: Rasterizer::new(config.raster)?,
            vanities: VanityTable::new(),
            server_seed: String::new(),
        })
    }

    pub fn with_vanities(mut self, vanities: VanityTable) -> Self {
        self.vanities = vanities;
        self
    }

    /// Secret appended to public keys before hashing.
    pub fn with_server_seed(mut self, seed: impl Into<String>) -> Self {
        self.server_seed = seed.into();
        self
    }

    pub fn config(&self) -> &AvatarConfig {
        &self.config
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn rasterizer(&self) -> &Rasterizer {
        &self.rasterizer
    }

    pub fn generate_vector_avatar(
        &self,
        hash: &str,
        badge: BadgeKind,
        outline: bool,
        outline_color: Option<Rgb>,
    ) -> NatriconResult<VectorDocument> {
        let bundle = self
            .resolver
            .resolve_assets(hash, badge, outline, outline_color)?;
        self.composer.compose(&bundle)
    }

    pub fn generate_raster_avatar(
        &self,
        hash: &str,
        badge: BadgeKind,
        outline: bool,
        outline_color: Option<Rgb>,
        format: RasterFormat,
        size: u32,
    ) -> NatriconResult<Vec<u8>> {
        let doc = self.generate_vector_avatar(hash, badge, outline, outline_color)?;
        self.rasterizer.rasterize(&doc, format, size)
    }

    /// Procedural avatar for an already computed hash.
    #[tracing::instrument(skip(self, request), fields(format = %request.format))]
    pub fn generate_for_hash(
        &self,
        hash: &str,
        request: &AvatarRequest,
    ) -> NatriconResult<RenderedAvatar> {
        let size = request.validate(&self.config.raster)?;
        let bundle = self.resolver.resolve_assets(
            hash,
            request.badge,
            request.outline,
            request.outline_color(),
        )?;
        self.finish(&bundle, request.format, size)
    }

    /// Avatar for a public key, honoring any vanity override registered for it.
    #[tracing::instrument(skip(self, request))]
    pub fn generate_for_account(
        &self,
        public_key: &str,
        nonce: Option<u64>,
        request: &AvatarRequest,
    ) -> NatriconResult<RenderedAvatar> {
        if let Some(vanity) = self.vanities.get(public_key) {
            tracing::debug!("vanity override applies");
            return self.generate_for_vanity(vanity, public_key, request);
        }
        let hash = account_hash(public_key, nonce, &self.server_seed);
        self.generate_for_hash(&hash, request)
    }

    /// Avatar for a vanity override. The override's badge replaces the requested one, and
    /// `public_key` supplies the hash when the override names neither assets nor a hash.
    pub fn generate_for_vanity(
        &self,
        vanity: &VanityOverride,
        public_key: &str,
        request: &AvatarRequest,
    ) -> NatriconResult<RenderedAvatar> {
        let request = AvatarRequest {
            badge: vanity.badge(),
            ..*request
        };
        match vanity.plan() {
            VanityPlan::Selection(selection) => {
                let size = request.validate(&self.config.raster)?;
                let bundle = self.resolver.resolve_vanity_assets(
                    request.badge,
                    request.outline,
                    request.outline_color(),
                    &selection,
                )?;
                self.finish(&bundle, request.format, size)
            }
            VanityPlan::Hash(hash) => self.generate_for_hash(hash, &request),
            VanityPlan::AccountHash => {
                let hash = account_hash(public_key, None, &self.server_seed);
                self.generate_for_hash(&hash, &request)
            }
        }
    }

    /// Colors the procedural path derives for `hash`.
    pub fn describe(&self, hash: &str) -> NatriconResult<AvatarReport> {
        let bundle = self
            .resolver
            .resolve_assets(hash, BadgeKind::None, false, None)?;
        Ok(AvatarReport::new(hash, bundle.body_color, bundle.hair_color))
    }

    fn finish(
        &self,
        bundle: &AssetBundle,
        format: OutputFormat,
        size: Option<u32>,
    ) -> NatriconResult<RenderedAvatar> {
        let doc = self.composer.compose(bundle)?;
        let bytes = match (format.raster(), size) {
            (Some(raster), Some(size)) => self.rasterizer.rasterize(&doc, raster, size)?,
            _ => doc.into_bytes(),
        };
        Ok(RenderedAvatar { format, bytes })
    }
}

#[cfg(test)]
#[path = "../tests/unit/avatar.rs"]
mod tests;
