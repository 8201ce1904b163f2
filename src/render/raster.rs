use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::compose::VectorDocument;
use crate::foundation::config::RasterConfig;
use crate::foundation::error::{NatriconError, NatriconResult};

/// Bitmap encodings offered by the [`Rasterizer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RasterFormat {
    Png,
    /// Lossless WebP.
    Webp,
}

impl RasterFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            RasterFormat::Png => "png",
            RasterFormat::Webp => "webp",
        }
    }

    pub const fn mime_type(self) -> &'static str {
        match self {
            RasterFormat::Png => "image/png",
            RasterFormat::Webp => "image/webp",
        }
    }

    fn image_format(self) -> image::ImageFormat {
        match self {
            RasterFormat::Png => image::ImageFormat::Png,
            RasterFormat::Webp => image::ImageFormat::WebP,
        }
    }
}

impl fmt::Display for RasterFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RasterFormat {
    type Err = NatriconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(RasterFormat::Png),
            "webp" => Ok(RasterFormat::Webp),
            other => Err(NatriconError::validation(format!(
                "unknown raster format \"{other}\" (expected png or webp)"
            ))),
        }
    }
}

/// Converts composed documents into square bitmaps.
///
/// Conversions run on a fixed-size rayon pool; callers block until their conversion finishes, so
/// at most `max_in_flight` conversions hold native buffers at once.
pub struct Rasterizer {
    cfg: RasterConfig,
    pool: rayon::ThreadPool,
}

impl fmt::Debug for Rasterizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rasterizer")
            .field("cfg", &self.cfg)
            .field("threads", &self.pool.current_num_threads())
            .finish()
    }
}

impl Rasterizer {
    pub fn new(cfg: RasterConfig) -> NatriconResult<Self> {
        cfg.validate()?;
        let pool = build_thread_pool(cfg.max_in_flight)?;
        Ok(Self { cfg, pool })
    }

    pub fn config(&self) -> &RasterConfig {
        &self.cfg
    }

    pub fn max_in_flight(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Render `doc` into a `size`x`size` bitmap encoded as `format`.
    #[tracing::instrument(skip(self, doc), fields(bytes = doc.len()))]
    pub fn rasterize(
        &self,
        doc: &VectorDocument,
        format: RasterFormat,
        size: u32,
    ) -> NatriconResult<Vec<u8>> {
        let size = self.cfg.check_size(size)?;
        self.pool.install(|| {
            let rgba = render_rgba8(doc.as_str(), size)?;
            encode(&rgba, size, format)
        })
    }
}

/// Straight-alpha RGBA8 pixels of `svg` scaled onto a square canvas.
fn render_rgba8(svg: &str, size: u32) -> NatriconResult<Vec<u8>> {
    let tree = usvg::Tree::from_str(svg, &usvg::Options::default())
        .map_err(|e| NatriconError::conversion(format!("parse svg: {e}")))?;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size, size)
        .ok_or_else(|| NatriconError::conversion("failed to allocate pixmap"))?;

    let sx = size as f32 / tree.size().width();
    let sy = size as f32 / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);
    resvg::render(&tree, xform, &mut pixmap.as_mut());

    Ok(pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect())
}

fn encode(rgba: &[u8], size: u32, format: RasterFormat) -> NatriconResult<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    image::write_buffer_with_format(
        &mut out,
        rgba,
        size,
        size,
        image::ColorType::Rgba8,
        format.image_format(),
    )
    .map_err(|e| NatriconError::conversion(format!("encode {format}: {e}")))?;
    Ok(out.into_inner())
}

/// `threads` is already validated by [`RasterConfig::validate`].
fn build_thread_pool(threads: Option<usize>) -> NatriconResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("natricon-raster-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| NatriconError::conversion(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
