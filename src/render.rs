//! Conversion of composed documents to bitmap formats.

pub mod raster;

pub use raster::{RasterFormat, Rasterizer};
