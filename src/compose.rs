//! Layered composition of fragment bundles into one minified SVG document.

use std::fmt;

pub mod engine;
pub mod minify;

pub use engine::{Composer, VectorDocument};
pub use minify::{Minifier, MinifyOptions};

/// Canvas layers, listed back to front.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    BodyOutline,
    MouthOutline,
    HairOutline,
    BackHair,
    Face,
    Hair,
    Mouth,
    Eye,
    Badge,
}

impl Layer {
    pub const ALL: [Layer; 9] = [
        Layer::BodyOutline,
        Layer::MouthOutline,
        Layer::HairOutline,
        Layer::BackHair,
        Layer::Face,
        Layer::Hair,
        Layer::Mouth,
        Layer::Eye,
        Layer::Badge,
    ];

    /// `id` of the `<g>` element wrapping the layer.
    pub const fn group_id(self) -> &'static str {
        match self {
            Layer::BodyOutline => "bodyOutline",
            Layer::MouthOutline => "mouthOutline",
            Layer::HairOutline => "hairOutline",
            Layer::BackHair => "backhair",
            Layer::Face => "face",
            Layer::Hair => "hair",
            Layer::Mouth => "mouth",
            Layer::Eye => "eye",
            Layer::Badge => "badge",
        }
    }

    pub const fn is_outline(self) -> bool {
        matches!(
            self,
            Layer::BodyOutline | Layer::MouthOutline | Layer::HairOutline
        )
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.group_id())
    }
}
