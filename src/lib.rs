//! Natricon renders deterministic avatars for cryptocurrency accounts.
//!
//! An account hash seeds the derivation of a body and hair color, picks one fragment per layer
//! from a [`FragmentCatalog`], and the [`Composer`] stacks the recolored fragments into a single
//! minified SVG. The [`Rasterizer`] turns that document into PNG or WebP when asked to.
//!
//! - Load a catalog once with [`FragmentCatalog::load_dir`]
//! - Build an [`AvatarService`] around it
//! - Generate avatars per hash, per account, or per vanity override
#![forbid(unsafe_code)]

pub mod assets;
pub mod avatar;
pub mod color;
pub mod compose;
pub mod foundation;
pub mod identity;
pub mod render;

pub use crate::assets::{
    AssetBundle, AssetResolver, BadgeKind, CatalogBuilder, CatalogEntry, Fragment,
    FragmentCatalog, FragmentTags, VanityOverride, VanitySelection, VanityTable,
};
pub use crate::avatar::{AvatarReport, AvatarRequest, AvatarService, OutputFormat, RenderedAvatar};
pub use crate::color::{ColorDeriver, Hsb, Hsl, Palette, PinnedRng, Rgb, SeedSource};
pub use crate::compose::{Composer, Layer, Minifier, MinifyOptions, VectorDocument};
pub use crate::foundation::config::{
    AvatarConfig, ComposeConfig, DerivationConfig, HairHuePolicy, RasterConfig,
};
pub use crate::foundation::error::{NatriconError, NatriconResult};
pub use crate::identity::account_hash;
pub use crate::render::{RasterFormat, Rasterizer};
