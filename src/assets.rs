//! Fragment markup, capability tags, and the catalog that resolves hashes into bundles.

pub mod bundle;
pub mod catalog;
pub mod decode;
pub mod fragment;
pub mod vanity;

pub use bundle::{AssetBundle, BadgeKind, OutlineSet};
pub use catalog::{AssetResolver, CatalogBuilder, CatalogEntry, FragmentCatalog, VanitySelection};
pub use decode::{Slot, Substitutions, Template};
pub use fragment::{Fragment, FragmentTags};
pub use vanity::{VanityOverride, VanityPlan, VanityTable};
