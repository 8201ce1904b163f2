//! Color-space math and seeded color derivation.

pub mod derive;
pub mod rng;
pub mod space;

pub use derive::{ColorDeriver, Palette};
pub use rng::{PinnedRng, SeedSource};
pub use space::{Hsb, Hsl, Rgb};
