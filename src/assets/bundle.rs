use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::assets::fragment::Fragment;
use crate::color::Rgb;
use crate::foundation::error::NatriconError;

/// Badge overlay classification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeKind {
    #[default]
    None,
    Donor,
    Exchange,
    Explorer,
    Faucet,
    Node,
    Service,
}

impl BadgeKind {
    pub const ALL: [BadgeKind; 7] = [
        BadgeKind::None,
        BadgeKind::Donor,
        BadgeKind::Exchange,
        BadgeKind::Explorer,
        BadgeKind::Faucet,
        BadgeKind::Node,
        BadgeKind::Service,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            BadgeKind::None => "none",
            BadgeKind::Donor => "donor",
            BadgeKind::Exchange => "exchange",
            BadgeKind::Explorer => "explorer",
            BadgeKind::Faucet => "faucet",
            BadgeKind::Node => "node",
            BadgeKind::Service => "service",
        }
    }
}

impl fmt::Display for BadgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BadgeKind {
    type Err = NatriconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(BadgeKind::None);
        }
        BadgeKind::ALL
            .into_iter()
            .find(|b| b.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| NatriconError::validation(format!("unknown badge kind \"{s}\"")))
    }
}

/// Outline color plus the outline fragments drawn behind the avatar.
#[derive(Clone, Debug)]
pub struct OutlineSet {
    pub color: Rgb,
    pub body: Option<Fragment>,
    pub hair: Option<Fragment>,
    pub mouth: Option<Fragment>,
}

/// Fully resolved colors and fragments for one avatar.
///
/// Built per request by an [`AssetResolver`](crate::assets::AssetResolver) and never mutated
/// afterwards.
#[derive(Clone, Debug)]
pub struct AssetBundle {
    pub face: Fragment,
    pub hair: Option<Fragment>,
    pub back_hair: Option<Fragment>,
    pub mouth: Option<Fragment>,
    pub eye: Option<Fragment>,
    pub badge: Option<Fragment>,
    pub badge_kind: BadgeKind,
    pub body_color: Rgb,
    pub hair_color: Rgb,
    pub outline: Option<OutlineSet>,
}

impl AssetBundle {
    /// Bundle with only the required face layer.
    pub fn new(face: Fragment, body_color: Rgb, hair_color: Rgb) -> Self {
        Self {
            face,
            hair: None,
            back_hair: None,
            mouth: None,
            eye: None,
            badge: None,
            badge_kind: BadgeKind::None,
            body_color,
            hair_color,
            outline: None,
        }
    }

    pub fn outline_color(&self) -> Option<Rgb> {
        self.outline.as_ref().map(|o| o.color)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/bundle.rs"]
mod tests;
