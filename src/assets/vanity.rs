use std::collections::HashMap;
use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::assets::bundle::BadgeKind;
use crate::assets::catalog::VanitySelection;
use crate::color::Rgb;
use crate::foundation::error::{NatriconError, NatriconResult};

/// Hand-curated avatar settings for one public key.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VanityOverride {
    pub badge: Option<BadgeKind>,
    /// Replaces the computed account hash when no explicit selection is present.
    pub hash: Option<String>,
    pub body_color: Option<Rgb>,
    pub hair_color: Option<Rgb>,
    pub face_id: Option<u32>,
    pub hair_id: Option<u32>,
    pub mouth_id: Option<u32>,
    pub eye_id: Option<u32>,
}

/// How a vanity override turns into an avatar.
#[derive(Clone, Debug, PartialEq)]
pub enum VanityPlan<'a> {
    /// Explicit colors and fragments; color derivation is skipped.
    Selection(VanitySelection),
    /// Procedural path over a fixed hash.
    Hash(&'a str),
    /// Procedural path over the normal account hash.
    AccountHash,
}

impl VanityOverride {
    pub fn badge(&self) -> BadgeKind {
        self.badge.unwrap_or_default()
    }

    /// Explicit selection, present only with a non-zero face id and both colors.
    pub fn selection(&self) -> Option<VanitySelection> {
        let face_id = self.face_id.filter(|id| *id > 0)?;
        Some(VanitySelection {
            body_color: self.body_color?,
            hair_color: self.hair_color?,
            face_id,
            hair_id: self.hair_id,
            mouth_id: self.mouth_id,
            eye_id: self.eye_id,
        })
    }

    pub fn plan(&self) -> VanityPlan<'_> {
        if let Some(selection) = self.selection() {
            return VanityPlan::Selection(selection);
        }
        match self.hash.as_deref() {
            Some(hash) if !hash.is_empty() => VanityPlan::Hash(hash),
            _ => VanityPlan::AccountHash,
        }
    }
}

/// Read-only map from public key to [`VanityOverride`].
#[derive(Clone, Debug, Default)]
pub struct VanityTable {
    entries: HashMap<String, VanityOverride>,
}

impl VanityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(s: &str) -> NatriconResult<Self> {
        let entries: HashMap<String, VanityOverride> = serde_json::from_str(s)
            .map_err(|e| NatriconError::serde(format!("parse vanity table: {e}")))?;
        tracing::info!(entries = entries.len(), "vanity table loaded");
        Ok(Self { entries })
    }

    pub fn from_json_path(path: impl AsRef<Path>) -> NatriconResult<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read vanity table '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    pub fn insert(&mut self, public_key: impl Into<String>, vanity: VanityOverride) {
        self.entries.insert(public_key.into(), vanity);
    }

    pub fn get(&self, public_key: &str) -> Option<&VanityOverride> {
        self.entries.get(public_key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/vanity.rs"]
mod tests;
