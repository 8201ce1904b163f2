use std::collections::BTreeMap;
use std::ops::Range;
use std::path::Path;

use anyhow::Context as _;
use serde::Deserialize;

use crate::assets::bundle::{AssetBundle, BadgeKind, OutlineSet};
use crate::assets::fragment::{Fragment, FragmentTags};
use crate::color::derive::{ColorDeriver, PALETTE_ENTROPY_LEN, SEED_HEX_LEN, parse_seed};
use crate::color::Rgb;
use crate::compose::Layer;
use crate::foundation::config::DerivationConfig;
use crate::foundation::error::{NatriconError, NatriconResult};

/// Manifest file expected at the root of an asset directory.
pub const MANIFEST_FILE: &str = "catalog.json";

/// Hex characters of an account hash consumed by procedural resolution.
pub const SELECTION_ENTROPY_LEN: usize = PALETTE_ENTROPY_LEN + 4 * SEED_HEX_LEN;

const FACE_ENTROPY: Range<usize> = 24..28;
const HAIR_ENTROPY: Range<usize> = 28..32;
const MOUTH_ENTROPY: Range<usize> = 32..36;
const EYE_ENTROPY: Range<usize> = 36..40;

/// Explicit colors and fragment ids for a hand-curated avatar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VanitySelection {
    pub body_color: Rgb,
    pub hair_color: Rgb,
    pub face_id: u32,
    pub hair_id: Option<u32>,
    pub mouth_id: Option<u32>,
    pub eye_id: Option<u32>,
}

/// Turns an account hash (or a vanity selection) into a resolved [`AssetBundle`].
pub trait AssetResolver: Send + Sync {
    fn resolve_assets(
        &self,
        hash: &str,
        badge: BadgeKind,
        outline: bool,
        outline_color: Option<Rgb>,
    ) -> NatriconResult<AssetBundle>;

    fn resolve_vanity_assets(
        &self,
        badge: BadgeKind,
        outline: bool,
        outline_color: Option<Rgb>,
        selection: &VanitySelection,
    ) -> NatriconResult<AssetBundle>;
}

/// A selectable fragment plus the companions that travel with it.
#[derive(Clone, Debug)]
pub struct CatalogEntry {
    pub id: u32,
    pub fragment: Fragment,
    /// Back layer drawn behind the face (hair only).
    pub back: Option<Fragment>,
    pub outline: Option<Fragment>,
}

impl CatalogEntry {
    pub fn new(id: u32, fragment: Fragment) -> Self {
        Self {
            id,
            fragment,
            back: None,
            outline: None,
        }
    }

    pub fn with_back(mut self, back: Fragment) -> Self {
        self.back = Some(back);
        self
    }

    pub fn with_outline(mut self, outline: Fragment) -> Self {
        self.outline = Some(outline);
        self
    }
}

/// Collects catalog entries; [`CatalogBuilder::build`] validates every fragment.
#[derive(Clone, Debug, Default)]
pub struct CatalogBuilder {
    faces: Vec<CatalogEntry>,
    hairs: Vec<CatalogEntry>,
    mouths: Vec<CatalogEntry>,
    eyes: Vec<CatalogEntry>,
    badges: BTreeMap<BadgeKind, Fragment>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn face(mut self, entry: CatalogEntry) -> Self {
        self.faces.push(entry);
        self
    }

    pub fn hair(mut self, entry: CatalogEntry) -> Self {
        self.hairs.push(entry);
        self
    }

    pub fn mouth(mut self, entry: CatalogEntry) -> Self {
        self.mouths.push(entry);
        self
    }

    pub fn eye(mut self, entry: CatalogEntry) -> Self {
        self.eyes.push(entry);
        self
    }

    pub fn badge(mut self, kind: BadgeKind, fragment: Fragment) -> Self {
        self.badges.insert(kind, fragment);
        self
    }

    pub fn build(self, derivation: DerivationConfig) -> NatriconResult<FragmentCatalog> {
        derivation.validate()?;
        if self.faces.is_empty() {
            return Err(NatriconError::asset_lookup("catalog must contain a face"));
        }
        if self.badges.contains_key(&BadgeKind::None) {
            return Err(NatriconError::validation(
                "badge kind 'none' cannot carry a fragment",
            ));
        }

        validate_entries("face", &self.faces, Layer::Face, None, Some(Layer::BodyOutline))?;
        validate_entries(
            "hair",
            &self.hairs,
            Layer::Hair,
            Some(Layer::BackHair),
            Some(Layer::HairOutline),
        )?;
        validate_entries(
            "mouth",
            &self.mouths,
            Layer::Mouth,
            None,
            Some(Layer::MouthOutline),
        )?;
        validate_entries("eye", &self.eyes, Layer::Eye, None, None)?;
        for fragment in self.badges.values() {
            fragment.validate(Layer::Badge)?;
        }
        for (kind, len) in [
            ("hair", self.hairs.len()),
            ("mouth", self.mouths.len()),
            ("eye", self.eyes.len()),
        ] {
            if len == 0 {
                tracing::warn!(kind, "catalog has no {kind} fragments; layer will be skipped");
            }
        }

        tracing::info!(
            faces = self.faces.len(),
            hairs = self.hairs.len(),
            mouths = self.mouths.len(),
            eyes = self.eyes.len(),
            badges = self.badges.len(),
            "fragment catalog ready"
        );

        Ok(FragmentCatalog {
            deriver: ColorDeriver::new(derivation),
            faces: self.faces,
            hairs: self.hairs,
            mouths: self.mouths,
            eyes: self.eyes,
            badges: self.badges,
        })
    }
}

fn validate_entries(
    kind: &str,
    entries: &[CatalogEntry],
    layer: Layer,
    back_layer: Option<Layer>,
    outline_layer: Option<Layer>,
) -> NatriconResult<()> {
    for (i, entry) in entries.iter().enumerate() {
        if entries[..i].iter().any(|e| e.id == entry.id) {
            return Err(NatriconError::validation(format!(
                "duplicate {kind} id {}",
                entry.id
            )));
        }
        entry.fragment.validate(layer)?;
        if let Some(back) = &entry.back {
            back.validate(back_layer.unwrap_or(layer))?;
        }
        if let Some(outline) = &entry.outline {
            outline.validate(outline_layer.unwrap_or(layer))?;
        }
    }
    Ok(())
}

/// Immutable fragment table loaded once at startup and shared across requests.
#[derive(Clone, Debug)]
pub struct FragmentCatalog {
    deriver: ColorDeriver,
    faces: Vec<CatalogEntry>,
    hairs: Vec<CatalogEntry>,
    mouths: Vec<CatalogEntry>,
    eyes: Vec<CatalogEntry>,
    badges: BTreeMap<BadgeKind, Fragment>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    #[serde(default)]
    faces: Vec<ManifestEntry>,
    #[serde(default)]
    hairs: Vec<ManifestEntry>,
    #[serde(default)]
    mouths: Vec<ManifestEntry>,
    #[serde(default)]
    eyes: Vec<ManifestEntry>,
    #[serde(default)]
    badges: BTreeMap<BadgeKind, String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestEntry {
    id: u32,
    file: String,
    #[serde(default)]
    tags: FragmentTags,
    #[serde(default)]
    back: Option<String>,
    #[serde(default)]
    outline: Option<String>,
}

impl FragmentCatalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// Load `catalog.json` and the SVG files it references from `root`.
    pub fn load_dir(root: impl AsRef<Path>, derivation: DerivationConfig) -> NatriconResult<Self> {
        let root = root.as_ref();
        let manifest_path = root.join(MANIFEST_FILE);
        let raw = std::fs::read_to_string(&manifest_path)
            .with_context(|| format!("read catalog manifest '{}'", manifest_path.display()))?;
        let manifest: Manifest = serde_json::from_str(&raw)
            .map_err(|e| NatriconError::serde(format!("parse catalog manifest: {e}")))?;

        let load = |rel: &str, tags: FragmentTags| -> NatriconResult<Fragment> {
            let rel = normalize_rel_path(rel)?;
            let path = root.join(&rel);
            let markup = std::fs::read_to_string(&path)
                .with_context(|| format!("read fragment '{}'", path.display()))?;
            Ok(Fragment::new(rel, markup, tags))
        };
        let entry = |m: &ManifestEntry, back_tags: FragmentTags| -> NatriconResult<CatalogEntry> {
            let mut e = CatalogEntry::new(m.id, load(&m.file, m.tags)?);
            if let Some(back) = &m.back {
                e.back = Some(load(back, back_tags)?);
            }
            if let Some(outline) = &m.outline {
                e.outline = Some(load(outline, FragmentTags::default())?);
            }
            Ok(e)
        };

        let mut builder = CatalogBuilder::new();
        for m in &manifest.faces {
            builder = builder.face(entry(m, FragmentTags::default())?);
        }
        // Back hair shares the tags of the hair it belongs to.
        for m in &manifest.hairs {
            builder = builder.hair(entry(m, m.tags)?);
        }
        for m in &manifest.mouths {
            builder = builder.mouth(entry(m, FragmentTags::default())?);
        }
        for m in &manifest.eyes {
            builder = builder.eye(entry(m, FragmentTags::default())?);
        }
        for (kind, file) in &manifest.badges {
            builder = builder.badge(*kind, load(file, FragmentTags::default())?);
        }

        tracing::info!(root = %root.display(), "loading fragment catalog");
        builder.build(derivation)
    }

    pub fn deriver(&self) -> &ColorDeriver {
        &self.deriver
    }

    pub fn faces(&self) -> &[CatalogEntry] {
        &self.faces
    }

    pub fn hairs(&self) -> &[CatalogEntry] {
        &self.hairs
    }

    pub fn mouths(&self) -> &[CatalogEntry] {
        &self.mouths
    }

    pub fn eyes(&self) -> &[CatalogEntry] {
        &self.eyes
    }

    pub fn badge(&self, kind: BadgeKind) -> Option<&Fragment> {
        self.badges.get(&kind)
    }

    fn pick<'a>(
        entries: &'a [CatalogEntry],
        hash: &str,
        range: Range<usize>,
    ) -> NatriconResult<Option<&'a CatalogEntry>> {
        if entries.is_empty() {
            return Ok(None);
        }
        let v = parse_seed(&hash[range])? as usize;
        Ok(entries.get(v % entries.len()))
    }

    fn by_id<'a>(
        entries: &'a [CatalogEntry],
        kind: &str,
        id: Option<u32>,
    ) -> NatriconResult<Option<&'a CatalogEntry>> {
        let Some(id) = id else {
            return Ok(None);
        };
        entries
            .iter()
            .find(|e| e.id == id)
            .map(Some)
            .ok_or_else(|| NatriconError::asset_lookup(format!("unknown {kind} id {id}")))
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        &self,
        face: &CatalogEntry,
        hair: Option<&CatalogEntry>,
        mouth: Option<&CatalogEntry>,
        eye: Option<&CatalogEntry>,
        body_color: Rgb,
        hair_color: Rgb,
        badge: BadgeKind,
        outline: bool,
        outline_color: Option<Rgb>,
    ) -> NatriconResult<AssetBundle> {
        let badge_fragment = match badge {
            BadgeKind::None => None,
            kind => Some(self.badges.get(&kind).cloned().ok_or_else(|| {
                NatriconError::asset_lookup(format!("no badge fragment for '{kind}'"))
            })?),
        };

        let outline = outline.then(|| OutlineSet {
            color: outline_color.unwrap_or(Rgb::WHITE),
            body: face.outline.clone(),
            hair: hair.and_then(|h| h.outline.clone()),
            mouth: mouth.and_then(|m| m.outline.clone()),
        });

        Ok(AssetBundle {
            face: face.fragment.clone(),
            hair: hair.map(|h| h.fragment.clone()),
            back_hair: hair.and_then(|h| h.back.clone()),
            mouth: mouth.map(|m| m.fragment.clone()),
            eye: eye.map(|e| e.fragment.clone()),
            badge: badge_fragment,
            badge_kind: badge,
            body_color,
            hair_color,
            outline,
        })
    }
}

impl AssetResolver for FragmentCatalog {
    #[tracing::instrument(level = "debug", skip(self))]
    fn resolve_assets(
        &self,
        hash: &str,
        badge: BadgeKind,
        outline: bool,
        outline_color: Option<Rgb>,
    ) -> NatriconResult<AssetBundle> {
        if !hash.get(..SELECTION_ENTROPY_LEN).is_some_and(str::is_ascii) {
            return Err(NatriconError::derivation(format!(
                "hash must be at least {SELECTION_ENTROPY_LEN} hex characters"
            )));
        }
        let palette = self.deriver.palette(hash)?;

        let face = Self::pick(&self.faces, hash, FACE_ENTROPY)?
            .ok_or_else(|| NatriconError::asset_lookup("catalog has no faces"))?;
        let hair = Self::pick(&self.hairs, hash, HAIR_ENTROPY)?;
        let mouth = Self::pick(&self.mouths, hash, MOUTH_ENTROPY)?;
        let eye = Self::pick(&self.eyes, hash, EYE_ENTROPY)?;

        self.assemble(
            face,
            hair,
            mouth,
            eye,
            palette.body,
            palette.hair,
            badge,
            outline,
            outline_color,
        )
    }

    #[tracing::instrument(level = "debug", skip(self))]
    fn resolve_vanity_assets(
        &self,
        badge: BadgeKind,
        outline: bool,
        outline_color: Option<Rgb>,
        selection: &VanitySelection,
    ) -> NatriconResult<AssetBundle> {
        let face = Self::by_id(&self.faces, "face", Some(selection.face_id))?
            .ok_or_else(|| NatriconError::asset_lookup("vanity face is required"))?;
        let hair = Self::by_id(&self.hairs, "hair", selection.hair_id)?;
        let mouth = Self::by_id(&self.mouths, "mouth", selection.mouth_id)?;
        let eye = Self::by_id(&self.eyes, "eye", selection.eye_id)?;

        self.assemble(
            face,
            hair,
            mouth,
            eye,
            selection.body_color,
            selection.hair_color,
            badge,
            outline,
            outline_color,
        )
    }
}

/// Normalize and validate catalog-relative fragment paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> NatriconResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(NatriconError::validation("fragment paths must be relative"));
    }
    if s.is_empty() {
        return Err(NatriconError::validation("fragment path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(NatriconError::validation(
                "fragment paths must not contain '..'",
            ));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(NatriconError::validation(
            "fragment path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/catalog.rs"]
mod tests;
