use std::sync::Arc;

use crate::assets::{AssetBundle, Fragment, FragmentTags, Slot, Substitutions};
use crate::color::Rgb;
use crate::compose::Layer;
use crate::compose::minify::Minifier;
use crate::foundation::config::ComposeConfig;
use crate::foundation::error::NatriconResult;

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Composed, minified SVG bytes. Immutable once produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VectorDocument {
    svg: Arc<str>,
}

impl VectorDocument {
    pub fn as_str(&self) -> &str {
        &self.svg
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.svg.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.svg.len()
    }

    pub fn is_empty(&self) -> bool {
        self.svg.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.svg.as_bytes().to_vec()
    }
}

impl From<String> for VectorDocument {
    fn from(svg: String) -> Self {
        Self { svg: svg.into() }
    }
}

/// Writes asset bundles onto a square canvas, one recolored `<g>` per layer.
#[derive(Clone, Debug)]
pub struct Composer {
    cfg: ComposeConfig,
    minifier: Arc<Minifier>,
}

impl Composer {
    pub fn new(cfg: ComposeConfig, minifier: Arc<Minifier>) -> Self {
        Self { cfg, minifier }
    }

    pub fn config(&self) -> &ComposeConfig {
        &self.cfg
    }

    /// Compose and minify.
    #[tracing::instrument(skip_all, fields(badge = %bundle.badge_kind))]
    pub fn compose(&self, bundle: &AssetBundle) -> NatriconResult<VectorDocument> {
        let raw = self.compose_raw(bundle)?;
        let svg = self.minifier.minify(&raw);
        tracing::debug!(raw = raw.len(), minified = svg.len(), "composed avatar");
        Ok(VectorDocument { svg: svg.into() })
    }

    /// Composed document before minification.
    pub fn compose_raw(&self, bundle: &AssetBundle) -> NatriconResult<String> {
        let size = self.cfg.canvas_size;
        let mut out = String::with_capacity(16 * 1024);
        out.push_str("<?xml version=\"1.0\"?>\n");
        out.push_str(&format!(
            "<svg xmlns=\"{SVG_NS}\" xmlns:xlink=\"{XLINK_NS}\" viewBox=\"0 0 {size} {size}\">\n"
        ));

        if let Some(outline) = &bundle.outline {
            let subs = self.outline_subs(outline.color);
            for (layer, fragment) in [
                (Layer::BodyOutline, &outline.body),
                (Layer::MouthOutline, &outline.mouth),
                (Layer::HairOutline, &outline.hair),
            ] {
                if let Some(fragment) = fragment {
                    write_layer(&mut out, layer, fragment, &subs)?;
                }
            }
        }

        // Back hair follows the tags of its hair.
        if let Some(back) = &bundle.back_hair {
            let tags = bundle.hair.as_ref().map_or(back.tags(), Fragment::tags);
            write_layer(&mut out, Layer::BackHair, back, &self.hair_subs(bundle, tags))?;
        }

        write_layer(&mut out, Layer::Face, &bundle.face, &self.face_subs(bundle))?;

        if let Some(hair) = &bundle.hair {
            write_layer(&mut out, Layer::Hair, hair, &self.hair_subs(bundle, hair.tags()))?;
        }
        if let Some(mouth) = &bundle.mouth {
            let subs = self.feature_subs(bundle, mouth.tags(), true);
            write_layer(&mut out, Layer::Mouth, mouth, &subs)?;
        }
        if let Some(eye) = &bundle.eye {
            let subs = self.feature_subs(bundle, eye.tags(), false);
            write_layer(&mut out, Layer::Eye, eye, &subs)?;
        }
        if let Some(badge) = &bundle.badge {
            let mut subs = Substitutions::new();
            if let Some(color) = bundle.outline_color() {
                subs.set(Slot::White, color.to_html(true));
            }
            write_layer(&mut out, Layer::Badge, badge, &subs)?;
        }

        out.push_str("</svg>\n");
        Ok(out)
    }

    /// Shadow opacity for `color`: darker colors get more.
    pub fn shadow_opacity(&self, color: Rgb) -> f64 {
        lerp_by_darkness(
            color,
            self.cfg.min_shadow_opacity,
            self.cfg.max_shadow_opacity,
        )
    }

    pub fn accessory_opacity(&self, color: Rgb) -> f64 {
        lerp_by_darkness(
            color,
            self.cfg.min_accessory_opacity,
            self.cfg.max_accessory_opacity,
        )
    }

    /// Whether `body` is dark enough to flip feature inks.
    pub fn is_dark(&self, body: Rgb) -> bool {
        (body.perceived_brightness().floor() as u32) < self.cfg.light_dark_switch
    }

    fn outline_subs(&self, color: Rgb) -> Substitutions {
        let mut subs = Substitutions::new();
        subs.set(Slot::Black, color.to_html(true));
        subs
    }

    fn hair_subs(&self, bundle: &AssetBundle, tags: FragmentTags) -> Substitutions {
        let mut subs = Substitutions::new();
        if tags.hair_colored {
            subs.set(Slot::HairKey, bundle.hair_color.to_html(true));
            subs.set(
                Slot::ShadowOpacity,
                opacity_attr(self.shadow_opacity(bundle.body_color)),
            );
        }
        subs
    }

    fn face_subs(&self, bundle: &AssetBundle) -> Substitutions {
        let mut subs = Substitutions::new();
        if bundle.face.tags().body_colored {
            subs.set(Slot::BodyKey, bundle.body_color.to_html(true));
            subs.set(
                Slot::ShadowOpacity,
                opacity_attr(self.shadow_opacity(bundle.body_color)),
            );
            subs.set(Slot::FaceHairKey, bundle.hair_color.to_html(true));
            subs.set(
                Slot::FaceHairOpacity,
                opacity_attr(self.shadow_opacity(bundle.hair_color)),
            );
        }
        subs
    }

    /// Mouth and eye rules. Only the mouth takes the hair color.
    fn feature_subs(&self, bundle: &AssetBundle, tags: FragmentTags, mouth: bool) -> Substitutions {
        let mut subs = Substitutions::new();
        if mouth && tags.hair_colored {
            subs.set(Slot::MouthKey, bundle.hair_color.to_html(true));
            subs.set(
                Slot::ShadowOpacity,
                opacity_attr(self.shadow_opacity(bundle.hair_color)),
            );
        }

        let dark = self.is_dark(bundle.body_color);
        if dark && tags.dark_bw_colored {
            subs.set(Slot::White, self.cfg.dark_white_fallback.to_html(true));
        }
        if dark && tags.dark_colored {
            subs.set(Slot::Black, Slot::White.sentinel());
        } else if !dark && tags.high_opacity_accessory {
            subs.set(
                Slot::AccessoryOpacity,
                opacity_attr(self.accessory_opacity(bundle.body_color)),
            );
        }
        subs
    }
}

fn write_layer(
    out: &mut String,
    layer: Layer,
    fragment: &Fragment,
    subs: &Substitutions,
) -> NatriconResult<()> {
    let template = fragment.validate(layer)?;
    out.push_str(&format!("<g id=\"{}\">\n", layer.group_id()));
    template.render_into(out, subs);
    out.push_str("</g>\n");
    Ok(())
}

fn lerp_by_darkness(color: Rgb, min: f64, max: f64) -> f64 {
    min + (1.0 - color.perceived_brightness() / 100.0) * (max - min)
}

fn opacity_attr(v: f64) -> String {
    format!("fill-opacity=\"{v:.6}\"")
}

#[cfg(test)]
#[path = "../../tests/unit/compose/engine.rs"]
mod tests;
