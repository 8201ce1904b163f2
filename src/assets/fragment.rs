use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::assets::decode::Template;
use crate::compose::Layer;
use crate::foundation::error::{NatriconError, NatriconResult};

/// Capability tags deciding which recolor rules apply to a fragment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FragmentTags {
    pub body_colored: bool,
    pub hair_colored: bool,
    /// Black ink turns white on dark bodies.
    pub dark_colored: bool,
    /// White ink turns grey on dark bodies.
    pub dark_bw_colored: bool,
    /// Carries the accessory opacity that scales with body brightness.
    pub high_opacity_accessory: bool,
}

/// One pre-authored SVG layer. Cheap to clone.
///
/// The markup is parsed once at construction; a parse failure is kept and reported when the
/// fragment is validated or composed.
#[derive(Clone, Debug)]
pub struct Fragment {
    name: Arc<str>,
    markup: Arc<str>,
    tags: FragmentTags,
    template: Arc<Result<Template, String>>,
}

impl Fragment {
    pub fn new(name: impl Into<Arc<str>>, markup: impl Into<Arc<str>>, tags: FragmentTags) -> Self {
        let markup = markup.into();
        let template = Template::parse(&markup);
        Self {
            name: name.into(),
            markup,
            tags,
            template: Arc::new(template),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn tags(&self) -> FragmentTags {
        self.tags
    }

    pub fn template(&self) -> Result<&Template, &str> {
        (*self.template).as_ref().map_err(String::as_str)
    }

    /// Fail with the parse diagnostic, attributed to `layer`.
    pub fn validate(&self, layer: Layer) -> NatriconResult<&Template> {
        self.template().map_err(|msg| {
            NatriconError::fragment_parse(layer, format!("{}: {msg}", self.name))
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fragment.rs"]
mod tests;
