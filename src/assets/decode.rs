use std::ops::Range;

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Entities every XML parser resolves without a DTD.
const PREDEFINED_ENTITIES: [&str; 5] = ["amp", "lt", "gt", "quot", "apos"];

/// A recolorable region inside fragment markup.
///
/// Asset authors mark regions with fixed sentinel literals; the composer targets them by slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    /// `black` ink: outline strokes, dark features.
    Black,
    /// `white` ink: highlights, badge glyphs.
    White,
    /// Hair key color.
    HairKey,
    /// Mouth accent key color.
    MouthKey,
    /// Face body key color.
    BodyKey,
    /// Face accent key color, painted with the hair color.
    FaceHairKey,
    /// Baseline shadow opacity.
    ShadowOpacity,
    /// Face accent opacity.
    FaceHairOpacity,
    /// High-opacity accessory opacity.
    AccessoryOpacity,
}

impl Slot {
    pub const COUNT: usize = 9;

    pub const ALL: [Slot; Slot::COUNT] = [
        Slot::Black,
        Slot::White,
        Slot::HairKey,
        Slot::MouthKey,
        Slot::BodyKey,
        Slot::FaceHairKey,
        Slot::ShadowOpacity,
        Slot::FaceHairOpacity,
        Slot::AccessoryOpacity,
    ];

    /// Literal text that marks the slot in authored markup.
    pub const fn sentinel(self) -> &'static str {
        match self {
            Slot::Black => "black",
            Slot::White => "white",
            Slot::HairKey => "#FF0000",
            Slot::MouthKey => "#FFFF00",
            Slot::BodyKey => "#06c2b5",
            Slot::FaceHairKey => "#6dfff9",
            Slot::ShadowOpacity => "fill-opacity=\"0.15\"",
            Slot::FaceHairOpacity => "fill-opacity=\"0.65\"",
            Slot::AccessoryOpacity => "fill-opacity=\"0.299\"",
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Text(Range<usize>),
    Slot(Slot),
}

/// Inner markup of a fragment split into literal runs and recolor slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    inner: String,
    segments: Vec<Segment>,
}

/// Per-layer replacement text keyed by slot. Unset slots render their sentinel unchanged.
#[derive(Clone, Debug, Default)]
pub struct Substitutions {
    values: [Option<String>; Slot::COUNT],
}

impl Substitutions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, slot: Slot, value: impl Into<String>) {
        self.values[slot.index()] = Some(value.into());
    }

    pub fn get(&self, slot: Slot) -> Option<&str> {
        self.values[slot.index()].as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }
}

impl Template {
    /// Parse a standalone `<svg>` document and keep everything between its root tags.
    ///
    /// The kept markup is re-rooted under the composed document, so it may only use the SVG,
    /// xlink and xml namespaces and the predefined entities.
    pub fn parse(markup: &str) -> Result<Self, String> {
        let opts = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let doc = roxmltree::Document::parse_with_options(markup, opts).map_err(|e| e.to_string())?;
        let root = doc.root_element();
        if root.tag_name().name() != "svg" {
            return Err(format!(
                "root element must be <svg>, found <{}>",
                root.tag_name().name()
            ));
        }

        check_namespaces(root)?;

        let inner = match (root.first_child(), root.last_child()) {
            (Some(first), Some(last)) => &markup[first.range().start..last.range().end],
            _ => "",
        };
        check_entities(inner)?;
        Ok(Self::from_inner(inner))
    }

    fn from_inner(inner: &str) -> Self {
        let bytes = inner.as_bytes();
        let mut segments = Vec::new();
        let mut text_start = 0;
        let mut i = 0;

        while i < bytes.len() {
            let hit = Slot::ALL
                .iter()
                .copied()
                .find(|slot| bytes[i..].starts_with(slot.sentinel().as_bytes()));
            match hit {
                Some(slot) => {
                    if text_start < i {
                        segments.push(Segment::Text(text_start..i));
                    }
                    segments.push(Segment::Slot(slot));
                    i += slot.sentinel().len();
                    text_start = i;
                }
                None => i += 1,
            }
        }
        if text_start < bytes.len() {
            segments.push(Segment::Text(text_start..bytes.len()));
        }

        Self {
            inner: inner.to_owned(),
            segments,
        }
    }

    /// Inner markup exactly as authored.
    pub fn inner(&self) -> &str {
        &self.inner
    }

    pub fn contains(&self, slot: Slot) -> bool {
        self.segments.contains(&Segment::Slot(slot))
    }

    /// Append the markup with `subs` applied.
    pub fn render_into(&self, out: &mut String, subs: &Substitutions) {
        for seg in &self.segments {
            match seg {
                Segment::Text(r) => out.push_str(&self.inner[r.clone()]),
                Segment::Slot(slot) => out.push_str(subs.get(*slot).unwrap_or(slot.sentinel())),
            }
        }
    }
}

fn check_namespaces(root: roxmltree::Node<'_, '_>) -> Result<(), String> {
    for node in root.descendants().filter(|n| n.is_element()) {
        let tag = node.tag_name();
        if let Some(ns) = tag.namespace()
            && ns != SVG_NS
        {
            return Err(format!(
                "element <{}> is in foreign namespace \"{ns}\"",
                tag.name()
            ));
        }
        for attr in node.attributes() {
            if let Some(ns) = attr.namespace()
                && ![SVG_NS, XLINK_NS, XML_NS].contains(&ns)
            {
                return Err(format!(
                    "attribute '{}' on <{}> is in foreign namespace \"{ns}\"",
                    attr.name(),
                    tag.name()
                ));
            }
        }
    }
    Ok(())
}

/// Rejects references to entities declared in the fragment's own DTD. Comments and CDATA are
/// skipped since `&` is literal there.
fn check_entities(inner: &str) -> Result<(), String> {
    let mut rest = inner;
    while let Some(i) = rest.find(['&', '<']) {
        rest = &rest[i..];
        if let Some(after) = rest.strip_prefix("<!--") {
            rest = after.find("-->").map_or("", |end| &after[end + 3..]);
        } else if let Some(after) = rest.strip_prefix("<![CDATA[") {
            rest = after.find("]]>").map_or("", |end| &after[end + 3..]);
        } else if let Some(after) = rest.strip_prefix('&') {
            let name = after.split_once(';').map_or(after, |(name, _)| name);
            if !name.starts_with('#') && !PREDEFINED_ENTITIES.contains(&name) {
                return Err(format!("entity '&{name};' is only defined by the fragment's DTD"));
            }
            rest = after;
        } else {
            rest = &rest[1..];
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
