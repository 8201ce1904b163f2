use serde::{Deserialize, Serialize};

/// Numeric presentation attributes whose values may be rewritten in shorter form.
const NUMERIC_ATTRS: &[&str] = &[
    "opacity",
    "fill-opacity",
    "stroke-opacity",
    "stop-opacity",
    "stroke-width",
    "stroke-miterlimit",
    "offset",
    "x",
    "y",
    "x1",
    "y1",
    "x2",
    "y2",
    "cx",
    "cy",
    "r",
    "rx",
    "ry",
    "width",
    "height",
    "font-size",
];

/// Minifier switches, carried in `ComposeConfig::minify`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MinifyOptions {
    pub keep_comments: bool,
    pub shorten_numbers: bool,
}

impl Default for MinifyOptions {
    fn default() -> Self {
        Self {
            keep_comments: false,
            shorten_numbers: true,
        }
    }
}

/// Lexical SVG minifier.
///
/// Stateless after construction and safe to share between threads.
#[derive(Clone, Debug, Default)]
pub struct Minifier {
    opts: MinifyOptions,
}

impl Minifier {
    pub fn new(opts: MinifyOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> MinifyOptions {
        self.opts
    }

    pub fn minify(&self, src: &str) -> String {
        let mut out = String::with_capacity(src.len());
        let mut rest = src;

        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix("<!--") {
                let end = after.find("-->").map_or(after.len(), |i| i + 3);
                if self.opts.keep_comments {
                    out.push_str(&rest[..4 + end]);
                }
                rest = &after[end..];
            } else if rest.starts_with("<![CDATA[") {
                let end = rest.find("]]>").map_or(rest.len(), |i| i + 3);
                out.push_str(&rest[..end]);
                rest = &rest[end..];
            } else if let Some(after) = rest.strip_prefix("<?") {
                let end = after.find("?>").map_or(after.len(), |i| i + 2);
                rest = &after[end..];
            } else if rest.starts_with('<') {
                let end = tag_end(rest);
                self.write_tag(&mut out, &rest[..end]);
                rest = &rest[end..];
            } else {
                let end = rest.find('<').unwrap_or(rest.len());
                write_text(&mut out, &rest[..end]);
                rest = &rest[end..];
            }
        }
        out
    }

    fn write_tag(&self, out: &mut String, tag: &str) {
        let mut quote: Option<char> = None;
        let mut value = String::new();
        let mut pending_space = false;
        let mut name_start = out.len();

        for c in tag.chars() {
            if let Some(q) = quote {
                if c == q {
                    let name = out[name_start..].trim_end_matches('=');
                    let short = if self.opts.shorten_numbers && NUMERIC_ATTRS.contains(&name) {
                        shorten_number(&value)
                    } else {
                        None
                    };
                    out.push(q);
                    out.push_str(short.as_deref().unwrap_or(&value));
                    out.push(q);
                    value.clear();
                    quote = None;
                } else {
                    value.push(c);
                }
                continue;
            }

            if c.is_whitespace() {
                pending_space = true;
                continue;
            }
            if pending_space {
                let last = out.chars().last();
                if !matches!(c, '=' | '>' | '/') && !matches!(last, Some('=' | '<')) {
                    out.push(' ');
                    name_start = out.len();
                }
                pending_space = false;
            }
            match c {
                '"' | '\'' => quote = Some(c),
                '<' => {
                    out.push(c);
                    name_start = out.len();
                }
                _ => out.push(c),
            }
        }

        // Unterminated quote: emit what was collected.
        if let Some(q) = quote {
            out.push(q);
            out.push_str(&value);
        }
    }
}

/// Byte index just past the `>` closing the tag at the start of `s`, ignoring quoted `>`.
fn tag_end(s: &str) -> usize {
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '>' => return i + 1,
            None => {}
        }
    }
    s.len()
}

fn write_text(out: &mut String, text: &str) {
    if text.trim().is_empty() {
        return;
    }
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
}

/// `"0.237500"` -> `".2375"`, `"1.000"` -> `"1"`. Non-decimal input returns `None`.
fn shorten_number(v: &str) -> Option<String> {
    let (neg, body) = match v.strip_prefix('-') {
        Some(b) => (true, b),
        None => (false, v),
    };
    let (int, frac) = body.split_once('.')?;
    let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if int.is_empty() || frac.is_empty() || !digits(int) || !digits(frac) {
        return None;
    }

    let int = int.trim_start_matches('0');
    let frac = frac.trim_end_matches('0');
    if int.is_empty() && frac.is_empty() {
        return Some("0".to_owned());
    }

    let mut s = String::with_capacity(v.len());
    if neg {
        s.push('-');
    }
    s.push_str(int);
    if !frac.is_empty() {
        s.push('.');
        s.push_str(frac);
    }
    Some(s)
}

#[cfg(test)]
#[path = "../../tests/unit/compose/minify.rs"]
mod tests;
