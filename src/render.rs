//! Tag link rendering.
//!
//! Produces the HTML shown next to a tagged record: one anchor per tag,
//! joined with the configured glue. Callers can swap in their own renderer.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::collections::BTreeMap;

use crate::domain::Tag;

/// Characters escaped inside a route path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'&');

/// Escape text for use in HTML content and double-quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// URL of a tag's page: `/{route}?{key}={id}`
pub fn tag_url(route: &str, key: &str, id: i64) -> String {
    let path: Vec<String> = route
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect();
    format!("/{}?{}={}", path.join("/"), utf8_percent_encode(key, SEGMENT), id)
}

/// Default renderer: an anchor to the tag's page labelled with its name.
///
/// `options` become extra attributes; an `href` entry is ignored.
pub fn tag_link(tag: &Tag, route: &str, key: &str, options: &BTreeMap<String, String>) -> String {
    let mut attrs = format!(" href=\"{}\"", escape_html(&tag_url(route, key, tag.id)));
    for (name, value) in options {
        if name.eq_ignore_ascii_case("href") {
            continue;
        }
        attrs.push_str(&format!(" {}=\"{}\"", escape_html(name), escape_html(value)));
    }
    format!("<a{}>{}</a>", attrs, escape_html(&tag.name))
}

/// Render each tag with `renderer` and join the results with `glue`
pub fn tag_links<F>(tags: &[Tag], glue: &str, renderer: F) -> String
where
    F: Fn(&Tag) -> String,
{
    tags.iter().map(renderer).collect::<Vec<_>>().join(glue)
}
