//! Reads stored fragments back into display pieces.
//!
//! This only follows the markup written by [`crate::ui::render`]; it never
//! looks for backtick fences or indentation, so a restored message displays
//! exactly as it did when it was first rendered.

use memchr::{memchr, memmem};

use crate::core::message::RenderedContent;
use crate::core::segment::Segment;
use crate::ui::render::{CODE_BLOCK_CLOSE, CODE_BLOCK_OPEN};

const ENTITIES: &[(&str, char)] = &[
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&#39;", '\''),
];

pub fn unescape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = memchr(b'&', rest.as_bytes()) {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        match ENTITIES
            .iter()
            .find(|(entity, _)| rest.starts_with(entity))
        {
            Some((entity, ch)) => {
                out.push(*ch);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Split a fragment into unescaped text and code pieces.
///
/// A code block opener without its closer is shown as text.
pub fn display_segments(content: &RenderedContent) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut rest = content.as_str();

    while let Some(open) = memmem::find(rest.as_bytes(), CODE_BLOCK_OPEN.as_bytes()) {
        let body_start = open + CODE_BLOCK_OPEN.len();
        let Some(close) = memmem::find(&rest.as_bytes()[body_start..], CODE_BLOCK_CLOSE.as_bytes())
        else {
            break;
        };
        if open > 0 {
            segments.push(Segment::Text(unescape_html(&rest[..open])));
        }
        let body_end = body_start + close;
        segments.push(Segment::Code(unescape_html(&rest[body_start..body_end])));
        rest = &rest[body_end + CODE_BLOCK_CLOSE.len()..];
    }

    if !rest.is_empty() {
        segments.push(Segment::Text(unescape_html(rest)));
    }
    segments
}

/// The message as plain text, without the copy button label.
pub fn plain_text(content: &RenderedContent) -> String {
    display_segments(content)
        .iter()
        .map(Segment::as_str)
        .collect::<String>()
        .trim()
        .to_string()
}

pub fn code_blocks(content: &RenderedContent) -> Vec<String> {
    display_segments(content)
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Code(code) => Some(code),
            Segment::Text(_) => None,
        })
        .collect()
}
