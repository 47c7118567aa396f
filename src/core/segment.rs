//! Splits free-form response text into plain-text and code segments.
//!
//! Two code-block shapes are recognised in a single left-to-right scan:
//! fenced blocks (a line opening with three backticks and an optional
//! language tag, closed by the next three backticks) and indented blocks (a
//! line starting with four spaces or a tab, running until a newline that is
//! followed by a non-whitespace character, or the end of input). When both
//! shapes could start at the same position the fenced block wins.

use memchr::{memchr, memchr2, memmem};

const FENCE: &str = "```";
const INDENT_SPACES: &str = "    ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    /// Code body with surrounding whitespace trimmed; never empty.
    Code(String),
}

impl Segment {
    pub fn as_str(&self) -> &str {
        match self {
            Segment::Text(text) | Segment::Code(text) => text,
        }
    }

    pub fn is_code(&self) -> bool {
        matches!(self, Segment::Code(_))
    }
}

struct BlockMatch<'a> {
    start: usize,
    end: usize,
    body: &'a str,
}

/// Parse `text` into an ordered sequence of segments.
///
/// Never fails: an unterminated fence, or any other malformed marker, is
/// left in the surrounding plain text. Code blocks are emitted in the order
/// they are found and are never merged with each other or with adjacent
/// text.
pub fn parse(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = 0;
    let mut pos = 0;

    // Start of input counts as a line start for indented blocks.
    if let Some(block) = match_indented(text, 0, 0) {
        push_block(&mut segments, text, &mut cursor, block);
        pos = cursor;
    }

    while pos < text.len() {
        let Some(offset) = memchr2(b'`', b'\n', &text.as_bytes()[pos..]) else {
            break;
        };
        let at = pos + offset;
        let block = match text.as_bytes()[at] {
            b'`' => match_fenced(text, at),
            _ => match_indented(text, at, at + 1),
        };
        match block {
            Some(block) => {
                push_block(&mut segments, text, &mut cursor, block);
                pos = cursor;
            }
            None => pos = at + 1,
        }
    }

    if cursor < text.len() {
        segments.push(Segment::Text(text[cursor..].to_string()));
    }
    segments
}

fn push_block(segments: &mut Vec<Segment>, text: &str, cursor: &mut usize, block: BlockMatch<'_>) {
    if block.start > *cursor {
        segments.push(Segment::Text(text[*cursor..block.start].to_string()));
    }
    let body = block.body.trim();
    if !body.is_empty() {
        segments.push(Segment::Code(body.to_string()));
    }
    *cursor = block.end;
}

fn match_fenced(text: &str, start: usize) -> Option<BlockMatch<'_>> {
    if !text[start..].starts_with(FENCE) {
        return None;
    }
    let tag_start = start + FENCE.len();
    let newline = tag_start + memchr(b'\n', &text.as_bytes()[tag_start..])?;
    let tag = text[tag_start..newline].trim_end();
    if tag.contains(|c: char| c.is_whitespace() || c == '`') {
        return None;
    }

    let body_start = newline + 1;
    let close = body_start + memmem::find(&text.as_bytes()[body_start..], FENCE.as_bytes())?;
    Some(BlockMatch {
        start,
        end: close + FENCE.len(),
        body: &text[body_start..close],
    })
}

/// `start` is where the match span begins (the newline that introduces the
/// block, if any); `line` is where the indented line itself begins.
fn match_indented(text: &str, start: usize, line: usize) -> Option<BlockMatch<'_>> {
    let rest = &text[line..];
    let indent = if rest.starts_with(INDENT_SPACES) {
        INDENT_SPACES.len()
    } else if rest.starts_with('\t') {
        1
    } else {
        return None;
    };

    // At least one character must follow the indent.
    let first = rest[indent..].chars().next()?;
    let mut search = line + indent + first.len_utf8();
    let end = loop {
        let Some(offset) = memchr(b'\n', &text.as_bytes()[search..]) else {
            break text.len();
        };
        let newline = search + offset;
        match text[newline + 1..].chars().next() {
            Some(next) if !next.is_whitespace() => break newline,
            Some(_) => search = newline + 1,
            None => break text.len(),
        }
    };

    Some(BlockMatch {
        start,
        end,
        body: &text[line..end],
    })
}
