//! Turns segments into the escaped fragment that is displayed and stored.
//!
//! Text is escaped so markup in a response cannot become structure. Code
//! bodies are escaped and wrapped in a block carrying a copy button.

use crate::core::message::RenderedContent;
use crate::core::segment::{self, Segment};

pub(crate) const CODE_BLOCK_OPEN: &str = concat!(
    "<div class=\"code-block\">",
    "<button class=\"copy-button\">Copy</button>",
    "<pre><code class=\"python\">"
);
pub(crate) const CODE_BLOCK_CLOSE: &str = "</code></pre></div>";

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub fn render_segment(segment: &Segment) -> String {
    match segment {
        Segment::Text(text) => escape_html(text),
        Segment::Code(code) => {
            format!("{CODE_BLOCK_OPEN}{}{CODE_BLOCK_CLOSE}", escape_html(code))
        }
    }
}

pub fn render_segments(segments: &[Segment]) -> RenderedContent {
    let fragment: String = segments.iter().map(render_segment).collect();
    RenderedContent::from_rendered(fragment)
}

pub fn render_assistant(text: &str) -> RenderedContent {
    render_segments(&segment::parse(text))
}

pub fn render_user(text: &str) -> RenderedContent {
    RenderedContent::from_rendered(escape_html(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn text_segment_renders_escaped() {
        let rendered = render_segment(&Segment::Text("1 < 2".into()));
        assert_eq!(rendered, "1 &lt; 2");
    }

    #[test]
    fn code_segment_renders_with_copy_button() {
        let rendered = render_segment(&Segment::Code("if a<b:\n    pass".into()));
        assert_eq!(
            rendered,
            "<div class=\"code-block\"><button class=\"copy-button\">Copy</button>\
             <pre><code class=\"python\">if a&lt;b:\n    pass</code></pre></div>"
        );
    }

    #[test]
    fn assistant_text_is_rendered_in_segment_order() {
        let rendered = render_assistant("Use this:\n```python\nprint(1)\n```\ndone");
        let expected = format!("Use this:\n{CODE_BLOCK_OPEN}print(1){CODE_BLOCK_CLOSE}\ndone");
        assert_eq!(rendered.as_str(), expected);
    }

    #[test]
    fn empty_response_renders_empty_fragment() {
        assert_eq!(render_assistant("").as_str(), "");
    }
}
