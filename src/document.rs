use std::borrow::Cow;
use std::ops::Range;

/// Language identifier of the console config dialect this crate understands.
/// Documents declaring any other language are ignored by the alias index.
pub const LANGUAGE_ID: &str = "cs2cfg";

/// Host-side document seam: the engine never reads files itself, it only
/// sees whatever the editor hands it through this trait.
pub trait Document {
    /// Stable URI-like key identifying this document across rescans.
    fn uri(&self) -> &str;

    /// Declared language identifier (see [`LANGUAGE_ID`]).
    fn language_id(&self) -> &str;

    /// Number of lines, counting a trailing empty line after a final `\n`.
    fn line_count(&self) -> usize;

    /// Text of one line without its terminator. `None` past the end.
    fn line(&self, index: usize) -> Option<&str>;

    /// Full document text.
    fn text(&self) -> Cow<'_, str>;
}

/// In-memory [`Document`] used by tests and by hosts that keep document
/// content as a plain string. Content is replaced wholesale on edit; there
/// is no incremental diffing.
pub struct TextDocument {
    language_id: String,
    line_spans: Vec<Range<usize>>,
    text: String,
    uri: String,
}

impl TextDocument {
    /// Create a document with an explicit language id.
    pub fn new(
        uri: impl Into<String>,
        language_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let text = text.into();
        Self {
            language_id: language_id.into(),
            line_spans: compute_line_spans(&text),
            text,
            uri: uri.into(),
        }
    }

    /// Create a document in the recognized config language.
    pub fn cfg(uri: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(uri, LANGUAGE_ID, text)
    }

    /// Replace the whole content, e.g. on a document change notification.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.line_spans = compute_line_spans(&self.text);
    }
}

impl Document for TextDocument {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn language_id(&self) -> &str {
        &self.language_id
    }

    fn line_count(&self) -> usize {
        self.line_spans.len()
    }

    fn line(&self, index: usize) -> Option<&str> {
        self.line_spans.get(index).map(|span| &self.text[span.clone()])
    }

    fn text(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.text)
    }
}

/// Byte spans of each line, excluding `\n`/`\r\n` terminators.
/// An empty document still has one (empty) line, matching editor behavior.
fn compute_line_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = 0;

    for (i, b) in text.bytes().enumerate() {
        if b == b'\n' {
            let end = if i > start && text.as_bytes()[i - 1] == b'\r' {
                i - 1
            } else {
                i
            };
            spans.push(start..end);
            start = i + 1;
        }
    }
    spans.push(start..text.len());
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_split_on_lf_and_crlf() {
        let doc = TextDocument::cfg("test://doc.cfg", "one\r\ntwo\nthree");
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.line(0), Some("one"));
        assert_eq!(doc.line(1), Some("two"));
        assert_eq!(doc.line(2), Some("three"));
        assert_eq!(doc.line(3), None);
    }

    #[test]
    fn trailing_newline_yields_trailing_empty_line() {
        let doc = TextDocument::cfg("test://doc.cfg", "only\n");
        assert_eq!(doc.line_count(), 2);
        assert_eq!(doc.line(1), Some(""));
    }

    #[test]
    fn set_text_replaces_content_wholesale() {
        let mut doc = TextDocument::cfg("test://doc.cfg", "bind w +forward");
        doc.set_text("alias x y\nalias y z");
        assert_eq!(doc.line_count(), 2);
        assert_eq!(doc.line(0), Some("alias x y"));
    }
}
