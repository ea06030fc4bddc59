//! HTML rendering of a classified buffer.
use std::fmt::Write as _;

use crate::buffer::SourceBuffer;
use crate::index::{RangeSet, ReferenceMap, SymbolIndex};
use crate::types::{ByteRange, NameDef};

/// Visual category of a span; each maps to one CSS class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleClass {
    /// Character literal.
    Character,
    /// Comment.
    Comment,
    /// Enum value.
    EnumConstant,
    /// Scope qualifier with no local definition.
    ExternalScope,
    /// Type with no local definition.
    ExternalType,
    /// Unclassified identifier.
    Identifier,
    /// Reserved word.
    Keyword,
    /// Line number gutter.
    LineNumber,
    /// Macro name.
    Macro,
    /// Call-like use.
    Method,
    /// `#` and directive keyword.
    Preprocessor,
    /// String literal or include target.
    String,
    /// Class, struct, union, namespace or enum name.
    UserType,
}

impl StyleClass {
    /// CSS class name used in the generated markup.
    pub const fn css_class(self) -> &'static str {
        return match self {
            Self::Character => "character",
            Self::Comment => "comment",
            Self::EnumConstant => "enum-constant",
            Self::ExternalScope => "external-scope",
            Self::ExternalType => "external-type",
            Self::Identifier => "identifier",
            Self::Keyword => "keyword",
            Self::LineNumber => "line-number",
            Self::Macro => "macro",
            Self::Method => "method",
            Self::Preprocessor => "preprocessor",
            Self::String => "string",
            Self::UserType => "user-type",
        };
    }
}

/// One styled byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleSpan {
    /// Bytes covered.
    pub range: ByteRange,
    /// How they are styled.
    pub style: StyleClass,
}

/// Accumulates spans, keeping the first one inserted wherever two overlap.
#[derive(Debug, Default)]
struct SpanBuilder {
    /// Spans accepted so far.
    spans: Vec<StyleSpan>,
    /// Ranges of `spans`, for overlap checks.
    taken: RangeSet,
}

impl SpanBuilder {
    /// Add one span unless it is empty or overlaps an earlier one.
    fn add(&mut self, range: ByteRange, style: StyleClass) {
        if !range.is_empty() && self.taken.insert(range) {
            self.spans.push(StyleSpan { range, style });
        }
    }

    /// Add every definition in `defs`.
    fn add_defs(&mut self, defs: &[NameDef], style: StyleClass) {
        for def in defs {
            self.add(def.range, style);
        }
    }

    /// Add every occurrence in `map`.
    fn add_refs(&mut self, map: &ReferenceMap, style: StyleClass) {
        for (_, range) in map.occurrences() {
            self.add(range, style);
        }
    }

    /// Spans ordered by position.
    fn finish(mut self) -> Vec<StyleSpan> {
        self.spans.sort_by_key(|s| return s.range.begin);
        return self.spans;
    }
}

/// Flatten an index into ordered, non-overlapping spans. Where categories
/// overlap, the earlier one in this order wins: preprocessor, comment,
/// string, character, include, external type, external scope, keyword,
/// class, enum, macro, enum constant, method.
pub fn style_spans(index: &SymbolIndex) -> Vec<StyleSpan> {
    let mut builder = SpanBuilder::default();
    for def in index.preprocessor() {
        builder.add(ByteRange::new(def.line.begin, def.directive.range.end), StyleClass::Preprocessor);
    }
    builder.add_defs(index.comments(), StyleClass::Comment);
    builder.add_defs(index.strings(), StyleClass::String);
    builder.add_defs(index.characters(), StyleClass::Character);
    builder.add_defs(index.includes(), StyleClass::String);
    builder.add_refs(index.external_type_refs(), StyleClass::ExternalType);
    builder.add_refs(index.external_scope_refs(), StyleClass::ExternalScope);
    builder.add_refs(index.keyword_refs(), StyleClass::Keyword);
    builder.add_refs(index.class_refs(), StyleClass::UserType);
    builder.add_refs(index.enum_refs(), StyleClass::UserType);
    builder.add_refs(index.macro_refs(), StyleClass::Macro);
    builder.add_refs(index.constant_refs(), StyleClass::EnumConstant);
    builder.add_refs(index.method_refs(), StyleClass::Method);
    return builder.finish();
}

/// Layout options for [`render_html`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Zero-padded width of line numbers; `0` disables them.
    pub line_number_width: usize,
    /// Emit the bare body without the XHTML document around it.
    pub no_header: bool,
    /// Stylesheet linked from the header.
    pub stylesheet: String,
    /// Columns per tab stop.
    pub tab_size: usize,
    /// Document title, normally the source file name.
    pub title: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        return Self {
            line_number_width: 0,
            no_header: false,
            stylesheet: "style.css".to_string(),
            tab_size: 4,
            title: String::new(),
        };
    }
}

/// Render `source` as HTML, wrapping each span in a `<label>` of its class.
/// `spans` must be ordered and non-overlapping, as [`style_spans`] returns.
pub fn render_html(source: &SourceBuffer, spans: &[StyleSpan], options: &RenderOptions) -> String {
    let mut body: Vec<u8> = Vec::with_capacity(source.len().saturating_mul(2));
    let mut pending = spans.iter().peekable();
    let mut open: Option<ByteRange> = None;
    let mut line = 1_usize;
    let mut at_line_start = true;
    let mut column = 0_usize;
    let tab_size = options.tab_size.max(1);

    for (pos, &byte) in source.as_bytes().iter().enumerate() {
        if at_line_start && options.line_number_width > 0 {
            open_label(&mut body, StyleClass::LineNumber);
            body.extend_from_slice(format!("{line:0width$}", width = options.line_number_width).as_bytes());
            close_label(&mut body);
        }
        at_line_start = false;

        if open.is_some_and(|r| return r.end == pos) {
            close_label(&mut body);
            open = None;
        }
        if let Some(span) = pending.next_if(|s| return s.range.begin == pos) {
            open_label(&mut body, span.style);
            open = Some(span.range);
        }

        match byte {
            b'\r' => {},
            b'\n' => {
                body.extend_from_slice(b"<br/>");
                line = line.saturating_add(1);
                at_line_start = true;
                column = 0;
            },
            b'\t' => {
                let width = tab_size.saturating_sub(column.checked_rem(tab_size).unwrap_or(0));
                for _ in 0..width {
                    body.extend_from_slice(b"&nbsp;");
                }
                column = column.saturating_add(width);
            },
            _ => {
                push_escaped(&mut body, byte);
                column = column.saturating_add(1);
            },
        }
    }
    if open.is_some() {
        close_label(&mut body);
    }

    let body = String::from_utf8_lossy(&body);
    if options.no_header {
        return body.into_owned();
    }
    let mut html = String::with_capacity(body.len().saturating_add(512));
    html.push_str(
        "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\" \
         \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd\">\n",
    );
    html.push_str("<!--This document is generated by ccmark -->\n");
    html.push_str("<html xmlns=\"http://www.w3.org/1999/xhtml\">\n<head>\n");
    let _ = writeln!(html, "<title>{}</title>", escape_text(&options.title));
    let _ = writeln!(
        html,
        "<link rel=\"stylesheet\" href=\"{}\" type=\"text/css\"/>",
        escape_text(&options.stylesheet)
    );
    html.push_str("</head>\n<body>\n");
    html.push_str(&body);
    html.push_str("\n</body>\n</html>\n");
    return html;
}

/// Append `byte`, escaped for HTML text.
fn push_escaped(out: &mut Vec<u8>, byte: u8) {
    match byte {
        b'<' => out.extend_from_slice(b"&lt;"),
        b'>' => out.extend_from_slice(b"&gt;"),
        b'&' => out.extend_from_slice(b"&amp;"),
        b'"' => out.extend_from_slice(b"&quot;"),
        b' ' => out.extend_from_slice(b"&nbsp;"),
        _ => out.push(byte),
    }
}

/// Escape text for use in an element or attribute.
fn escape_text(text: &str) -> String {
    return text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;");
}

/// Append an opening label for `style`.
fn open_label(out: &mut Vec<u8>, style: StyleClass) {
    out.extend_from_slice(b"<label class=\"");
    out.extend_from_slice(style.css_class().as_bytes());
    out.extend_from_slice(b"\">");
}

/// Append a closing label.
fn close_label(out: &mut Vec<u8>) {
    out.extend_from_slice(b"</label>");
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn bare() -> RenderOptions {
        return RenderOptions { no_header: true, ..RenderOptions::default() };
    }

    fn spans_for(source: &str) -> (SourceBuffer, Vec<StyleSpan>) {
        let buffer = SourceBuffer::from_bytes(source);
        let index = SymbolIndex::build(&buffer, &HashSet::new());
        let spans = style_spans(&index);
        return (buffer, spans);
    }

    #[test]
    fn spans_are_ordered_and_disjoint() {
        let (_, spans) = spans_for("#include <a.h>\nstruct S { int f(); };\nS s = S(); // done\n");
        for pair in spans.windows(2) {
            let [a, b] = pair else { unreachable!() };
            assert!(a.range.end <= b.range.begin);
        }
    }

    #[test]
    fn class_wins_over_method() {
        let (_, spans) = spans_for("struct Foo { };\nauto f = Foo(1);");
        let call = spans.iter().find(|s| return s.range == ByteRange::new(25, 28)).unwrap();
        assert_eq!(call.style, StyleClass::UserType);
    }

    #[test]
    fn preprocessor_span_stops_after_directive() {
        let (_, spans) = spans_for("#include <a.h>\n");
        assert_eq!(spans.first().unwrap(), &StyleSpan {
            range: ByteRange::new(0, 8),
            style: StyleClass::Preprocessor,
        });
        assert_eq!(spans.get(1).unwrap().style, StyleClass::String);
    }

    #[test]
    fn escapes_markup() {
        let buffer = SourceBuffer::from_bytes("a<b && c>d");
        let html = render_html(&buffer, &[], &bare());
        assert_eq!(html, "a&lt;b&nbsp;&amp;&amp;&nbsp;c&gt;d<br/>");
    }

    #[test]
    fn labels_wrap_spans() {
        let (buffer, spans) = spans_for("int x;");
        let html = render_html(&buffer, &spans, &bare());
        assert_eq!(html, "<label class=\"keyword\">int</label>&nbsp;x;<br/>");
    }

    #[test]
    fn adjacent_spans_close_before_opening() {
        let buffer = SourceBuffer::from_bytes("ab");
        let spans = [
            StyleSpan { range: ByteRange::new(0, 1), style: StyleClass::Keyword },
            StyleSpan { range: ByteRange::new(1, 2), style: StyleClass::Method },
        ];
        let html = render_html(&buffer, &spans, &bare());
        assert_eq!(html, "<label class=\"keyword\">a</label><label class=\"method\">b</label><br/>");
    }

    #[test]
    fn tabs_expand_to_next_stop() {
        let buffer = SourceBuffer::from_bytes("ab\tc\r\n\td");
        let html = render_html(&buffer, &[], &RenderOptions { tab_size: 4, ..bare() });
        assert_eq!(html, "ab&nbsp;&nbsp;c<br/>&nbsp;&nbsp;&nbsp;&nbsp;d<br/>");
    }

    #[test]
    fn line_numbers_are_zero_padded() {
        let buffer = SourceBuffer::from_bytes("x\ny");
        let html = render_html(&buffer, &[], &RenderOptions { line_number_width: 3, ..bare() });
        assert_eq!(
            html,
            "<label class=\"line-number\">001</label>x<br/><label class=\"line-number\">002</label>y<br/>"
        );
    }

    #[test]
    fn header_links_stylesheet_and_title() {
        let buffer = SourceBuffer::from_bytes("x");
        let options = RenderOptions { stylesheet: "dark.css".to_string(), title: "a<b>.c".to_string(), ..RenderOptions::default() };
        let html = render_html(&buffer, &[], &options);
        assert!(html.starts_with("<!DOCTYPE html"));
        assert!(html.contains("<title>a&lt;b&gt;.c</title>"));
        assert!(html.contains("href=\"dark.css\""));
        assert!(html.ends_with("x<br/>\n</body>\n</html>\n"));
    }
}
