//! Markdown-subset inline formatting for text blocks.
//!
//! Formatting commands wrap a character range with fixed delimiters; the
//! renderer turns the same delimiters into HTML.

use once_cell::sync::Lazy;
use regex::Regex;

static CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").expect("valid code regex"));
static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)\s]+)\)").expect("valid link regex"));
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid bold regex"));
static STRIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"~~(.+?)~~").expect("valid strike regex"));
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*]+)\*").expect("valid italic regex"));

const QUOTE_PREFIX: &str = "&gt; ";

/// Inline formatting command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Format {
    Bold,
    Italic,
    Strike,
    Code,
    Quote,
    Link { href: String },
}

impl Format {
    fn delimiters(&self) -> (String, String) {
        match self {
            Format::Bold => ("**".to_string(), "**".to_string()),
            Format::Italic => ("*".to_string(), "*".to_string()),
            Format::Strike => ("~~".to_string(), "~~".to_string()),
            Format::Code => ("`".to_string(), "`".to_string()),
            Format::Quote => ("> ".to_string(), String::new()),
            Format::Link { href } => ("[".to_string(), format!("]({})", href)),
        }
    }
}

/// Character range inside a block's text, `start..end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Order the bounds and clamp them to `len` characters.
    fn normalized(self, len: usize) -> Self {
        let (start, end) = if self.start <= self.end {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        };
        Self {
            start: start.min(len),
            end: end.min(len),
        }
    }
}

/// Text after a formatting command, with the selection moved inside the delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatted {
    pub text: String,
    pub selection: Selection,
}

/// Wrap `selection` of `text` with the delimiters of `format`.
///
/// A quote prefixes the line holding the start of the selection.
pub fn apply_format(text: &str, selection: Selection, format: &Format) -> Formatted {
    let len = text.chars().count();
    let selection = selection.normalized(len);
    let start_byte = byte_offset(text, selection.start);
    let end_byte = byte_offset(text, selection.end);

    if *format == Format::Quote {
        return quote_line(text, selection, start_byte);
    }

    let (open, close) = format.delimiters();
    let mut out = String::with_capacity(text.len() + open.len() + close.len());
    out.push_str(&text[..start_byte]);
    out.push_str(&open);
    out.push_str(&text[start_byte..end_byte]);
    out.push_str(&close);
    out.push_str(&text[end_byte..]);

    let shift = open.chars().count();
    Formatted {
        text: out,
        selection: Selection {
            start: selection.start + shift,
            end: selection.end + shift,
        },
    }
}

fn quote_line(text: &str, selection: Selection, start_byte: usize) -> Formatted {
    let line_start = text[..start_byte].rfind('\n').map_or(0, |i| i + 1);
    let (open, _) = Format::Quote.delimiters();

    let mut out = String::with_capacity(text.len() + open.len());
    out.push_str(&text[..line_start]);
    out.push_str(&open);
    out.push_str(&text[line_start..]);

    let shift = open.chars().count();
    Formatted {
        text: out,
        selection: Selection {
            start: selection.start + shift,
            end: selection.end + shift,
        },
    }
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Render a text block to HTML.
///
/// Lines starting with `> ` become blockquotes; other lines are joined with `<br>`.
pub fn render_inline(text: &str) -> String {
    let escaped = escape_html(text);

    escaped
        .split('\n')
        .map(|line| match line.strip_prefix(QUOTE_PREFIX) {
            Some(quoted) => format!("<blockquote>{}</blockquote>", render_spans(quoted)),
            None => render_spans(line),
        })
        .collect::<Vec<_>>()
        .join("<br>")
}

/// Render one line: code spans are kept verbatim, the rest gets emphasis and links.
fn render_spans(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut last = 0;

    for caps in CODE.captures_iter(line) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&render_links(&line[last..whole.start()]));
        out.push_str("<code>");
        out.push_str(inner.as_str());
        out.push_str("</code>");
        last = whole.end();
    }
    out.push_str(&render_links(&line[last..]));

    out
}

/// Link targets are emitted verbatim; emphasis applies to labels and the text around links.
fn render_links(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut last = 0;

    for caps in LINK.captures_iter(segment) {
        let (Some(whole), Some(label), Some(href)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        if !is_safe_href(href.as_str()) {
            continue;
        }
        out.push_str(&render_emphasis(&segment[last..whole.start()]));
        out.push_str(&format!(
            r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
            href.as_str(),
            render_emphasis(label.as_str())
        ));
        last = whole.end();
    }
    out.push_str(&render_emphasis(&segment[last..]));

    out
}

fn render_emphasis(segment: &str) -> String {
    let bold = BOLD.replace_all(segment, "<strong>$1</strong>");
    let struck = STRIKE.replace_all(&bold, "<del>$1</del>");
    ITALIC.replace_all(&struck, "<em>$1</em>").into_owned()
}

fn is_safe_href(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    lower.starts_with("https://") || lower.starts_with("http://") || lower.starts_with("mailto:")
}

/// Escape text for HTML bodies and double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
