//! Content preparation: turn an element or markup string into a detached,
//! print-styled copy ready for the renderer.
//!
//! ## Rule Order
//!
//! The copy gets the print stylesheet prepended, then its markup is rewritten
//! by four rules, in this order:
//!
//! 1. every blank line (`\n\n`) becomes `<br><br>`
//! 2. `**text**` becomes `<strong>text</strong>`
//! 3. `*text*` becomes `<em>text</em>`
//! 4. letter groups followed by `,`, ` - ` or `;` become skill-tag pills
//!
//! The rules do not run as chained regex substitutions over raw markup.
//! The markup is lexed once into [`Segment`]s; each rule maps a segment list
//! to a new one, and only [`Segment::Text`] is ever rewritten. Tags, entities
//! and the stylesheet body are opaque, and a span produced by one rule is a
//! typed node a later rule cannot re-match.
//!
//! ## Skill tags
//!
//! A plain `([letters ]+)[,;-]` substitution wraps the group with its
//! surrounding spaces (`<span class="skill-tag"> Go</span>`) and never tags
//! the item after the last delimiter. Here the pill holds the trimmed group,
//! the whitespace stays outside the span, and the last item of a list is
//! tagged too when it ends the text run, the line, or a sentence:
//!
//! ```text
//! "Python, Go, Rust"  →  [Python], [Go], [Rust]
//! "Rust, Go 2 years"  →  [Rust], Go 2 years
//! ```

use super::markup::{tokenize, Element, Token};
use tracing::debug;

/// Class of the pill span wrapped around each recognised skill.
pub const SKILL_TAG_CLASS: &str = "skill-tag";

/// Print stylesheet injected into every prepared copy.
pub const PRINT_STYLESHEET: &str = r#"
        body {
            font-family: 'Segoe UI', Arial, sans-serif;
            line-height: 1.6;
            color: #333;
            padding: 10px;
        }
        h1, h2, h3, h4 {
            color: #1a73e8;
            font-weight: 600;
            margin-top: 15px;
        }
        h1 {
            font-size: 22px;
            border-bottom: 2px solid #1a73e8;
            padding-bottom: 8px;
        }
        h2 {
            font-size: 18px;
            border-bottom: 1px solid #e0e0e0;
            padding-bottom: 5px;
        }
        h3 {
            font-size: 16px;
        }
        ul {
            margin-left: 20px;
            padding-left: 20px;
        }
        li {
            margin-bottom: 5px;
        }
        .skill-tag {
            display: inline-block;
            background-color: #e8f0fe;
            color: #1a73e8;
            padding: 2px 8px;
            border-radius: 15px;
            margin: 2px;
            font-size: 14px;
        }
    "#;

/// What to prepare: a markup string or an already-detached element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// HTML or Markdown-flavoured text. Wrapped in a `<div>` container.
    Markup(String),
    /// An element taken from a document.
    Element(Element),
}

impl From<&str> for ContentSource {
    fn from(s: &str) -> Self {
        ContentSource::Markup(s.to_string())
    }
}

impl From<String> for ContentSource {
    fn from(s: String) -> Self {
        ContentSource::Markup(s)
    }
}

impl From<Element> for ContentSource {
    fn from(e: Element) -> Self {
        ContentSource::Element(e)
    }
}

impl From<&Element> for ContentSource {
    fn from(e: &Element) -> Self {
        ContentSource::Element(e.clone())
    }
}

/// The styled, rewritten copy handed to a renderer.
///
/// Owned exclusively by one export call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedContent {
    element: Element,
}

impl PreparedContent {
    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn into_element(self) -> Element {
        self.element
    }

    /// A complete HTML document around the prepared element, for renderers
    /// that load whole pages.
    pub fn to_html_document(&self, title: &str) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
            html_escape::encode_text(title),
            self.element.outer_html()
        )
    }
}

/// Produce a detached, styled and rewritten copy of `source`.
///
/// `source` is only borrowed: the caller's element or string is never
/// modified, and every call returns an independent copy.
pub fn prepare_content(source: &ContentSource) -> PreparedContent {
    let mut element = match source {
        ContentSource::Markup(markup) => Element::container(markup.as_str()),
        ContentSource::Element(el) => el.clone(),
    };

    element.prepend_html(&format!("<style>{PRINT_STYLESHEET}</style>"));
    let rewritten = rewrite_markup(element.inner_html());
    debug!(
        "Prepared <{}> content: {} → {} bytes",
        element.tag(),
        element.inner_html().len(),
        rewritten.len()
    );
    element.set_inner_html(rewritten);

    PreparedContent { element }
}

/// Apply all four text rules to an HTML fragment.
pub fn rewrite_markup(input: &str) -> String {
    render_segments(&segment(input))
}

// ── Segments ─────────────────────────────────────────────────────────────────

/// A typed piece of rewritten content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Markup passed through untouched.
    Markup(String),
    /// Plain text.
    Text(String),
    /// Paragraph spacing, rendered as `<br><br>`.
    Break,
    Bold(Vec<Segment>),
    Italic(Vec<Segment>),
    /// A recognised skill, rendered as a pill span.
    SkillTag(String),
}

/// Lex `input` and run every rule, returning the typed result.
pub fn segment(input: &str) -> Vec<Segment> {
    let segments = lex(input);
    let segments = split_paragraph_breaks(segments);
    let segments = pair_markers(segments, "**", Segment::Bold);
    let segments = italicise(segments);
    tag_skills(segments)
}

/// Serialise segments back to HTML.
pub fn render_segments(segments: &[Segment]) -> String {
    let mut out = String::new();
    render_into(segments, &mut out);
    out
}

fn render_into(segments: &[Segment], out: &mut String) {
    for seg in segments {
        match seg {
            Segment::Markup(s) | Segment::Text(s) => out.push_str(s),
            Segment::Break => out.push_str("<br><br>"),
            Segment::Bold(children) => {
                out.push_str("<strong>");
                render_into(children, out);
                out.push_str("</strong>");
            }
            Segment::Italic(children) => {
                out.push_str("<em>");
                render_into(children, out);
                out.push_str("</em>");
            }
            Segment::SkillTag(skill) => {
                out.push_str("<span class=\"");
                out.push_str(SKILL_TAG_CLASS);
                out.push_str("\">");
                out.push_str(skill);
                out.push_str("</span>");
            }
        }
    }
}

fn lex(input: &str) -> Vec<Segment> {
    tokenize(input)
        .into_iter()
        .map(|token| match token {
            Token::Markup(m) => Segment::Markup(m.to_string()),
            Token::Text(t) => Segment::Text(t.to_string()),
        })
        .collect()
}

/// Join adjacent text segments and drop empty ones.
fn merge_text(segments: Vec<Segment>) -> Vec<Segment> {
    let mut out: Vec<Segment> = Vec::with_capacity(segments.len());
    for seg in segments {
        if let Segment::Text(t) = &seg {
            if t.is_empty() {
                continue;
            }
            if let Some(Segment::Text(prev)) = out.last_mut() {
                prev.push_str(t);
                continue;
            }
        }
        out.push(seg);
    }
    out
}

// ── Rule 1: Blank lines become breaks ────────────────────────────────────────

fn split_paragraph_breaks(segments: Vec<Segment>) -> Vec<Segment> {
    let mut out = Vec::with_capacity(segments.len());
    for seg in segments {
        match seg {
            Segment::Text(t) if t.contains("\n\n") => {
                for (i, part) in t.split("\n\n").enumerate() {
                    if i > 0 {
                        out.push(Segment::Break);
                    }
                    if !part.is_empty() {
                        out.push(Segment::Text(part.to_string()));
                    }
                }
            }
            other => out.push(other),
        }
    }
    out
}

// ── Rules 2 & 3: Emphasis ────────────────────────────────────────────────────

enum Piece {
    Seg(Segment),
    Marker,
}

/// Pair `marker` occurrences left to right and wrap what lies between.
///
/// A pair never spans a line: an opening marker still unpaired when a
/// newline or break arrives stays literal text.
fn pair_markers(
    segments: Vec<Segment>,
    marker: &str,
    wrap: fn(Vec<Segment>) -> Segment,
) -> Vec<Segment> {
    let mut pieces = Vec::with_capacity(segments.len());
    for seg in segments {
        match seg {
            Segment::Text(t) if t.contains(marker) => {
                for (i, part) in t.split(marker).enumerate() {
                    if i > 0 {
                        pieces.push(Piece::Marker);
                    }
                    if !part.is_empty() {
                        pieces.push(Piece::Seg(Segment::Text(part.to_string())));
                    }
                }
            }
            other => pieces.push(Piece::Seg(other)),
        }
    }

    let mut out: Vec<Segment> = Vec::with_capacity(pieces.len());
    let mut open: Option<usize> = None;
    for piece in pieces {
        match piece {
            Piece::Marker => match open.take() {
                Some(start) => {
                    let inner = merge_text(out.split_off(start));
                    out.push(wrap(inner));
                }
                None => open = Some(out.len()),
            },
            Piece::Seg(seg) => {
                if ends_line(&seg) {
                    if let Some(start) = open.take() {
                        out.insert(start, Segment::Text(marker.to_string()));
                    }
                }
                out.push(seg);
            }
        }
    }
    if let Some(start) = open {
        out.insert(start, Segment::Text(marker.to_string()));
    }

    merge_text(out)
}

fn ends_line(seg: &Segment) -> bool {
    match seg {
        Segment::Text(s) | Segment::Markup(s) => s.contains('\n'),
        Segment::Break => true,
        _ => false,
    }
}

/// Rule 3 runs inside bold text first, then across the top level.
fn italicise(segments: Vec<Segment>) -> Vec<Segment> {
    let segments = segments
        .into_iter()
        .map(|seg| match seg {
            Segment::Bold(children) => Segment::Bold(pair_markers(children, "*", Segment::Italic)),
            other => other,
        })
        .collect();
    pair_markers(segments, "*", Segment::Italic)
}

// ── Rule 4: Skill tags ───────────────────────────────────────────────────────

/// Letters of the recognised alphabet (ASCII plus Turkish), space and tab.
fn is_skill_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == ' ' || c == '\t' || "ğüşıöçĞÜŞİÖÇ".contains(c)
}

fn is_list_delimiter(c: char) -> bool {
    c == ',' || c == ';'
}

fn tag_skills(segments: Vec<Segment>) -> Vec<Segment> {
    let mut out = Vec::with_capacity(segments.len());
    for seg in segments {
        match seg {
            Segment::Text(t) => out.extend(tag_skills_in_text(&t)),
            Segment::Bold(children) => out.push(Segment::Bold(tag_skills(children))),
            Segment::Italic(children) => out.push(Segment::Italic(tag_skills(children))),
            other => out.push(other),
        }
    }
    out
}

/// Length of the delimiter that closes `group`, if `tail` starts with one.
///
/// `,` and `;` close any group. A dash closes it only as ` - `, i.e. with
/// whitespace on both sides (the leading space belongs to `group`).
fn delimiter_len(group: &str, tail: &str) -> Option<usize> {
    let mut chars = tail.chars();
    match chars.next()? {
        c if is_list_delimiter(c) => Some(1),
        '-' if group.ends_with([' ', '\t']) && chars.next().is_some_and(char::is_whitespace) => {
            Some(1)
        }
        _ => None,
    }
}

/// A trailing list item ends at the end of the text run, a line end, or a period.
fn ends_list_item(tail: &str) -> bool {
    tail.is_empty() || tail.starts_with(['\n', '\r', '.'])
}

fn tag_skills_in_text(text: &str) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut plain = String::new();
    let mut rest = text;
    let mut after_delimiter = false;

    while let Some(first) = rest.chars().next() {
        let group_len = rest
            .char_indices()
            .find(|(_, c)| !is_skill_char(*c))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());

        if group_len == 0 {
            plain.push(first);
            rest = &rest[first.len_utf8()..];
            after_delimiter = is_list_delimiter(first);
            continue;
        }

        let group = &rest[..group_len];
        let tail = &rest[group_len..];
        let delimiter = delimiter_len(group, tail);
        let is_skill = !group.trim().is_empty()
            && (delimiter.is_some() || (after_delimiter && ends_list_item(tail)));

        if is_skill {
            let core = group.trim();
            let lead = group.len() - group.trim_start().len();
            plain.push_str(&group[..lead]);
            if !plain.is_empty() {
                out.push(Segment::Text(std::mem::take(&mut plain)));
            }
            out.push(Segment::SkillTag(core.to_string()));
            plain.push_str(&group[lead + core.len()..]);
        } else {
            plain.push_str(group);
        }

        match delimiter {
            Some(len) => {
                plain.push_str(&tail[..len]);
                rest = &tail[len..];
                after_delimiter = true;
            }
            None => {
                rest = tail;
                after_delimiter = false;
            }
        }
    }

    if !plain.is_empty() {
        out.push(Segment::Text(plain));
    }
    out
}

// ── Tests ────────────────────────────────────────────────────────────────────
