//! Markup lexing and the detached [`Element`] value.
//!
//! The preparer never parses HTML into a tree. It only needs to know which
//! bytes are *markup* (tags, comments, character references, the bodies of
//! `<style>`/`<script>`) and which are *text*, because the text rewrites must
//! never touch markup. [`tokenize`] draws exactly that line.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// A lexed piece of an HTML fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Opaque markup: tag, comment, doctype, character reference, or the raw
    /// body of a `<style>`/`<script>` element.
    Markup(&'a str),
    /// Plain text between markup.
    Text(&'a str),
}

static RE_MARKUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)<!--.*?-->|</?[A-Za-z][^<>]*>|<[!?][^<>]*>|&(?:#[0-9]+|#[xX][0-9A-Fa-f]+|[A-Za-z][A-Za-z0-9]*);",
    )
    .unwrap()
});

// Close tags of the raw-text elements, whose content is never markup.
static RE_STYLE_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</style").unwrap());
static RE_SCRIPT_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</script").unwrap());

/// Split an HTML fragment into markup and text tokens.
///
/// Concatenating the token slices in order reproduces `input` exactly.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < input.len() {
        let Some(m) = RE_MARKUP.find_at(input, pos) else {
            tokens.push(Token::Text(&input[pos..]));
            break;
        };

        if m.start() > pos {
            tokens.push(Token::Text(&input[pos..m.start()]));
        }
        tokens.push(Token::Markup(m.as_str()));
        pos = m.end();

        if let Some(close) = raw_text_element(m.as_str()) {
            // Everything up to the matching close tag is opaque.
            let body_end = close
                .find_at(input, pos)
                .map(|c| c.start())
                .unwrap_or(input.len());
            if body_end > pos {
                tokens.push(Token::Markup(&input[pos..body_end]));
            }
            pos = body_end;
        }
    }

    tokens
}

/// Close-tag pattern of the raw-text element `tag` opens, if any.
fn raw_text_element(tag: &str) -> Option<&'static Regex> {
    let rest = tag.strip_prefix('<')?;
    if rest.starts_with('/') || tag.ends_with("/>") {
        return None;
    }
    let name_len = rest
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(rest.len());
    let name = &rest[..name_len];
    if name.eq_ignore_ascii_case("style") {
        Some(&*RE_STYLE_CLOSE)
    } else if name.eq_ignore_ascii_case("script") {
        Some(&*RE_SCRIPT_CLOSE)
    } else {
        None
    }
}

/// Visible text of an HTML fragment: tags dropped, character references decoded.
///
/// Used to show HTML labels (icon + caption) on surfaces that cannot render
/// markup, such as a terminal spinner.
pub fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for token in tokenize(input) {
        match token {
            Token::Text(t) => out.push_str(t),
            Token::Markup(m) if m.starts_with('&') => {
                out.push_str(&html_escape::decode_html_entities(m));
            }
            Token::Markup(_) => {}
        }
    }
    out
}

// ── Element ──────────────────────────────────────────────────────────────

/// A detached element: tag name, attributes, and inner markup.
///
/// Stands in for a DOM node that has already been taken out of a live
/// document. `Clone` is a deep copy; nothing is shared between clones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    inner_html: String,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            inner_html: String::new(),
        }
    }

    /// A `<div>` whose inner markup is `markup`.
    pub fn container(markup: impl Into<String>) -> Self {
        Self::new("div").with_inner_html(markup)
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_inner_html(mut self, markup: impl Into<String>) -> Self {
        self.inner_html = markup.into();
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing one with the same name.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(&name))
        {
            Some((_, v)) => *v = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn inner_html(&self) -> &str {
        &self.inner_html
    }

    pub fn set_inner_html(&mut self, markup: impl Into<String>) {
        self.inner_html = markup.into();
    }

    /// Insert markup before the first child.
    pub fn prepend_html(&mut self, markup: &str) {
        self.inner_html.insert_str(0, markup);
    }

    /// Serialise the element including its own tag.
    pub fn outer_html(&self) -> String {
        let mut out = String::with_capacity(self.inner_html.len() + 64);
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&attribute_value(value));
            out.push('"');
        }
        out.push('>');
        out.push_str(&self.inner_html);
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
        out
    }
}

fn attribute_value(value: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejoin(tokens: &[Token<'_>]) -> String {
        tokens
            .iter()
            .map(|t| match t {
                Token::Markup(s) | Token::Text(s) => *s,
            })
            .collect()
    }

    #[test]
    fn test_tokenize_tags_and_text() {
        let tokens = tokenize("<p class=\"x\">Hello</p>");
        assert_eq!(
            tokens,
            vec![
                Token::Markup("<p class=\"x\">"),
                Token::Text("Hello"),
                Token::Markup("</p>"),
            ]
        );
    }

    #[test]
    fn test_tokenize_roundtrips_input() {
        let input = "a <b>b</b> &amp; <!-- c --> 3 < 4 <br/>\n\nend";
        assert_eq!(rejoin(&tokenize(input)), input);
    }

    #[test]
    fn test_lone_less_than_is_text() {
        let tokens = tokenize("3 < 4");
        assert_eq!(tokens, vec![Token::Text("3 < 4")]);
    }

    #[test]
    fn test_entities_are_markup() {
        let tokens = tokenize("R&amp;D;");
        assert_eq!(
            tokens,
            vec![Token::Text("R"), Token::Markup("&amp;"), Token::Text("D;")]
        );
    }

    #[test]
    fn test_style_body_is_opaque() {
        let input = "<style>body { font-family: Arial, sans-serif; }</style>Go, Rust";
        let tokens = tokenize(input);
        assert_eq!(tokens[0], Token::Markup("<style>"));
        assert_eq!(
            tokens[1],
            Token::Markup("body { font-family: Arial, sans-serif; }")
        );
        assert_eq!(tokens[2], Token::Markup("</style>"));
        assert_eq!(tokens[3], Token::Text("Go, Rust"));
    }

    #[test]
    fn test_close_tag_matched_case_insensitively() {
        let input = "<Style>b { color: red; }</STYLE>**x**<script>a*b*c</Script>";
        let tokens = tokenize(input);
        assert_eq!(
            tokens,
            vec![
                Token::Markup("<Style>"),
                Token::Markup("b { color: red; }"),
                Token::Markup("</STYLE>"),
                Token::Text("**x**"),
                Token::Markup("<script>"),
                Token::Markup("a*b*c"),
                Token::Markup("</Script>"),
            ]
        );
    }

    #[test]
    fn test_many_raw_text_elements() {
        let input = "<style>a{}</style>Go, ".repeat(2000);
        let tokens = tokenize(&input);
        assert_eq!(tokens.len(), 4 * 2000);
        assert_eq!(rejoin(&tokens), input);
        assert!(tokens
            .iter()
            .filter(|t| matches!(t, Token::Text(_)))
            .all(|t| *t == Token::Text("Go, ")));
    }

    #[test]
    fn test_unclosed_script_swallows_rest() {
        let tokens = tokenize("<SCRIPT>let a = 1, b = 2;");
        assert_eq!(tokens.len(), 2);
        assert!(matches!(tokens[1], Token::Markup(_)));
    }

    #[test]
    fn test_strip_tags_decodes_entities() {
        assert_eq!(
            strip_tags("<i style=\"margin-right: 5px;\">⏳</i> PDF &amp; more"),
            "⏳ PDF & more"
        );
    }

    #[test]
    fn test_outer_html_escapes_attributes() {
        let el = Element::new("section")
            .with_attribute("id", "cv")
            .with_attribute("title", "a \"quoted\" title")
            .with_inner_html("<p>x</p>");
        assert_eq!(
            el.outer_html(),
            "<section id=\"cv\" title=\"a &quot;quoted&quot; title\"><p>x</p></section>"
        );
    }

    #[test]
    fn test_set_attribute_replaces() {
        let mut el = Element::new("div").with_attribute("class", "a");
        el.set_attribute("CLASS", "b");
        assert_eq!(el.attributes().len(), 1);
        assert_eq!(el.attribute("class"), Some("b"));
    }

    #[test]
    fn test_clone_is_independent() {
        let original = Element::container("<p>keep</p>");
        let mut copy = original.clone();
        copy.prepend_html("<style></style>");
        assert_eq!(original.inner_html(), "<p>keep</p>");
        assert_eq!(copy.inner_html(), "<style></style><p>keep</p>");
    }
}
