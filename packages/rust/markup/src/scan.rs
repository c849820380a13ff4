//! Small markup scanner.
//!
//! Splits a markup body into text runs, tags, comments and raw-text element
//! bodies without building a tree. The linker only needs to know which byte
//! ranges are plain text outside any open `<a>` element, so the scanner is
//! deliberately forgiving: an unterminated tag or comment runs to the end of
//! the input.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

/// Elements whose bodies are never markup or linkable text.
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

/// One lexical unit of a markup body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    /// Character data between tags.
    Text(Range<usize>),
    /// An opening, closing or self-closing tag.
    Tag(Tag<'a>),
    /// `<!-- ... -->`, `<!DOCTYPE ...>` or `<? ... >`.
    Comment(Range<usize>),
    /// Body of a `script`/`style` element.
    RawText(Range<usize>),
}

/// A parsed tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Tag<'a> {
    /// Tag name as written (case preserved).
    pub name: &'a str,
    /// `</name>`.
    pub closing: bool,
    /// `<name ... />`.
    pub self_closing: bool,
    /// Everything between the name and the closing `>`.
    pub attrs: &'a str,
}

impl<'a> Tag<'a> {
    pub fn is_anchor(&self) -> bool {
        self.name.eq_ignore_ascii_case("a")
    }

    /// Value of the `href` attribute, if present.
    pub fn href(&self) -> Option<&'a str> {
        static HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r#"(?i)(?:^|\s)href\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
                .expect("valid regex")
        });

        let caps = HREF_RE.captures(self.attrs)?;
        caps.get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map(|m| m.as_str())
    }
}

/// Iterator over the [`Token`]s of a markup string.
pub(crate) struct Scanner<'a> {
    src: &'a str,
    pos: usize,
    raw_element: Option<&'static str>,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            raw_element: None,
        }
    }

    /// Whether a `<` at byte `i` opens markup rather than being literal text.
    fn starts_markup(&self, i: usize) -> bool {
        let bytes = self.src.as_bytes();
        if bytes.get(i) != Some(&b'<') {
            return false;
        }
        match bytes.get(i + 1) {
            Some(b) if b.is_ascii_alphabetic() || *b == b'!' || *b == b'?' => true,
            Some(b'/') => bytes.get(i + 2).is_some_and(|b| b.is_ascii_alphabetic()),
            _ => false,
        }
    }

    fn scan_raw_text(&mut self, element: &str) -> Option<Token<'a>> {
        let start = self.pos;
        let end = raw_text_end(element)
            .find_at(self.src, start)
            .map_or(self.src.len(), |m| m.start());
        self.pos = end;
        (end > start).then(|| Token::RawText(start..end))
    }

    fn scan_comment(&mut self) -> Token<'a> {
        let start = self.pos;
        let end = if self.src[start..].starts_with("<!--") {
            self.src[start + 4..]
                .find("-->")
                .map(|i| start + 4 + i + 3)
        } else {
            self.src[start..].find('>').map(|i| start + i + 1)
        }
        .unwrap_or(self.src.len());
        self.pos = end;
        Token::Comment(start..end)
    }

    fn scan_tag(&mut self) -> Token<'a> {
        let bytes = self.src.as_bytes();
        let mut i = self.pos + 1;

        let closing = bytes.get(i) == Some(&b'/');
        if closing {
            i += 1;
        }

        let name_start = i;
        while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || matches!(bytes[i], b'-' | b':'))
        {
            i += 1;
        }
        let name = &self.src[name_start..i];

        // Attribute region: quoted values may contain '>'.
        let attrs_start = i;
        let mut quote: Option<u8> = None;
        while i < bytes.len() {
            let b = bytes[i];
            match quote {
                Some(q) if b == q => quote = None,
                Some(_) => {}
                None if b == b'"' || b == b'\'' => quote = Some(b),
                None if b == b'>' => break,
                None => {}
            }
            i += 1;
        }
        let attrs = &self.src[attrs_start..i];
        self.pos = (i + 1).min(bytes.len());

        let self_closing = ends_with_solidus(attrs);
        if !closing && !self_closing {
            self.raw_element = RAW_TEXT_ELEMENTS
                .into_iter()
                .find(|raw| name.eq_ignore_ascii_case(raw));
        }

        Token::Tag(Tag {
            name,
            closing,
            self_closing,
            attrs,
        })
    }

    fn scan_text(&mut self) -> Token<'a> {
        let start = self.pos;
        let mut end = start + 1;
        while end < self.src.len() && !self.starts_markup(end) {
            end += 1;
        }
        self.pos = end;
        Token::Text(start..end)
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(element) = self.raw_element.take() {
            if let Some(token) = self.scan_raw_text(element) {
                return Some(token);
            }
        }

        if self.pos >= self.src.len() {
            return None;
        }

        if self.starts_markup(self.pos) {
            let next = self.src.as_bytes()[self.pos + 1];
            if next == b'!' || next == b'?' {
                return Some(self.scan_comment());
            }
            return Some(self.scan_tag());
        }

        Some(self.scan_text())
    }
}

/// Whether `attrs` ends in a standalone `/`, not one closing an unquoted value.
fn ends_with_solidus(attrs: &str) -> bool {
    let Some(before) = attrs.trim_end().strip_suffix('/') else {
        return false;
    };
    before.is_empty() || before.ends_with(|c: char| c.is_whitespace() || c == '"' || c == '\'')
}

/// Byte ranges of `html` that are plain text outside any open anchor.
///
/// A link may only be inserted inside one of these ranges. `<a .../>` still
/// opens an anchor: the self-closing flag means nothing on `a`.
pub(crate) fn linkable_runs(html: &str) -> Vec<Range<usize>> {
    let mut anchor_depth = 0usize;
    let mut runs = Vec::new();

    for token in Scanner::new(html) {
        match token {
            Token::Text(range) if anchor_depth == 0 => runs.push(range),
            Token::Tag(tag) if tag.is_anchor() => {
                if tag.closing {
                    anchor_depth = anchor_depth.saturating_sub(1);
                } else {
                    anchor_depth += 1;
                }
            }
            _ => {}
        }
    }

    runs
}

/// `href` values of every opening anchor tag, in document order.
pub(crate) fn anchor_hrefs(html: &str) -> Vec<&str> {
    Scanner::new(html)
        .filter_map(|token| match token {
            Token::Tag(tag) if tag.is_anchor() && !tag.closing => tag.href(),
            _ => None,
        })
        .collect()
}

/// Matcher for the end tag of a raw-text element.
fn raw_text_end(element: &str) -> &'static Regex {
    static SCRIPT_END: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)</script").expect("valid regex"));
    static STYLE_END: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)</style").expect("valid regex"));

    if element.eq_ignore_ascii_case("style") {
        &STYLE_END
    } else {
        &SCRIPT_END
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts<'a>(html: &'a str) -> Vec<&'a str> {
        linkable_runs(html).into_iter().map(|r| &html[r]).collect()
    }

    #[test]
    fn plain_text_is_one_run() {
        assert_eq!(texts("just words"), vec!["just words"]);
    }

    #[test]
    fn tags_split_text_runs() {
        assert_eq!(
            texts("<p>one <strong>two</strong> three</p>"),
            vec!["one ", "two", " three"]
        );
    }

    #[test]
    fn anchor_text_is_not_linkable() {
        assert_eq!(
            texts(r#"<p>before <a href="/x">inside <em>deep</em></a> after</p>"#),
            vec!["before ", " after"]
        );
    }

    #[test]
    fn quoted_attribute_may_contain_angle_bracket() {
        let html = r#"<img alt="a > b" title='Chat Online'>visible"#;
        assert_eq!(texts(html), vec!["visible"]);
    }

    #[test]
    fn comments_and_scripts_are_skipped() {
        let html = "<!-- Chat Online --><script>var a = '<b>x</b>';</script>ok<style>p{}</style>";
        assert_eq!(texts(html), vec!["ok"]);
    }

    #[test]
    fn lone_less_than_is_text() {
        assert_eq!(texts("<p>1 < 2 and 3 <= 4</p>"), vec!["1 < 2 and 3 <= 4"]);
    }

    #[test]
    fn unterminated_tag_swallows_the_rest() {
        assert_eq!(texts("start <p class=\"x\" rest of body"), vec!["start "]);
    }

    #[test]
    fn unclosed_anchor_blocks_everything_after_it() {
        assert_eq!(texts("a <a href=\"/y\">b c"), vec!["a "]);
    }

    #[test]
    fn self_closing_syntax_still_opens_anchor() {
        assert_eq!(texts("x<a name=\"top\"/>y</a>z"), vec!["x", "z"]);
    }

    #[test]
    fn unquoted_href_ending_in_slash_opens_anchor() {
        let html = "<p><a href=/blog/outro/>dentro</a> fora</p>";
        assert_eq!(texts(html), vec![" fora"]);
        assert_eq!(anchor_hrefs(html), vec!["/blog/outro/"]);
    }

    fn first_tag(html: &str) -> Tag<'_> {
        Scanner::new(html)
            .find_map(|token| match token {
                Token::Tag(tag) => Some(tag),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn self_closing_flag_needs_a_standalone_slash() {
        assert!(first_tag("<br/>").self_closing);
        assert!(first_tag("<img src=\"x.png\" />").self_closing);
        assert!(first_tag("<a id='top'/>").self_closing);
        assert!(!first_tag("<a href=/blog/x/>").self_closing);
        assert!(!first_tag("<p>").self_closing);
    }

    #[test]
    fn raw_text_end_tag_is_case_insensitive() {
        let html = "<SCRIPT>var s = '<b>Chat</b>';</Script>depois";
        assert_eq!(texts(html), vec!["depois"]);
    }

    #[test]
    fn collects_hrefs_in_document_order() {
        let html = r#"<a href="/blog/rio">Rio</a> <A HREF='/blog/bahia'>Ba</A> <a name="n">n</a> <a href=/blog/recife>R</a>"#;
        assert_eq!(anchor_hrefs(html), vec!["/blog/rio", "/blog/bahia", "/blog/recife"]);
    }

    #[test]
    fn data_href_is_not_href() {
        let html = r#"<a data-href="/blog/no" href="/blog/yes">t</a>"#;
        assert_eq!(anchor_hrefs(html), vec!["/blog/yes"]);
    }

    #[test]
    fn non_ascii_text_keeps_char_boundaries() {
        let html = "<p>São Paulo é ótima</p>";
        assert_eq!(texts(html), vec!["São Paulo é ótima"]);
    }
}
