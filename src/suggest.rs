use crate::types::FileKind;
use crate::util::char_to_byte;

pub(crate) const MARKUP_TAGS: &[&str] = &[
    "div", "span", "h1", "h2", "p", "button", "input", "img", "a", "section", "ul", "li", "br",
    "hr", "script", "style",
];

pub(crate) const STYLE_PROPERTIES: &[&str] = &[
    "color",
    "background",
    "font-size",
    "margin",
    "padding",
    "border",
    "display",
    "width",
    "height",
    "flex",
    "position",
    "top",
    "border-radius",
];

const TOKEN_DELIMITERS: &[char] = &[' ', '\n', '<', ':', ';', '{', '}'];

pub(crate) fn vocabulary(kind: FileKind) -> &'static [&'static str] {
    match kind {
        FileKind::Markup => MARKUP_TAGS,
        FileKind::Style => STYLE_PROPERTIES,
        FileKind::Script | FileKind::Unknown => &[],
    }
}

/// The token being typed: it starts at `start` and ends at the cursor
/// (both character offsets). `query` is the lower-cased token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Prefix {
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) query: String,
}

pub(crate) fn extract_prefix(text: &str, cursor: usize) -> Prefix {
    let before: Vec<char> = text.chars().take(cursor).collect();
    let end = before.len();
    let start = before
        .iter()
        .rposition(|c| TOKEN_DELIMITERS.contains(c))
        .map_or(0, |idx| idx + 1);
    let query = before[start..].iter().collect::<String>().to_lowercase();
    Prefix { start, end, query }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Suggestions {
    pub(crate) kind: FileKind,
    pub(crate) prefix: Prefix,
    pub(crate) candidates: Vec<&'static str>,
}

/// Candidates for the token at `cursor`, or `None` when there is nothing
/// to offer (empty token, no vocabulary, or no match).
pub(crate) fn suggest(text: &str, cursor: usize, kind: FileKind) -> Option<Suggestions> {
    let prefix = extract_prefix(text, cursor);
    if prefix.query.is_empty() {
        return None;
    }
    let candidates: Vec<&'static str> = vocabulary(kind)
        .iter()
        .copied()
        .filter(|entry| entry.starts_with(prefix.query.as_str()))
        .collect();
    if candidates.is_empty() {
        return None;
    }
    Some(Suggestions {
        kind,
        prefix,
        candidates,
    })
}

impl Suggestions {
    pub(crate) fn label(&self, idx: usize) -> Option<String> {
        let word = self.candidates.get(idx)?;
        Some(match self.kind {
            FileKind::Markup => format!("<{word}>"),
            _ => word.to_string(),
        })
    }

    pub(crate) fn completion(&self, idx: usize) -> Option<Completion> {
        let word = *self.candidates.get(idx)?;
        Some(Completion {
            kind: self.kind,
            word,
            start: self.prefix.start,
            end: self.prefix.end,
        })
    }
}

/// Text transform for an accepted candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Completion {
    pub(crate) kind: FileKind,
    pub(crate) word: &'static str,
    pub(crate) start: usize,
    pub(crate) end: usize,
}

impl Completion {
    /// Returns the rewritten text and the new cursor offset.
    ///
    /// Markup becomes `<tag></tag>` with the cursor between the tags; a `<`
    /// typed right before the token is absorbed into the open tag. Style
    /// becomes `prop: ;` with the cursor in the empty value slot.
    pub(crate) fn apply(&self, text: &str) -> (String, usize) {
        let mut start = self.start;
        let (insert, cursor_in_insert) = match self.kind {
            FileKind::Markup => {
                if start > 0 && text.chars().nth(start - 1) == Some('<') {
                    start -= 1;
                }
                let open = format!("<{}>", self.word);
                let cursor = open.chars().count();
                (format!("{open}</{}>", self.word), cursor)
            }
            FileKind::Style => (format!("{}: ;", self.word), self.word.chars().count() + 2),
            FileKind::Script | FileKind::Unknown => {
                (self.word.to_string(), self.word.chars().count())
            }
        };
        let from = char_to_byte(text, start);
        let to = char_to_byte(text, self.end);
        let mut out = String::with_capacity(text.len() + insert.len());
        out.push_str(&text[..from]);
        out.push_str(&insert);
        out.push_str(&text[to..]);
        (out, start + cursor_in_insert)
    }
}
