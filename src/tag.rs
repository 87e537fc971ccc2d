//! Defines [`TagKind`] and the two escaping transforms that turn a raw tag
//! (e.g., `C#`) into a path segment.
//!
//! The file-safe form replaces reserved characters with spelled-out
//! `~name~` sequences. The URL-safe form percent-encodes the file-safe form.
//! Since the escape character (`~`) is itself escaped, both transforms are
//! injective and can be inverted exactly.

use std::fmt;
use std::str::FromStr;

/// Distinguishes the two tag vocabularies a content item can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagKind {
    /// Programming languages (frontmatter field `languages`).
    Language,

    /// Tools, platforms, and frameworks (frontmatter field `technologies`).
    Technology,
}

impl TagKind {
    /// Both kinds, in a fixed order.
    pub const ALL: [TagKind; 2] = [TagKind::Language, TagKind::Technology];

    /// The page-id prefix for the kind (`language:Go`).
    pub fn page_prefix(self) -> &'static str {
        match self {
            TagKind::Language => "language",
            TagKind::Technology => "technology",
        }
    }

    /// The URL segment under `/blog/` for the kind's collections.
    pub fn collection_segment(self) -> &'static str {
        match self {
            TagKind::Language => "languages",
            TagKind::Technology => "technologies",
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.page_prefix())
    }
}

impl FromStr for TagKind {
    type Err = UnknownTagKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "language" => Ok(TagKind::Language),
            "technology" => Ok(TagKind::Technology),
            _ => Err(UnknownTagKind(s.to_owned())),
        }
    }
}

/// Returned when parsing a [`TagKind`] from an unrecognized prefix.
#[derive(Debug, thiserror::Error)]
#[error("unknown tag kind `{0}`")]
pub struct UnknownTagKind(pub String);

const ESCAPE: char = '~';

/// Characters that never appear verbatim in a file-safe tag.
const RESERVED: &[(char, &str)] = &[
    ('~', "tilde"),
    ('#', "sharp"),
    ('/', "slash"),
    ('\\', "backslash"),
    ('?', "question"),
    ('%', "percent"),
    (':', "colon"),
    ('*', "star"),
    ('"', "quote"),
    ('<', "lt"),
    ('>', "gt"),
    ('|', "pipe"),
];

/// Leading dots would produce hidden files or `..` segments.
const LEADING_DOT: &str = "dot";

/// Converts a raw tag into a form that is safe to use as a single path
/// segment on disk (e.g., `C#` becomes `C~sharp~`).
pub fn file_safe(tag: &str) -> String {
    let mut out = String::with_capacity(tag.len());
    for (i, c) in tag.chars().enumerate() {
        if i == 0 && c == '.' {
            push_escaped(&mut out, LEADING_DOT);
            continue;
        }
        match RESERVED.iter().find(|(reserved, _)| *reserved == c) {
            Some((_, name)) => push_escaped(&mut out, name),
            None => out.push(c),
        }
    }
    out
}

fn push_escaped(out: &mut String, name: &str) {
    out.push(ESCAPE);
    out.push_str(name);
    out.push(ESCAPE);
}

/// Converts a raw tag into the form used inside route paths: the file-safe
/// form, percent-encoded.
pub fn url_safe(tag: &str) -> String {
    urlencoding::encode(&file_safe(tag)).into_owned()
}

/// Inverts [`file_safe`].
pub fn decode_file_safe(escaped: &str) -> Result<String, DecodeError> {
    let mut out = String::with_capacity(escaped.len());
    let mut rest = escaped;
    while let Some(start) = rest.find(ESCAPE) {
        out.push_str(&rest[..start]);
        let after = &rest[start + ESCAPE.len_utf8()..];
        let end = after
            .find(ESCAPE)
            .ok_or_else(|| DecodeError::Unterminated(escaped.to_owned()))?;
        let name = &after[..end];
        match RESERVED.iter().find(|(_, n)| *n == name) {
            Some((c, _)) => out.push(*c),
            None if name == LEADING_DOT => out.push('.'),
            None => return Err(DecodeError::UnknownEscape(name.to_owned())),
        }
        rest = &after[end + ESCAPE.len_utf8()..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Inverts [`url_safe`].
pub fn decode_url_safe(escaped: &str) -> Result<String, DecodeError> {
    let file_safe = urlencoding::decode(escaped)
        .map_err(|_| DecodeError::InvalidPercentEncoding(escaped.to_owned()))?;
    decode_file_safe(&file_safe)
}

/// Represents a failure to decode an escaped tag.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Returned when an escape sequence is missing its closing `~`.
    #[error("unterminated escape sequence in `{0}`")]
    Unterminated(String),

    /// Returned when an escape sequence names no reserved character.
    #[error("unknown escape sequence `~{0}~`")]
    UnknownEscape(String),

    /// Returned when percent-decoding doesn't produce valid UTF-8.
    #[error("invalid percent-encoding in `{0}`")]
    InvalidPercentEncoding(String),
}
