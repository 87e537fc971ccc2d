//! Converts markdown to HTML along with the metadata the templates need:
//! heading anchors, a table of contents, and an estimated reading time.

use std::collections::HashSet;

use pulldown_cmark::{html, CowStr, Event, Options as ParserOptions, Parser, Tag};

use crate::item::ContentType;

const WORDS_PER_MINUTE: usize = 200;

/// Controls how a content type's markdown is rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Options {
    /// Give every heading an `id` derived from its text.
    pub anchors: bool,

    /// Collect headings into [`Rendered::toc`]. Implies `anchors`.
    pub toc: bool,

    /// Added to every heading level so that body headings nest under the
    /// page's own headings (e.g., `#` becomes `<h2>` with an offset of 1).
    pub heading_offset: u32,
}

impl Options {
    pub fn for_content(content_type: ContentType) -> Options {
        match content_type {
            // The post title is the page's h1.
            ContentType::Post => Options {
                anchors: true,
                toc: true,
                heading_offset: 1,
            },
            // Entries sit below the page title and the entry title.
            ContentType::Experience | ContentType::Project => Options {
                anchors: false,
                toc: false,
                heading_offset: 2,
            },
            ContentType::Slide => Options {
                anchors: false,
                toc: false,
                heading_offset: 0,
            },
        }
    }
}

/// One heading in the table of contents, with the headings nested under it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocEntry {
    pub level: u32,
    pub id: String,
    pub title: String,
    pub children: Vec<TocEntry>,
}

/// The output of [`to_html`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Rendered {
    pub html: String,

    /// Estimated reading time in whole minutes; never zero.
    pub reading_time: usize,
    pub toc: Vec<TocEntry>,

    /// The ids assigned to headings, in document order.
    pub anchors: Vec<String>,
}

/// Converts `markdown` to HTML.
pub fn to_html(markdown: &str, options: Options) -> Rendered {
    let mut parser_options = ParserOptions::empty();
    parser_options.insert(ParserOptions::ENABLE_FOOTNOTES);
    parser_options.insert(ParserOptions::ENABLE_SMART_PUNCTUATION);
    parser_options.insert(ParserOptions::ENABLE_STRIKETHROUGH);
    parser_options.insert(ParserOptions::ENABLE_TABLES);
    parser_options.insert(ParserOptions::ENABLE_TASKLISTS);

    let events: Vec<Event> = Parser::new_ext(markdown, parser_options).collect();
    let reading_time = reading_time(&events);
    let anchors = options.anchors || options.toc;

    let mut out = Vec::with_capacity(events.len());
    let mut headings = Vec::new();
    let mut ids = Anchors::default();
    let mut i = 0;
    while i < events.len() {
        match &events[i] {
            Event::Start(Tag::Heading(level)) => {
                let level = (level + options.heading_offset).min(6);
                let end = heading_end(&events, i);
                if anchors {
                    let title = heading_text(&events[i + 1..end]);
                    let id = ids.claim(&title);
                    out.push(Event::Html(CowStr::from(format!(
                        "<h{} id=\"{}\">",
                        level, id
                    ))));
                    headings.push((level, id, title));
                } else {
                    out.push(Event::Start(Tag::Heading(level)));
                }
                out.extend(events[i + 1..end].iter().cloned());
                out.push(Event::End(Tag::Heading(level)));
                i = end + 1;
            }
            event => {
                out.push(event.clone());
                i += 1;
            }
        }
    }

    let mut html = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut html, out.into_iter());
    Rendered {
        html,
        reading_time,
        toc: match options.toc {
            true => toc(&headings),
            false => Vec::new(),
        },
        anchors: headings.into_iter().map(|(_, id, _)| id).collect(),
    }
}

// Index of the `End` matching the heading that starts at `start`, or the last
// event if the stream is truncated.
fn heading_end(events: &[Event], start: usize) -> usize {
    events[start..]
        .iter()
        .position(|e| matches!(e, Event::End(Tag::Heading(_))))
        .map(|offset| start + offset)
        .unwrap_or(events.len() - 1)
}

fn heading_text(events: &[Event]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text.trim().to_owned()
}

fn reading_time(events: &[Event]) -> usize {
    let words: usize = events
        .iter()
        .map(|e| match e {
            Event::Text(t) | Event::Code(t) => t.split_whitespace().count(),
            _ => 0,
        })
        .sum();
    ((words + WORDS_PER_MINUTE - 1) / WORDS_PER_MINUTE).max(1)
}

/// Hands out unique heading ids. Repeats get `-1`, `-2`, ... suffixes.
#[derive(Default)]
struct Anchors {
    used: HashSet<String>,
}

impl Anchors {
    fn claim(&mut self, title: &str) -> String {
        let mut base = slug::slugify(title);
        if base.is_empty() {
            base = "section".to_owned();
        }
        let mut id = base.clone();
        let mut n = 1;
        while self.used.contains(&id) {
            id = format!("{}-{}", base, n);
            n += 1;
        }
        self.used.insert(id.clone());
        id
    }
}

// Nests a flat list of headings by level. A heading becomes a child of the
// closest preceding heading with a smaller level.
fn toc(headings: &[(u32, String, String)]) -> Vec<TocEntry> {
    fn insert(entries: &mut Vec<TocEntry>, entry: TocEntry) {
        match entries.last_mut() {
            Some(last) if last.level < entry.level => insert(&mut last.children, entry),
            _ => entries.push(entry),
        }
    }

    let mut entries = Vec::new();
    for (level, id, title) in headings {
        insert(
            &mut entries,
            TocEntry {
                level: *level,
                id: id.clone(),
                title: title.clone(),
                children: Vec::new(),
            },
        );
    }
    entries
}

#[cfg(test)]
mod test {
    use super::*;

    fn post(markdown: &str) -> Rendered {
        to_html(markdown, Options::for_content(ContentType::Post))
    }

    #[test]
    fn test_headings_get_unique_anchors() {
        let rendered = post("# Setup\n\ntext\n\n## Setup\n\n# `cargo` & Friends\n");
        assert_eq!(vec!["setup", "setup-1", "cargo-friends"], rendered.anchors);
        assert!(rendered.html.contains("<h2 id=\"setup\">Setup</h2>"));
        assert!(rendered.html.contains("<h3 id=\"setup-1\">Setup</h3>"));
        assert!(rendered
            .html
            .contains("<h2 id=\"cargo-friends\"><code>cargo</code> &amp; Friends</h2>"));
    }

    #[test]
    fn test_toc_nests_by_level() {
        let rendered = post("# A\n## A.1\n### A.1.a\n## A.2\n# B\n");
        let titles = |entries: &[TocEntry]| -> Vec<String> {
            entries.iter().map(|e| e.title.clone()).collect()
        };
        assert_eq!(vec!["A", "B"], titles(&rendered.toc));
        assert_eq!(vec!["A.1", "A.2"], titles(&rendered.toc[0].children));
        assert_eq!(vec!["A.1.a"], titles(&rendered.toc[0].children[0].children));
        assert!(rendered.toc[1].children.is_empty());
    }

    #[test]
    fn test_entries_have_no_anchors() {
        let rendered = to_html("# Role\n", Options::for_content(ContentType::Experience));
        assert_eq!("<h3>Role</h3>\n", rendered.html);
        assert!(rendered.anchors.is_empty());
        assert!(rendered.toc.is_empty());
    }

    #[test]
    fn test_reading_time() {
        assert_eq!(1, post("").reading_time);
        assert_eq!(1, post(&"word ".repeat(200)).reading_time);
        assert_eq!(2, post(&"word ".repeat(201)).reading_time);
    }
}
