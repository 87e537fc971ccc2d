//! Defines the content item types ([`Post`], [`Experience`], [`Project`],
//! [`Slide`]) and the logic for parsing them from source files. A source
//! file's location under the content directory is part of its data: the
//! path of a post encodes its date and slug, the path of a slide deck encodes
//! its slug. See [`locate`] for the accepted layouts and [`parse`] for the
//! file format.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::Deserialize;

use crate::page::{FixedPage, PageId};
use crate::tag::TagKind;

const MARKDOWN_EXTENSION: &str = "md";
const BUNDLE_INDEX: &str = "index.md";

/// The closed set of content collections. Each corresponds to a top-level
/// directory under the content directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContentType {
    Post,
    Experience,
    Project,
    Slide,
}

impl ContentType {
    /// The directory (relative to the content directory) holding the
    /// collection's source files.
    pub fn directory(self) -> &'static str {
        match self {
            ContentType::Post => "blog",
            ContentType::Experience => "experience",
            ContentType::Project => "projects",
            ContentType::Slide => "slides",
        }
    }

    fn from_directory(directory: &str) -> Option<ContentType> {
        match directory {
            "blog" => Some(ContentType::Post),
            "experience" => Some(ContentType::Experience),
            "projects" => Some(ContentType::Project),
            "slides" => Some(ContentType::Slide),
            _ => None,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.directory())
    }
}

/// Identifies a post by the date and slug segments of its source path.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PostId {
    pub year: String,
    pub month: String,
    pub day: String,
    pub slug: String,
}

impl PostId {
    /// Builds a [`PostId`], validating that the date segments are zero-padded
    /// and form a real calendar date.
    pub fn new(year: &str, month: &str, day: &str, slug: &str) -> Result<PostId> {
        let well_formed = |s: &str, len: usize| {
            s.len() == len && s.chars().all(|c| c.is_ascii_digit())
        };
        if !(well_formed(year, 4) && well_formed(month, 2) && well_formed(day, 2))
            || slug.is_empty()
        {
            return Err(Error::InvalidPostPath(format!(
                "{}/{}/{}/{}",
                year, month, day, slug
            )));
        }
        let id = PostId {
            year: year.to_owned(),
            month: month.to_owned(),
            day: day.to_owned(),
            slug: slug.to_owned(),
        };
        id.calendar_date()?;
        Ok(id)
    }

    fn calendar_date(&self) -> Result<NaiveDate> {
        let invalid = || Error::InvalidDate(self.to_string());
        let year = self.year.parse().map_err(|_| invalid())?;
        let month = self.month.parse().map_err(|_| invalid())?;
        let day = self.day.parse().map_err(|_| invalid())?;
        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
    }

    /// The canonical URL of the post.
    pub fn route_path(&self) -> String {
        format!(
            "/blog/{}/{}/{}/{}/",
            self.year, self.month, self.day, self.slug
        )
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}:{}:{}", self.year, self.month, self.day, self.slug)
    }
}

/// What kind of entry a source path denotes, with the identity encoded in
/// the path itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Entry {
    Post(PostId),
    Experience,
    Project,
    Slide(String),
}

/// The result of resolving a source path against the content directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    /// The path relative to the content directory, `/`-separated. This is
    /// the stable key under which the item is stored.
    pub key: String,
    pub entry: Entry,
}

impl Location {
    pub fn content_type(&self) -> ContentType {
        match self.entry {
            Entry::Post(_) => ContentType::Post,
            Entry::Experience => ContentType::Experience,
            Entry::Project => ContentType::Project,
            Entry::Slide(_) => ContentType::Slide,
        }
    }
}

/// Resolves `path` against `content_directory`. Accepted layouts:
///
/// * `blog/{YYYY}/{MM}/{DD}/{slug}.md` or `blog/{YYYY}/{MM}/{DD}/{slug}/index.md`
/// * `slides/{slug}.md` or `slides/{slug}/index.md`
/// * `experience/**/*.md`
/// * `projects/**/*.md`
pub fn locate(content_directory: &Path, path: &Path) -> Result<Location> {
    let relative = path
        .strip_prefix(content_directory)
        .map_err(|_| Error::OutsideContent(path.to_owned()))?;
    if relative.extension().and_then(|e| e.to_str()) != Some(MARKDOWN_EXTENSION) {
        return Err(Error::NotMarkdown(path.to_owned()));
    }

    let segments = relative
        .components()
        .map(|c| match c {
            Component::Normal(s) => s
                .to_str()
                .map(str::to_owned)
                .ok_or_else(|| Error::InvalidFileName(path.to_owned())),
            _ => Err(Error::InvalidFileName(path.to_owned())),
        })
        .collect::<Result<Vec<String>>>()?;
    let key = segments.join("/");

    let (collection, rest) = match segments.split_first() {
        Some((collection, rest)) if !rest.is_empty() => (collection, rest),
        _ => return Err(Error::UnknownContentType(key)),
    };
    let content_type = ContentType::from_directory(collection)
        .ok_or_else(|| Error::UnknownContentType(key.clone()))?;

    let entry = match content_type {
        ContentType::Post => match rest {
            [year, month, day, file] => {
                Entry::Post(PostId::new(year, month, day, file_stem(file))?)
            }
            [year, month, day, slug, index] if index == BUNDLE_INDEX => {
                Entry::Post(PostId::new(year, month, day, slug)?)
            }
            _ => return Err(Error::InvalidPostPath(key)),
        },
        ContentType::Slide => match rest {
            [file] => Entry::Slide(file_stem(file).to_owned()),
            [slug, index] if index == BUNDLE_INDEX => Entry::Slide(slug.clone()),
            _ => return Err(Error::InvalidSlidePath(key)),
        },
        ContentType::Experience => Entry::Experience,
        ContentType::Project => Entry::Project,
    };
    Ok(Location { key, entry })
}

fn file_stem(file_name: &str) -> &str {
    file_name
        .strip_suffix(MARKDOWN_EXTENSION)
        .and_then(|s| s.strip_suffix('.'))
        .unwrap_or(file_name)
}

/// A blog post.
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    pub key: String,
    pub id: PostId,
    pub title: String,
    pub description: Option<String>,

    /// The path date combined with the frontmatter `time` (UTC).
    pub date: DateTime<Utc>,
    pub draft: bool,
    pub languages: Vec<String>,
    pub technologies: Vec<String>,

    /// The raw markdown body, frontmatter excluded.
    pub body: String,
}

impl Post {
    /// Whether the fields shown in collection listings and the feed differ.
    pub fn listing_differs(&self, other: &Post) -> bool {
        self.title != other.title
            || self.description != other.description
            || self.date != other.date
    }

    pub fn route_path(&self) -> String {
        self.id.route_path()
    }

    pub fn tags(&self, kind: TagKind) -> &[String] {
        select_tags(&self.languages, &self.technologies, kind)
    }
}

/// A professional experience entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Experience {
    pub key: String,
    pub title: String,
    /// The start as written (`YYYY`, `YYYY-MM` or `YYYY-MM-DD`).
    pub start: String,
    /// `start` as a date; entries are ordered by this.
    pub started: NaiveDate,
    pub end: Option<String>,
    pub website: Option<String>,
    pub draft: bool,
    pub languages: Vec<String>,
    pub technologies: Vec<String>,
    pub body: String,
}

/// A project entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Project {
    pub key: String,
    pub title: String,
    pub description: Option<String>,
    pub order: i64,
    pub website: Option<String>,
    pub draft: bool,
    pub languages: Vec<String>,
    pub technologies: Vec<String>,
    pub body: String,
}

/// A slide deck. The body is the deck's markdown source.
#[derive(Clone, Debug, PartialEq)]
pub struct Slide {
    pub key: String,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub draft: bool,
    pub languages: Vec<String>,
    pub technologies: Vec<String>,
    pub body: String,
}

/// One parsed source file. Items are immutable once parsed and shared with
/// route payloads through [`Arc`].
#[derive(Clone, Debug, PartialEq)]
pub enum ContentItem {
    Post(Arc<Post>),
    Experience(Arc<Experience>),
    Project(Arc<Project>),
    Slide(Arc<Slide>),
}

impl ContentItem {
    pub fn key(&self) -> &str {
        match self {
            ContentItem::Post(p) => &p.key,
            ContentItem::Experience(e) => &e.key,
            ContentItem::Project(p) => &p.key,
            ContentItem::Slide(s) => &s.key,
        }
    }

    pub fn content_type(&self) -> ContentType {
        match self {
            ContentItem::Post(_) => ContentType::Post,
            ContentItem::Experience(_) => ContentType::Experience,
            ContentItem::Project(_) => ContentType::Project,
            ContentItem::Slide(_) => ContentType::Slide,
        }
    }

    pub fn draft(&self) -> bool {
        match self {
            ContentItem::Post(p) => p.draft,
            ContentItem::Experience(e) => e.draft,
            ContentItem::Project(p) => p.draft,
            ContentItem::Slide(s) => s.draft,
        }
    }

    pub fn tags(&self, kind: TagKind) -> &[String] {
        match self {
            ContentItem::Post(p) => p.tags(kind),
            ContentItem::Experience(e) => select_tags(&e.languages, &e.technologies, kind),
            ContentItem::Project(p) => select_tags(&p.languages, &p.technologies, kind),
            ContentItem::Slide(s) => select_tags(&s.languages, &s.technologies, kind),
        }
    }

    /// The location the item was parsed from.
    pub fn location(&self) -> Location {
        let entry = match self {
            ContentItem::Post(p) => Entry::Post(p.id.clone()),
            ContentItem::Experience(_) => Entry::Experience,
            ContentItem::Project(_) => Entry::Project,
            ContentItem::Slide(s) => Entry::Slide(s.slug.clone()),
        };
        Location {
            key: self.key().to_owned(),
            entry,
        }
    }

    /// The page this item primarily belongs to. This depends only on the
    /// item's type and location, never on its contents.
    pub fn page_id(&self) -> PageId {
        match self {
            ContentItem::Post(p) => PageId::Post(p.id.clone()),
            ContentItem::Experience(_) => PageId::Fixed(FixedPage::Experience),
            ContentItem::Project(_) => PageId::Fixed(FixedPage::Projects),
            ContentItem::Slide(s) => PageId::Slides(s.slug.clone()),
        }
    }
}

pub(crate) fn select_tags<'a>(
    languages: &'a [String],
    technologies: &'a [String],
    kind: TagKind,
) -> &'a [String] {
    match kind {
        TagKind::Language => languages,
        TagKind::Technology => technologies,
    }
}

/// Page id for an item that may no longer be parseable; derived from its
/// location alone.
pub fn location_page_id(location: &Location) -> PageId {
    match &location.entry {
        Entry::Post(id) => PageId::Post(id.clone()),
        Entry::Experience => PageId::Fixed(FixedPage::Experience),
        Entry::Project => PageId::Fixed(FixedPage::Projects),
        Entry::Slide(slug) => PageId::Slides(slug.clone()),
    }
}

#[derive(Deserialize, Default)]
struct Frontmatter {
    title: Option<String>,
    description: Option<String>,
    time: Option<String>,
    #[serde(default)]
    draft: bool,
    languages: Option<Vec<String>>,
    technologies: Option<Vec<String>>,
    start: Option<String>,
    end: Option<String>,
    website: Option<String>,
    order: Option<i64>,
}

/// Parses a content item from the contents of the file at `location`. Each
/// file must be structured as follows:
///
/// 1. Initial frontmatter fence (`---`)
/// 2. YAML frontmatter
/// 3. Terminal frontmatter fence (`---`) on its own line
/// 4. Markdown body
///
/// For example:
///
/// ```md
/// ---
/// title: Hello, world!
/// time: "09:30"
/// languages: [Rust]
/// ---
/// # Hello
///
/// World
/// ```
pub fn parse(location: &Location, input: &str) -> Result<ContentItem> {
    let (yaml, body) = split_frontmatter(input)?;
    let frontmatter: Frontmatter = if yaml.trim().is_empty() {
        Frontmatter::default()
    } else {
        serde_yaml::from_str(yaml)?
    };

    let key = location.key.clone();
    let missing = |field: &'static str| Error::MissingField {
        key: location.key.clone(),
        field,
    };
    let title = frontmatter.title.clone().ok_or_else(|| missing("title"))?;
    let languages = normalize_tags(frontmatter.languages.unwrap_or_default());
    let technologies = normalize_tags(frontmatter.technologies.unwrap_or_default());
    let body = body.to_owned();

    Ok(match &location.entry {
        Entry::Post(id) => ContentItem::Post(Arc::new(Post {
            date: post_date(id, frontmatter.time.as_deref())?,
            key,
            id: id.clone(),
            title,
            description: frontmatter.description,
            draft: frontmatter.draft,
            languages,
            technologies,
            body,
        })),
        Entry::Experience => {
            let start = frontmatter.start.ok_or_else(|| missing("start"))?;
            ContentItem::Experience(Arc::new(Experience {
                started: start_date(&start)?,
                start,
                key,
                title,
                end: frontmatter.end,
                website: frontmatter.website,
                draft: frontmatter.draft,
                languages,
                technologies,
                body,
            }))
        }
        Entry::Project => ContentItem::Project(Arc::new(Project {
            order: frontmatter.order.ok_or_else(|| missing("order"))?,
            key,
            title,
            description: frontmatter.description,
            website: frontmatter.website,
            draft: frontmatter.draft,
            languages,
            technologies,
            body,
        })),
        Entry::Slide(slug) => ContentItem::Slide(Arc::new(Slide {
            key,
            slug: slug.clone(),
            title,
            description: frontmatter.description,
            draft: frontmatter.draft,
            languages,
            technologies,
            body,
        })),
    })
}

/// Splits `input` into its YAML frontmatter and markdown body.
pub fn split_frontmatter(input: &str) -> Result<(&str, &str)> {
    const FENCE: &str = "---";
    const CLOSING_FENCE: &str = "\n---";

    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let rest = input
        .strip_prefix(FENCE)
        .ok_or(Error::FrontmatterMissingStartFence)?;
    let yaml_stop = rest
        .find(CLOSING_FENCE)
        .ok_or(Error::FrontmatterMissingEndFence)?;
    let after_fence = &rest[yaml_stop + CLOSING_FENCE.len()..];
    let body = match after_fence.find('\n') {
        Some(newline) => &after_fence[newline + 1..],
        None => "",
    };
    Ok((&rest[..yaml_stop], body))
}

fn post_date(id: &PostId, time: Option<&str>) -> Result<DateTime<Utc>> {
    let time = match time.map(str::trim) {
        None | Some("") => NaiveTime::default(),
        Some(time) => NaiveTime::parse_from_str(time, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
            .map_err(|_| Error::InvalidTime(time.to_owned()))?,
    };
    let date = id.calendar_date()?;
    Ok(Utc.from_utc_datetime(&NaiveDateTime::new(date, time)))
}

// Accepts a year, a year and month, or a full date. Missing parts count as
// the first month or day.
fn start_date(start: &str) -> Result<NaiveDate> {
    let start = start.trim();
    let invalid = || Error::InvalidStart(start.to_owned());
    let mut parts = start.splitn(3, '-').map(|part| part.parse::<u32>());
    let year = match parts.next() {
        Some(Ok(year)) => i32::try_from(year).map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };
    let mut next = || match parts.next() {
        None => Ok(1),
        Some(Ok(n)) => Ok(n),
        Some(Err(_)) => Err(invalid()),
    };
    let month = next()?;
    let day = next()?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

// Trims, drops empties, and removes duplicates while keeping the author's
// order.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_owned());
        }
    }
    out
}

/// Represents the result of a content-item parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error locating or parsing a content item.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a source file is missing its starting frontmatter
    /// fence (`---`).
    #[error("content must begin with `---`")]
    FrontmatterMissingStartFence,

    /// Returned when a source file is missing its terminal frontmatter fence
    /// (i.e., the starting fence was found but the ending one was missing).
    #[error("missing closing `---`")]
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    #[error(transparent)]
    DeserializeYaml(#[from] serde_yaml::Error),

    /// Returned when a required frontmatter field is absent.
    #[error("`{key}` is missing required field `{field}`")]
    MissingField { key: String, field: &'static str },

    /// Returned when a path isn't inside the content directory.
    #[error("{0:?} is outside the content directory")]
    OutsideContent(PathBuf),

    /// Returned when a path isn't a markdown file.
    #[error("{0:?} is not a markdown file")]
    NotMarkdown(PathBuf),

    /// Returned when a path has components that aren't valid UTF-8 names.
    #[error("invalid file name: {0:?}")]
    InvalidFileName(PathBuf),

    /// Returned when a path isn't inside one of the known collections.
    #[error("`{0}` does not belong to a known content collection")]
    UnknownContentType(String),

    /// Returned when a post path doesn't follow `blog/YYYY/MM/DD/slug`.
    #[error("`{0}` is not a valid post path")]
    InvalidPostPath(String),

    /// Returned when a slide path doesn't follow `slides/slug`.
    #[error("`{0}` is not a valid slide deck path")]
    InvalidSlidePath(String),

    /// Returned when a post's path segments don't form a calendar date.
    #[error("`{0}` does not denote a valid date")]
    InvalidDate(String),

    /// Returned when an experience's `start` isn't `YYYY`, `YYYY-MM` or
    /// `YYYY-MM-DD`.
    #[error("invalid start `{0}`")]
    InvalidStart(String),

    /// Returned when the frontmatter `time` isn't `HH:MM` or `HH:MM:SS`.
    #[error("invalid time `{0}`")]
    InvalidTime(String),

    /// Returned when two source files resolve to the same page (e.g., both
    /// `hello.md` and `hello/index.md` for the same date).
    #[error("`{key}` resolves to the same page as `{other}`")]
    DuplicatePage { key: String, other: String },

    /// Returned when a source file couldn't be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod test {
    use super::*;

    fn content_dir() -> PathBuf {
        PathBuf::from("/site/content")
    }

    fn located(relative: &str) -> Result<Location> {
        locate(&content_dir(), &content_dir().join(relative))
    }

    #[test]
    fn test_locate_post_file_and_bundle() -> Result<()> {
        let wanted = Entry::Post(PostId::new("2024", "05", "01", "hello")?);
        assert_eq!(wanted, located("blog/2024/05/01/hello.md")?.entry);
        let bundle = located("blog/2024/05/01/hello/index.md")?;
        assert_eq!(wanted, bundle.entry);
        assert_eq!("blog/2024/05/01/hello/index.md", bundle.key);
        Ok(())
    }

    #[test]
    fn test_locate_rejects_bad_paths() {
        assert!(matches!(
            located("blog/2024/05/01/hello/notes.md"),
            Err(Error::InvalidPostPath(_))
        ));
        assert!(matches!(
            located("blog/2024/02/30/hello.md"),
            Err(Error::InvalidDate(_))
        ));
        assert!(matches!(
            located("blog/24/05/01/hello.md"),
            Err(Error::InvalidPostPath(_))
        ));
        assert!(matches!(located("drafts/a.md"), Err(Error::UnknownContentType(_))));
        assert!(matches!(located("slides/deck/img.png"), Err(Error::NotMarkdown(_))));
        assert!(matches!(
            locate(&content_dir(), Path::new("/elsewhere/a.md")),
            Err(Error::OutsideContent(_))
        ));
    }

    #[test]
    fn test_locate_slides_and_profile_entries() -> Result<()> {
        assert_eq!(Entry::Slide("intro".to_owned()), located("slides/intro/index.md")?.entry);
        assert_eq!(Entry::Slide("intro".to_owned()), located("slides/intro.md")?.entry);
        assert_eq!(Entry::Experience, located("experience/2019/acme.md")?.entry);
        assert_eq!(Entry::Project, located("projects/ravensite.md")?.entry);
        Ok(())
    }

    #[test]
    fn test_parse_post() -> Result<()> {
        let location = located("blog/2024/05/01/hello/index.md")?;
        let item = parse(
            &location,
            "---\ntitle: Hello\ntime: \"09:30\"\nlanguages: [Go, \" Go \", \"\"]\n---\n# Hi\n",
        )?;
        let post = match item {
            ContentItem::Post(post) => post,
            other => panic!("expected a post, got {:?}", other),
        };
        assert_eq!("Hello", post.title);
        assert_eq!("2024-05-01T09:30:00+00:00", post.date.to_rfc3339());
        assert_eq!(vec!["Go".to_owned()], post.languages);
        assert!(post.technologies.is_empty());
        assert_eq!("# Hi\n", post.body);
        assert_eq!("/blog/2024/05/01/hello/", post.route_path());
        Ok(())
    }

    #[test]
    fn test_page_id_ignores_contents() -> Result<()> {
        let location = located("blog/2024/05/01/hello.md")?;
        let a = parse(&location, "---\ntitle: A\n---\nbody")?;
        let b = parse(&location, "---\ntitle: B\ndraft: true\n---\nother")?;
        assert_eq!(a.page_id(), b.page_id());
        assert_eq!("post:2024:05:01:hello", a.page_id().to_string());
        Ok(())
    }

    #[test]
    fn test_parse_requires_type_specific_fields() -> Result<()> {
        let experience = located("experience/acme.md")?;
        assert!(matches!(
            parse(&experience, "---\ntitle: Acme\n---\n"),
            Err(Error::MissingField { field: "start", .. })
        ));
        let project = located("projects/tool.md")?;
        assert!(matches!(
            parse(&project, "---\ntitle: Tool\n---\n"),
            Err(Error::MissingField { field: "order", .. })
        ));
        Ok(())
    }

    #[test]
    fn test_experience_start_is_a_date() -> Result<()> {
        let location = located("experience/acme.md")?;
        let started = |start: &str| {
            let contents = format!("---\ntitle: Acme\nstart: \"{}\"\n---\n", start);
            match parse(&location, &contents) {
                Ok(ContentItem::Experience(experience)) => Ok(experience.started),
                Ok(_) => panic!("expected an experience"),
                Err(err) => Err(err),
            }
        };
        assert_eq!(NaiveDate::from_ymd_opt(2019, 1, 1), started("2019-1").ok());
        assert_eq!(NaiveDate::from_ymd_opt(2019, 10, 1), started("2019-10").ok());
        assert_eq!(NaiveDate::from_ymd_opt(2019, 1, 1), started("2019").ok());
        assert_eq!(NaiveDate::from_ymd_opt(2019, 10, 15), started("2019-10-15").ok());
        assert!(matches!(started("2019-13"), Err(Error::InvalidStart(_))));
        assert!(matches!(started("soon"), Err(Error::InvalidStart(_))));
        Ok(())
    }

    #[test]
    fn test_frontmatter_fences() {
        assert!(matches!(
            split_frontmatter("title: x\n"),
            Err(Error::FrontmatterMissingStartFence)
        ));
        assert!(matches!(
            split_frontmatter("---\ntitle: x\n"),
            Err(Error::FrontmatterMissingEndFence)
        ));
        assert_eq!(
            ("\ntitle: a---b", "body\n"),
            split_frontmatter("---\ntitle: a---b\n---\nbody\n").unwrap()
        );
    }

    #[test]
    fn test_invalid_time_is_rejected() -> Result<()> {
        let location = located("blog/2024/05/01/hello.md")?;
        assert!(matches!(
            parse(&location, "---\ntitle: A\ntime: noon\n---\n"),
            Err(Error::InvalidTime(_))
        ));
        Ok(())
    }
}
